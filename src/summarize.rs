//! Extractive article summaries.
//!
//! Deliberately boring: paragraph text comes from `<p>` tags, sentences are
//! scored by word frequency, and the top sentences are emitted in their
//! original order. Short articles pass through whole. No network, no model,
//! fully deterministic.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use std::collections::HashMap;

/// Paragraphs shorter than this are navigation crumbs, not body text.
const MIN_PARAGRAPH_CHARS: usize = 40;

/// Texts shorter than this are returned whole instead of summarized.
const MIN_SUMMARY_INPUT_CHARS: usize = 100;

/// Words this short carry no topical weight.
const MIN_SCORED_WORD_CHARS: usize = 4;

/// Collect the article body text from a parsed document.
pub fn extract_body_text(doc: &Html) -> String {
    static PARAGRAPH: Lazy<Selector> = Lazy::new(|| Selector::parse("p").unwrap());
    doc.select(&PARAGRAPH)
        .map(|p| p.text().collect::<String>())
        .map(|t| t.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|t| t.chars().count() >= MIN_PARAGRAPH_CHARS)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Produce an extractive summary of at most `max_sentences` sentences.
pub fn summarize(text: &str, max_sentences: usize) -> String {
    let cleaned = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if cleaned.chars().count() < MIN_SUMMARY_INPUT_CHARS || max_sentences == 0 {
        return cleaned;
    }

    let sentences = split_sentences(&cleaned);
    if sentences.len() <= max_sentences {
        return cleaned;
    }

    let frequencies = word_frequencies(&cleaned);
    let mut scored: Vec<(usize, f64)> = sentences
        .iter()
        .enumerate()
        .map(|(i, s)| (i, sentence_score(s, &frequencies)))
        .collect();
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));

    let mut picked: Vec<usize> = scored.iter().take(max_sentences).map(|(i, _)| *i).collect();
    picked.sort_unstable();

    picked
        .into_iter()
        .map(|i| sentences[i].as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

fn split_sentences(text: &str) -> Vec<String> {
    static BOUNDARY: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?…]+\s+").unwrap());
    let mut sentences = Vec::new();
    let mut start = 0;
    for m in BOUNDARY.find_iter(text) {
        let sentence = text[start..m.end()].trim();
        if !sentence.is_empty() {
            sentences.push(sentence.to_string());
        }
        start = m.end();
    }
    let tail = text[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail.to_string());
    }
    sentences
}

fn word_frequencies(text: &str) -> HashMap<String, f64> {
    let mut counts: HashMap<String, f64> = HashMap::new();
    for word in text.split_whitespace() {
        let word: String = word
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        if word.chars().count() >= MIN_SCORED_WORD_CHARS {
            *counts.entry(word).or_insert(0.0) += 1.0;
        }
    }
    counts
}

fn sentence_score(sentence: &str, frequencies: &HashMap<String, f64>) -> f64 {
    let words: Vec<String> = sentence
        .split_whitespace()
        .map(|w| {
            w.chars()
                .filter(|c| c.is_alphanumeric())
                .collect::<String>()
                .to_lowercase()
        })
        .filter(|w| w.chars().count() >= MIN_SCORED_WORD_CHARS)
        .collect();
    if words.is_empty() {
        return 0.0;
    }
    let total: f64 = words.iter().filter_map(|w| frequencies.get(w)).sum();
    total / words.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_passes_through() {
        let text = "Короткая заметка о банке.";
        assert_eq!(summarize(text, 3), text);
    }

    #[test]
    fn test_whitespace_is_collapsed() {
        let text = "Первое   предложение.\n\nВторое    предложение.";
        assert_eq!(summarize(text, 3), "Первое предложение. Второе предложение.");
    }

    #[test]
    fn test_summary_keeps_original_order() {
        let text = "Банк объявил о повышении ключевой ставки до рекордного уровня в декабре. \
                    Погода в городе была пасмурной и дождливой весь день напролет. \
                    Аналитики банка считают, что повышение ставки банка замедлит инфляцию. \
                    Клиенты банка начали переводить вклады под новую ставку банка немедленно.";
        let summary = summarize(text, 2);
        let sentences = split_sentences(&summary);
        assert_eq!(sentences.len(), 2);
        // picked sentences appear in their original relative order
        let first_pos = text.find(sentences[0].as_str()).unwrap();
        let second_pos = text.find(sentences[1].as_str()).unwrap();
        assert!(first_pos < second_pos);
    }

    #[test]
    fn test_frequency_scoring_prefers_topical_sentences() {
        let text = "Ставка ставка ставка выросла и ставка изменилась очень сильно вчера. \
                    Совершенно нерелевантное предложение про погоду без ключевых слов. \
                    Новая ставка удивила рынок и ставка стала главной темой дня.";
        let summary = summarize(text, 2);
        assert!(summary.contains("ставка"));
        assert!(!summary.contains("погоду"));
    }

    #[test]
    fn test_extract_body_text_skips_short_paragraphs() {
        let html = r#"<html><body>
            <p>Меню</p>
            <p>Банк объявил о повышении ключевой ставки до нового рекордного уровня.</p>
            <p>Подробнее</p>
        </body></html>"#;
        let doc = Html::parse_document(html);
        let body = extract_body_text(&doc);
        assert!(body.contains("ключевой ставки"));
        assert!(!body.contains("Меню"));
    }

    #[test]
    fn test_determinism() {
        let text = "Первое предложение достаточно длинное для анализа частот слов здесь. \
                    Второе предложение тоже содержит достаточно много слов для оценки. \
                    Третье предложение завершает небольшой тестовый текст про слова.";
        assert_eq!(summarize(text, 2), summarize(text, 2));
    }
}
