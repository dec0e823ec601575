//! Defensive multi-format date parsing.
//!
//! [`DateStringParser`] turns one free-text date/time fragment into a
//! normalized [`Timestamp`], or `None` when the fragment is unusable.
//! Stages run in strict priority order, first success wins:
//!
//! 1. **ISO-8601**: a leading `YYYY-MM-DD` shape is unambiguous and always
//!    wins. `T`/`Z` separators and trailing offsets are normalized away
//!    before re-parsing as local components.
//! 2. **Localized pattern library**: an ordered list of `(regex, extractor)`
//!    rules covering the formats observed on real news sites (localized
//!    month names, `DD.MM.YYYY в HH:MM`, labeled and time-first forms).
//!    A month token missing from the lookup table, or an out-of-range
//!    calendar value, makes the rule non-matching and evaluation continues.
//! 3. **Generic fallback**: RFC 2822, then a strict day-first format list,
//!    then a fuzzy pass anchored at 2000-01-01 so missing fields never get
//!    substituted with "today".
//!
//! The permissive stages must never pre-empt the unambiguous ones: general
//! day-first parsing is prone to day/month swaps, so it runs last.
//!
//! All rule lists are configuration data ([`ParserConfig`]) supplied at
//! construction time; adding a new site's date format is a data change.

use crate::models::Timestamp;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use tracing::trace;

/// Inputs this short are too ambiguous to be dates ("12:30", "5 мин").
const MIN_INPUT_CHARS: usize = 6;

/// Anchor date for the fuzzy pass; fields the input lacks come from here,
/// never from the current date.
const FUZZY_ANCHOR: (i32, u32, u32) = (2000, 1, 1);

/// How a localized pattern's capture groups map onto calendar fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extract {
    /// `(day, month-name, year, hour, minute)`
    DayMonthYearHm,
    /// `(hour, minute, day, month-name, year)`
    HmDayMonthYear,
    /// `(day, month-name, year)` — no time component.
    DayMonthYear,
    /// `(day, month-number, year, hour, minute)`
    NumericDmyHm,
}

/// One localized template: a regex plus the extractor describing its groups.
#[derive(Debug, Clone)]
pub struct PatternRule {
    pub pattern: String,
    pub extract: Extract,
}

impl PatternRule {
    fn new(pattern: &str, extract: Extract) -> Self {
        Self {
            pattern: pattern.to_string(),
            extract,
        }
    }
}

/// Configuration data for [`DateStringParser`].
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Month-name stems mapped to month numbers. Lookup is substring-based
    /// over the lowercased token, so genitive suffixes and trailing dots
    /// need no entries of their own.
    pub month_stems: Vec<(String, u32)>,
    /// Localized-month substitutions applied before the generic fallback
    /// only; the primary path is the pattern library above.
    pub month_translations: Vec<(String, String)>,
    /// Strings matching any of these are rejected outright (e.g. bare
    /// year ranges like `2024—2025`).
    pub bad_patterns: Vec<String>,
    /// The ordered localized template list, first match wins.
    pub rules: Vec<PatternRule>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        let ru = [
            "янв", "фев", "мар", "апр", "май", "июн", "июл", "авг", "сен", "окт", "ноя", "дек",
        ];
        let en = [
            "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
        ];
        let en_full = [
            "january",
            "february",
            "march",
            "april",
            "may",
            "june",
            "july",
            "august",
            "september",
            "october",
            "november",
            "december",
        ];
        let ru_genitive = [
            "января",
            "февраля",
            "марта",
            "апреля",
            "мая",
            "июня",
            "июля",
            "августа",
            "сентября",
            "октября",
            "ноября",
            "декабря",
        ];

        let mut month_stems = Vec::new();
        // "мая" does not contain the stem "май", so the genitive forms get
        // their own entries ahead of the nominative stems.
        for (i, name) in ru_genitive.iter().enumerate() {
            month_stems.push((name.to_string(), i as u32 + 1));
        }
        for (i, stem) in ru.iter().chain(en.iter()).enumerate() {
            month_stems.push((stem.to_string(), (i % 12) as u32 + 1));
        }

        let mut month_translations = Vec::new();
        for (i, name) in ru_genitive.iter().enumerate() {
            month_translations.push((name.to_string(), en_full[i].to_string()));
        }
        // dotted abbreviations before bare ones, so "янв." leaves no stray dot
        for (i, stem) in ru.iter().enumerate() {
            month_translations.push((format!("{stem}."), en_full[i].to_string()));
        }
        for (i, stem) in ru.iter().enumerate() {
            month_translations.push((stem.to_string(), en_full[i].to_string()));
        }

        Self {
            month_stems,
            month_translations,
            bad_patterns: vec![r"^\d{4}[—–-]\d{4}$".to_string()],
            rules: vec![
                // "03 декабря 2025, 11:35" / "3 дек 2025 11:35" / "5 декабря 2025 в 11:36"
                PatternRule::new(
                    r"(\d{1,2})\s+([а-яёa-z]+\.?)\s+(\d{4})[,\s]\s*(?:в\s+)?(\d{1,2}):(\d{2})",
                    Extract::DayMonthYearHm,
                ),
                // "17:36, 14 декабря 2025"
                PatternRule::new(
                    r"(\d{1,2}):(\d{2}),?\s+(\d{1,2})\s+([а-яёa-z]+)\s+(\d{4})",
                    Extract::HmDayMonthYear,
                ),
                // "Дата публикации: 02 дек 2025"
                PatternRule::new(
                    r"дата публикации:\s*(\d{1,2})\s+([а-яёa-z]+\.?)\s+(\d{4})",
                    Extract::DayMonthYear,
                ),
                // "03 декабря 2025" / "3 дек 2025"
                PatternRule::new(
                    r"(\d{1,2})\s+([а-яёa-z]+\.?)\s+(\d{4})",
                    Extract::DayMonthYear,
                ),
                // "04.12.2025 в 07:56"
                PatternRule::new(
                    r"(\d{2})\.(\d{2})\.(\d{4})\s+в\s+(\d{2}):(\d{2})",
                    Extract::NumericDmyHm,
                ),
                // "04.12.2025 07:56"
                PatternRule::new(
                    r"(\d{2})\.(\d{2})\.(\d{4})\s*(?:в\s*)?(\d{2}):(\d{2})",
                    Extract::NumericDmyHm,
                ),
            ],
        }
    }
}

/// Turns one free-text date/time fragment into a normalized [`Timestamp`].
#[derive(Debug, Clone)]
pub struct DateStringParser {
    month_stems: Vec<(String, u32)>,
    month_translations: Vec<(String, String)>,
    bad_patterns: Vec<Regex>,
    rules: Vec<(Regex, Extract)>,
}

impl Default for DateStringParser {
    fn default() -> Self {
        Self::new(&ParserConfig::default()).expect("default parser config is valid")
    }
}

impl DateStringParser {
    /// Compile a parser from configuration data.
    ///
    /// # Errors
    ///
    /// Returns an error if any configured pattern fails to compile.
    pub fn new(config: &ParserConfig) -> Result<Self, Box<dyn Error>> {
        let bad_patterns = config
            .bad_patterns
            .iter()
            .map(|p| Regex::new(p))
            .collect::<Result<Vec<_>, _>>()?;
        let rules = config
            .rules
            .iter()
            .map(|r| Regex::new(&r.pattern).map(|re| (re, r.extract)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            month_stems: config.month_stems.clone(),
            month_translations: config.month_translations.clone(),
            bad_patterns,
            rules,
        })
    }

    /// Parse one fragment. `None` means "no usable signal", never an error.
    pub fn parse(&self, raw: &str) -> Option<Timestamp> {
        let trimmed = raw.trim();
        if trimmed.chars().count() < MIN_INPUT_CHARS {
            return None;
        }
        if self.bad_patterns.iter().any(|re| re.is_match(trimmed)) {
            trace!(input = trimmed, "rejected by bad-pattern list");
            return None;
        }

        let lower = trimmed.to_lowercase();
        self.parse_iso(trimmed, &lower)
            .or_else(|| self.parse_localized(&lower))
            .or_else(|| self.parse_generic(trimmed, &lower))
    }

    /// Stage 1: leading `YYYY-MM-DD` shape.
    fn parse_iso(&self, original: &str, lower: &str) -> Option<Timestamp> {
        static ISO_SHAPE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}").unwrap());
        static TRAILING_OFFSET: Lazy<Regex> =
            Lazy::new(|| Regex::new(r"[+-]\d{2}:?\d{2}$").unwrap());

        if !ISO_SHAPE.is_match(lower) {
            return None;
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(original) {
            return Some(Timestamp::with_time(dt.date_naive(), dt.time()));
        }

        // normalize T/Z separators away and re-parse as local components
        let normalized = lower.replace('t', " ").replace('z', "");
        let normalized = TRAILING_OFFSET.replace(normalized.trim(), "");
        let normalized = normalized.trim();

        for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
            if let Ok(dt) = NaiveDateTime::parse_from_str(normalized, fmt) {
                return Some(Timestamp::with_time(dt.date(), dt.time()));
            }
        }
        // shape guarantees the first 10 bytes are ASCII `YYYY-MM-DD`
        NaiveDate::parse_from_str(&normalized[..10], "%Y-%m-%d")
            .ok()
            .map(Timestamp::date_only)
    }

    /// Stage 2: the ordered localized template list.
    fn parse_localized(&self, lower: &str) -> Option<Timestamp> {
        for (re, extract) in &self.rules {
            let Some(caps) = re.captures(lower) else {
                continue;
            };
            let group = |i: usize| caps.get(i).map(|m| m.as_str()).unwrap_or("");
            let num = |i: usize| group(i).parse::<u32>().ok();

            let built = match extract {
                Extract::DayMonthYearHm => self.build(
                    group(3).parse().ok(),
                    self.month_from_token(group(2)),
                    num(1),
                    Some((num(4), num(5))),
                ),
                Extract::HmDayMonthYear => self.build(
                    group(5).parse().ok(),
                    self.month_from_token(group(4)),
                    num(3),
                    Some((num(1), num(2))),
                ),
                Extract::DayMonthYear => self.build(
                    group(3).parse().ok(),
                    self.month_from_token(group(2)),
                    num(1),
                    None,
                ),
                Extract::NumericDmyHm => self.build(
                    group(3).parse().ok(),
                    num(2),
                    num(1),
                    Some((num(4), num(5))),
                ),
            };

            // an unknown month token or an out-of-range value (day 32)
            // makes this rule non-matching; keep evaluating
            if built.is_some() {
                return built;
            }
        }
        None
    }

    fn build(
        &self,
        year: Option<i32>,
        month: Option<u32>,
        day: Option<u32>,
        time: Option<(Option<u32>, Option<u32>)>,
    ) -> Option<Timestamp> {
        let date = NaiveDate::from_ymd_opt(year?, month?, day?)?;
        match time {
            Some((hour, minute)) => {
                let time = NaiveTime::from_hms_opt(hour?, minute?, 0)?;
                Some(Timestamp::with_time(date, time))
            }
            None => Some(Timestamp::date_only(date)),
        }
    }

    /// Stage 3: permissive day-first parsing, strict then fuzzy.
    fn parse_generic(&self, original: &str, lower: &str) -> Option<Timestamp> {
        if let Ok(dt) = DateTime::parse_from_rfc2822(original) {
            return Some(Timestamp::with_time(dt.date_naive(), dt.time()));
        }

        let translated = self.translate_months(lower);
        let collapsed = translated.split_whitespace().collect::<Vec<_>>().join(" ");

        for fmt in [
            "%d.%m.%Y %H:%M:%S",
            "%d.%m.%Y %H:%M",
            "%d/%m/%Y %H:%M",
            "%d %B %Y %H:%M",
        ] {
            if let Ok(dt) = NaiveDateTime::parse_from_str(&collapsed, fmt) {
                return Some(Timestamp::with_time(dt.date(), dt.time()));
            }
        }
        for fmt in [
            "%d.%m.%Y",
            "%d/%m/%Y",
            "%d-%m-%Y",
            "%d %B %Y",
            "%B %d, %Y",
        ] {
            if let Ok(date) = NaiveDate::parse_from_str(&collapsed, fmt) {
                return Some(Timestamp::date_only(date));
            }
        }

        self.parse_fuzzy(&collapsed)
    }

    /// Last resort: pick date-like tokens out of surrounding text. Missing
    /// fields come from the fixed anchor, never from the current date.
    fn parse_fuzzy(&self, s: &str) -> Option<Timestamp> {
        static NUMERIC: Lazy<Regex> =
            Lazy::new(|| Regex::new(r"\b(\d{1,2})[./-](\d{1,2})[./-](\d{2,4})\b").unwrap());
        static DAY_NAME: Lazy<Regex> =
            Lazy::new(|| Regex::new(r"\b(\d{1,2})\s+([a-zа-яё]+)").unwrap());
        static NAME_YEAR: Lazy<Regex> =
            Lazy::new(|| Regex::new(r"\b([a-zа-яё]+)\s+(\d{4})\b").unwrap());
        static TIME: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(\d{1,2}):(\d{2})\b").unwrap());

        let (anchor_year, _, anchor_day) = FUZZY_ANCHOR;
        let time = TIME.captures(s).and_then(|c| {
            let hour: u32 = c[1].parse().ok()?;
            let minute: u32 = c[2].parse().ok()?;
            NaiveTime::from_hms_opt(hour, minute, 0)
        });

        let date = self
            .fuzzy_numeric(&NUMERIC, s)
            .or_else(|| self.fuzzy_day_name(&DAY_NAME, &NAME_YEAR, s, anchor_year))
            .or_else(|| self.fuzzy_name_year(&NAME_YEAR, s, anchor_day))?;

        Some(match time {
            Some(t) => Timestamp::with_time(date, t),
            None => Timestamp::date_only(date),
        })
    }

    fn fuzzy_numeric(&self, re: &Regex, s: &str) -> Option<NaiveDate> {
        let caps = re.captures(s)?;
        let a: u32 = caps[1].parse().ok()?;
        let b: u32 = caps[2].parse().ok()?;
        let year: i32 = caps[3].parse().ok()?;
        let year = if year < 100 { year + 2000 } else { year };
        // day-first; swap only when that is impossible
        NaiveDate::from_ymd_opt(year, b, a).or_else(|| NaiveDate::from_ymd_opt(year, a, b))
    }

    fn fuzzy_day_name(
        &self,
        day_name: &Regex,
        name_year: &Regex,
        s: &str,
        anchor_year: i32,
    ) -> Option<NaiveDate> {
        let caps = day_name.captures(s)?;
        let day: u32 = caps[1].parse().ok()?;
        let month = self.month_from_token(&caps[2])?;
        let year = name_year
            .captures(s)
            .and_then(|c| c[2].parse::<i32>().ok())
            .unwrap_or(anchor_year);
        NaiveDate::from_ymd_opt(year, month, day)
    }

    fn fuzzy_name_year(&self, re: &Regex, s: &str, anchor_day: u32) -> Option<NaiveDate> {
        for caps in re.captures_iter(s) {
            if let Some(month) = self.month_from_token(&caps[1]) {
                if let Some(year) = caps[2].parse::<i32>().ok() {
                    if let Some(date) = NaiveDate::from_ymd_opt(year, month, anchor_day) {
                        return Some(date);
                    }
                }
            }
        }
        None
    }

    /// Map a lowercased month token to its number via substring lookup.
    fn month_from_token(&self, token: &str) -> Option<u32> {
        self.month_stems
            .iter()
            .find(|(stem, _)| token.contains(stem.as_str()))
            .map(|(_, num)| *num)
    }

    /// Replace the first recognized localized month name with its English
    /// form, for the benefit of the generic format list only.
    fn translate_months(&self, lower: &str) -> String {
        for (from, to) in &self.month_translations {
            if lower.contains(from.as_str()) {
                return lower.replacen(from.as_str(), to, 1);
            }
        }
        lower.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn parser() -> DateStringParser {
        DateStringParser::default()
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_iso_date_only() {
        let ts = parser().parse("2025-12-03").unwrap();
        assert_eq!(ts.date, d(2025, 12, 3));
        assert!(!ts.has_time());
    }

    #[test]
    fn test_iso_with_time_and_zone() {
        let ts = parser().parse("2025-12-03T11:35:00Z").unwrap();
        assert_eq!(ts.date, d(2025, 12, 3));
        assert_eq!(ts.time, NaiveTime::from_hms_opt(11, 35, 0));
    }

    #[test]
    fn test_iso_with_offset() {
        let ts = parser().parse("2025-12-03T11:35:00+03:00").unwrap();
        assert_eq!(ts.date, d(2025, 12, 3));
        assert_eq!(ts.time, NaiveTime::from_hms_opt(11, 35, 0));
    }

    #[test]
    fn test_iso_space_separated() {
        let ts = parser().parse("2025-12-03 11:35").unwrap();
        assert_eq!(ts.date, d(2025, 12, 3));
        assert_eq!(ts.time, Some(t(11, 35)));
    }

    #[test]
    fn test_iso_beats_later_stages() {
        // a string that stage 2 could also claim must still parse as ISO
        let ts = parser().parse("2025-12-03 11:35, 5 января 2020").unwrap();
        assert_eq!(ts.date, d(2025, 12, 3));
    }

    #[test]
    fn test_short_inputs_rejected() {
        let p = parser();
        assert_eq!(p.parse(""), None);
        assert_eq!(p.parse("12:30"), None);
        assert_eq!(p.parse("  5 мин "), None);
    }

    #[test]
    fn test_year_range_rejected() {
        assert_eq!(parser().parse("2024—2025"), None);
    }

    #[test]
    fn test_localized_full_and_abbreviated_agree() {
        let p = parser();
        let full = p.parse("3 декабря 2025").unwrap();
        let abbrev = p.parse("3 дек 2025").unwrap();
        assert_eq!(full, abbrev);
        assert_eq!(full.date, d(2025, 12, 3));
        assert!(!full.has_time());
    }

    #[test]
    fn test_localized_with_time() {
        let ts = parser().parse("03 декабря 2025, 11:35").unwrap();
        assert_eq!(ts.date, d(2025, 12, 3));
        assert_eq!(ts.time, Some(t(11, 35)));
    }

    #[test]
    fn test_localized_v_separator() {
        let ts = parser().parse("5 декабря 2025 в 11:36").unwrap();
        assert_eq!(ts.date, d(2025, 12, 5));
        assert_eq!(ts.time, Some(t(11, 36)));
    }

    #[test]
    fn test_time_first_form() {
        let ts = parser().parse("17:36, 14 декабря 2025").unwrap();
        assert_eq!(ts.date, d(2025, 12, 14));
        assert_eq!(ts.time, Some(t(17, 36)));
    }

    #[test]
    fn test_labeled_form() {
        let ts = parser().parse("Дата публикации: 02 дек 2025").unwrap();
        assert_eq!(ts.date, d(2025, 12, 2));
        assert!(!ts.has_time());
    }

    #[test]
    fn test_numeric_dmy_with_v() {
        let ts = parser().parse("04.12.2025 в 07:56").unwrap();
        assert_eq!(ts.date, d(2025, 12, 4));
        assert_eq!(ts.time, Some(t(7, 56)));
    }

    #[test]
    fn test_numeric_dmy_plain_time() {
        let ts = parser().parse("04.12.2025 07:56").unwrap();
        assert_eq!(ts.date, d(2025, 12, 4));
        assert_eq!(ts.time, Some(t(7, 56)));
    }

    #[test]
    fn test_genitive_may_parses() {
        let ts = parser().parse("15 мая 2025").unwrap();
        assert_eq!(ts.date, d(2025, 5, 15));
    }

    #[test]
    fn test_day_32_never_propagates() {
        // the localized rule rejects the invalid day; later stages may still
        // salvage a coarser date, but day 32 must never come out
        let got = parser().parse("32 декабря 2025");
        if let Some(ts) = got {
            assert_ne!(ts.day(), 32);
            assert_eq!(ts.month(), 12);
            assert_eq!(ts.year(), 2025);
        }
    }

    #[test]
    fn test_rfc2822_reference_dates() {
        let ts = parser().parse("Tue, 03 Dec 2025 11:30:00 GMT").unwrap();
        assert_eq!(ts.date, d(2025, 12, 3));
        assert!(ts.has_time());
    }

    #[test]
    fn test_generic_day_first() {
        let ts = parser().parse("05.12.2025").unwrap();
        assert_eq!(ts.date, d(2025, 12, 5));
        assert!(!ts.has_time());
    }

    #[test]
    fn test_fuzzy_anchor_not_today() {
        // month + year only: the day comes from the fixed anchor
        let ts = parser().parse("опубликовано в декабре 2025 года");
        if let Some(ts) = ts {
            assert_eq!(ts.year(), 2025);
            assert_eq!(ts.day(), 1);
        }
    }

    #[test]
    fn test_determinism() {
        let p = parser();
        let a = p.parse("3 декабря 2025, 11:35");
        let b = p.parse("3 декабря 2025, 11:35");
        assert_eq!(a, b);
    }

    #[test]
    fn test_garbage_returns_none() {
        let p = parser();
        assert_eq!(p.parse("читать далее"), None);
        assert_eq!(p.parse("…—…—…"), None);
    }

    #[test]
    fn test_custom_config_bad_pattern() {
        let mut config = ParserConfig::default();
        config.bad_patterns.push(r"^draft".to_string());
        let p = DateStringParser::new(&config).unwrap();
        assert_eq!(p.parse("draft 3 декабря 2025"), None);
    }
}
