//! Harvesting date signals from a parsed HTML document.
//!
//! [`SignalCollector`] walks a page in a fixed order (structured-data
//! scripts, then metadata tags, then CSS class/compound selectors) and emits
//! every candidate whose raw text parses as a date. Each element can yield
//! up to three signals, probed in order: a `datetime` attribute, a `content`
//! attribute, and the trimmed visible text.
//!
//! Collection never fails: an invalid selector, a malformed script payload,
//! or a missing attribute just narrows the result. Reconciliation decides
//! what the signals mean; this module only gathers them.

use crate::config::SourceRules;
use crate::models::{DateSignal, Provenance};
use crate::parse::DateStringParser;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use tracing::{debug, trace};

/// Walks a parsed document and emits parseable date candidates.
pub struct SignalCollector {
    rules: SourceRules,
    parser: DateStringParser,
}

impl SignalCollector {
    pub fn new(rules: SourceRules, parser: DateStringParser) -> Self {
        Self { rules, parser }
    }

    /// Collect all signals from `doc` in stable discovery order.
    pub fn collect(&self, doc: &Html, url: &str) -> Vec<DateSignal> {
        let mut signals = Vec::new();
        self.scan_structured_data(doc, &mut signals);
        self.scan_meta_tags(doc, &mut signals);
        self.scan_selectors(doc, &mut signals);
        debug!(url, count = signals.len(), "Collected date signals");
        signals
    }

    /// Embedded structured-data blocks: probe `datePublished`, then
    /// `dateCreated`, in both single objects and top-level arrays.
    fn scan_structured_data(&self, doc: &Html, out: &mut Vec<DateSignal>) {
        for sel_str in &self.rules.script_selectors {
            let Ok(selector) = Selector::parse(sel_str) else {
                trace!(selector = sel_str.as_str(), "Invalid script selector");
                continue;
            };
            for script in doc.select(&selector) {
                let body = script.text().collect::<String>();
                let Ok(value) = serde_json::from_str::<Value>(&body) else {
                    continue;
                };
                let objects: Vec<&Value> = match &value {
                    Value::Array(items) => items.iter().collect(),
                    other => vec![other],
                };
                for object in objects {
                    for key in ["datePublished", "dateCreated"] {
                        if let Some(text) = object.get(key).and_then(Value::as_str) {
                            self.push_candidate(
                                out,
                                text,
                                Provenance::StructuredData,
                                format!("json-ld:{key}"),
                            );
                        }
                    }
                }
            }
        }
    }

    /// Metadata tags: first matching element per selector, `content` attribute.
    fn scan_meta_tags(&self, doc: &Html, out: &mut Vec<DateSignal>) {
        for sel_str in &self.rules.meta_selectors {
            let Ok(selector) = Selector::parse(sel_str) else {
                trace!(selector = sel_str.as_str(), "Invalid meta selector");
                continue;
            };
            if let Some(element) = doc.select(&selector).next() {
                if let Some(content) = element.value().attr("content") {
                    self.push_candidate(
                        out,
                        content,
                        Provenance::MetaTag,
                        format!("meta:{sel_str}"),
                    );
                }
            }
        }
    }

    /// Class names and compound selectors: every matching element, three
    /// facets per element.
    fn scan_selectors(&self, doc: &Html, out: &mut Vec<DateSignal>) {
        let class_selectors = self
            .rules
            .time_classes
            .iter()
            .map(|name| normalize_class(name));
        let selectors = class_selectors.chain(self.rules.compound_selectors.iter().cloned());

        for sel_str in selectors {
            let Ok(selector) = Selector::parse(&sel_str) else {
                trace!(selector = sel_str.as_str(), "Invalid date selector");
                continue;
            };
            for element in doc.select(&selector) {
                self.probe_element(element, &sel_str, out);
            }
        }
    }

    fn probe_element(&self, element: ElementRef<'_>, sel_str: &str, out: &mut Vec<DateSignal>) {
        if let Some(datetime) = element.value().attr("datetime") {
            self.push_candidate(
                out,
                datetime,
                Provenance::CssSelectorAttribute,
                format!("attr:datetime in {sel_str}"),
            );
        }
        if let Some(content) = element.value().attr("content") {
            self.push_candidate(
                out,
                content,
                Provenance::CssSelectorAttribute,
                format!("attr:content in {sel_str}"),
            );
        }
        let text = element.text().collect::<String>();
        let text = text.trim();
        if !text.is_empty() {
            self.push_candidate(
                out,
                text,
                Provenance::CssSelectorText,
                format!("text in {sel_str}"),
            );
        }
    }

    /// Keep a candidate only when its raw text parses; every kept signal
    /// therefore carries a usable timestamp.
    fn push_candidate(
        &self,
        out: &mut Vec<DateSignal>,
        raw: &str,
        provenance: Provenance,
        locator: String,
    ) {
        if let Some(parsed) = self.parser.parse(raw) {
            out.push(DateSignal {
                raw_text: raw.trim().to_string(),
                provenance,
                source_locator: locator,
                parsed,
            });
        }
    }
}

/// Bare class names become `.name`; anything already selector-shaped
/// (contains `.`, `#`, `[`, or a space) passes through unchanged.
fn normalize_class(name: &str) -> String {
    if name.contains(['.', '#', '[', ' ']) {
        name.to_string()
    } else {
        format!(".{name}")
    }
}
