//! Choosing one date per page from collected signals.
//!
//! [`DateReconciler`] walks the signals in discovery order and compares each
//! against the feed's reference date under a [`MatchPolicy`]. The first
//! matching signal wins and scanning stops; when nothing matches, the first
//! signal found stands in as the fallback so a page with any signal at all
//! still yields a date. A fallback emits exactly one mismatch entry with the
//! full attempt trail.
//!
//! Reconciliation is pure apart from the injected sink: same signals, same
//! reference, same policy, same result.

use crate::diagnostics::DiagnosticsSink;
use crate::models::{Attempt, DateSignal, ReconciliationResult, Timestamp};
use crate::parse::DateStringParser;

/// What counts as agreement between a signal and the reference date.
#[derive(Debug, Clone, Copy)]
pub struct MatchPolicy {
    /// Maximum absolute day difference, same month and year required.
    pub day_tolerance: i64,
    /// When set, a signal without a time-of-day can never match and is
    /// only ever usable as the fallback.
    pub require_time: bool,
}

impl Default for MatchPolicy {
    fn default() -> Self {
        Self {
            day_tolerance: 1,
            require_time: true,
        }
    }
}

/// Picks one timestamp per page from its signals.
pub struct DateReconciler {
    policy: MatchPolicy,
    parser: DateStringParser,
}

impl DateReconciler {
    pub fn new(policy: MatchPolicy, parser: DateStringParser) -> Self {
        Self { policy, parser }
    }

    /// Reconcile `signals` against the raw reference date.
    ///
    /// Empty `signals` is a terminal case: the result is empty and no
    /// mismatch entry is emitted (the caller reports the URL separately).
    pub fn reconcile(
        &self,
        signals: &[DateSignal],
        reference_raw: Option<&str>,
        url: &str,
        sink: &mut dyn DiagnosticsSink,
    ) -> ReconciliationResult {
        if signals.is_empty() {
            return ReconciliationResult {
                chosen: None,
                matched: false,
                attempts: Vec::new(),
            };
        }

        let reference = reference_raw.and_then(|raw| self.parser.parse(raw));

        let mut attempts = Vec::with_capacity(signals.len());
        let mut chosen: Option<Timestamp> = None;
        let mut matched = false;

        for signal in signals {
            let is_match = self.is_match(&signal.parsed, reference.as_ref());
            attempts.push(Attempt {
                signal: signal.clone(),
                is_match,
            });
            if is_match {
                chosen = Some(signal.parsed);
                matched = true;
                break;
            }
        }

        if !matched {
            // fallback: the first signal found, in discovery order
            chosen = Some(signals[0].parsed);
            sink.date_mismatch(url, reference_raw.unwrap_or(""), &attempts);
        }

        ReconciliationResult {
            chosen,
            matched,
            attempts,
        }
    }

    fn is_match(&self, candidate: &Timestamp, reference: Option<&Timestamp>) -> bool {
        let Some(reference) = reference else {
            return false;
        };
        if self.policy.require_time && !candidate.has_time() {
            return false;
        }
        let day_delta = (candidate.date - reference.date).num_days().abs();
        day_delta <= self.policy.day_tolerance
            && candidate.month() == reference.month()
            && candidate.year() == reference.year()
    }
}
