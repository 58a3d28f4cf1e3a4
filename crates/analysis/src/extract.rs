//! Numeric amount extraction from free text
//!
//! Narrowly-scoped parsing utility behind the [`AmountExtractor`] trait so
//! the regex strategy can be swapped without touching escalation logic.
//! Absent matches yield 0, which never trips an escalation threshold.

use once_cell::sync::Lazy;
use regex::Regex;

/// First integer preceding a percent sign, e.g. "un 25% de descuento"
static DISCOUNT_PERCENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)\s*%").expect("valid discount pattern"));

/// Integer month counts, e.g. "6 meses" / "1 mes"
static TERM_MONTHS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d+)\s*mes(?:es)?\b").expect("valid months pattern"));

/// Extraction seam used by the escalation engine
pub trait AmountExtractor: Send + Sync {
    /// Requested discount percent, 0 when the message names none
    fn discount_percent(&self, message: &str) -> u32;

    /// Requested term in months, 0 when the message names none
    fn term_months(&self, message: &str) -> u32;
}

/// Regex-based extractor matching the documented patterns
#[derive(Debug, Default)]
pub struct RegexAmountExtractor;

impl RegexAmountExtractor {
    pub fn new() -> Self {
        Self
    }

    fn first_capture(regex: &Regex, message: &str) -> u32 {
        regex
            .captures(message)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0)
    }
}

impl AmountExtractor for RegexAmountExtractor {
    fn discount_percent(&self, message: &str) -> u32 {
        Self::first_capture(&DISCOUNT_PERCENT, message)
    }

    fn term_months(&self, message: &str) -> u32 {
        Self::first_capture(&TERM_MONTHS, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discount_round_trip() {
        let extractor = RegexAmountExtractor::new();
        assert_eq!(extractor.discount_percent("quiero un 25% de descuento"), 25);
        assert_eq!(extractor.discount_percent("dame 30 % menos"), 30);
    }

    #[test]
    fn months_round_trip() {
        let extractor = RegexAmountExtractor::new();
        assert_eq!(extractor.term_months("necesito 6 meses"), 6);
        assert_eq!(extractor.term_months("un mes más, 1 mes"), 1);
    }

    #[test]
    fn absent_pattern_yields_zero() {
        let extractor = RegexAmountExtractor::new();
        assert_eq!(extractor.discount_percent("quiero pagar menos"), 0);
        assert_eq!(extractor.term_months("necesito más plazo"), 0);
    }

    #[test]
    fn first_match_wins() {
        let extractor = RegexAmountExtractor::new();
        assert_eq!(extractor.discount_percent("entre 10% y 40%"), 10);
        assert_eq!(extractor.term_months("3 meses o 24 meses"), 3);
    }
}
