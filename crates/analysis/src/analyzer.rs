//! Debtor message analyzer
//!
//! Classifies a single inbound message into keyword flags, a three-bucket
//! sentiment, an intent category and a complexity signal. Deterministic
//! lexicon heuristics only - no model, no I/O, no failure modes: empty
//! input analyzes to inquiry/neutral.

use negotiation_agent_core::{Analysis, Complexity, Keyword, MessageIntent, Sentiment};
use unicode_segmentation::UnicodeSegmentation;

use crate::lexicon;

/// Stateless analyzer over the fixed Spanish lexicon
#[derive(Debug, Default)]
pub struct MessageAnalyzer;

impl MessageAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Analyze one inbound debtor message
    pub fn analyze(&self, message: &str) -> Analysis {
        let text = message.trim().to_lowercase();
        if text.is_empty() {
            return Analysis::default();
        }

        let keywords = detect_keywords(&text);
        let sentiment = detect_sentiment(&text);
        let intent = detect_intent(&keywords);
        let complexity = Complexity::from_word_count(text.unicode_words().count());

        tracing::debug!(
            intent = %intent,
            sentiment = sentiment.as_str(),
            keyword_count = keywords.len(),
            "Analyzed debtor message"
        );

        Analysis {
            keywords,
            sentiment,
            sentiment_score: sentiment.score(),
            intent,
            complexity,
        }
    }
}

fn detect_keywords(text: &str) -> Vec<Keyword> {
    let checks: [(Keyword, &[&str]); 7] = [
        (Keyword::Discount, lexicon::DISCOUNT),
        (Keyword::Installments, lexicon::INSTALLMENTS),
        (Keyword::Time, lexicon::TIME),
        (Keyword::Human, lexicon::HUMAN),
        (Keyword::Payment, lexicon::PAYMENT),
        (Keyword::Distress, lexicon::DISTRESS),
        (Keyword::Agreement, lexicon::AGREEMENT),
    ];

    checks
        .into_iter()
        .filter(|(_, phrases)| lexicon::contains_any(text, phrases))
        .map(|(keyword, _)| keyword)
        .collect()
}

/// Distress is checked before agreement: a message carrying both buckets
/// classifies negative.
fn detect_sentiment(text: &str) -> Sentiment {
    if lexicon::contains_any(text, lexicon::DISTRESS) {
        Sentiment::Negative
    } else if lexicon::contains_any(text, lexicon::AGREEMENT) {
        Sentiment::Positive
    } else {
        Sentiment::Neutral
    }
}

/// First-match over the fixed priority order. A message naming both a
/// discount and a human resolves to discount_request; the escalation chain
/// still sees the human keyword flag.
fn detect_intent(keywords: &[Keyword]) -> MessageIntent {
    const PRIORITY: [(Keyword, MessageIntent); 5] = [
        (Keyword::Discount, MessageIntent::DiscountRequest),
        (Keyword::Installments, MessageIntent::InstallmentRequest),
        (Keyword::Time, MessageIntent::TimeRequest),
        (Keyword::Human, MessageIntent::HumanRequest),
        (Keyword::Agreement, MessageIntent::Agreement),
    ];

    PRIORITY
        .into_iter()
        .find(|(keyword, _)| keywords.contains(keyword))
        .map(|(_, intent)| intent)
        .unwrap_or(MessageIntent::Inquiry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_is_neutral_inquiry() {
        let analysis = MessageAnalyzer::new().analyze("   ");
        assert_eq!(analysis.intent, MessageIntent::Inquiry);
        assert_eq!(analysis.sentiment, Sentiment::Neutral);
        assert_eq!(analysis.sentiment_score, 0.5);
        assert!(analysis.keywords.is_empty());
    }

    #[test]
    fn human_request_intent() {
        let analysis = MessageAnalyzer::new().analyze("Quiero hablar con una persona");
        assert_eq!(analysis.intent, MessageIntent::HumanRequest);
        assert!(analysis.has_keyword(Keyword::Human));
    }

    #[test]
    fn discount_wins_over_human() {
        // Both trigger words present: priority order resolves the intent,
        // but both keyword flags survive for the escalation chain.
        let analysis =
            MessageAnalyzer::new().analyze("quiero un descuento o hablar con una persona");
        assert_eq!(analysis.intent, MessageIntent::DiscountRequest);
        assert!(analysis.has_keyword(Keyword::Human));
        assert!(analysis.has_keyword(Keyword::Discount));
    }

    #[test]
    fn distress_beats_agreement() {
        let analysis = MessageAnalyzer::new().analyze("gracias pero no puedo pagar");
        assert_eq!(analysis.sentiment, Sentiment::Negative);
        assert_eq!(analysis.sentiment_score, 0.2);
    }

    #[test]
    fn agreement_is_positive() {
        let analysis = MessageAnalyzer::new().analyze("gracias, de acuerdo");
        assert_eq!(analysis.sentiment, Sentiment::Positive);
        assert_eq!(analysis.intent, MessageIntent::Agreement);
    }

    #[test]
    fn complexity_from_word_count() {
        let analyzer = MessageAnalyzer::new();
        assert_eq!(analyzer.analyze("hola").complexity, Complexity::Low);

        let medium = "necesito que me expliquen otra vez cuales son las condiciones del plan";
        assert_eq!(analyzer.analyze(medium).complexity, Complexity::Medium);
    }
}
