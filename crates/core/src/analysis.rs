//! Message analysis types
//!
//! Output of the message analyzer: keyword flags, a three-bucket sentiment,
//! an intent category and a word-count complexity signal.

use serde::{Deserialize, Serialize};

/// Keyword categories detected in a debtor message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Keyword {
    Discount,
    Installments,
    Time,
    Human,
    Payment,
    Distress,
    Agreement,
}

impl Keyword {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Discount => "discount",
            Self::Installments => "installments",
            Self::Time => "time",
            Self::Human => "human",
            Self::Payment => "payment",
            Self::Distress => "distress",
            Self::Agreement => "agreement",
        }
    }
}

/// Three-bucket sentiment classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    Negative,
    #[default]
    Neutral,
    Positive,
}

impl Sentiment {
    /// Fixed score per bucket. Deterministic by design: downstream
    /// escalation thresholds compare against these exact values.
    pub fn score(&self) -> f32 {
        match self {
            Self::Negative => 0.2,
            Self::Neutral => 0.5,
            Self::Positive => 0.8,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Negative => "negative",
            Self::Neutral => "neutral",
            Self::Positive => "positive",
        }
    }
}

/// Intent category of a debtor message
///
/// Detection is first-match over a fixed priority order; a message containing
/// several trigger words resolves to the highest-priority intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MessageIntent {
    DiscountRequest,
    InstallmentRequest,
    TimeRequest,
    HumanRequest,
    Agreement,
    #[default]
    Inquiry,
}

impl MessageIntent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DiscountRequest => "discount_request",
            Self::InstallmentRequest => "installment_request",
            Self::TimeRequest => "time_request",
            Self::HumanRequest => "human_request",
            Self::Agreement => "agreement",
            Self::Inquiry => "inquiry",
        }
    }
}

impl std::fmt::Display for MessageIntent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Word-count complexity buckets. A minor confidence signal only; never
/// drives control flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Complexity {
    #[default]
    Low,
    Medium,
    High,
}

impl Complexity {
    /// Bucket a word count: <10 low, <25 medium, else high
    pub fn from_word_count(words: usize) -> Self {
        if words < 10 {
            Self::Low
        } else if words < 25 {
            Self::Medium
        } else {
            Self::High
        }
    }
}

/// Full analysis of one inbound debtor message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Analysis {
    /// Keyword flags present in the message
    pub keywords: Vec<Keyword>,
    pub sentiment: Sentiment,
    /// Fixed score of the sentiment bucket, kept alongside for metadata
    pub sentiment_score: f32,
    pub intent: MessageIntent,
    pub complexity: Complexity,
}

impl Default for Analysis {
    /// The analysis of an empty message: neutral inquiry. The score must
    /// match the neutral bucket or an empty message would read as distress.
    fn default() -> Self {
        Self {
            keywords: Vec::new(),
            sentiment: Sentiment::Neutral,
            sentiment_score: Sentiment::Neutral.score(),
            intent: MessageIntent::Inquiry,
            complexity: Complexity::Low,
        }
    }
}

impl Analysis {
    pub fn has_keyword(&self, keyword: Keyword) -> bool {
        self.keywords.contains(&keyword)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complexity_buckets() {
        assert_eq!(Complexity::from_word_count(0), Complexity::Low);
        assert_eq!(Complexity::from_word_count(9), Complexity::Low);
        assert_eq!(Complexity::from_word_count(10), Complexity::Medium);
        assert_eq!(Complexity::from_word_count(24), Complexity::Medium);
        assert_eq!(Complexity::from_word_count(25), Complexity::High);
    }

    #[test]
    fn sentiment_scores_are_fixed() {
        assert_eq!(Sentiment::Negative.score(), 0.2);
        assert_eq!(Sentiment::Neutral.score(), 0.5);
        assert_eq!(Sentiment::Positive.score(), 0.8);
    }
}
