//! Generated response types
//!
//! Confidence values are design constants per response type, not derived
//! scores. Downstream analytics compare runs against each other, so the
//! constants must not drift.

use serde::{Deserialize, Serialize};

use crate::analysis::Keyword;
use crate::escalation::EscalationReason;

/// Category of an outbound AI message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseType {
    DiscountOffer,
    InstallmentOptions,
    TimeExtension,
    AgreementConfirmation,
    GeneralInquiry,
    PersonalizedResponse,
    /// Safety-net reply emitted when generation fails
    TechnicalError,
}

impl ResponseType {
    /// Fixed confidence constant for this response type
    pub fn confidence(&self) -> f32 {
        match self {
            Self::DiscountOffer => 0.9,
            Self::InstallmentOptions => 0.95,
            Self::TimeExtension => 0.85,
            Self::AgreementConfirmation => 1.0,
            Self::GeneralInquiry => 0.7,
            Self::PersonalizedResponse => 0.95,
            Self::TechnicalError => 0.1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DiscountOffer => "discount_offer",
            Self::InstallmentOptions => "installment_options",
            Self::TimeExtension => "time_extension",
            Self::AgreementConfirmation => "agreement_confirmation",
            Self::GeneralInquiry => "general_inquiry",
            Self::PersonalizedResponse => "personalized_response",
            Self::TechnicalError => "technical_error",
        }
    }
}

/// How much debtor/corporate knowledge informed a response
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonalizationLevel {
    /// Generic template, no debtor identity available
    Medium,
    /// Generic template addressed to a known debtor
    High,
    /// Full knowledge-personalized composition
    UltraHigh,
}

impl PersonalizationLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Medium => "medium",
            Self::High => "high",
            Self::UltraHigh => "ultra_high",
        }
    }
}

/// Outbound message produced by the response generator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiResponse {
    pub content: String,
    /// Always `response_type.confidence()`; carried explicitly so the value
    /// survives into persisted message metadata
    pub confidence: f32,
    /// Keyword flags of the message being answered
    pub keywords: Vec<Keyword>,
    pub response_type: ResponseType,
    pub personalization_level: PersonalizationLevel,
    /// Set by the safety net when generation failed
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub escalation_triggered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub escalation_reason: Option<EscalationReason>,
}

impl AiResponse {
    pub fn new(
        content: impl Into<String>,
        response_type: ResponseType,
        personalization_level: PersonalizationLevel,
    ) -> Self {
        Self {
            content: content.into(),
            confidence: response_type.confidence(),
            keywords: Vec::new(),
            response_type,
            personalization_level,
            escalation_triggered: false,
            escalation_reason: None,
        }
    }

    pub fn with_keywords(mut self, keywords: Vec<Keyword>) -> Self {
        self.keywords = keywords;
        self
    }
}
