//! Knowledge-base types
//!
//! Typed records for the two knowledge layers merged into a negotiation
//! turn: the corporate layer (profile, policies, custom response templates,
//! limits) and the debtor layer (personal/debt info, history, derived
//! behavior profile). "Knowledge absent" is always a modeled state - every
//! optional field is an `Option`, never an implicit hole.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::conversation::ConversationStatus;
use crate::limits::NegotiationLimits;

/// How the debtor prefers to be reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactMethod {
    Email,
    Phone,
    Sms,
    Whatsapp,
}

impl ContactMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Sms => "sms",
            Self::Whatsapp => "whatsapp",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "email" => Some(Self::Email),
            "phone" => Some(Self::Phone),
            "sms" => Some(Self::Sms),
            "whatsapp" => Some(Self::Whatsapp),
            _ => None,
        }
    }
}

/// Register the agent should write in when addressing this debtor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CommunicationStyle {
    Formal,
    Informal,
    /// Default register when the history gives no clear signal
    #[default]
    Professional,
}

impl CommunicationStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Formal => "formal",
            Self::Informal => "informal",
            Self::Professional => "professional",
        }
    }
}

/// Collection risk classification derived from overdue days and payment lateness
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// Historical willingness to settle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NegotiationTendency {
    Cooperative,
    Resistant,
}

/// Historical payment punctuality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentPattern {
    Regular,
    #[default]
    Irregular,
    Delinquent,
}

impl PaymentPattern {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Regular => "regular",
            Self::Irregular => "irregular",
            Self::Delinquent => "delinquent",
        }
    }
}

/// Derived classification of the debtor's historical behavior
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BehaviorProfile {
    /// `None` when the history is too balanced to classify
    #[serde(skip_serializing_if = "Option::is_none")]
    pub negotiation_tendency: Option<NegotiationTendency>,
    pub payment_pattern: PaymentPattern,
}

/// Derived personalization inputs for response composition
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersonalizationData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_contact_method: Option<ContactMethod>,
    pub communication_style: CommunicationStyle,
    pub risk_level: RiskLevel,
}

/// Debtor identity fields, all optional
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DebtorInfo {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_contact_method: Option<ContactMethod>,
}

/// The debt under collection
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct DebtInfo {
    pub amount: f64,
    pub days_overdue: u32,
}

/// One historical payment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub amount: f64,
    pub due_date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<DateTime<Utc>>,
    /// Paid on or before the due date
    pub on_time: bool,
}

/// Condensed record of a prior negotiation conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NegotiationSummary {
    pub conversation_id: Uuid,
    pub status: ConversationStatus,
    /// One-line description of how the negotiation went
    pub summary: String,
    /// Debtor-authored message contents, used for register detection
    #[serde(default)]
    pub debtor_messages: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl NegotiationSummary {
    pub fn agreed(&self) -> bool {
        self.status == ConversationStatus::Agreed
    }
}

/// Merged debtor-side knowledge for one (debtor, corporate client) pair.
/// Recomputed on every resolution so it reflects the latest payment and
/// negotiation state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebtorKnowledge {
    pub personal: DebtorInfo,
    pub debt: DebtInfo,
    /// Most recent first, at most 5
    pub negotiation_history: Vec<NegotiationSummary>,
    /// Most recent first, at most 10
    pub payment_history: Vec<PaymentRecord>,
    pub behavior: BehaviorProfile,
    pub personalization: PersonalizationData,
}

impl DebtorKnowledge {
    /// Display name for response templates, falling back to a neutral form
    pub fn display_name(&self) -> &str {
        self.personal.name.as_deref().unwrap_or("estimado cliente")
    }
}

/// Corporate client profile fields used in responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorporateProfile {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
}

/// A policy document bounding the negotiation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorporatePolicy {
    pub id: Uuid,
    pub corporate_client_id: Uuid,
    pub title: String,
    pub content: String,
    pub active: bool,
    pub updated_at: DateTime<Utc>,
}

/// A custom triggered-response template configured by the corporate client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseTemplate {
    pub id: Uuid,
    pub corporate_client_id: Uuid,
    /// Intent or keyword this template answers (e.g. "discount_request")
    pub trigger: String,
    pub content: String,
    pub active: bool,
}

/// Per-client AI configuration. Missing config resolves to
/// [`AiConfig::default`], which carries the documented limit defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    #[serde(default = "default_true")]
    pub ai_enabled: bool,
    #[serde(default)]
    pub limits: NegotiationLimits,
}

fn default_true() -> bool {
    true
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            ai_enabled: true,
            limits: NegotiationLimits::default(),
        }
    }
}

/// Merged corporate-side knowledge for one corporate client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorporateKnowledge {
    pub profile: CorporateProfile,
    /// Active policies only
    pub policies: Vec<CorporatePolicy>,
    /// Active custom response templates only
    pub response_templates: Vec<ResponseTemplate>,
    pub limits: NegotiationLimits,
}

impl CorporateKnowledge {
    /// First active template whose trigger matches, if any
    pub fn template_for(&self, trigger: &str) -> Option<&ResponseTemplate> {
        self.response_templates
            .iter()
            .find(|t| t.active && t.trigger == trigger)
    }
}
