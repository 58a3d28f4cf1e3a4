//! Debtor message analysis for the negotiation agent
//!
//! Classifies inbound Spanish-language debtor messages:
//! - Keyword flags over a fixed lexicon
//! - Three-bucket deterministic sentiment
//! - First-match intent resolution
//! - Word-count complexity
//! - Regex extraction of requested discount percent and term months
//!
//! Everything here is pure and synchronous; no external NLP dependency.

pub mod analyzer;
pub mod extract;
pub mod lexicon;

pub use analyzer::MessageAnalyzer;
pub use extract::{AmountExtractor, RegexAmountExtractor};
