//! Natural-language analysis: normalization, intent and entity extraction,
//! complexity, language recommendation and derived requirements.

pub mod analyzer;
pub mod keywords;
pub mod rules;

pub use analyzer::{Analyzer, LanguageScores, MAX_DESCRIPTION_BYTES, normalize};
pub use keywords::{KeywordCategory, KeywordTables};
pub use rules::{IntentRule, IntentSignals, PRIMARY_RULES};
