use std::sync::Arc;
use tracing::{debug, info};

use super::keywords::KeywordTables;
use super::rules::{self, IntentSignals};
use crate::error::{GeneratorError, Result};
use crate::model::{
    Analysis, Complexity, Entity, EntityLabel, Intent, IntentCategory, Language, Requirements,
    SecondaryIntent,
};

/// Descriptions beyond this size are rejected before any pattern runs.
pub const MAX_DESCRIPTION_BYTES: usize = 64 * 1024;

const NETWORK_ACTIONS: &[&str] = &["download", "upload", "request", "fetch", "scrape", "ping"];
const FILESYSTEM_ACTIONS: &[&str] = &["read", "write", "create", "delete", "copy", "move", "find"];
const DATABASE_ACTIONS: &[&str] = &["query", "insert", "update", "delete"];

/// Characters kept by [`normalize`] besides alphanumerics, `_` and whitespace.
const KEPT_PUNCTUATION: &[char] = &['.', '-', '/', '~', ':', '*'];

/// Lowercases, trims, replaces unsupported punctuation with spaces and
/// collapses whitespace runs.
pub fn normalize(text: &str) -> String {
    let cleaned: String = text
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '_' || c.is_whitespace() || KEPT_PUNCTUATION.contains(&c)
            {
                c
            } else {
                ' '
            }
        })
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Raw keyword scores per language, intent and hint bonuses included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageScores {
    pub python: u32,
    pub bash: u32,
}

impl LanguageScores {
    /// Ties go to Python.
    pub fn winner(&self) -> Language {
        if self.python >= self.bash {
            Language::Python
        } else {
            Language::Bash
        }
    }
}

/// Deterministic keyword/pattern analyzer.
#[derive(Debug, Clone)]
pub struct Analyzer {
    tables: Arc<KeywordTables>,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer {
    pub fn new() -> Self {
        Self::with_tables(KeywordTables::standard())
    }

    pub fn with_tables(tables: Arc<KeywordTables>) -> Self {
        Self { tables }
    }

    pub fn tables(&self) -> &KeywordTables {
        &self.tables
    }

    /// Turns a free-text description into an [`Analysis`].
    ///
    /// Empty or meaningless text is a valid input and classifies as general
    /// scripting with low confidence.
    pub fn analyze(&self, description: &str) -> Result<Analysis> {
        if description.len() > MAX_DESCRIPTION_BYTES {
            return Err(GeneratorError::Analysis(format!(
                "description is {} bytes, limit is {MAX_DESCRIPTION_BYTES}",
                description.len()
            )));
        }

        let text = normalize(description);
        let intent = self.extract_intent(&text);
        let entities = rules::extract_entities(&text);

        let score = self.complexity_score(&text, &intent, &entities);
        let complexity = complexity_from_score(score);

        let scores = self.score_languages(&text, &intent);
        let suggested_language = scores.winner();
        debug!(
            python = scores.python,
            bash = scores.bash,
            complexity_score = score,
            "language scoring"
        );

        let requirements = self.derive_requirements(&text, &intent, &entities);
        let confidence = confidence(&intent, &entities);

        info!(
            primary = %intent.primary,
            language = %suggested_language,
            complexity = %complexity,
            confidence = (confidence * 100.0).round(),
            "analysis completed"
        );

        Ok(Analysis {
            intent,
            entities,
            complexity,
            confidence,
            suggested_language,
            requirements,
        })
    }

    fn extract_intent(&self, text: &str) -> Intent {
        let actions = rules::extract_actions(text);
        let objects = rules::extract_objects(text);
        let primary = rules::classify(&IntentSignals {
            text,
            actions: &actions,
            objects: &objects,
        });

        Intent {
            primary,
            secondary: rules::secondary_intents(text),
            actions,
            objects,
        }
    }

    /// Additive score behind [`Complexity`]. Triggers match as substrings, so
    /// overlapping triggers each count.
    pub fn complexity_score(&self, text: &str, intent: &Intent, entities: &[Entity]) -> f64 {
        let count = |triggers: &[&str]| {
            triggers
                .iter()
                .filter(|trigger| text.contains(**trigger))
                .count() as f64
        };

        let mut score = -count(&self.tables.simple_triggers)
            + count(&self.tables.medium_triggers)
            + 2.0 * count(&self.tables.complex_triggers);

        score += intent.actions.len() as f64 * 0.5;
        score += intent.objects.len() as f64 * 0.3;
        score += entities.len() as f64 * 0.1;
        if intent.primary.is_integration() {
            score += 1.0;
        }
        score += intent.secondary.len() as f64 * 0.5;
        score
    }

    pub fn score_languages(&self, text: &str, intent: &Intent) -> LanguageScores {
        let mut python = self.tables.score(Language::Python, text);
        let mut bash = self.tables.score(Language::Bash, text);

        match intent.primary {
            IntentCategory::NemoIntegration
            | IntentCategory::KdeConnect
            | IntentCategory::SystemAdministration => bash += 3,
            IntentCategory::GuiApplication
            | IntentCategory::WebAutomation
            | IntentCategory::DataProcessing => python += 3,
            IntentCategory::FileProcessing => {
                if intent.actions.contains("parse") || intent.actions.contains("analyze") {
                    python += 1;
                } else {
                    bash += 1;
                }
            }
            IntentCategory::GeneralScripting => {}
        }

        if text.contains(".py") || text.contains("python") {
            python += 2;
        }
        if text.contains(".sh") || text.contains("bash") || text.contains("shell") {
            bash += 2;
        }

        LanguageScores { python, bash }
    }

    fn derive_requirements(&self, text: &str, intent: &Intent, entities: &[Entity]) -> Requirements {
        let has_action = |candidates: &[&str]| {
            candidates
                .iter()
                .any(|candidate| intent.actions.contains(*candidate))
        };
        let has_label = |label: EntityLabel| entities.iter().any(|entity| entity.label == label);
        let mentions = |words: &[&str]| words.iter().any(|word| text.contains(*word));

        let reads = mentions(&["read", "input", "load", "process"]);
        let writes = mentions(&["write", "output", "save"]);

        let mut requirements = Requirements::default();
        for entity in entities.iter().filter(|entity| entity.label == EntityLabel::File) {
            if reads {
                requirements.input_files.push(entity.text.clone());
            }
            if writes {
                requirements.output_files.push(entity.text.clone());
            }
        }

        requirements.network_access = has_action(NETWORK_ACTIONS) || has_label(EntityLabel::Url);
        requirements.file_system_access = has_action(FILESYSTEM_ACTIONS)
            || has_label(EntityLabel::File)
            || has_label(EntityLabel::Path);
        requirements.gui_required = intent.primary == IntentCategory::GuiApplication
            || has_action(&["show", "display"]);
        requirements.web_required =
            intent.primary == IntentCategory::WebAutomation || requirements.network_access;
        requirements.database_required =
            has_action(DATABASE_ACTIONS) || mentions(&["database", "sql"]);
        requirements.error_handling = intent.secondary.contains(&SecondaryIntent::ErrorHandling)
            || mentions(&["error", "exception", "handle"]);

        requirements.libraries = self.tables.libraries_for(text);
        requirements.system_commands = entities
            .iter()
            .filter(|entity| entity.label == EntityLabel::Command)
            .map(|entity| entity.text.clone())
            .collect();

        requirements
    }
}

pub fn complexity_from_score(score: f64) -> Complexity {
    if score <= 0.0 {
        Complexity::Simple
    } else if score <= 3.0 {
        Complexity::Medium
    } else {
        Complexity::Complex
    }
}

/// Signal-strength score averaged with the mean entity confidence.
pub fn confidence(intent: &Intent, entities: &[Entity]) -> f64 {
    let mut score = 0.5;
    if !intent.actions.is_empty() {
        score += 0.2;
    }
    if !intent.objects.is_empty() {
        score += 0.1;
    }
    if !entities.is_empty() {
        score += 0.1;
    }
    if intent.primary != IntentCategory::GeneralScripting {
        score += 0.1;
    }

    let entity_confidence = if entities.is_empty() {
        0.5
    } else {
        entities.iter().map(|entity| entity.confidence).sum::<f64>() / entities.len() as f64
    };

    ((score + entity_confidence) / 2.0).clamp(0.0, 1.0)
}
