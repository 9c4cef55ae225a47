//! Pattern groups and the ordered primary-intent rules.

use indexmap::IndexSet;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::{Entity, EntityLabel, IntentCategory, SecondaryIntent};

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|pattern| Regex::new(pattern).expect("built-in pattern must compile"))
        .collect()
}

static ACTION_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"\b(read|write|create|delete|copy|move|rename|list|find|search)\b",
        r"\b(parse|process|analyze|convert|transform|filter|sort)\b",
        r"\b(run|execute|start|stop|kill|monitor|check)\b",
        r"\b(download|upload|request|fetch|scrape|ping)\b",
        r"\b(show|display|open|close|click|select)\b",
        r"\b(integrate|install|setup|configure)\b",
    ])
});

static OBJECT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"\b\w+\.(txt|csv|json|xml|pdf|doc|xls|py|sh|js|html|css)\b",
        r"\b(folder|directory|path|location)\b",
        r"\b(file|database|table|list|array|dict|json|xml)\b",
        r"\b(nemo|kde|browser|editor|terminal|gui|app)\b",
        r"\b(api|service|server|database|web|http|ftp)\b",
    ])
});

static ENTITY_PATTERNS: Lazy<Vec<(EntityLabel, Regex)>> = Lazy::new(|| {
    let patterns = [
        (
            EntityLabel::File,
            r"[\w*.-]+\.(txt|csv|json|xml|pdf|doc|xls|py|sh|js|html|css|log)\b",
        ),
        (EntityLabel::Url, r"https?://\S+"),
        (
            EntityLabel::Command,
            r"\b(ls|cp|mv|rm|mkdir|chmod|grep|sed|awk|curl|wget)\b",
        ),
        (EntityLabel::Path, r"/\S*|~/\S*|\./\S*"),
    ];
    patterns
        .into_iter()
        .map(|(label, pattern)| {
            (
                label,
                Regex::new(pattern).expect("built-in pattern must compile"),
            )
        })
        .collect()
});

static NEMO_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bnemo\b").expect("valid regex"));
static PHONE_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bphones?\b").expect("valid regex"));
static SYSADMIN_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:backup|sync|archive)\w*").expect("valid regex"));
static GUI_TOOLKIT_WORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:tkinter|pyqt\w*|pyside\w*|gtk\w*|wxpython|qt\d*|kivy)\b")
        .expect("valid regex")
});
static DATA_WORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:csv|json|xml|data|dataset|dataframe|records?|statistics)\b")
        .expect("valid regex")
});

const NETWORK_ACTIONS: &[&str] = &["scrape", "download", "upload", "request", "fetch", "ping"];
const FILE_PROCESSING_ACTIONS: &[&str] = &["read", "write", "process", "parse"];
const DATA_ACTIONS: &[&str] = &["analyze", "transform", "filter", "sort"];

/// Distinct matches of every pattern group, in first-seen order.
fn collect_matches(patterns: &[Regex], text: &str) -> IndexSet<String> {
    patterns
        .iter()
        .flat_map(|pattern| pattern.find_iter(text))
        .map(|found| found.as_str().to_string())
        .collect()
}

pub fn extract_actions(text: &str) -> IndexSet<String> {
    collect_matches(&ACTION_PATTERNS, text)
}

pub fn extract_objects(text: &str) -> IndexSet<String> {
    collect_matches(&OBJECT_PATTERNS, text)
}

/// Every occurrence of every entity pattern. Spans may overlap across labels.
pub fn extract_entities(text: &str) -> Vec<Entity> {
    ENTITY_PATTERNS
        .iter()
        .flat_map(|(label, pattern)| {
            pattern.find_iter(text).map(move |found| Entity {
                text: found.as_str().to_string(),
                label: *label,
                start: found.start(),
                end: found.end(),
                confidence: label.confidence(),
            })
        })
        .collect()
}

// =============================================================================
// PRIMARY INTENT
// =============================================================================

/// What the intent rules can look at.
pub struct IntentSignals<'a> {
    pub text: &'a str,
    pub actions: &'a IndexSet<String>,
    pub objects: &'a IndexSet<String>,
}

impl IntentSignals<'_> {
    fn any_action(&self, candidates: &[&str]) -> bool {
        candidates.iter().any(|candidate| self.actions.contains(*candidate))
    }

    fn has_object(&self, object: &str) -> bool {
        self.objects.contains(object)
    }
}

pub struct IntentRule {
    pub category: IntentCategory,
    pub predicate: fn(&IntentSignals<'_>) -> bool,
}

/// Evaluated in order; the first matching rule decides the primary intent.
pub static PRIMARY_RULES: &[IntentRule] = &[
    IntentRule {
        category: IntentCategory::NemoIntegration,
        predicate: |s| {
            NEMO_WORD.is_match(s.text)
                || s.text.contains("file manager")
                || s.text.contains("context menu")
        },
    },
    IntentRule {
        category: IntentCategory::KdeConnect,
        predicate: |s| {
            s.text.contains("kde connect")
                || s.text.contains("remote command")
                || PHONE_WORD.is_match(s.text)
        },
    },
    IntentRule {
        category: IntentCategory::WebAutomation,
        predicate: |s| s.any_action(NETWORK_ACTIONS) || s.has_object("api") || s.has_object("http"),
    },
    IntentRule {
        category: IntentCategory::SystemAdministration,
        predicate: |s| SYSADMIN_WORD.is_match(s.text),
    },
    IntentRule {
        category: IntentCategory::GuiApplication,
        predicate: |s| s.has_object("gui") || GUI_TOOLKIT_WORD.is_match(s.text),
    },
    IntentRule {
        category: IntentCategory::DataProcessing,
        predicate: |s| s.any_action(DATA_ACTIONS) && DATA_WORD.is_match(s.text),
    },
    IntentRule {
        category: IntentCategory::FileProcessing,
        predicate: |s| s.any_action(FILE_PROCESSING_ACTIONS),
    },
];

pub fn classify(signals: &IntentSignals<'_>) -> IntentCategory {
    PRIMARY_RULES
        .iter()
        .find(|rule| (rule.predicate)(signals))
        .map(|rule| rule.category)
        .unwrap_or(IntentCategory::GeneralScripting)
}

pub fn secondary_intents(text: &str) -> Vec<SecondaryIntent> {
    let mut secondary = Vec::new();
    if text.contains("error handling") || text.contains("exception") {
        secondary.push(SecondaryIntent::ErrorHandling);
    }
    if text.contains("log") || text.contains("debug") {
        secondary.push(SecondaryIntent::Logging);
    }
    if text.contains("test") || text.contains("validate") {
        secondary.push(SecondaryIntent::Testing);
    }
    secondary
}
