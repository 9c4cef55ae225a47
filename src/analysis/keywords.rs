//! Keyword tables that drive language scoring, complexity triggers and
//! library hints. Pure data; the analyzer receives a [`KeywordTables`] value
//! so callers can swap the vocabulary without touching the scoring code.

use once_cell::sync::Lazy;
use std::sync::Arc;

use crate::model::Language;

/// Weight applied when a category has no explicit weight.
pub const DEFAULT_CATEGORY_WEIGHT: u32 = 1;

#[derive(Debug, Clone, PartialEq)]
pub struct KeywordCategory {
    pub name: &'static str,
    pub weight: u32,
    pub keywords: &'static [&'static str],
}

impl KeywordCategory {
    const fn new(name: &'static str, weight: u32, keywords: &'static [&'static str]) -> Self {
        Self {
            name,
            weight,
            keywords,
        }
    }

    /// Sum of the category weight for every keyword found in `text`.
    pub fn score(&self, text: &str) -> u32 {
        let hits = self
            .keywords
            .iter()
            .filter(|keyword| text.contains(**keyword))
            .count() as u32;
        hits * self.weight
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeywordTables {
    pub python: Vec<KeywordCategory>,
    pub bash: Vec<KeywordCategory>,
    pub simple_triggers: Vec<&'static str>,
    pub medium_triggers: Vec<&'static str>,
    pub complex_triggers: Vec<&'static str>,
    /// Library name followed by the hints that pull it in, in output order.
    pub library_hints: Vec<(&'static str, &'static [&'static str])>,
}

static STANDARD: Lazy<Arc<KeywordTables>> = Lazy::new(|| Arc::new(KeywordTables::build()));

impl KeywordTables {
    /// Shared handle to the built-in tables.
    pub fn standard() -> Arc<KeywordTables> {
        Arc::clone(&STANDARD)
    }

    pub fn categories(&self, language: Language) -> &[KeywordCategory] {
        match language {
            Language::Python => &self.python,
            Language::Bash => &self.bash,
        }
    }

    pub fn weight(&self, language: Language, category: &str) -> u32 {
        self.categories(language)
            .iter()
            .find(|entry| entry.name == category)
            .map(|entry| entry.weight)
            .unwrap_or(DEFAULT_CATEGORY_WEIGHT)
    }

    /// Keyword score of `text` for one language.
    pub fn score(&self, language: Language, text: &str) -> u32 {
        self.categories(language)
            .iter()
            .map(|category| category.score(text))
            .sum()
    }

    /// Libraries whose hints appear in `text`, in table order.
    pub fn libraries_for(&self, text: &str) -> Vec<String> {
        self.library_hints
            .iter()
            .filter(|(_, hints)| hints.iter().any(|hint| text.contains(*hint)))
            .map(|(library, _)| library.to_string())
            .collect()
    }

    fn build() -> Self {
        Self {
            python: vec![
                KeywordCategory::new(
                    "file_operations",
                    2,
                    &["read", "write", "create", "delete", "copy", "move", "rename", "chmod"],
                ),
                KeywordCategory::new(
                    "data_processing",
                    3,
                    &[
                        "parse",
                        "filter",
                        "sort",
                        "transform",
                        "analyze",
                        "convert",
                        "merge",
                        "csv",
                        "data",
                        "statistics",
                    ],
                ),
                KeywordCategory::new(
                    "web_scraping",
                    3,
                    &["scrape", "crawl", "download", "fetch", "request", "api", "json", "xml"],
                ),
                KeywordCategory::new(
                    "database",
                    2,
                    &["query", "insert", "update", "delete", "sql", "sqlite", "postgres", "mysql"],
                ),
                KeywordCategory::new(
                    "gui_desktop",
                    3,
                    &["tkinter", "qt", "gtk", "window", "dialog", "button", "menu", "interface"],
                ),
                KeywordCategory::new(
                    "automation",
                    2,
                    &["schedule", "cron", "automate", "batch", "monitor", "watch", "trigger"],
                ),
                KeywordCategory::new(
                    "system",
                    1,
                    &["subprocess", "process", "command", "execute", "run", "shell", "os"],
                ),
                KeywordCategory::new(
                    "network",
                    2,
                    &["http", "https", "ftp", "ssh", "socket", "requests", "urllib"],
                ),
                KeywordCategory::new(
                    "math_science",
                    3,
                    &["calculate", "compute", "numpy", "scipy", "matplotlib", "pandas", "statistics"],
                ),
                KeywordCategory::new(
                    "machine_learning",
                    4,
                    &["sklearn", "tensorflow", "pytorch", "model", "predict", "train", "classify"],
                ),
                KeywordCategory::new(
                    "image_processing",
                    3,
                    &["pillow", "opencv", "image", "photo", "resize", "crop", "filter"],
                ),
                KeywordCategory::new(
                    "audio_video",
                    2,
                    &["audio", "video", "ffmpeg", "convert", "encode", "decode", "stream"],
                ),
                KeywordCategory::new(
                    "testing",
                    2,
                    &["unittest", "pytest", "test", "assert", "mock", "fixture"],
                ),
                KeywordCategory::new(
                    "logging",
                    1,
                    &["log", "debug", "error", "warning", "info", "trace"],
                ),
            ],
            bash: vec![
                KeywordCategory::new(
                    "file_operations",
                    3,
                    &["ls", "cp", "mv", "rm", "mkdir", "rmdir", "chmod", "chown", "find", "locate"],
                ),
                KeywordCategory::new(
                    "text_processing",
                    4,
                    &["grep", "sed", "awk", "cut", "sort", "uniq", "wc", "tr", "head", "tail"],
                ),
                KeywordCategory::new(
                    "system_admin",
                    4,
                    &["ps", "kill", "killall", "service", "systemctl", "crontab", "at", "nohup"],
                ),
                KeywordCategory::new(
                    "network",
                    2,
                    &["curl", "wget", "ping", "ssh", "scp", "rsync", "netstat", "ss"],
                ),
                KeywordCategory::new(
                    "archive",
                    3,
                    &["tar", "zip", "unzip", "gzip", "gunzip", "compress", "uncompress"],
                ),
                KeywordCategory::new(
                    "monitoring",
                    3,
                    &["top", "htop", "ps", "df", "du", "free", "iostat", "vmstat"],
                ),
                KeywordCategory::new(
                    "package_management",
                    3,
                    &["apt", "yum", "dnf", "pacman", "pip", "npm", "snap"],
                ),
                KeywordCategory::new(
                    "git_vcs",
                    2,
                    &["git", "svn", "commit", "push", "pull", "clone", "branch", "merge"],
                ),
                KeywordCategory::new(
                    "backup",
                    3,
                    &["backup", "sync", "mirror", "archive", "restore"],
                ),
                KeywordCategory::new(
                    "environment",
                    2,
                    &["export", "env", "set", "unset", "source", "alias"],
                ),
                KeywordCategory::new(
                    "conditional",
                    2,
                    &["if", "then", "else", "elif", "fi", "case", "while", "for", "until"],
                ),
                KeywordCategory::new(
                    "nemo_integration",
                    4,
                    &["nemo", "file manager", "context menu", "right click", "action"],
                ),
                KeywordCategory::new(
                    "kde_connect",
                    4,
                    &["kde connect", "phone", "mobile", "remote", "notification", "command"],
                ),
            ],
            simple_triggers: vec!["hello", "basic", "simple", "print", "echo"],
            medium_triggers: vec!["function", "class", "loop", "condition", "if", "for", "while"],
            complex_triggers: vec![
                "algorithm",
                "optimization",
                "concurrent",
                "threading",
                "async",
                "machine learning",
                "ai",
                "neural",
                "deep learning",
                "tensorflow",
                "database",
                "sql",
                "api",
                "microservice",
                "gui",
                "interface",
                "qt",
                "tkinter",
            ],
            library_hints: vec![
                hint("requests", &["api", "http", "web", "download"]),
                hint("pandas", &["csv", "data", "analyze", "dataframe"]),
                hint("numpy", &["math", "calculate", "array", "numeric"]),
                hint("tkinter", &["gui", "window", "interface", "dialog"]),
                hint("sqlite3", &["database", "sqlite", "db"]),
                hint("json", &["json", "api", "parse"]),
                hint("os", &["file", "directory", "path", "system"]),
                hint("subprocess", &["command", "execute", "run", "process"]),
                hint("logging", &["log", "debug", "error", "warning"]),
            ],
        }
    }
}

const fn hint(
    library: &'static str,
    hints: &'static [&'static str],
) -> (&'static str, &'static [&'static str]) {
    (library, hints)
}

impl Default for KeywordTables {
    fn default() -> Self {
        Self::build()
    }
}
