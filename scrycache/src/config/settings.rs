//! User-facing settings.
//!
//! `Settings` is the single immutable configuration surface the rest of the
//! crate is built from. Components never watch for changes; applying new
//! settings means constructing a new application from a new `Settings` value.

use crate::fetch::{FetchOptions, DEFAULT_BASE_DELAY_MS, DEFAULT_RETRIES, DEFAULT_TIMEOUT_MS};

/// Default cache root folder, relative to the storage base directory.
pub const DEFAULT_CACHE_ROOT: &str = "scryfall";

/// Default filename of the Japanese-only bulk index inside the record dir.
pub const DEFAULT_JA_BULK_FILE: &str = "ja_only.json";

/// Default filename of the comprehensive oracle bulk index.
pub const DEFAULT_ORACLE_BULK_FILE: &str = "oracle-cards.json";

/// Default number of concurrent deck resolution workers.
pub const DEFAULT_CONCURRENCY: usize = 6;

/// Default lookup locale order: Japanese first, then English.
pub const DEFAULT_LANGUAGES: [&str; 2] = ["ja", "en"];

/// Complete configuration for a resolution run.
///
/// Directory fields left empty are derived from `cache_root` when the cache
/// layout is computed, mirroring the file layout the defaults produce.
#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    /// Cache root folder, relative to the storage base directory.
    pub cache_root: String,

    /// Record (JSON) cache folder. Empty means `<cache_root>/json`.
    pub record_dir: String,

    /// Image cache folder. Empty means `<cache_root>/img`.
    pub image_dir: String,

    /// Filename of the Japanese-only bulk index inside the record dir.
    pub ja_bulk_file: String,

    /// Filename of the oracle bulk index inside the record dir.
    pub oracle_bulk_file: String,

    /// Remote lookup locales, in the order they are tried.
    pub languages: Vec<String>,

    /// Number of concurrent deck resolution workers.
    pub concurrency: usize,

    /// Retries after a failed metadata fetch attempt.
    pub retries: u32,

    /// Per-attempt timeout for metadata fetches, in milliseconds.
    pub timeout_ms: u64,

    /// Base retry backoff in milliseconds; attempt `n` waits `n * base`.
    pub base_delay_ms: u64,

    /// Render the mana curve in deck reports.
    pub show_mana_curve: bool,

    /// Render the card type table in deck reports.
    pub show_card_types: bool,

    /// Render the color table in deck reports.
    pub show_color_counts: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cache_root: DEFAULT_CACHE_ROOT.to_string(),
            record_dir: String::new(),
            image_dir: String::new(),
            ja_bulk_file: DEFAULT_JA_BULK_FILE.to_string(),
            oracle_bulk_file: DEFAULT_ORACLE_BULK_FILE.to_string(),
            languages: DEFAULT_LANGUAGES.iter().map(|s| s.to_string()).collect(),
            concurrency: DEFAULT_CONCURRENCY,
            retries: DEFAULT_RETRIES,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            base_delay_ms: DEFAULT_BASE_DELAY_MS,
            show_mana_curve: true,
            show_card_types: true,
            show_color_counts: true,
        }
    }
}

impl Settings {
    /// Set the cache root folder.
    pub fn with_cache_root(mut self, root: impl Into<String>) -> Self {
        self.cache_root = root.into();
        self
    }

    /// Set the lookup locale order.
    pub fn with_languages(mut self, languages: Vec<String>) -> Self {
        self.languages = languages;
        self
    }

    /// Set the worker count. Zero is clamped to one so a deck run always
    /// makes progress.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Set the retry count for metadata fetches.
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Fetch policy derived from the retry and timeout settings.
    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions::default()
            .with_retries(self.retries)
            .with_timeout_ms(self.timeout_ms)
            .with_base_delay_ms(self.base_delay_ms)
    }
}

/// Parses a comma-separated locale list, dropping blanks.
///
/// Returns the default locale order when nothing usable remains, so a
/// misconfigured value degrades to the stock behavior instead of disabling
/// remote lookups entirely.
pub fn parse_language_list(raw: &str) -> Vec<String> {
    let languages: Vec<String> = raw
        .split(',')
        .map(|lang| lang.trim().to_string())
        .filter(|lang| !lang.is_empty())
        .collect();
    if languages.is_empty() {
        DEFAULT_LANGUAGES.iter().map(|s| s.to_string()).collect()
    } else {
        languages
    }
}
