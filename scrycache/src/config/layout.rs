//! Cache path layout.
//!
//! `CacheLayout` turns [`Settings`] into the concrete storage paths every
//! other component uses. It is pure string manipulation: no path here is
//! checked against a filesystem, and computing the layout twice from the same
//! settings yields identical results.
//!
//! All paths are relative, slash-separated and free of trailing slashes, so
//! they can be handed to any [`StorageAdapter`](crate::storage::StorageAdapter)
//! unchanged.

use crate::card::CardKey;
use crate::config::settings::{Settings, DEFAULT_CACHE_ROOT};

/// Normalizes a path for storage use.
///
/// Backslashes become forward slashes and trailing slashes are stripped, so
/// Windows-style input and `"dir/"` spellings produce the same layout.
pub fn normalize_path(path: &str) -> String {
    let normalized = path.replace('\\', "/");
    normalized.trim_end_matches('/').to_string()
}

/// Derived cache paths for one settings snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheLayout {
    cache_root: String,
    record_dir: String,
    image_dir: String,
    ja_only_path: String,
    oracle_path: String,
}

impl CacheLayout {
    /// Computes the layout from settings.
    ///
    /// Empty directory settings derive from the cache root: records under
    /// `<root>/json`, images under `<root>/img`. An empty root falls back to
    /// the stock root folder.
    pub fn from_settings(settings: &Settings) -> Self {
        let root = if settings.cache_root.trim().is_empty() {
            DEFAULT_CACHE_ROOT.to_string()
        } else {
            normalize_path(&settings.cache_root)
        };

        let record_dir = if settings.record_dir.trim().is_empty() {
            format!("{}/json", root)
        } else {
            normalize_path(&settings.record_dir)
        };

        let image_dir = if settings.image_dir.trim().is_empty() {
            format!("{}/img", root)
        } else {
            normalize_path(&settings.image_dir)
        };

        let ja_only_path = format!("{}/{}", record_dir, settings.ja_bulk_file);
        let oracle_path = format!("{}/{}", record_dir, settings.oracle_bulk_file);

        Self {
            cache_root: root,
            record_dir,
            image_dir,
            ja_only_path,
            oracle_path,
        }
    }

    /// The cache root folder.
    pub fn cache_root(&self) -> &str {
        &self.cache_root
    }

    /// The folder holding per-card record files and the bulk indices.
    pub fn record_dir(&self) -> &str {
        &self.record_dir
    }

    /// The folder holding cached card images.
    pub fn image_dir(&self) -> &str {
        &self.image_dir
    }

    /// Path of the Japanese-only bulk index file.
    pub fn ja_only_path(&self) -> &str {
        &self.ja_only_path
    }

    /// Path of the comprehensive oracle bulk index file.
    pub fn oracle_path(&self) -> &str {
        &self.oracle_path
    }

    /// Path of the persisted record file for a card.
    pub fn record_path(&self, key: &CardKey) -> String {
        format!("{}/{}.json", self.record_dir, key.safe_filename())
    }

    /// Path of the cached image file for a card.
    pub fn image_path(&self, key: &CardKey) -> String {
        format!("{}/{}.jpg", self.image_dir, key.safe_filename())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(name: &str) -> CardKey {
        CardKey::new(name).unwrap()
    }

    #[test]
    fn test_normalize_path_backslashes() {
        assert_eq!(normalize_path(r"cards\json"), "cards/json");
    }

    #[test]
    fn test_normalize_path_trailing_slashes() {
        assert_eq!(normalize_path("cards/"), "cards");
        assert_eq!(normalize_path("cards///"), "cards");
        assert_eq!(normalize_path("cards"), "cards");
    }

    #[test]
    fn test_layout_defaults() {
        let layout = CacheLayout::from_settings(&Settings::default());
        assert_eq!(layout.cache_root(), "scryfall");
        assert_eq!(layout.record_dir(), "scryfall/json");
        assert_eq!(layout.image_dir(), "scryfall/img");
        assert_eq!(layout.ja_only_path(), "scryfall/json/ja_only.json");
        assert_eq!(layout.oracle_path(), "scryfall/json/oracle-cards.json");
    }

    #[test]
    fn test_layout_empty_root_falls_back() {
        let settings = Settings::default().with_cache_root("  ");
        let layout = CacheLayout::from_settings(&settings);
        assert_eq!(layout.cache_root(), "scryfall");
    }

    #[test]
    fn test_layout_custom_dirs_override_derivation() {
        let mut settings = Settings::default().with_cache_root("mtg");
        settings.record_dir = r"data\records\".to_string();
        let layout = CacheLayout::from_settings(&settings);
        assert_eq!(layout.record_dir(), "data/records");
        // Image dir still derives from the root.
        assert_eq!(layout.image_dir(), "mtg/img");
    }

    #[test]
    fn test_layout_custom_bulk_filenames() {
        let mut settings = Settings::default();
        settings.oracle_bulk_file = "oracle-cards-20240101.json".to_string();
        let layout = CacheLayout::from_settings(&settings);
        assert_eq!(
            layout.oracle_path(),
            "scryfall/json/oracle-cards-20240101.json"
        );
    }

    #[test]
    fn test_record_and_image_paths_encode_names() {
        let layout = CacheLayout::from_settings(&Settings::default());
        assert_eq!(
            layout.record_path(&key("Lightning Bolt")),
            "scryfall/json/Lightning_20Bolt.json"
        );
        assert_eq!(
            layout.image_path(&key("Fire // Ice")),
            "scryfall/img/Fire_20_2F_2F_20Ice.jpg"
        );
    }

    #[test]
    fn test_layout_idempotent() {
        let settings = Settings::default().with_cache_root("cards/");
        let a = CacheLayout::from_settings(&settings);
        let b = CacheLayout::from_settings(&settings);
        assert_eq!(a, b);
    }
}
