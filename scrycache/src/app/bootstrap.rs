//! Application bootstrap implementation.
//!
//! This module contains `ScrycacheApp`, which wires the resolver stack
//! together in dependency order from a single `Settings` value, so every
//! component sees the same cache layout and locale order.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;

use super::error::AppError;
use crate::bulk::BulkIndexLoader;
use crate::config::{CacheLayout, Settings};
use crate::deck::{parse_decklist, DeckEntry, DeckProcessor, DeckReport, Decklist};
use crate::deck::BatchError;
use crate::fetch::{FetchClient, HttpClient, ReqwestClient};
use crate::image::ImageResolver;
use crate::resolver::CardResolver;
use crate::storage::{FsStorage, StorageAdapter};

/// Scrycache application with all components built from one settings value.
///
/// The graph is immutable once built; applying changed settings means
/// constructing a new app. That keeps every component's view of the cache
/// layout, locale order and fetch policy consistent for its whole lifetime.
///
/// # Example
///
/// ```ignore
/// use scrycache::app::ScrycacheApp;
/// use scrycache::config::Settings;
///
/// let app = ScrycacheApp::new(Settings::default(), "/var/lib/scrycache")?;
/// let (decklist, report) = app.process_deck(&input).await?;
/// ```
pub struct ScrycacheApp {
    /// Settings snapshot the components were built from.
    settings: Settings,

    /// Cache paths derived from the settings.
    layout: CacheLayout,

    /// Backing storage shared by every component.
    storage: Arc<dyn StorageAdapter>,

    /// Record resolution tiers.
    records: Arc<CardResolver>,

    /// Image resolution and coalescing cache.
    images: Arc<ImageResolver>,
}

impl ScrycacheApp {
    /// Builds the application over the real filesystem and network.
    ///
    /// # Arguments
    ///
    /// * `settings` - The configuration snapshot
    /// * `base_dir` - Directory the cache tree lives under
    ///
    /// # Errors
    ///
    /// Returns an error when the HTTP client cannot be constructed.
    pub fn new(settings: Settings, base_dir: impl Into<PathBuf>) -> Result<Self, AppError> {
        let storage: Arc<dyn StorageAdapter> = Arc::new(FsStorage::new(base_dir));
        let http: Arc<dyn HttpClient> = Arc::new(ReqwestClient::new()?);
        Ok(Self::with_components(settings, storage, http))
    }

    /// Loads settings from an INI file, then builds the application.
    pub fn from_config_file(
        path: &Path,
        base_dir: impl Into<PathBuf>,
    ) -> Result<Self, AppError> {
        let settings = Settings::load_from(path)?;
        Self::new(settings, base_dir)
    }

    /// Builds the application over explicit storage and HTTP
    /// implementations. Tests use this with in-memory fakes.
    pub fn with_components(
        settings: Settings,
        storage: Arc<dyn StorageAdapter>,
        http: Arc<dyn HttpClient>,
    ) -> Self {
        let layout = CacheLayout::from_settings(&settings);
        let fetch = FetchClient::with_options(http.clone(), settings.fetch_options());
        let bulk = Arc::new(BulkIndexLoader::new(storage.clone(), layout.clone()));
        let records = Arc::new(CardResolver::new(
            storage.clone(),
            layout.clone(),
            bulk,
            fetch.clone(),
            settings.languages.clone(),
        ));
        let images = Arc::new(ImageResolver::new(
            storage.clone(),
            layout.clone(),
            records.clone(),
            fetch,
            http,
            settings.languages.clone(),
        ));

        info!(
            cache_root = %layout.cache_root(),
            languages = ?settings.languages,
            concurrency = settings.concurrency,
            "application components built"
        );

        Self {
            settings,
            layout,
            storage,
            records,
            images,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn layout(&self) -> &CacheLayout {
        &self.layout
    }

    pub fn storage(&self) -> Arc<dyn StorageAdapter> {
        Arc::clone(&self.storage)
    }

    /// Get the record resolver for direct lookups.
    pub fn records(&self) -> Arc<CardResolver> {
        Arc::clone(&self.records)
    }

    /// Get the image resolver for direct lookups.
    pub fn images(&self) -> Arc<ImageResolver> {
        Arc::clone(&self.images)
    }

    /// A deck processor using the configured worker count.
    pub fn deck_processor(&self) -> DeckProcessor {
        DeckProcessor::new(self.records(), self.images())
            .with_concurrency(self.settings.concurrency)
    }

    /// Parses decklist text and resolves every entry.
    ///
    /// # Returns
    ///
    /// The parsed decklist together with the resolution report; the report's
    /// outcomes follow the decklist's entry order.
    pub async fn process_deck(
        &self,
        input: &str,
    ) -> Result<(Decklist, DeckReport), BatchError> {
        let decklist = parse_decklist(input);
        let entries: Vec<DeckEntry> = decklist.all_entries().cloned().collect();
        let report = self.deck_processor().process(&entries).await?;
        Ok((decklist, report))
    }

    /// Resolves a list of prepared entries, outside any decklist context.
    pub async fn process_entries(
        &self,
        entries: &[DeckEntry],
    ) -> Result<DeckReport, BatchError> {
        self.deck_processor().process(entries).await
    }
}
