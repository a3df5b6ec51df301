//! Tiered card record resolution.
//!
//! A lookup walks the tiers from cheapest to most expensive: the in-memory
//! record cache, the persisted per-card file, the bulk index the name's
//! script routes to, and finally the remote API once per configured locale.
//! Bulk and remote hits are persisted on the way out so the next process
//! finds them on disk. A name no tier knows is `None`, never an error.

use std::sync::Arc;

use moka::future::Cache;
use tracing::{debug, warn};

use crate::bulk::BulkIndexLoader;
use crate::card::{decode_record, encode_record, Card, CardKey};
use crate::config::CacheLayout;
use crate::fetch::FetchClient;
use crate::storage::StorageAdapter;

/// Fuzzy-named lookup endpoint of the remote API.
const NAMED_ENDPOINT: &str = "https://api.scryfall.com/cards/named";

/// Capacity of the in-memory record tier, in entries.
const MEMORY_CACHE_CAPACITY: u64 = 10_000;

/// Builds the named-lookup URL for one name and locale.
pub fn named_lookup_url(name: &str, lang: &str) -> String {
    format!(
        "{}?fuzzy={}&lang={}",
        NAMED_ENDPOINT,
        urlencoding::encode(name),
        urlencoding::encode(lang)
    )
}

/// Resolves card names to records through the cache tiers.
pub struct CardResolver {
    storage: Arc<dyn StorageAdapter>,
    layout: CacheLayout,
    bulk: Arc<BulkIndexLoader>,
    fetch: FetchClient,
    memory: Cache<String, Arc<Card>>,
    languages: Vec<String>,
}

impl CardResolver {
    pub fn new(
        storage: Arc<dyn StorageAdapter>,
        layout: CacheLayout,
        bulk: Arc<BulkIndexLoader>,
        fetch: FetchClient,
        languages: Vec<String>,
    ) -> Self {
        Self {
            storage,
            layout,
            bulk,
            fetch,
            memory: Cache::new(MEMORY_CACHE_CAPACITY),
            languages,
        }
    }

    pub fn layout(&self) -> &CacheLayout {
        &self.layout
    }

    /// Resolves a card record.
    ///
    /// Tier order: memory, persisted file, bulk index, remote API (each
    /// configured locale in turn). The memory key is the folded name, so
    /// differently-cased requests share one entry.
    ///
    /// # Arguments
    ///
    /// * `key` - The prepared card name
    ///
    /// # Returns
    ///
    /// The record, or `None` when every tier missed.
    pub async fn resolve(&self, key: &CardKey) -> Option<Arc<Card>> {
        if let Some(card) = self.memory.get(key.folded()).await {
            debug!(name = %key.display(), "record served from memory");
            return Some(card);
        }

        self.ensure_cache_dirs().await;

        let card = self.resolve_tiers(key).await?;
        self.memory
            .insert(key.folded().to_string(), card.clone())
            .await;
        Some(card)
    }

    /// Creates the cache directories.
    ///
    /// Failure is logged and resolution continues; the affected tiers then
    /// behave as misses.
    pub async fn ensure_cache_dirs(&self) {
        for dir in [
            self.layout.cache_root(),
            self.layout.record_dir(),
            self.layout.image_dir(),
        ] {
            if let Err(e) = self.storage.mkdir(dir).await {
                warn!(dir = %dir, error = %e, "failed to create cache directory");
            }
        }
    }

    async fn resolve_tiers(&self, key: &CardKey) -> Option<Arc<Card>> {
        if let Some(card) = self.from_cache_file(key).await {
            return Some(Arc::new(card));
        }

        if let Some(card) = self.bulk.lookup(key.display()).await {
            debug!(name = %key.display(), "record served from bulk index");
            self.persist(key, &card).await;
            return Some(Arc::new(card));
        }

        if let Some(card) = self.from_remote(key).await {
            self.persist(key, &card).await;
            return Some(Arc::new(card));
        }

        debug!(name = %key.display(), "record not found in any tier");
        None
    }

    /// Tier: the persisted per-card file. Any storage or parse problem is a
    /// miss for this tier only.
    async fn from_cache_file(&self, key: &CardKey) -> Option<Card> {
        let path = self.layout.record_path(key);

        match self.storage.exists(&path).await {
            Ok(true) => {}
            Ok(false) => return None,
            Err(e) => {
                warn!(path = %path, error = %e, "failed to check for cached record");
                return None;
            }
        }

        let bytes = match self.storage.read(&path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(path = %path, error = %e, "failed to read cached record");
                return None;
            }
        };

        match decode_record(&bytes) {
            Ok(card) => {
                debug!(name = %key.display(), path = %path, "record served from cache file");
                Some(card)
            }
            Err(e) => {
                warn!(path = %path, error = %e, "cached record is malformed, ignoring");
                None
            }
        }
    }

    /// Tier: the remote API, once per configured locale.
    async fn from_remote(&self, key: &CardKey) -> Option<Card> {
        for lang in &self.languages {
            let url = named_lookup_url(key.display(), lang);
            match self.fetch.fetch_json(&url).await {
                Ok(value) => match serde_json::from_value::<Card>(value) {
                    Ok(card) => {
                        debug!(name = %key.display(), lang = %lang, "record fetched from remote API");
                        return Some(card);
                    }
                    Err(e) => {
                        warn!(name = %key.display(), lang = %lang, error = %e, "remote record has unexpected shape");
                    }
                },
                Err(e) => {
                    debug!(name = %key.display(), lang = %lang, error = %e, "remote lookup failed");
                }
            }
        }
        None
    }

    /// Writes the wrapper cache file. Failure skips caching, nothing more.
    pub(crate) async fn persist(&self, key: &CardKey, card: &Card) {
        let body = match encode_record(card) {
            Ok(body) => body,
            Err(e) => {
                warn!(name = %key.display(), error = %e, "failed to serialize record for caching");
                return;
            }
        };

        let path = self.layout.record_path(key);
        if let Err(e) = self.storage.write(&path, body).await {
            warn!(path = %path, error = %e, "failed to persist record, continuing uncached");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::fetch::{FetchOptions, MockHttpClient};
    use crate::storage::MemoryStorage;

    fn resolver_with(storage: Arc<MemoryStorage>, http: Arc<MockHttpClient>) -> CardResolver {
        let layout = CacheLayout::from_settings(&Settings::default());
        let bulk = Arc::new(BulkIndexLoader::new(storage.clone(), layout.clone()));
        let options = FetchOptions::default()
            .with_retries(0)
            .with_timeout_ms(1_000)
            .with_base_delay_ms(1);
        let fetch = FetchClient::with_options(http, options);
        CardResolver::new(
            storage,
            layout,
            bulk,
            fetch,
            vec!["ja".to_string(), "en".to_string()],
        )
    }

    fn key(name: &str) -> CardKey {
        CardKey::new(name).unwrap()
    }

    #[test]
    fn test_named_lookup_url_encoding() {
        assert_eq!(
            named_lookup_url("Fire // Ice", "en"),
            "https://api.scryfall.com/cards/named?fuzzy=Fire%20%2F%2F%20Ice&lang=en"
        );
        assert_eq!(
            named_lookup_url("稲妻", "ja"),
            "https://api.scryfall.com/cards/named?fuzzy=%E7%A8%B2%E5%A6%BB&lang=ja"
        );
    }

    #[tokio::test]
    async fn test_resolve_from_persisted_record() {
        let storage = Arc::new(MemoryStorage::new());
        storage.insert("scryfall/json/Opt.json", r#"{"original":{"name":"Opt"}}"#);
        let http = Arc::new(MockHttpClient::new());
        let resolver = resolver_with(storage, http.clone());

        let card = resolver.resolve(&key("Opt")).await.unwrap();
        assert_eq!(card.name, "Opt");
        assert_eq!(http.call_count(), 0);
    }

    #[tokio::test]
    async fn test_resolve_accepts_bare_cache_file() {
        let storage = Arc::new(MemoryStorage::new());
        storage.insert("scryfall/json/Opt.json", r#"{"name":"Opt"}"#);
        let resolver = resolver_with(storage, Arc::new(MockHttpClient::new()));

        assert_eq!(resolver.resolve(&key("Opt")).await.unwrap().name, "Opt");
    }

    #[tokio::test]
    async fn test_resolve_from_bulk_persists_wrapper() {
        let storage = Arc::new(MemoryStorage::new());
        storage.insert(
            "scryfall/json/oracle-cards.json",
            r#"[{"name":"Shock","cmc":1.0}]"#,
        );
        let http = Arc::new(MockHttpClient::new());
        let resolver = resolver_with(storage.clone(), http.clone());

        let card = resolver.resolve(&key("Shock")).await.unwrap();
        assert_eq!(card.name, "Shock");
        assert_eq!(http.call_count(), 0);

        let written = storage.contents("scryfall/json/Shock.json").unwrap();
        let reread = decode_record(&written).unwrap();
        assert_eq!(reread.name, "Shock");
        // Written in the wrapped form.
        let value: serde_json::Value = serde_json::from_slice(&written).unwrap();
        assert_eq!(value["original"]["name"], "Shock");
    }

    #[tokio::test]
    async fn test_resolve_from_remote_tries_locales_in_order() {
        let storage = Arc::new(MemoryStorage::new());
        let en_url = named_lookup_url("Opt", "en");
        let http = Arc::new(MockHttpClient::new().respond_json(&en_url, r#"{"name":"Opt","cmc":1.0}"#));
        let resolver = resolver_with(storage.clone(), http.clone());

        let card = resolver.resolve(&key("Opt")).await.unwrap();
        assert_eq!(card.name, "Opt");

        // The ja locale was attempted first and missed (404), then en hit.
        let calls = http.calls();
        assert_eq!(calls, vec![named_lookup_url("Opt", "ja"), en_url]);

        // The remote hit was persisted.
        assert!(storage.contents("scryfall/json/Opt.json").is_some());
    }

    #[tokio::test]
    async fn test_resolve_miss_returns_none() {
        let storage = Arc::new(MemoryStorage::new());
        let http = Arc::new(MockHttpClient::new());
        let resolver = resolver_with(storage, http.clone());

        assert!(resolver.resolve(&key("No Such Card")).await.is_none());
        // Both locales were tried before giving up.
        assert_eq!(http.call_count(), 2);
    }

    #[tokio::test]
    async fn test_resolve_memory_tier_survives_storage_loss() {
        let storage = Arc::new(MemoryStorage::new());
        storage.insert("scryfall/json/Opt.json", r#"{"original":{"name":"Opt"}}"#);
        let resolver = resolver_with(storage.clone(), Arc::new(MockHttpClient::new()));

        assert!(resolver.resolve(&key("Opt")).await.is_some());
        storage.remove("scryfall/json/Opt.json");

        // Second resolution is served from memory; the folded key also makes
        // a differently-cased request hit.
        assert!(resolver.resolve(&key("OPT")).await.is_some());
    }

    #[tokio::test]
    async fn test_malformed_cache_file_falls_through_and_is_rewritten() {
        let storage = Arc::new(MemoryStorage::new());
        storage.insert("scryfall/json/Shock.json", "{corrupt");
        storage.insert("scryfall/json/oracle-cards.json", r#"[{"name":"Shock"}]"#);
        let resolver = resolver_with(storage.clone(), Arc::new(MockHttpClient::new()));

        let card = resolver.resolve(&key("Shock")).await.unwrap();
        assert_eq!(card.name, "Shock");

        // The bulk hit replaced the corrupt file.
        let written = storage.contents("scryfall/json/Shock.json").unwrap();
        assert!(decode_record(&written).is_ok());
    }
}
