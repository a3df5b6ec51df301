//! Card image caching with request coalescing.
//!
//! Images are resolved once per name per process: concurrent requests for
//! the same card share a single in-flight resolution, and the outcome,
//! including a miss, is cached for the life of the resolver. Downloads are
//! single-shot; when downloading or persisting fails, the raw remote URL is
//! handed back so callers can still render something.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::card::{Card, CardKey};
use crate::config::CacheLayout;
use crate::fetch::{FetchClient, HttpClient};
use crate::resolver::{named_lookup_url, CardResolver};
use crate::storage::StorageAdapter;

/// Where a resolved card image lives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImageRef {
    /// Cached in storage; the string is its resource locator.
    Local(String),
    /// Only available remotely; the string is the raw URL.
    Remote(String),
}

impl ImageRef {
    /// The displayable location, local or remote.
    pub fn location(&self) -> &str {
        match self {
            ImageRef::Local(loc) | ImageRef::Remote(loc) => loc,
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, ImageRef::Local(_))
    }
}

/// Resolves and caches card images.
pub struct ImageResolver {
    storage: Arc<dyn StorageAdapter>,
    layout: CacheLayout,
    records: Arc<CardResolver>,
    fetch: FetchClient,
    http: Arc<dyn HttpClient>,
    languages: Vec<String>,
    in_flight: DashMap<String, Arc<OnceCell<Option<ImageRef>>>>,
}

impl ImageResolver {
    pub fn new(
        storage: Arc<dyn StorageAdapter>,
        layout: CacheLayout,
        records: Arc<CardResolver>,
        fetch: FetchClient,
        http: Arc<dyn HttpClient>,
        languages: Vec<String>,
    ) -> Self {
        Self {
            storage,
            layout,
            records,
            fetch,
            http,
            languages,
            in_flight: DashMap::new(),
        }
    }

    /// Resolves the image for a card, coalescing concurrent requests.
    ///
    /// The first caller for a folded name performs the resolution; everyone
    /// arriving while it runs awaits the same outcome. Once settled the
    /// outcome is final for this resolver, misses included.
    ///
    /// # Arguments
    ///
    /// * `key` - The prepared card name
    ///
    /// # Returns
    ///
    /// A local or remote image reference, or `None` when no image exists.
    pub async fn resolve_image(&self, key: &CardKey) -> Option<ImageRef> {
        // The map guard must not be held across the await below, so the
        // cell is cloned out in the same statement that creates it.
        let cell = self
            .in_flight
            .entry(key.folded().to_string())
            .or_default()
            .clone();
        cell.get_or_init(|| self.resolve_uncached(key)).await.clone()
    }

    async fn resolve_uncached(&self, key: &CardKey) -> Option<ImageRef> {
        let path = self.layout.image_path(key);
        match self.storage.exists(&path).await {
            Ok(true) => {
                debug!(name = %key.display(), path = %path, "image served from cache");
                return Some(ImageRef::Local(self.storage.resource_locator(&path)));
            }
            Ok(false) => {}
            Err(e) => {
                warn!(path = %path, error = %e, "failed to check for cached image");
            }
        }

        // A record from any tier may already carry a usable image URL.
        if let Some(card) = self.records.resolve(key).await {
            if let Some(url) = card.image_url(key.display()) {
                return Some(self.cache_remote_image(key, url).await);
            }
            debug!(name = %key.display(), "resolved record carries no image URL");
        }

        // Cached and bulk records can lack image data; a fresh lookup per
        // locale may return a printing that has it. The fetched record is
        // persisted whether or not it yields an image, so the record tiers
        // see it on the next lookup.
        for lang in &self.languages {
            let url = named_lookup_url(key.display(), lang);
            let value = match self.fetch.fetch_json(&url).await {
                Ok(value) => value,
                Err(e) => {
                    debug!(name = %key.display(), lang = %lang, error = %e, "image lookup failed for locale");
                    continue;
                }
            };
            let card: Card = match serde_json::from_value(value) {
                Ok(card) => card,
                Err(e) => {
                    warn!(name = %key.display(), lang = %lang, error = %e, "remote record has unexpected shape");
                    continue;
                }
            };
            self.records.persist(key, &card).await;
            if let Some(url) = card.image_url(key.display()) {
                return Some(self.cache_remote_image(key, url).await);
            }
        }

        debug!(name = %key.display(), "no image found for card");
        None
    }

    /// Downloads and persists an image.
    ///
    /// One attempt, no retry. Either failure degrades to the raw remote URL
    /// instead of a miss.
    async fn cache_remote_image(&self, key: &CardKey, url: &str) -> ImageRef {
        let bytes = match self.http.get(url).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(name = %key.display(), url = %url, error = %e, "image download failed, keeping remote URL");
                return ImageRef::Remote(url.to_string());
            }
        };

        let path = self.layout.image_path(key);
        if let Err(e) = self.storage.write_binary(&path, bytes).await {
            warn!(path = %path, error = %e, "failed to persist image, keeping remote URL");
            return ImageRef::Remote(url.to_string());
        }

        debug!(name = %key.display(), path = %path, "image cached");
        ImageRef::Local(self.storage.resource_locator(&path))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::bulk::BulkIndexLoader;
    use crate::card::decode_record;
    use crate::config::Settings;
    use crate::fetch::{FetchOptions, HttpError, MockHttpClient};
    use crate::storage::MemoryStorage;

    fn langs() -> Vec<String> {
        vec!["ja".to_string(), "en".to_string()]
    }

    fn image_resolver(storage: Arc<MemoryStorage>, http: Arc<MockHttpClient>) -> ImageResolver {
        let layout = CacheLayout::from_settings(&Settings::default());
        let bulk = Arc::new(BulkIndexLoader::new(storage.clone(), layout.clone()));
        let options = FetchOptions::default()
            .with_retries(0)
            .with_timeout_ms(1_000)
            .with_base_delay_ms(1);
        let fetch = FetchClient::with_options(http.clone(), options);
        let records = Arc::new(CardResolver::new(
            storage.clone(),
            layout.clone(),
            bulk,
            fetch.clone(),
            langs(),
        ));
        ImageResolver::new(storage, layout, records, fetch, http, langs())
    }

    fn key(name: &str) -> CardKey {
        CardKey::new(name).unwrap()
    }

    #[test]
    fn test_image_ref_accessors() {
        let local = ImageRef::Local("memory://a.jpg".to_string());
        let remote = ImageRef::Remote("http://img/a.jpg".to_string());
        assert!(local.is_local());
        assert!(!remote.is_local());
        assert_eq!(local.location(), "memory://a.jpg");
        assert_eq!(remote.location(), "http://img/a.jpg");
    }

    #[tokio::test]
    async fn test_local_image_short_circuits() {
        let storage = Arc::new(MemoryStorage::new());
        storage.insert("scryfall/img/Opt.jpg", vec![0xff, 0xd8]);
        let http = Arc::new(MockHttpClient::new());
        let resolver = image_resolver(storage, http.clone());

        let image = resolver.resolve_image(&key("Opt")).await.unwrap();
        assert_eq!(image, ImageRef::Local("memory://scryfall/img/Opt.jpg".to_string()));
        assert_eq!(http.call_count(), 0);
    }

    #[tokio::test]
    async fn test_record_image_downloaded_and_cached() {
        let storage = Arc::new(MemoryStorage::new());
        storage.insert(
            "scryfall/json/Opt.json",
            r#"{"original":{"name":"Opt","image_uris":{"normal":"http://img/opt.jpg"}}}"#,
        );
        let http = Arc::new(MockHttpClient::new().respond("http://img/opt.jpg", Ok(vec![1, 2, 3])));
        let resolver = image_resolver(storage.clone(), http);

        let image = resolver.resolve_image(&key("Opt")).await.unwrap();
        assert!(image.is_local());
        assert_eq!(storage.contents("scryfall/img/Opt.jpg").unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_download_failure_falls_back_to_remote_url_and_is_cached() {
        let storage = Arc::new(MemoryStorage::new());
        storage.insert(
            "scryfall/json/Opt.json",
            r#"{"original":{"name":"Opt","image_uris":{"normal":"http://img/opt.jpg"}}}"#,
        );
        // No scripted response for the image URL, so the download 404s.
        let http = Arc::new(MockHttpClient::new());
        let resolver = image_resolver(storage, http.clone());

        let image = resolver.resolve_image(&key("Opt")).await.unwrap();
        assert_eq!(image, ImageRef::Remote("http://img/opt.jpg".to_string()));

        // The failure outcome is cached; a second call does not retry.
        let again = resolver.resolve_image(&key("Opt")).await.unwrap();
        assert_eq!(again, image);
        assert_eq!(http.calls_to("http://img/opt.jpg"), 1);
    }

    #[tokio::test]
    async fn test_locale_fallback_when_record_lacks_image() {
        let storage = Arc::new(MemoryStorage::new());
        let layout = CacheLayout::from_settings(&Settings::default());
        // Bulk-style record without image data.
        storage.insert(
            layout.record_path(&key("稲妻")),
            r#"{"original":{"name":"Lightning Bolt","printed_name":"稲妻"}}"#,
        );
        let ja_url = named_lookup_url("稲妻", "ja");
        let http = Arc::new(
            MockHttpClient::new()
                .respond_json(
                    &ja_url,
                    r#"{"name":"Lightning Bolt","image_uris":{"normal":"http://img/bolt.jpg"}}"#,
                )
                .respond("http://img/bolt.jpg", Ok(vec![7])),
        );
        let resolver = image_resolver(storage.clone(), http.clone());

        let image = resolver.resolve_image(&key("稲妻")).await.unwrap();
        assert!(image.is_local());
        assert_eq!(http.calls(), vec![ja_url, "http://img/bolt.jpg".to_string()]);

        // The fetched record replaced the image-less cache file.
        let written = storage.contents(&layout.record_path(&key("稲妻"))).unwrap();
        assert!(decode_record(&written).unwrap().image_uris.is_some());
    }

    #[tokio::test]
    async fn test_locale_fetch_persists_record_for_later_lookups() {
        let storage = Arc::new(MemoryStorage::new());
        let ja_url = named_lookup_url("Opt", "ja");
        // The record lookup burns the first, failing response; the image
        // lookup gets the good one.
        let http = Arc::new(
            MockHttpClient::new()
                .respond(
                    &ja_url,
                    Err(HttpError::Status { status: 500, url: ja_url.clone() }),
                )
                .respond_json(
                    &ja_url,
                    r#"{"name":"Opt","image_uris":{"normal":"http://img/opt.jpg"}}"#,
                )
                .respond("http://img/opt.jpg", Ok(vec![9])),
        );
        let resolver = image_resolver(storage.clone(), http.clone());

        let image = resolver.resolve_image(&key("Opt")).await.unwrap();
        assert!(image.is_local());
        assert_eq!(http.calls_to(&ja_url), 2);

        // The image-path fetch left the record behind in the wrapped form.
        let layout = CacheLayout::from_settings(&Settings::default());
        let written = storage.contents(&layout.record_path(&key("Opt"))).unwrap();
        assert_eq!(decode_record(&written).unwrap().name, "Opt");

        // A fresh resolver over the same storage now resolves offline.
        let offline_http = Arc::new(MockHttpClient::new());
        let offline = CardResolver::new(
            storage.clone(),
            layout.clone(),
            Arc::new(BulkIndexLoader::new(storage.clone(), layout.clone())),
            FetchClient::with_options(
                offline_http.clone(),
                FetchOptions::default().with_retries(0),
            ),
            langs(),
        );
        assert_eq!(offline.resolve(&key("Opt")).await.unwrap().name, "Opt");
        assert_eq!(offline_http.call_count(), 0);
    }

    #[tokio::test]
    async fn test_miss_outcome_is_cached() {
        let storage = Arc::new(MemoryStorage::new());
        let http = Arc::new(MockHttpClient::new());
        let resolver = image_resolver(storage, http.clone());

        assert!(resolver.resolve_image(&key("No Such Card")).await.is_none());
        let first_round = http.call_count();
        assert!(first_round > 0);

        assert!(resolver.resolve_image(&key("No Such Card")).await.is_none());
        assert_eq!(http.call_count(), first_round);
    }

    #[tokio::test]
    async fn test_concurrent_requests_share_one_download() {
        let storage = Arc::new(MemoryStorage::new());
        storage.insert(
            "scryfall/json/Opt.json",
            r#"{"original":{"name":"Opt","image_uris":{"normal":"http://img/opt.jpg"}}}"#,
        );
        let http = Arc::new(
            MockHttpClient::new()
                .with_delay(Duration::from_millis(20))
                .respond("http://img/opt.jpg", Ok(vec![1])),
        );
        let resolver = Arc::new(image_resolver(storage, http.clone()));

        let tasks: Vec<_> = (0..4)
            .map(|_| {
                let resolver = resolver.clone();
                tokio::spawn(async move { resolver.resolve_image(&key("Opt")).await })
            })
            .collect();

        let mut outcomes = Vec::new();
        for task in tasks {
            outcomes.push(task.await.unwrap());
        }

        assert_eq!(http.calls_to("http://img/opt.jpg"), 1);
        assert!(outcomes.iter().all(|o| o == &outcomes[0]));
        assert!(outcomes[0].as_ref().unwrap().is_local());
    }
}
