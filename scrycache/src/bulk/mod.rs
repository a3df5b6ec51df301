//! Pre-downloaded bulk card datasets.
//!
//! Two bulk files can sit in the record directory: a Japanese-only dataset
//! and the comprehensive oracle dataset. Names containing Japanese script
//! are looked up in the former, everything else in the latter, and only in
//! the index the script routing selected. Each index is loaded at most once
//! per process; a missing or unreadable file is a permanently empty index.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::card::Card;
use crate::config::CacheLayout;
use crate::storage::StorageAdapter;

/// Returns true when a name should be looked up in the Japanese-only index.
///
/// The check is a script-range heuristic: any Hiragana or Katakana
/// (U+3040..=U+30FF) or CJK ideograph (U+3400..=U+9FFF) routes the name to
/// the Japanese side.
pub fn is_japanese_name(name: &str) -> bool {
    name.chars()
        .any(|c| matches!(c, '\u{3040}'..='\u{30ff}' | '\u{3400}'..='\u{9fff}'))
}

/// Identifies one of the two bulk datasets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BulkIndexKind {
    /// The Japanese-only dataset.
    JaOnly,
    /// The comprehensive oracle dataset.
    Oracle,
}

impl BulkIndexKind {
    /// Routing for a lookup name, per the script heuristic.
    pub fn for_name(name: &str) -> Self {
        if is_japanese_name(name) {
            BulkIndexKind::JaOnly
        } else {
            BulkIndexKind::Oracle
        }
    }

    fn label(&self) -> &'static str {
        match self {
            BulkIndexKind::JaOnly => "ja_only",
            BulkIndexKind::Oracle => "oracle",
        }
    }
}

/// A parsed bulk dataset.
///
/// Bulk files ship in two shapes and the variant is decided at parse time:
/// the standard array-of-records form, and a keyed name-to-record map.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum BulkIndex {
    /// Array form; lookups scan `name` and `printed_name`.
    Records(Vec<Card>),
    /// Map form; lookups probe the verbatim key, then fall back to a
    /// case-insensitive scan.
    ByName(HashMap<String, Card>),
}

impl BulkIndex {
    pub fn len(&self) -> usize {
        match self {
            BulkIndex::Records(cards) => cards.len(),
            BulkIndex::ByName(map) => map.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Point lookup: exact match wins over case-insensitive match.
    pub fn find(&self, name: &str) -> Option<&Card> {
        match self {
            BulkIndex::Records(cards) => cards
                .iter()
                .find(|card| {
                    card.name == name || card.printed_name.as_deref() == Some(name)
                })
                .or_else(|| {
                    let folded = name.to_lowercase();
                    cards.iter().find(|card| {
                        card.name.to_lowercase() == folded
                            || card
                                .printed_name
                                .as_ref()
                                .is_some_and(|printed| printed.to_lowercase() == folded)
                    })
                }),
            BulkIndex::ByName(map) => map.get(name).or_else(|| {
                let folded = name.to_lowercase();
                map.iter()
                    .find(|(key, _)| key.to_lowercase() == folded)
                    .map(|(_, card)| card)
            }),
        }
    }
}

/// Lazily loads the bulk indices and serves point lookups against them.
///
/// Loading happens on first use and the outcome is memoized for the life of
/// the loader, so a dataset dropped into the record directory mid-run is not
/// picked up until the application is rebuilt.
pub struct BulkIndexLoader {
    storage: Arc<dyn StorageAdapter>,
    layout: CacheLayout,
    ja_only: OnceCell<Option<Arc<BulkIndex>>>,
    oracle: OnceCell<Option<Arc<BulkIndex>>>,
}

impl BulkIndexLoader {
    pub fn new(storage: Arc<dyn StorageAdapter>, layout: CacheLayout) -> Self {
        Self {
            storage,
            layout,
            ja_only: OnceCell::new(),
            oracle: OnceCell::new(),
        }
    }

    /// Looks a name up in the index its script routes to.
    ///
    /// A Japanese name that misses the Japanese index is a miss; the oracle
    /// index is never consulted as a second chance, and vice versa.
    pub async fn lookup(&self, name: &str) -> Option<Card> {
        self.find(BulkIndexKind::for_name(name), name).await
    }

    /// Point lookup in one specific index.
    pub async fn find(&self, kind: BulkIndexKind, name: &str) -> Option<Card> {
        let index = self.load(kind).await?;
        index.find(name).cloned()
    }

    /// Loads and memoizes an index. The first outcome, present or missing,
    /// is final.
    pub async fn load(&self, kind: BulkIndexKind) -> Option<Arc<BulkIndex>> {
        let cell = match kind {
            BulkIndexKind::JaOnly => &self.ja_only,
            BulkIndexKind::Oracle => &self.oracle,
        };
        cell.get_or_init(|| self.load_uncached(kind)).await.clone()
    }

    async fn load_uncached(&self, kind: BulkIndexKind) -> Option<Arc<BulkIndex>> {
        let path = match kind {
            BulkIndexKind::JaOnly => self.layout.ja_only_path(),
            BulkIndexKind::Oracle => self.layout.oracle_path(),
        };

        let bytes = match self.storage.read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.is_not_found() => {
                debug!(index = kind.label(), path = %path, "bulk index file not present");
                return None;
            }
            Err(e) => {
                warn!(index = kind.label(), path = %path, error = %e, "failed to read bulk index");
                return None;
            }
        };

        match serde_json::from_slice::<BulkIndex>(&bytes) {
            Ok(index) => {
                debug!(index = kind.label(), cards = index.len(), "bulk index loaded");
                Some(Arc::new(index))
            }
            Err(e) => {
                warn!(index = kind.label(), path = %path, error = %e, "failed to parse bulk index");
                None
            }
        }
    }
}
