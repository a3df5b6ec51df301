//! Bounded-concurrency deck resolution.
//!
//! A fixed pool of workers drains the entry list through a shared atomic
//! cursor, so every entry is claimed exactly once no matter how the workers
//! interleave. Entries fail independently; the only batch-level error is a
//! worker dying, and even then the outcomes that completed are returned
//! alongside the error.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures::future::join_all;
use parking_lot::Mutex;
use thiserror::Error;
use tracing::{debug, warn};

use super::parser::DeckEntry;
use super::stats::DeckStats;
use crate::card::{Card, CardKey};
use crate::config::DEFAULT_CONCURRENCY;
use crate::image::{ImageRef, ImageResolver};
use crate::resolver::CardResolver;

/// Outcome of one decklist entry, in input order.
#[derive(Clone, Debug)]
pub struct EntryOutcome {
    pub name: String,
    pub count: u32,
    /// The resolved record, when any tier had it.
    pub card: Option<Arc<Card>>,
    /// The resolved image, when one exists.
    pub image: Option<ImageRef>,
}

impl EntryOutcome {
    pub fn resolved(&self) -> bool {
        self.card.is_some()
    }

    fn unresolved(entry: &DeckEntry) -> Self {
        Self {
            name: entry.name.clone(),
            count: entry.count,
            card: None,
            image: None,
        }
    }
}

/// Result of a deck run: per-entry outcomes plus the folded statistics.
#[derive(Clone, Debug)]
pub struct DeckReport {
    pub outcomes: Vec<EntryOutcome>,
    pub stats: DeckStats,
}

impl DeckReport {
    pub fn resolved_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.resolved()).count()
    }

    /// Entries no tier could resolve.
    pub fn unresolved(&self) -> impl Iterator<Item = &EntryOutcome> {
        self.outcomes.iter().filter(|o| !o.resolved())
    }
}

/// Batch-level failure.
#[derive(Debug, Error)]
pub enum BatchError {
    /// A worker task died. The report carries everything that finished
    /// before the failure; unclaimed entries appear as unresolved.
    #[error("deck worker failed: {message}")]
    WorkerPanicked { message: String, report: DeckReport },
}

/// Resolves the entries of a deck with a bounded worker pool.
pub struct DeckProcessor {
    records: Arc<CardResolver>,
    images: Arc<ImageResolver>,
    concurrency: usize,
}

impl DeckProcessor {
    pub fn new(records: Arc<CardResolver>, images: Arc<ImageResolver>) -> Self {
        Self {
            records,
            images,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// Set the worker count. Zero is clamped to one.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Resolves every entry and folds the statistics.
    ///
    /// # Arguments
    ///
    /// * `entries` - The deck entries, processed in claim order but reported
    ///   in input order
    ///
    /// # Returns
    ///
    /// The report, or [`BatchError::WorkerPanicked`] carrying the partial
    /// report when a worker died.
    pub async fn process(&self, entries: &[DeckEntry]) -> Result<DeckReport, BatchError> {
        let total = entries.len();
        let entries = Arc::new(entries.to_vec());
        let cursor = Arc::new(AtomicUsize::new(0));
        let stats = Arc::new(Mutex::new(DeckStats::new()));
        let slots: Arc<Mutex<Vec<Option<EntryOutcome>>>> =
            Arc::new(Mutex::new(vec![None; total]));

        let workers = self.concurrency.min(total).max(1);
        debug!(entries = total, workers, "starting deck resolution");

        let mut handles = Vec::with_capacity(workers);
        for worker in 0..workers {
            let entries = entries.clone();
            let cursor = cursor.clone();
            let stats = stats.clone();
            let slots = slots.clone();
            let records = self.records.clone();
            let images = self.images.clone();

            handles.push(tokio::spawn(async move {
                loop {
                    let index = cursor.fetch_add(1, Ordering::SeqCst);
                    if index >= entries.len() {
                        break;
                    }
                    let outcome =
                        resolve_entry(&records, &images, &entries[index], &stats).await;
                    slots.lock()[index] = Some(outcome);
                }
                debug!(worker, "deck worker drained the queue");
            }));
        }

        let mut failure: Option<String> = None;
        for joined in join_all(handles).await {
            if let Err(e) = joined {
                warn!(error = %e, "deck worker failed");
                failure.get_or_insert_with(|| e.to_string());
            }
        }

        let stats = std::mem::take(&mut *stats.lock());
        let slots = std::mem::take(&mut *slots.lock());
        let outcomes = slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| slot.unwrap_or_else(|| EntryOutcome::unresolved(&entries[index])))
            .collect();

        let report = DeckReport { outcomes, stats };
        match failure {
            Some(message) => Err(BatchError::WorkerPanicked { message, report }),
            None => Ok(report),
        }
    }
}

/// Resolves one entry. Record and image failures are independent; the stats
/// lock is held only across the fold, never across an await.
async fn resolve_entry(
    records: &CardResolver,
    images: &ImageResolver,
    entry: &DeckEntry,
    stats: &Mutex<DeckStats>,
) -> EntryOutcome {
    let Some(key) = CardKey::new(&entry.name) else {
        debug!(name = %entry.name, "skipping blank deck entry");
        return EntryOutcome::unresolved(entry);
    };

    let card = records.resolve(&key).await;
    match &card {
        Some(card) => stats.lock().record(card, entry.count),
        None => debug!(name = %key.display(), "deck entry did not resolve"),
    }

    let image = images.resolve_image(&key).await;

    EntryOutcome {
        name: entry.name.clone(),
        count: entry.count,
        card,
        image,
    }
}
