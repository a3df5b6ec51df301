//! Scrycache - Card name resolution and caching for Scryfall data
//!
//! This library resolves trading-card names (English or Japanese) into
//! structured Scryfall records and cached card images through a tiered
//! lookup chain: an in-memory cache, persisted per-card files,
//! pre-downloaded bulk datasets, and finally the remote API with retry.
//! A bounded worker pool resolves whole decklists at once, folding the
//! results into deck statistics.

pub mod app;
pub mod bulk;
pub mod card;
pub mod config;
pub mod deck;
pub mod fetch;
pub mod image;
pub mod resolver;
pub mod storage;

pub use app::{AppError, ScrycacheApp};
pub use card::{Card, CardKey};
pub use config::Settings;
pub use deck::{DeckProcessor, DeckReport};
pub use image::ImageRef;
