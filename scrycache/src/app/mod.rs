//! Application bootstrap.
//!
//! This module provides the `ScrycacheApp` type, which builds the whole
//! resolver stack from one `Settings` value.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                         ScrycacheApp                           │
//! │                                                                │
//! │  DeckProcessor ──► CardResolver ──► BulkIndexLoader            │
//! │       │                 │   │                                  │
//! │       └──► ImageResolver│   └─────► FetchClient ──► HttpClient │
//! │                 │       │                                      │
//! │                 └───────┴─────────► StorageAdapter             │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Settings are immutable per app instance; changed settings mean a new
//! `ScrycacheApp`, never a reconfigured one.
//!
//! # Example
//!
//! ```ignore
//! use scrycache::app::ScrycacheApp;
//! use scrycache::config::Settings;
//!
//! let app = ScrycacheApp::new(Settings::default(), base_dir)?;
//! let (decklist, report) = app.process_deck(&input).await?;
//! ```

mod bootstrap;
mod error;

pub use bootstrap::ScrycacheApp;
pub use error::AppError;
