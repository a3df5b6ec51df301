//! Decklist parsing, batch resolution and aggregate statistics.

mod batch;
mod parser;
mod stats;

pub use batch::{BatchError, DeckProcessor, DeckReport, EntryOutcome};
pub use parser::{
    parse_card_lines, parse_decklist, DeckEntry, DeckSection, Decklist, DEFAULT_SECTION_TITLE,
};
pub use stats::DeckStats;
