//! Deck command - resolve a decklist file and print its statistics.

use std::path::PathBuf;

use scrycache::deck::{parse_decklist, BatchError, DeckEntry};

use super::common::{build_runtime, AppArgs};
use super::render;
use crate::error::CliError;

/// Arguments for the deck command.
#[derive(Debug, clap::Args)]
pub struct DeckArgs {
    /// Decklist file to resolve
    pub file: PathBuf,

    #[command(flatten)]
    pub app: AppArgs,

    /// Skip the mana curve chart
    #[arg(long)]
    pub no_mana_curve: bool,

    /// Skip the card type table
    #[arg(long)]
    pub no_card_types: bool,

    /// Skip the color table
    #[arg(long)]
    pub no_color_counts: bool,
}

/// Run the deck command.
pub fn run(args: DeckArgs) -> Result<(), CliError> {
    let input = std::fs::read_to_string(&args.file).map_err(|e| {
        CliError::Input(format!("failed to read {}: {}", args.file.display(), e))
    })?;

    let decklist = parse_decklist(&input);
    if decklist.is_empty() {
        return Err(CliError::Input(format!(
            "no deck entries found in {}",
            args.file.display()
        )));
    }

    let mut settings = args.app.settings()?;
    if args.no_mana_curve {
        settings.show_mana_curve = false;
    }
    if args.no_card_types {
        settings.show_card_types = false;
    }
    if args.no_color_counts {
        settings.show_color_counts = false;
    }

    let app = args.app.build_app(settings.clone())?;
    let runtime = build_runtime()?;

    let entries: Vec<DeckEntry> = decklist.all_entries().cloned().collect();
    let report = match runtime.block_on(app.process_entries(&entries)) {
        Ok(report) => report,
        Err(BatchError::WorkerPanicked { message, report }) => {
            // Show what did resolve before surfacing the failure.
            print!("{}", render::deck_summary(&decklist, &report, &settings));
            return Err(CliError::Batch(message));
        }
    };

    print!("{}", render::deck_summary(&decklist, &report, &settings));
    Ok(())
}
