//! Card command - resolve individual card names.

use std::path::PathBuf;

use scrycache::deck::{parse_card_lines, BatchError, DeckEntry};

use super::common::{build_runtime, AppArgs};
use super::render;
use crate::error::CliError;

/// Arguments for the card command.
#[derive(Debug, clap::Args)]
pub struct CardArgs {
    /// Card names to resolve
    #[arg(required_unless_present = "file")]
    pub names: Vec<String>,

    /// File of card names, one per line
    #[arg(long, value_name = "FILE")]
    pub file: Option<PathBuf>,

    #[command(flatten)]
    pub app: AppArgs,
}

/// Run the card command.
pub fn run(args: CardArgs) -> Result<(), CliError> {
    let mut entries: Vec<DeckEntry> = args
        .names
        .iter()
        .map(|name| DeckEntry::new(name.clone(), 1))
        .collect();

    if let Some(path) = &args.file {
        let text = std::fs::read_to_string(path)
            .map_err(|e| CliError::Input(format!("failed to read {}: {}", path.display(), e)))?;
        entries.extend(parse_card_lines(&text));
    }

    if entries.is_empty() {
        return Err(CliError::Input("no card names given".to_string()));
    }

    let settings = args.app.settings()?;
    let app = args.app.build_app(settings)?;
    let runtime = build_runtime()?;

    let report = match runtime.block_on(app.process_entries(&entries)) {
        Ok(report) => report,
        Err(BatchError::WorkerPanicked { message, report }) => {
            for outcome in &report.outcomes {
                print!("{}", render::card_details(outcome));
            }
            return Err(CliError::Batch(message));
        }
    };

    for outcome in &report.outcomes {
        print!("{}", render::card_details(outcome));
    }
    Ok(())
}
