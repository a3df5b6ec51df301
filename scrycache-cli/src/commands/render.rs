//! Text rendering for deck reports and card lookups.
//!
//! Every renderer builds a `String` so command handlers stay thin and the
//! formatting is testable without capturing stdout.

use scrycache::card::CostBucket;
use scrycache::config::Settings;
use scrycache::deck::{DeckReport, DeckStats, Decklist, EntryOutcome};
use scrycache::image::ImageRef;

/// Widest mana curve bar, in characters.
const CURVE_BAR_WIDTH: usize = 40;

/// Formats the full deck report: sections, unresolved names and the
/// statistics blocks enabled in `settings`.
pub fn deck_summary(decklist: &Decklist, report: &DeckReport, settings: &Settings) -> String {
    let mut out = String::new();
    out.push_str("Deck Summary\n");
    out.push_str("============\n\n");

    for section in &decklist.sections {
        let cards: u32 = section.entries.iter().map(|e| e.count).sum();
        out.push_str(&format!("{} ({} cards)\n", section.title, cards));
    }
    out.push_str(&format!(
        "\nResolved {} of {} names, {} cards counted.\n",
        report.resolved_count(),
        report.outcomes.len(),
        report.stats.total_cards
    ));

    let missing: Vec<&str> = report.unresolved().map(|o| o.name.as_str()).collect();
    if !missing.is_empty() {
        out.push_str("\nNot found:\n");
        for name in missing {
            out.push_str(&format!("  - {}\n", name));
        }
    }

    if report.stats.total_cards > 0 {
        if settings.show_mana_curve {
            out.push_str(&mana_curve_chart(&report.stats));
        }
        if settings.show_card_types {
            out.push_str(&type_table(&report.stats));
        }
        if settings.show_color_counts {
            out.push_str(&color_table(&report.stats));
        }
    }
    out
}

/// Formats one card lookup outcome as an indented detail block.
pub fn card_details(outcome: &EntryOutcome) -> String {
    let card = match &outcome.card {
        Some(card) => card,
        None => return format!("{} (not found)\n\n", outcome.name),
    };

    let mut out = format!("{}\n", card.name);
    if let Some(printed) = &card.printed_name {
        out.push_str(&format!("  Printed name: {}\n", printed));
    }
    if let Some(line) = &card.type_line {
        out.push_str(&format!("  Type:         {}\n", line));
    }
    if let Some(cmc) = card.cmc {
        out.push_str(&format!("  Mana value:   {}\n", cmc));
    }
    let colors = card.color_identity.as_ref().or(card.colors.as_ref());
    if let Some(colors) = colors.filter(|c| !c.is_empty()) {
        out.push_str(&format!("  Colors:       {}\n", colors.join(", ")));
    }
    match &outcome.image {
        Some(ImageRef::Local(path)) => {
            out.push_str(&format!("  Image:        {} (cached)\n", path));
        }
        Some(ImageRef::Remote(url)) => {
            out.push_str(&format!("  Image:        {}\n", url));
        }
        None => {}
    }
    out.push('\n');
    out
}

fn mana_curve_chart(stats: &DeckStats) -> String {
    let mut out = String::new();
    out.push_str("\nMana Curve\n----------\n");

    let max = stats.mana_curve.values().copied().max().unwrap_or(0);
    for bucket in CostBucket::ALL {
        let count = stats.curve_count(bucket);
        out.push_str(&format!(
            "{:>2} | {:>3} {}\n",
            bucket.label(),
            count,
            curve_bar(count, max)
        ));
    }
    out
}

fn type_table(stats: &DeckStats) -> String {
    let mut out = String::new();
    out.push_str("\nCard Types\n----------\n");
    for (primary, count) in &stats.type_counts {
        out.push_str(&format!("{:<13} {:>3}\n", primary.label(), count));
    }
    out
}

fn color_table(stats: &DeckStats) -> String {
    let mut out = String::new();
    out.push_str("\nColors\n------\n");
    for (category, count) in &stats.color_counts {
        out.push_str(&format!("{:<13} {:>3}\n", category.label(), count));
    }
    out
}

/// Scales a count against the largest bucket. The largest bucket fills the
/// full width; zero counts produce no bar; nonzero counts always show at
/// least one mark.
fn curve_bar(count: u32, max: u32) -> String {
    if max == 0 || count == 0 {
        return String::new();
    }
    let width = (count as usize * CURVE_BAR_WIDTH).div_ceil(max as usize);
    "#".repeat(width.min(CURVE_BAR_WIDTH))
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use scrycache::card::{ColorCategory, CostBucket, PrimaryType};

    use super::*;

    fn missing(name: &str, count: u32) -> EntryOutcome {
        EntryOutcome {
            name: name.to_string(),
            count,
            card: None,
            image: None,
        }
    }

    fn sample_stats() -> DeckStats {
        let mut stats = DeckStats::default();
        stats.total_cards = 26;
        stats.mana_curve.insert(CostBucket::One, 6);
        stats.type_counts.insert(PrimaryType::Instant, 6);
        stats.type_counts.insert(PrimaryType::Land, 20);
        stats.color_counts.insert(ColorCategory::Red, 4);
        stats.color_counts.insert(ColorCategory::Blue, 22);
        stats
    }

    fn sample_report() -> DeckReport {
        DeckReport {
            outcomes: vec![missing("No Such Card", 2)],
            stats: sample_stats(),
        }
    }

    #[test]
    fn test_summary_lists_sections_and_missing_names() {
        let decklist = scrycache::deck::parse_decklist("Main:\n4 Shock\n\nLands:\n20 Island\n");
        let settings = Settings::default();
        let out = deck_summary(&decklist, &sample_report(), &settings);

        assert!(out.contains("Main (4 cards)"));
        assert!(out.contains("Lands (20 cards)"));
        assert!(out.contains("Resolved 0 of 1 names, 26 cards counted."));
        assert!(out.contains("  - No Such Card"));
        assert!(out.contains("Mana Curve"));
        assert!(out.contains("Card Types"));
        assert!(out.contains("Colors"));
    }

    #[test]
    fn test_display_toggles_suppress_blocks() {
        let decklist = scrycache::deck::parse_decklist("4 Shock\n");
        let mut settings = Settings::default();
        settings.show_mana_curve = false;
        settings.show_card_types = false;
        settings.show_color_counts = false;

        let out = deck_summary(&decklist, &sample_report(), &settings);
        assert!(!out.contains("Mana Curve"));
        assert!(!out.contains("Card Types"));
        assert!(!out.contains("\nColors\n"));
    }

    #[test]
    fn test_curve_rows_cover_every_bucket() {
        let chart = mana_curve_chart(&sample_stats());
        for bucket in CostBucket::ALL {
            assert!(chart.contains(&format!("{:>2} |", bucket.label())));
        }
        // The single populated bucket carries the full-width bar.
        assert!(chart.contains(&"#".repeat(CURVE_BAR_WIDTH)));
    }

    #[test]
    fn test_unresolved_card_renders_a_not_found_line() {
        let outcome = missing("Storm Crow", 1);
        assert_eq!(card_details(&outcome), "Storm Crow (not found)\n\n");
    }

    #[test]
    fn test_full_bar_belongs_to_the_largest_bucket() {
        assert_eq!(curve_bar(10, 10).len(), CURVE_BAR_WIDTH);
        assert_eq!(curve_bar(0, 10), "");
        assert_eq!(curve_bar(1, 0), "");
    }

    proptest! {
        #[test]
        fn prop_bars_are_bounded_and_ordered(a in 0u32..=200, b in 0u32..=200, max in 1u32..=200) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let lo_bar = curve_bar(lo.min(max), max).len();
            let hi_bar = curve_bar(hi.min(max), max).len();

            prop_assert!(hi_bar <= CURVE_BAR_WIDTH);
            prop_assert!(lo_bar <= hi_bar);
            if hi.min(max) > 0 {
                prop_assert!(hi_bar >= 1);
            }
        }
    }
}
