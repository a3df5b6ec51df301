//! Decklist text parsing.
//!
//! The input format is line-oriented: section headers are lines ending in a
//! colon (ASCII or fullwidth, so Japanese lists work unedited), entries are
//! `<count> <name>` lines, and anything else is ignored. Entries appearing
//! before any header are grouped under a default section.

use std::sync::OnceLock;

use regex::Regex;

/// Title given to entries that appear before any section header.
pub const DEFAULT_SECTION_TITLE: &str = "List";

/// Matches a section header: any text ending in `:` or `：`.
fn header_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(.+?)[：:]$").unwrap())
}

/// Matches an entry: a count, whitespace, then the card name.
fn entry_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(\d+)\s+(.+)$").unwrap())
}

/// One decklist line: a card name and how many copies it contributes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeckEntry {
    pub name: String,
    pub count: u32,
}

impl DeckEntry {
    pub fn new(name: impl Into<String>, count: u32) -> Self {
        Self {
            name: name.into(),
            count,
        }
    }
}

/// A titled group of entries.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeckSection {
    pub title: String,
    pub entries: Vec<DeckEntry>,
}

impl DeckSection {
    fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            entries: Vec::new(),
        }
    }
}

/// A parsed decklist, sections in input order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Decklist {
    pub sections: Vec<DeckSection>,
}

impl Decklist {
    /// All entries across all sections, in input order.
    pub fn all_entries(&self) -> impl Iterator<Item = &DeckEntry> {
        self.sections.iter().flat_map(|section| section.entries.iter())
    }

    /// Number of distinct entry lines.
    pub fn entry_count(&self) -> usize {
        self.sections.iter().map(|s| s.entries.len()).sum()
    }

    /// Total copies across all entries.
    pub fn total_cards(&self) -> u32 {
        self.all_entries().map(|entry| entry.count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entry_count() == 0
    }
}

/// Parses decklist text.
///
/// Lines that are neither a header nor an entry are skipped silently, which
/// lets the format tolerate comments and blank separators. An entry whose
/// count fails to parse as a number is skipped too. A header that collects
/// no entries produces no section.
pub fn parse_decklist(input: &str) -> Decklist {
    let mut sections: Vec<DeckSection> = Vec::new();
    let mut current: Option<DeckSection> = None;

    for line in input.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(caps) = header_pattern().captures(line) {
            if let Some(section) = current.take().filter(|s| !s.entries.is_empty()) {
                sections.push(section);
            }
            current = Some(DeckSection::titled(caps[1].trim()));
            continue;
        }

        if let Some(caps) = entry_pattern().captures(line) {
            let count = match caps[1].parse::<u32>() {
                Ok(count) => count,
                Err(_) => continue,
            };
            current
                .get_or_insert_with(|| DeckSection::titled(DEFAULT_SECTION_TITLE))
                .entries
                .push(DeckEntry::new(caps[2].trim(), count));
        }
    }

    if let Some(section) = current.take().filter(|s| !s.entries.is_empty()) {
        sections.push(section);
    }

    Decklist { sections }
}

/// Parses the bare name-per-line form: every non-empty line is one card.
pub fn parse_card_lines(input: &str) -> Vec<DeckEntry> {
    input
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| DeckEntry::new(line, 1))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sections_and_entries() {
        let list = parse_decklist(
            "Main:\n4 Lightning Bolt\n20 Mountain\n\nSideboard:\n2 Abrade\n",
        );
        assert_eq!(list.sections.len(), 2);
        assert_eq!(list.sections[0].title, "Main");
        assert_eq!(
            list.sections[0].entries,
            vec![
                DeckEntry::new("Lightning Bolt", 4),
                DeckEntry::new("Mountain", 20)
            ]
        );
        assert_eq!(list.sections[1].title, "Sideboard");
        assert_eq!(list.sections[1].entries, vec![DeckEntry::new("Abrade", 2)]);
        assert_eq!(list.total_cards(), 26);
        assert_eq!(list.entry_count(), 3);
    }

    #[test]
    fn test_parse_fullwidth_colon_header() {
        let list = parse_decklist("メイン：\n4 稲妻\n");
        assert_eq!(list.sections.len(), 1);
        assert_eq!(list.sections[0].title, "メイン");
        assert_eq!(list.sections[0].entries, vec![DeckEntry::new("稲妻", 4)]);
    }

    #[test]
    fn test_entries_before_header_get_default_section() {
        let list = parse_decklist("4 Opt\nLands:\n20 Island\n");
        assert_eq!(list.sections.len(), 2);
        assert_eq!(list.sections[0].title, DEFAULT_SECTION_TITLE);
        assert_eq!(list.sections[0].entries, vec![DeckEntry::new("Opt", 4)]);
        assert_eq!(list.sections[1].title, "Lands");
    }

    #[test]
    fn test_unmatched_lines_skipped() {
        let list = parse_decklist("// a comment\nSideboard\n4 Opt\nx2 Shock\n");
        assert_eq!(list.entry_count(), 1);
        assert_eq!(
            list.all_entries().collect::<Vec<_>>(),
            vec![&DeckEntry::new("Opt", 4)]
        );
    }

    #[test]
    fn test_header_without_entries_is_dropped() {
        let list = parse_decklist("Main:\nSideboard:\n2 Duress\n");
        assert_eq!(list.sections.len(), 1);
        assert_eq!(list.sections[0].title, "Sideboard");
        assert_eq!(list.sections[0].entries, vec![DeckEntry::new("Duress", 2)]);
    }

    #[test]
    fn test_trailing_empty_section_is_dropped() {
        let list = parse_decklist("4 Shock\nMaybeboard:\n");
        assert_eq!(list.sections.len(), 1);
        assert_eq!(list.sections[0].title, DEFAULT_SECTION_TITLE);
    }

    #[test]
    fn test_zero_count_entry_preserved() {
        let list = parse_decklist("0 Maybeboard Card\n");
        assert_eq!(
            list.all_entries().collect::<Vec<_>>(),
            vec![&DeckEntry::new("Maybeboard Card", 0)]
        );
        assert_eq!(list.total_cards(), 0);
    }

    #[test]
    fn test_names_keep_interior_punctuation() {
        let list = parse_decklist("1 Fire // Ice\n3 Borrowing 100,000 Arrows\n");
        let entries: Vec<_> = list.all_entries().collect();
        assert_eq!(entries[0].name, "Fire // Ice");
        assert_eq!(entries[1].name, "Borrowing 100,000 Arrows");
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_decklist("").is_empty());
        assert!(parse_decklist("\n\n   \n").is_empty());
    }

    #[test]
    fn test_parse_card_lines() {
        let entries = parse_card_lines("Opt\n\n  稲妻  \n");
        assert_eq!(
            entries,
            vec![DeckEntry::new("Opt", 1), DeckEntry::new("稲妻", 1)]
        );
    }
}
