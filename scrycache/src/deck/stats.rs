//! Deck aggregate statistics.

use std::collections::BTreeMap;

use crate::card::{Card, ColorCategory, CostBucket, PrimaryType};

/// Aggregates folded over the resolved cards of one deck run.
///
/// Unresolved entries contribute nothing; the per-entry outcomes in the
/// report are the place to look for what was missing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeckStats {
    /// Total copies of resolved cards.
    pub total_cards: u32,

    /// Copies per cost bucket. Lands are excluded.
    pub mana_curve: BTreeMap<CostBucket, u32>,

    /// Copies per primary card type.
    pub type_counts: BTreeMap<PrimaryType, u32>,

    /// Copies per color category.
    pub color_counts: BTreeMap<ColorCategory, u32>,
}

impl DeckStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one resolved card into the aggregates, weighted by its count.
    ///
    /// Colors prefer the color identity; the printed colors are only a
    /// fallback for records that carry no identity at all, so an explicitly
    /// empty identity counts as colorless.
    pub fn record(&mut self, card: &Card, count: u32) {
        self.total_cards += count;

        let primary = PrimaryType::classify(card.type_line.as_deref());
        *self.type_counts.entry(primary).or_default() += count;

        let codes = card
            .color_identity
            .as_deref()
            .or(card.colors.as_deref())
            .unwrap_or(&[]);
        let category = ColorCategory::from_codes(codes.iter().map(String::as_str));
        *self.color_counts.entry(category).or_default() += count;

        if primary != PrimaryType::Land {
            let bucket = CostBucket::from_cmc(card.cmc);
            *self.mana_curve.entry(bucket).or_default() += count;
        }
    }

    /// Copies in one cost bucket.
    pub fn curve_count(&self, bucket: CostBucket) -> u32 {
        self.mana_curve.get(&bucket).copied().unwrap_or(0)
    }

    /// Copies of one primary type.
    pub fn type_count(&self, primary: PrimaryType) -> u32 {
        self.type_counts.get(&primary).copied().unwrap_or(0)
    }

    /// Copies in one color category.
    pub fn color_count(&self, category: ColorCategory) -> u32 {
        self.color_counts.get(&category).copied().unwrap_or(0)
    }
}
