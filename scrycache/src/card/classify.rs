//! Deck statistics classification rules.
//!
//! Three independent classifications are derived per card:
//!
//! - [`CostBucket`]: mana-curve bucket from the converted mana cost
//! - [`PrimaryType`]: the dominant card type from the type line
//! - [`ColorCategory`]: colorless, a single color, or multicolored
//!
//! All three are total functions: malformed or missing inputs land in a
//! well-defined bucket instead of failing, so one odd record never aborts a
//! deck run.

use std::collections::BTreeSet;
use std::fmt;

/// Mana-curve bucket. Costs of seven or more share the top bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CostBucket {
    Zero,
    One,
    Two,
    Three,
    Four,
    Five,
    Six,
    SevenPlus,
}

impl CostBucket {
    /// Every bucket in ascending order, for rendering a full curve.
    pub const ALL: [CostBucket; 8] = [
        CostBucket::Zero,
        CostBucket::One,
        CostBucket::Two,
        CostBucket::Three,
        CostBucket::Four,
        CostBucket::Five,
        CostBucket::Six,
        CostBucket::SevenPlus,
    ];

    /// Buckets a converted mana cost.
    ///
    /// Missing, non-finite and non-positive costs all land in the zero
    /// bucket; fractional costs are floored; anything at seven or above
    /// collapses into `SevenPlus`.
    pub fn from_cmc(cmc: Option<f64>) -> Self {
        let value = match cmc {
            Some(v) if v.is_finite() => v,
            _ => return Self::Zero,
        };
        if value <= 0.0 {
            Self::Zero
        } else if value >= 7.0 {
            Self::SevenPlus
        } else {
            match value.floor() as u8 {
                0 => Self::Zero,
                1 => Self::One,
                2 => Self::Two,
                3 => Self::Three,
                4 => Self::Four,
                5 => Self::Five,
                _ => Self::Six,
            }
        }
    }

    /// Short label for display, `"0"` through `"6"` and `"7+"`.
    pub fn label(&self) -> &'static str {
        match self {
            CostBucket::Zero => "0",
            CostBucket::One => "1",
            CostBucket::Two => "2",
            CostBucket::Three => "3",
            CostBucket::Four => "4",
            CostBucket::Five => "5",
            CostBucket::Six => "6",
            CostBucket::SevenPlus => "7+",
        }
    }
}

impl fmt::Display for CostBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The dominant card type, picked from the type line by priority.
///
/// A type line can mention several types (`"Artifact Creature"`); the first
/// match in priority order wins, so creatures count as creatures even when
/// they are also artifacts, and anything that is a land counts as a land.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PrimaryType {
    Land,
    Creature,
    Instant,
    Sorcery,
    Artifact,
    Enchantment,
    Planeswalker,
    Battle,
    Other,
}

impl PrimaryType {
    const PRIORITY: [(&'static str, PrimaryType); 8] = [
        ("Land", PrimaryType::Land),
        ("Creature", PrimaryType::Creature),
        ("Instant", PrimaryType::Instant),
        ("Sorcery", PrimaryType::Sorcery),
        ("Artifact", PrimaryType::Artifact),
        ("Enchantment", PrimaryType::Enchantment),
        ("Planeswalker", PrimaryType::Planeswalker),
        ("Battle", PrimaryType::Battle),
    ];

    /// Classifies an English type line by substring match in priority order.
    ///
    /// Missing type lines and lines naming none of the known types map to
    /// [`PrimaryType::Other`].
    pub fn classify(type_line: Option<&str>) -> Self {
        let line = match type_line {
            Some(line) => line,
            None => return Self::Other,
        };
        for (needle, ty) in Self::PRIORITY {
            if line.contains(needle) {
                return ty;
            }
        }
        Self::Other
    }

    pub fn label(&self) -> &'static str {
        match self {
            PrimaryType::Land => "Land",
            PrimaryType::Creature => "Creature",
            PrimaryType::Instant => "Instant",
            PrimaryType::Sorcery => "Sorcery",
            PrimaryType::Artifact => "Artifact",
            PrimaryType::Enchantment => "Enchantment",
            PrimaryType::Planeswalker => "Planeswalker",
            PrimaryType::Battle => "Battle",
            PrimaryType::Other => "Other",
        }
    }
}

impl fmt::Display for PrimaryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One of the five card colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Color {
    White,
    Blue,
    Black,
    Red,
    Green,
}

impl Color {
    /// Parses a single-letter color code. Unknown codes yield `None` and are
    /// skipped by the category rules, like empty entries.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "W" => Some(Color::White),
            "U" => Some(Color::Blue),
            "B" => Some(Color::Black),
            "R" => Some(Color::Red),
            "G" => Some(Color::Green),
            _ => None,
        }
    }
}

/// Color classification of a card: colorless, exactly one color, or
/// multicolored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ColorCategory {
    White,
    Blue,
    Black,
    Red,
    Green,
    Multicolor,
    Colorless,
}

impl ColorCategory {
    /// Derives the category from a list of color codes.
    ///
    /// Duplicates, empty strings and unrecognized codes are dropped before
    /// counting distinct colors: zero distinct colors is colorless, one maps
    /// to that color, two or more is multicolored.
    pub fn from_codes<'a, I>(codes: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let distinct: BTreeSet<Color> = codes
            .into_iter()
            .filter_map(|code| Color::from_code(code.trim()))
            .collect();

        let mut colors = distinct.into_iter();
        match (colors.next(), colors.next()) {
            (None, _) => Self::Colorless,
            (Some(color), None) => color.into(),
            (Some(_), Some(_)) => Self::Multicolor,
        }
    }

    /// Single-letter code matching the remote API's color letters, with `M`
    /// for multicolored and `C` for colorless.
    pub fn code(&self) -> &'static str {
        match self {
            ColorCategory::White => "W",
            ColorCategory::Blue => "U",
            ColorCategory::Black => "B",
            ColorCategory::Red => "R",
            ColorCategory::Green => "G",
            ColorCategory::Multicolor => "M",
            ColorCategory::Colorless => "C",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ColorCategory::White => "White",
            ColorCategory::Blue => "Blue",
            ColorCategory::Black => "Black",
            ColorCategory::Red => "Red",
            ColorCategory::Green => "Green",
            ColorCategory::Multicolor => "Multicolor",
            ColorCategory::Colorless => "Colorless",
        }
    }
}

impl From<Color> for ColorCategory {
    fn from(color: Color) -> Self {
        match color {
            Color::White => ColorCategory::White,
            Color::Blue => ColorCategory::Blue,
            Color::Black => ColorCategory::Black,
            Color::Red => ColorCategory::Red,
            Color::Green => ColorCategory::Green,
        }
    }
}

impl fmt::Display for ColorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
