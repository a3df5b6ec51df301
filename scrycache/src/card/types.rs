//! Card record documents and name keys.
//!
//! `Card` mirrors the JSON documents served by the Scryfall card API. Only the
//! fields the resolver and statistics code read are typed; everything else is
//! captured in a flattened map so a record survives a cache round trip without
//! losing data the API added since this crate was written.
//!
//! `CardKey` is the identity used throughout the lookup chain: the trimmed
//! display name for remote queries and filenames, plus a case-folded form for
//! in-memory cache keys.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Image URL variants attached to a card or card face.
///
/// The cache only ever downloads the `normal` size; other sizes pass through
/// in `extra` untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageUris {
    /// URL of the normal-size JPEG, when the API provides one.
    pub normal: Option<String>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// One face of a multi-faced card (split, transform, modal double-faced).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardFace {
    /// Face name, e.g. `"Fable of the Mirror-Breaker"`.
    pub name: String,

    /// Per-face image URLs. Single-faced cards carry these at the top level
    /// instead.
    pub image_uris: Option<ImageUris>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// A card record as served by the remote API or a bulk dataset.
///
/// Records are immutable once fetched; a newer fetch replaces the cached
/// document wholesale rather than merging into it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    /// Canonical (English) card name.
    pub name: String,

    /// Localized printed name, present in non-English records and in the
    /// Japanese bulk dataset.
    pub printed_name: Option<String>,

    /// Converted mana cost. Absent on some layouts (e.g. reversible cards).
    pub cmc: Option<f64>,

    /// Full type line, e.g. `"Legendary Creature — Human Wizard"`.
    pub type_line: Option<String>,

    /// Color identity letters (`W`/`U`/`B`/`R`/`G`).
    pub color_identity: Option<Vec<String>>,

    /// Printed color letters. Used only when `color_identity` is absent.
    pub colors: Option<Vec<String>>,

    /// Top-level image URLs for single-faced cards.
    pub image_uris: Option<ImageUris>,

    /// Faces of a multi-faced card, in printed order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub card_faces: Vec<CardFace>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl Card {
    /// Picks the image URL to cache for this card.
    ///
    /// Precedence:
    /// 1. the top-level `normal` image,
    /// 2. the face whose name matches `requested` exactly,
    /// 3. the first face that has a `normal` image at all.
    ///
    /// # Arguments
    ///
    /// * `requested` - The name the caller asked for, used to pick the
    ///   matching face of a multi-faced card
    pub fn image_url(&self, requested: &str) -> Option<&str> {
        if let Some(url) = self.image_uris.as_ref().and_then(|uris| uris.normal.as_deref()) {
            return Some(url);
        }

        if let Some(face) = self.card_faces.iter().find(|face| face.name == requested) {
            if let Some(url) = face.image_uris.as_ref().and_then(|uris| uris.normal.as_deref()) {
                return Some(url);
            }
        }

        self.card_faces
            .iter()
            .find_map(|face| face.image_uris.as_ref().and_then(|uris| uris.normal.as_deref()))
    }
}

/// Persisted per-card cache file content.
///
/// New files are always written in the wrapped form `{"original": {...}}`,
/// but readers accept a bare record so caches produced by older builds keep
/// working.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum StoredRecord {
    /// The written form: the record nested under an `original` key.
    Wrapped { original: Card },
    /// A bare record with no envelope.
    Bare(Card),
}

impl StoredRecord {
    /// Unwraps the record regardless of envelope shape.
    pub fn into_card(self) -> Card {
        match self {
            StoredRecord::Wrapped { original } => original,
            StoredRecord::Bare(card) => card,
        }
    }
}

#[derive(Serialize)]
struct RecordEnvelope<'a> {
    original: &'a Card,
}

/// Serializes a card into the persisted cache file form.
pub fn encode_record(card: &Card) -> Result<String, serde_json::Error> {
    serde_json::to_string(&RecordEnvelope { original: card })
}

/// Parses a persisted cache file, accepting wrapped and bare shapes.
pub fn decode_record(bytes: &[u8]) -> Result<Card, serde_json::Error> {
    serde_json::from_slice::<StoredRecord>(bytes).map(StoredRecord::into_card)
}

/// A card name prepared for use as a cache identity.
///
/// Holds the trimmed display form (used for remote queries, index lookups and
/// filenames) and a case-folded form (used as the key for in-memory caches so
/// `"Fury"` and `"fury"` share one entry).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CardKey {
    display: String,
    folded: String,
}

impl CardKey {
    /// Builds a key from raw user input.
    ///
    /// Returns `None` when the input is empty or whitespace-only; such names
    /// can never resolve and must not produce cache entries.
    pub fn new(raw: &str) -> Option<Self> {
        let display = raw.trim();
        if display.is_empty() {
            return None;
        }
        Some(Self {
            display: display.to_string(),
            folded: display.to_lowercase(),
        })
    }

    /// The trimmed name as the user wrote it.
    pub fn display(&self) -> &str {
        &self.display
    }

    /// The case-folded form used for in-memory cache identity.
    pub fn folded(&self) -> &str {
        &self.folded
    }

    /// Derives a filesystem-safe filename stem from the display name.
    ///
    /// Percent-encodes the name, then replaces `%` with `_` so the result
    /// contains no path separators or percent signs on any platform. Distinct
    /// names can collide only if they differ exactly in `%` vs `_`, which real
    /// card names never do.
    pub fn safe_filename(&self) -> String {
        urlencoding::encode(&self.display).replace('%', "_")
    }
}

impl std::fmt::Display for CardKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display)
    }
}
