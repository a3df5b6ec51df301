//! Card records, name keys and statistics classification.

mod classify;
mod types;

pub use classify::{Color, ColorCategory, CostBucket, PrimaryType};
pub use types::{decode_record, encode_record, Card, CardFace, CardKey, ImageUris, StoredRecord};
