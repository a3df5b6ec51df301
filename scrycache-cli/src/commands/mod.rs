//! CLI command implementations.

pub mod card;
pub mod common;
pub mod config;
pub mod deck;
pub mod render;
