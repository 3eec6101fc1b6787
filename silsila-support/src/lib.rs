//! Support helpers for silsila diagnostics.

pub mod names;

pub use names::{shorten_type_name, suggest_similar};
