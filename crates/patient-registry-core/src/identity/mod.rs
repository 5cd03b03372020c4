//! Identity document validation.
//!
//! Handles:
//! - National documents (8 digits + check letter)
//! - Foreign-resident documents (X/Y/Z + 7 digits + check letter)
//! - Mod-23 check letter computation

mod document;

pub use document::*;
