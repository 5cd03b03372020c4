//! Export functionality for the patient roster.

mod roster;

pub use roster::*;
