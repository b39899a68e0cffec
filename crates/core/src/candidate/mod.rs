//! The common candidate representation every provider is normalized into.

mod types;

pub use types::*;
