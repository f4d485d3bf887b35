//! Pattern matching for encoded addresses.
//!
//! A pattern is a prefix and a suffix, either of which may be empty. Matching
//! ignores the `0x` marker and folds ASCII case unless case-sensitive
//! (checksum) mode is requested.

mod pattern;

pub use pattern::{matches, Pattern};
