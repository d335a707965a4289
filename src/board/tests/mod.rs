//! Cross-module board and search tests.
//!
//! Unit tests live next to the code they cover; these files exercise the
//! stack as a whole: perft counts over the legal generator, draw
//! bookkeeping across make/unmake, full searches, and property-based
//! consistency checks.

mod proptest;
mod search;
