//! deepfork — a parallel alpha-beta chess search engine.
//!
//! The crate is a pure search library: it takes a position and a set of
//! limits and returns the best move it found, a score, and the principal
//! variation. Protocol handling, opening books, and evaluation tuning are
//! left to the caller; static evaluation is pluggable through the
//! [`board::Evaluate`] trait.
//!
//! # Example
//! ```
//! use deepfork::board::{Board, SearchLimits};
//! use deepfork::search_control::start_search;
//!
//! let mut board = Board::new();
//! let limits = SearchLimits::depth(4);
//! let outcome = start_search(&mut board, &limits);
//! assert!(outcome.best_move.is_some());
//! ```

pub mod board;
pub mod tt;
mod zobrist;

pub use board::{Board, Color, Move, Piece, Square};
pub use tt::TranspositionTable;

/// Top-level search entry points, re-exported for callers that do not
/// want to reach into `board`.
pub mod search_control {
    pub use crate::board::{
        start_search, start_search_with, SearchIterationInfo, SearchLimits, SearchOutcome,
    };
}
