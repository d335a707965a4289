//! Board representation, move generation, and search.
//!
//! The submodules layer upward: value types and attack tables at the
//! bottom, the position state and make/unmake above them, then the
//! generators, the exchange evaluator, and finally the search driver.

mod attack_tables;
mod error;
mod eval;
mod fen;
mod make_unmake;
mod movegen;
pub(crate) mod search;
mod see;
mod state;
pub(crate) mod types;

#[cfg(test)]
mod tests;

pub use error::{FenError, MoveParseError, SquareError};
pub use eval::{Evaluate, MaterialEval};
pub use make_unmake::UnmakeInfo;
pub use search::{
    start_search, start_search_with, SearchConfig, SearchInfoCallback, SearchIterationInfo,
    SearchLimits, SearchOutcome, SearchParams,
};
pub use state::Board;
pub use types::{Bitboard, CastlingRights, Color, Move, MoveList, Piece, Square, MAX_PLY};
