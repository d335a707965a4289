//! Score constants shared by the search and the transposition table.

use crate::board::types::MAX_PLY;

/// Larger than any reachable score; used as the unbounded window edge.
pub(crate) const INFINITY: i32 = 32_000;

/// Score for mate at the root. Mate at ply N scores `MATE_SCORE - N`, so
/// shorter mates always score higher.
pub(crate) const MATE_SCORE: i32 = 30_000;

/// Scores at or beyond this magnitude encode a mate distance.
pub(crate) const MATE_THRESHOLD: i32 = MATE_SCORE - 2 * MAX_PLY as i32;

/// Score returned for any drawn position.
pub(crate) const DRAW_SCORE: i32 = 0;

/// Nodes between polls of the stop flag and the hard deadline.
pub(crate) const STOP_CHECK_INTERVAL: u64 = 2_048;

/// Mate score as seen from `ply` plies into the tree.
#[inline]
pub(crate) const fn mated_in(ply: usize) -> i32 {
    -MATE_SCORE + ply as i32
}

/// True if `score` encodes a forced mate for either side.
#[inline]
pub(crate) const fn is_mate_score(score: i32) -> bool {
    score.abs() >= MATE_THRESHOLD
}
