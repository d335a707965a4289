//! Packed move representation and fixed-capacity move lists.
//!
//! A move is a single `u16`: bits 0-5 the source square, bits 6-11 the
//! destination, bits 12-15 a kind nibble. Moving and captured pieces are
//! recovered from the board when needed, so equality on the raw word is
//! enough for hash-move and killer comparisons.

use std::fmt;
use std::ops::Index;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::piece::Piece;
use super::square::Square;

const KIND_QUIET: u16 = 0;
const KIND_DOUBLE_PUSH: u16 = 1;
const KIND_CASTLE_KING: u16 = 2;
const KIND_CASTLE_QUEEN: u16 = 3;
const KIND_CAPTURE: u16 = 4;
const KIND_EN_PASSANT: u16 = 5;
// 6-7 unused
const KIND_PROMO: u16 = 8; // +0..3 selects knight/bishop/rook/queen
const KIND_PROMO_CAPTURE: u16 = 12;

const PROMO_ORDER: [Piece; 4] = [Piece::Knight, Piece::Bishop, Piece::Rook, Piece::Queen];

/// A packed 16-bit move.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Move(u16);

impl Move {
    /// The null move, used as an "empty slot" marker in tables.
    pub const NONE: Move = Move(0);

    #[inline]
    const fn pack(from: Square, to: Square, kind: u16) -> Self {
        Move(from.index() as u16 | ((to.index() as u16) << 6) | (kind << 12))
    }

    #[inline]
    #[must_use]
    pub const fn quiet(from: Square, to: Square) -> Self {
        Move::pack(from, to, KIND_QUIET)
    }

    #[inline]
    #[must_use]
    pub const fn capture(from: Square, to: Square) -> Self {
        Move::pack(from, to, KIND_CAPTURE)
    }

    #[inline]
    #[must_use]
    pub const fn double_push(from: Square, to: Square) -> Self {
        Move::pack(from, to, KIND_DOUBLE_PUSH)
    }

    #[inline]
    #[must_use]
    pub const fn en_passant(from: Square, to: Square) -> Self {
        Move::pack(from, to, KIND_EN_PASSANT)
    }

    #[inline]
    #[must_use]
    pub const fn castle_kingside(from: Square, to: Square) -> Self {
        Move::pack(from, to, KIND_CASTLE_KING)
    }

    #[inline]
    #[must_use]
    pub const fn castle_queenside(from: Square, to: Square) -> Self {
        Move::pack(from, to, KIND_CASTLE_QUEEN)
    }

    /// A promotion, optionally capturing on the destination square.
    #[inline]
    #[must_use]
    pub fn promotion(from: Square, to: Square, piece: Piece, captures: bool) -> Self {
        let offset = match piece {
            Piece::Knight => 0,
            Piece::Bishop => 1,
            Piece::Rook => 2,
            _ => 3,
        };
        let base = if captures { KIND_PROMO_CAPTURE } else { KIND_PROMO };
        Move::pack(from, to, base + offset)
    }

    #[inline]
    #[must_use]
    pub const fn from(self) -> Square {
        Square::from_index((self.0 & 0x3F) as u8)
    }

    #[inline]
    #[must_use]
    pub const fn to(self) -> Square {
        Square::from_index(((self.0 >> 6) & 0x3F) as u8)
    }

    #[inline]
    const fn kind(self) -> u16 {
        self.0 >> 12
    }

    #[inline]
    #[must_use]
    pub const fn is_none(self) -> bool {
        self.0 == 0
    }

    #[inline]
    #[must_use]
    pub const fn is_some(self) -> bool {
        self.0 != 0
    }

    /// Capture of any kind, including en passant and capturing promotions.
    #[inline]
    #[must_use]
    pub const fn is_capture(self) -> bool {
        let k = self.kind();
        k == KIND_CAPTURE || k == KIND_EN_PASSANT || k >= KIND_PROMO_CAPTURE
    }

    #[inline]
    #[must_use]
    pub const fn is_en_passant(self) -> bool {
        self.kind() == KIND_EN_PASSANT
    }

    #[inline]
    #[must_use]
    pub const fn is_castle(self) -> bool {
        let k = self.kind();
        k == KIND_CASTLE_KING || k == KIND_CASTLE_QUEEN
    }

    #[inline]
    #[must_use]
    pub const fn is_castle_kingside(self) -> bool {
        self.kind() == KIND_CASTLE_KING
    }

    #[inline]
    #[must_use]
    pub const fn is_double_push(self) -> bool {
        self.kind() == KIND_DOUBLE_PUSH
    }

    #[inline]
    #[must_use]
    pub const fn is_promotion(self) -> bool {
        self.kind() >= KIND_PROMO
    }

    /// The promotion piece, if this is a promotion.
    #[inline]
    #[must_use]
    pub const fn promotion_piece(self) -> Option<Piece> {
        if self.kind() >= KIND_PROMO {
            Some(PROMO_ORDER[(self.kind() & 3) as usize])
        } else {
            None
        }
    }

    /// Not a capture and not a promotion.
    #[inline]
    #[must_use]
    pub const fn is_quiet(self) -> bool {
        !self.is_capture() && !self.is_promotion()
    }

    #[inline]
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self.0
    }

    #[inline]
    #[must_use]
    pub const fn from_u16(raw: u16) -> Self {
        Move(raw)
    }
}

impl fmt::Display for Move {
    /// Coordinate notation, e.g. `e2e4` or `a7a8q`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from(), self.to())?;
        if let Some(piece) = self.promotion_piece() {
            write!(f, "{}", piece.to_char())?;
        }
        Ok(())
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            return write!(f, "Move(none)");
        }
        write!(f, "Move({self}")?;
        if self.is_capture() {
            write!(f, " x")?;
        }
        if self.is_castle() {
            write!(f, " castle")?;
        }
        write!(f, ")")
    }
}

/// Upper bound on moves in any reachable chess position.
pub(crate) const MAX_MOVES: usize = 256;

/// Hard ceiling on search depth in plies.
pub const MAX_PLY: usize = 128;

/// Move list backed by a fixed array; no heap in the movegen hot path.
#[derive(Clone)]
pub struct MoveList {
    moves: [Move; MAX_MOVES],
    len: usize,
}

impl MoveList {
    #[must_use]
    pub fn new() -> Self {
        MoveList {
            moves: [Move::NONE; MAX_MOVES],
            len: 0,
        }
    }

    #[inline]
    pub fn push(&mut self, mv: Move) {
        debug_assert!(self.len < MAX_MOVES);
        self.moves[self.len] = mv;
        self.len += 1;
    }

    #[inline]
    pub fn clear(&mut self) {
        self.len = 0;
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Move] {
        &self.moves[..self.len]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Move> {
        self.as_slice().iter()
    }

    #[must_use]
    pub fn contains(&self, mv: Move) -> bool {
        self.as_slice().contains(&mv)
    }

    #[must_use]
    pub fn get(&self, idx: usize) -> Option<Move> {
        self.as_slice().get(idx).copied()
    }

    /// Move the given element to the front, shifting the prefix right.
    /// Used by the root driver to promote a fail-high move.
    pub(crate) fn promote_to_front(&mut self, idx: usize) {
        debug_assert!(idx < self.len);
        let mv = self.moves[idx];
        self.moves.copy_within(0..idx, 1);
        self.moves[0] = mv;
    }
}

impl Default for MoveList {
    fn default() -> Self {
        MoveList::new()
    }
}

impl Index<usize> for MoveList {
    type Output = Move;

    fn index(&self, idx: usize) -> &Move {
        &self.as_slice()[idx]
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Move;
    type IntoIter = std::slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

impl fmt::Debug for MoveList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// A move with an ordering score attached.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ScoredMove {
    pub mv: Move,
    pub score: i32,
}

/// Fixed-capacity scored list with incremental selection.
///
/// `pick_best` does one selection-sort step per call, so moves cut off
/// early never pay for a full sort.
#[derive(Clone)]
pub(crate) struct ScoredMoveList {
    moves: [ScoredMove; MAX_MOVES],
    len: usize,
}

impl ScoredMoveList {
    pub fn new() -> Self {
        ScoredMoveList {
            moves: [ScoredMove {
                mv: Move::NONE,
                score: 0,
            }; MAX_MOVES],
            len: 0,
        }
    }

    #[inline]
    pub fn push(&mut self, mv: Move, score: i32) {
        debug_assert!(self.len < MAX_MOVES);
        self.moves[self.len] = ScoredMove { mv, score };
        self.len += 1;
    }

    /// Swap the best remaining move into position `start` and return it.
    #[inline]
    pub fn pick_best(&mut self, start: usize) -> Option<ScoredMove> {
        if start >= self.len {
            return None;
        }
        let mut best = start;
        for i in (start + 1)..self.len {
            if self.moves[i].score > self.moves[best].score {
                best = i;
            }
        }
        self.moves.swap(start, best);
        Some(self.moves[start])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_squares_and_kind() {
        let mv = Move::capture(Square::new(1, 4), Square::new(2, 5));
        assert_eq!(mv.from(), Square::new(1, 4));
        assert_eq!(mv.to(), Square::new(2, 5));
        assert!(mv.is_capture());
        assert!(!mv.is_promotion());
    }

    #[test]
    fn promotion_piece_encoding() {
        for &piece in &[Piece::Knight, Piece::Bishop, Piece::Rook, Piece::Queen] {
            let mv = Move::promotion(Square::new(6, 0), Square::new(7, 0), piece, false);
            assert_eq!(mv.promotion_piece(), Some(piece));
            assert!(!mv.is_capture());

            let cap = Move::promotion(Square::new(6, 0), Square::new(7, 1), piece, true);
            assert_eq!(cap.promotion_piece(), Some(piece));
            assert!(cap.is_capture());
        }
    }

    #[test]
    fn display_coordinate_notation() {
        let mv = Move::quiet(Square::new(1, 4), Square::new(3, 4));
        assert_eq!(mv.to_string(), "e2e4");
        let promo = Move::promotion(Square::new(6, 0), Square::new(7, 0), Piece::Queen, false);
        assert_eq!(promo.to_string(), "a7a8q");
    }

    #[test]
    fn promote_to_front_preserves_contents() {
        let mut list = MoveList::new();
        for file in 0..4 {
            list.push(Move::quiet(Square::new(0, file), Square::new(1, file)));
        }
        let target = list[2];
        list.promote_to_front(2);
        assert_eq!(list[0], target);
        assert_eq!(list.len(), 4);
    }

    #[test]
    fn pick_best_is_descending() {
        let mut list = ScoredMoveList::new();
        let squares = [(0u8, 0u8), (0, 1), (0, 2), (0, 3)];
        let scores = [5, 40, -3, 12];
        for (&(r, f), &s) in squares.iter().zip(scores.iter()) {
            list.push(Move::quiet(Square::new(r, f), Square::new(1, f)), s);
        }
        let mut seen = Vec::new();
        let mut idx = 0;
        while let Some(sm) = list.pick_best(idx) {
            seen.push(sm.score);
            idx += 1;
        }
        assert_eq!(seen, vec![40, 12, 5, -3]);
    }
}
