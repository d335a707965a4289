//! Position state: bitboards, mailbox, hashes, and draw bookkeeping.

use std::collections::HashMap;

use crate::zobrist::ZOBRIST;

use super::types::{Bitboard, CastlingRights, Color, Piece, Square};

/// Occurrence counts of position hashes along the game history, for
/// repetition detection.
#[derive(Clone, Debug, Default)]
pub(crate) struct RepetitionTable {
    counts: HashMap<u64, u32>,
}

impl RepetitionTable {
    pub(crate) fn new() -> Self {
        RepetitionTable::default()
    }

    pub(crate) fn get(&self, hash: u64) -> u32 {
        self.counts.get(&hash).copied().unwrap_or(0)
    }

    pub(crate) fn increment(&mut self, hash: u64) {
        *self.counts.entry(hash).or_insert(0) += 1;
    }

    pub(crate) fn decrement(&mut self, hash: u64) {
        if let Some(count) = self.counts.get_mut(&hash) {
            *count -= 1;
            if *count == 0 {
                self.counts.remove(&hash);
            }
        }
    }
}

/// A chess position.
///
/// Bitboards per (color, piece) plus a mailbox array; the two must always
/// agree. The primary hash and the pawn-only hash are maintained
/// incrementally and must equal their from-scratch recomputation after any
/// make or unmake.
#[derive(Clone, Debug)]
pub struct Board {
    pub(crate) pieces: [[Bitboard; 6]; 2],
    pub(crate) occupied: [Bitboard; 2],
    pub(crate) all_occupied: Bitboard,
    pub(crate) mailbox: [Option<(Color, Piece)>; 64],
    pub(crate) side_to_move: Color,
    pub(crate) en_passant_target: Option<Square>,
    pub(crate) castling_rights: CastlingRights,
    pub(crate) hash: u64,
    pub(crate) pawn_hash: u64,
    /// Non-king material per color, centipawns.
    pub(crate) material: [i32; 2],
    pub(crate) king_squares: [Square; 2],
    pub(crate) halfmove_clock: u32,
    pub(crate) repetitions: RepetitionTable,
}

impl Board {
    /// The standard starting position.
    #[must_use]
    pub fn new() -> Self {
        let mut board = Board::empty();
        let back_rank = [
            Piece::Rook,
            Piece::Knight,
            Piece::Bishop,
            Piece::Queen,
            Piece::King,
            Piece::Bishop,
            Piece::Knight,
            Piece::Rook,
        ];
        for (file, &piece) in back_rank.iter().enumerate() {
            let file = file as u8;
            board.put_piece(Color::White, piece, Square::new(0, file));
            board.put_piece(Color::White, Piece::Pawn, Square::new(1, file));
            board.put_piece(Color::Black, Piece::Pawn, Square::new(6, file));
            board.put_piece(Color::Black, piece, Square::new(7, file));
        }
        board.castling_rights = CastlingRights::all();
        board.hash = board.calculate_hash();
        board.pawn_hash = board.calculate_pawn_hash();
        board.repetitions.increment(board.hash);
        board
    }

    pub(crate) fn empty() -> Self {
        Board {
            pieces: [[Bitboard::EMPTY; 6]; 2],
            occupied: [Bitboard::EMPTY; 2],
            all_occupied: Bitboard::EMPTY,
            mailbox: [None; 64],
            side_to_move: Color::White,
            en_passant_target: None,
            castling_rights: CastlingRights::none(),
            hash: 0,
            pawn_hash: 0,
            material: [0; 2],
            king_squares: [Square::from_index(0); 2],
            repetitions: RepetitionTable::new(),
            halfmove_clock: 0,
        }
    }

    #[inline]
    #[must_use]
    pub fn hash(&self) -> u64 {
        self.hash
    }

    /// Secondary key covering pawn placement only.
    #[inline]
    #[must_use]
    pub fn pawn_hash(&self) -> u64 {
        self.pawn_hash
    }

    #[inline]
    #[must_use]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    #[inline]
    #[must_use]
    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    #[inline]
    #[must_use]
    pub fn castling_rights(&self) -> CastlingRights {
        self.castling_rights
    }

    #[inline]
    #[must_use]
    pub fn en_passant_target(&self) -> Option<Square> {
        self.en_passant_target
    }

    /// Contents of a square.
    #[inline]
    #[must_use]
    pub fn piece_at(&self, sq: Square) -> Option<(Color, Piece)> {
        self.mailbox[sq.index()]
    }

    #[inline]
    pub(crate) fn piece_bb(&self, color: Color, piece: Piece) -> Bitboard {
        self.pieces[color.index()][piece.index()]
    }

    #[inline]
    pub(crate) fn occupancy(&self, color: Color) -> Bitboard {
        self.occupied[color.index()]
    }

    #[inline]
    pub(crate) fn king_square(&self, color: Color) -> Square {
        self.king_squares[color.index()]
    }

    /// Non-king material of one side, centipawns.
    #[inline]
    #[must_use]
    pub fn material(&self, color: Color) -> i32 {
        self.material[color.index()]
    }

    /// Add a piece. Keeps bitboards, mailbox, hashes, material, and king
    /// squares in step.
    pub(crate) fn put_piece(&mut self, color: Color, piece: Piece, sq: Square) {
        debug_assert!(self.mailbox[sq.index()].is_none());
        let bit = Bitboard::from_square(sq);
        self.pieces[color.index()][piece.index()] |= bit;
        self.occupied[color.index()] |= bit;
        self.all_occupied |= bit;
        self.mailbox[sq.index()] = Some((color, piece));
        self.hash ^= ZOBRIST.piece(color, piece, sq);
        match piece {
            Piece::Pawn => self.pawn_hash ^= ZOBRIST.piece(color, piece, sq),
            Piece::King => self.king_squares[color.index()] = sq,
            _ => {}
        }
        if piece != Piece::King {
            self.material[color.index()] += piece.value();
        }
    }

    /// Remove a piece. Inverse of [`Board::put_piece`].
    pub(crate) fn take_piece(&mut self, color: Color, piece: Piece, sq: Square) {
        debug_assert_eq!(self.mailbox[sq.index()], Some((color, piece)));
        let bit = Bitboard::from_square(sq);
        self.pieces[color.index()][piece.index()] ^= bit;
        self.occupied[color.index()] ^= bit;
        self.all_occupied ^= bit;
        self.mailbox[sq.index()] = None;
        self.hash ^= ZOBRIST.piece(color, piece, sq);
        if piece == Piece::Pawn {
            self.pawn_hash ^= ZOBRIST.piece(color, piece, sq);
        }
        if piece != Piece::King {
            self.material[color.index()] -= piece.value();
        }
    }

    /// Primary hash recomputed from scratch. Must always equal `self.hash`.
    #[must_use]
    pub fn calculate_hash(&self) -> u64 {
        let mut hash = 0u64;
        for color in Color::BOTH {
            for piece in Piece::ALL {
                for sq in self.piece_bb(color, piece).iter() {
                    hash ^= ZOBRIST.piece(color, piece, sq);
                }
            }
        }
        if self.side_to_move == Color::Black {
            hash ^= ZOBRIST.side_key;
        }
        hash ^= ZOBRIST.castling(self.castling_rights.as_u8());
        if let Some(ep) = self.en_passant_target {
            hash ^= ZOBRIST.en_passant(ep);
        }
        hash
    }

    /// Pawn hash recomputed from scratch. Must always equal `self.pawn_hash`.
    #[must_use]
    pub fn calculate_pawn_hash(&self) -> u64 {
        let mut hash = 0u64;
        for color in Color::BOTH {
            for sq in self.piece_bb(color, Piece::Pawn).iter() {
                hash ^= ZOBRIST.piece(color, Piece::Pawn, sq);
            }
        }
        hash
    }

    /// Game-over draw as seen from the root: threefold repetition or the
    /// 50-move rule.
    #[must_use]
    pub fn is_draw(&self) -> bool {
        self.halfmove_clock >= 100 || self.repetitions.get(self.hash) >= 3
    }

    /// Draw including insufficient mating material.
    #[must_use]
    pub fn is_theoretical_draw(&self) -> bool {
        self.is_draw() || self.is_insufficient_material()
    }

    /// Inside the tree a single earlier occurrence already scores as a
    /// draw: the opponent can force the repetition.
    #[inline]
    pub(crate) fn is_search_draw(&self) -> bool {
        self.halfmove_clock >= 100 || self.repetitions.get(self.hash) >= 2
    }

    #[must_use]
    pub fn is_insufficient_material(&self) -> bool {
        let majors_or_pawns = [Piece::Pawn, Piece::Rook, Piece::Queen]
            .iter()
            .any(|&p| {
                (self.piece_bb(Color::White, p) | self.piece_bb(Color::Black, p)).any()
            });
        if majors_or_pawns {
            return false;
        }

        let knights = self.piece_bb(Color::White, Piece::Knight)
            | self.piece_bb(Color::Black, Piece::Knight);
        let bishops = self.piece_bb(Color::White, Piece::Bishop)
            | self.piece_bb(Color::Black, Piece::Bishop);

        match knights.popcount() + bishops.popcount() {
            0 | 1 => true,
            2 if knights.is_empty() => bishops_on_one_color(bishops),
            _ => false,
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        Board::new()
    }
}

fn bishops_on_one_color(bishops: Bitboard) -> bool {
    const LIGHT: u64 = 0x55AA_55AA_55AA_55AA;
    bishops.0 & LIGHT == 0 || bishops.0 & !LIGHT == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_position_counts() {
        let board = Board::new();
        assert_eq!(board.all_occupied.popcount(), 32);
        assert_eq!(board.occupancy(Color::White).popcount(), 16);
        assert_eq!(board.material(Color::White), board.material(Color::Black));
        assert_eq!(board.material(Color::White), 8 * 100 + 2 * 320 + 2 * 330 + 2 * 500 + 900);
        assert_eq!(board.king_square(Color::White), Square::new(0, 4));
        assert_eq!(board.king_square(Color::Black), Square::new(7, 4));
    }

    #[test]
    fn hash_matches_recompute() {
        let board = Board::new();
        assert_eq!(board.hash(), board.calculate_hash());
        assert_eq!(board.pawn_hash(), board.calculate_pawn_hash());
    }

    #[test]
    fn mailbox_and_bitboards_agree() {
        let board = Board::new();
        for idx in 0..64u8 {
            let sq = Square::from_index(idx);
            match board.piece_at(sq) {
                Some((color, piece)) => assert!(board.piece_bb(color, piece).contains(sq)),
                None => assert!(!board.all_occupied.contains(sq)),
            }
        }
    }

    #[test]
    fn put_take_round_trip() {
        let mut board = Board::new();
        let hash = board.hash;
        let material = board.material;
        board.take_piece(Color::White, Piece::Knight, Square::new(0, 1));
        assert_ne!(board.hash, hash);
        board.put_piece(Color::White, Piece::Knight, Square::new(0, 1));
        assert_eq!(board.hash, hash);
        assert_eq!(board.material, material);
    }

    #[test]
    fn insufficient_material_cases() {
        let kk: Board = "8/8/8/8/8/8/8/K1k5 w - - 0 1".parse().unwrap();
        assert!(kk.is_insufficient_material());
        let kbk: Board = "8/8/8/8/8/8/1B6/K1k5 w - - 0 1".parse().unwrap();
        assert!(kbk.is_insufficient_material());
        let kpk: Board = "8/8/8/8/8/8/1P6/K1k5 w - - 0 1".parse().unwrap();
        assert!(!kpk.is_insufficient_material());
        // Opposite-colored bishops can mate.
        let kbkb: Board = "8/8/8/8/8/8/1Bb5/K1k5 w - - 0 1".parse().unwrap();
        assert!(!kbkb.is_insufficient_material());
    }
}
