//! Pseudo-legal move generation and legality testing.
//!
//! The generators append packed moves to a caller-provided buffer and may
//! emit moves that leave the mover's own king in check; [`Board::is_legal`]
//! is the cheap pin/attack predicate that filters them. Castling is the
//! exception: its transit-square conditions are verified during generation,
//! so a generated castle is already legal.

mod pawns;
mod pieces;

use super::attack_tables::{
    between, bishop_attacks, king_attacks, knight_attacks, pawn_attacks, rook_attacks,
};
use super::state::Board;
use super::types::{Bitboard, Color, Move, MoveList, Piece, Square};

impl Board {
    /// True if `sq` is attacked by any piece of `by`, given the current
    /// occupancy.
    #[must_use]
    pub fn is_attacked(&self, sq: Square, by: Color) -> bool {
        self.is_attacked_with_occupancy(sq, by, self.all_occupied)
    }

    /// Attack test against an explicit occupancy, used when the king is
    /// lifted off the board for evasion checks.
    pub(crate) fn is_attacked_with_occupancy(
        &self,
        sq: Square,
        by: Color,
        occupancy: Bitboard,
    ) -> bool {
        // A pawn of `by` attacks sq iff it stands on a square that a pawn
        // of the other color on sq would attack.
        if (pawn_attacks(by.opponent(), sq) & self.piece_bb(by, Piece::Pawn)).any() {
            return true;
        }
        if (knight_attacks(sq) & self.piece_bb(by, Piece::Knight)).any() {
            return true;
        }
        if (king_attacks(sq) & self.piece_bb(by, Piece::King)).any() {
            return true;
        }
        let diag = self.piece_bb(by, Piece::Bishop) | self.piece_bb(by, Piece::Queen);
        if (bishop_attacks(sq, occupancy) & diag).any() {
            return true;
        }
        let straight = self.piece_bb(by, Piece::Rook) | self.piece_bb(by, Piece::Queen);
        (rook_attacks(sq, occupancy) & straight).any()
    }

    /// True if `color`'s king is attacked.
    #[must_use]
    pub fn is_in_check(&self, color: Color) -> bool {
        self.is_attacked(self.king_square(color), color.opponent())
    }

    /// Pieces of the side not to move currently attacking our king.
    pub(crate) fn checkers(&self) -> Bitboard {
        let us = self.side_to_move;
        let them = us.opponent();
        let king = self.king_square(us);
        let occ = self.all_occupied;

        let mut checkers = pawn_attacks(us, king) & self.piece_bb(them, Piece::Pawn);
        checkers |= knight_attacks(king) & self.piece_bb(them, Piece::Knight);
        checkers |= bishop_attacks(king, occ)
            & (self.piece_bb(them, Piece::Bishop) | self.piece_bb(them, Piece::Queen));
        checkers |= rook_attacks(king, occ)
            & (self.piece_bb(them, Piece::Rook) | self.piece_bb(them, Piece::Queen));
        checkers
    }

    /// Append pseudo-legal captures, en passant, and promotions.
    pub fn generate_captures(&self, list: &mut MoveList) {
        self.pawn_captures_and_promotions(list);
        self.piece_captures(list);
    }

    /// Append pseudo-legal non-capturing, non-promoting moves, including
    /// castling (which is generated fully legal).
    pub fn generate_quiet(&self, list: &mut MoveList) {
        self.pawn_pushes(list);
        self.piece_quiets(list);
        self.castling_moves(list);
    }

    /// Append pseudo-legal replies to a check: king retreats, captures of
    /// a lone checker, and interpositions on a slider's ray.
    pub fn generate_check_evasions(&self, list: &mut MoveList) {
        let us = self.side_to_move;
        let them = us.opponent();
        let king = self.king_square(us);
        let checkers = self.checkers();
        debug_assert!(checkers.any());

        // King steps, tested against occupancy with the king removed so a
        // retreat along the checking ray is seen as still attacked.
        let occ_without_king = self.all_occupied ^ Bitboard::from_square(king);
        let targets = king_attacks(king) & !self.occupancy(us);
        for to in targets.iter() {
            if self.is_attacked_with_occupancy(to, them, occ_without_king) {
                continue;
            }
            if self.occupancy(them).contains(to) {
                list.push(Move::capture(king, to));
            } else {
                list.push(Move::quiet(king, to));
            }
        }

        if checkers.popcount() > 1 {
            // Double check: only the king can move.
            return;
        }

        let checker_sq = checkers
            .lsb()
            .unwrap_or(king);
        self.captures_of(checker_sq, list);

        // En passant can remove a checking pawn that just double-pushed.
        if let Some(ep) = self.en_passant_target {
            let victim = ep.offset_ranks(-us.pawn_direction());
            if victim == checker_sq {
                let candidates = pawn_attacks(them, ep) & self.piece_bb(us, Piece::Pawn);
                for from in candidates.iter() {
                    list.push(Move::en_passant(from, ep));
                }
            }
        }

        // Interpose on the ray of a checking slider.
        if let Some((_, piece)) = self.piece_at(checker_sq) {
            if piece.attacks_diagonally() || piece.attacks_straight() {
                let block_mask = between(king, checker_sq);
                for to in block_mask.iter() {
                    self.quiet_moves_to(to, list);
                }
            }
        }
    }

    /// All fully legal moves of the side to move.
    #[must_use]
    pub fn generate_moves(&mut self) -> MoveList {
        let mut pseudo = MoveList::new();
        if self.checkers().any() {
            self.generate_check_evasions(&mut pseudo);
        } else {
            self.generate_captures(&mut pseudo);
            self.generate_quiet(&mut pseudo);
        }

        let mut legal = MoveList::new();
        for &mv in pseudo.iter() {
            if self.is_legal(mv) {
                legal.push(mv);
            }
        }
        legal
    }

    /// Pseudo-legal tactical moves only (captures and promotions), legality
    /// filtered. Used by quiescence.
    #[must_use]
    pub fn generate_tactical_moves(&mut self) -> MoveList {
        let mut pseudo = MoveList::new();
        if self.checkers().any() {
            self.generate_check_evasions(&mut pseudo);
            let mut legal = MoveList::new();
            for &mv in pseudo.iter() {
                if self.is_legal(mv) {
                    legal.push(mv);
                }
            }
            return legal;
        }
        self.generate_captures(&mut pseudo);
        let mut legal = MoveList::new();
        for &mv in pseudo.iter() {
            if self.is_legal(mv) {
                legal.push(mv);
            }
        }
        legal
    }

    /// Cheap legality test for a pseudo-legal move: does the mover's king
    /// end up attacked? King moves get a full attack test on the target;
    /// other moves are tested with from/to/captured bits patched into the
    /// occupancy, which catches pins and discovered checks. Castles were
    /// verified at generation time.
    #[must_use]
    pub fn is_legal(&self, mv: Move) -> bool {
        if mv.is_castle() {
            return true;
        }

        let us = self.side_to_move;
        let them = us.opponent();
        let from = mv.from();
        let to = mv.to();

        let mut occ = self.all_occupied;
        occ.clear(from);
        occ.set(to);

        let mut captured_bit = Bitboard::EMPTY;
        if mv.is_en_passant() {
            let victim = to.offset_ranks(-us.pawn_direction());
            captured_bit = Bitboard::from_square(victim);
            occ.clear(victim);
        } else if mv.is_capture() {
            captured_bit = Bitboard::from_square(to);
        }

        let moving_king = from == self.king_square(us);
        let king_sq = if moving_king { to } else { self.king_square(us) };

        if (pawn_attacks(us, king_sq) & self.piece_bb(them, Piece::Pawn) & !captured_bit).any() {
            return false;
        }
        if (knight_attacks(king_sq) & self.piece_bb(them, Piece::Knight) & !captured_bit).any() {
            return false;
        }
        if (king_attacks(king_sq) & self.piece_bb(them, Piece::King)).any() {
            return false;
        }
        let diag =
            (self.piece_bb(them, Piece::Bishop) | self.piece_bb(them, Piece::Queen)) & !captured_bit;
        if (bishop_attacks(king_sq, occ) & diag).any() {
            return false;
        }
        let straight =
            (self.piece_bb(them, Piece::Rook) | self.piece_bb(them, Piece::Queen)) & !captured_bit;
        if (rook_attacks(king_sq, occ) & straight).any() {
            return false;
        }
        true
    }

    /// Validate a move pulled from a table (hash move, killer, counter)
    /// against the current position. Such moves were legal somewhere in the
    /// tree, not necessarily here, so every field is re-checked before the
    /// move is tried. Does not test for check; [`Board::is_legal`] follows.
    #[must_use]
    pub(crate) fn is_pseudo_legal(&self, mv: Move) -> bool {
        if mv.is_none() {
            return false;
        }
        let us = self.side_to_move;
        let them = us.opponent();
        let from = mv.from();
        let to = mv.to();

        let Some((color, piece)) = self.piece_at(from) else {
            return false;
        };
        if color != us {
            return false;
        }

        if mv.is_castle() {
            let mut castles = MoveList::new();
            self.castling_moves(&mut castles);
            return castles.contains(mv);
        }

        if mv.is_en_passant() {
            return piece == Piece::Pawn
                && self.en_passant_target == Some(to)
                && pawn_attacks(us, from).contains(to);
        }

        if piece == Piece::Pawn {
            let dir = us.pawn_direction();
            if mv.is_capture() {
                if !pawn_attacks(us, from).contains(to) {
                    return false;
                }
                if !matches!(self.piece_at(to), Some((c, _)) if c == them) {
                    return false;
                }
            } else {
                if self.piece_at(to).is_some() {
                    return false;
                }
                if mv.is_double_push() {
                    if from.rank() != us.pawn_start_rank() {
                        return false;
                    }
                    let step = from.offset_ranks(dir);
                    if self.all_occupied.contains(step) || to != from.offset_ranks(2 * dir) {
                        return false;
                    }
                } else if to != from.offset_ranks(dir) {
                    return false;
                }
            }
            // Promotion flag must agree with the destination rank.
            return mv.is_promotion() == (to.rank() == us.promotion_rank());
        }

        if mv.is_promotion() || mv.is_double_push() {
            return false;
        }

        let attacks = match piece {
            Piece::Knight => knight_attacks(from),
            Piece::Bishop => bishop_attacks(from, self.all_occupied),
            Piece::Rook => rook_attacks(from, self.all_occupied),
            Piece::Queen => {
                bishop_attacks(from, self.all_occupied) | rook_attacks(from, self.all_occupied)
            }
            Piece::King => king_attacks(from),
            Piece::Pawn => unreachable!(),
        };
        if !attacks.contains(to) {
            return false;
        }

        match self.piece_at(to) {
            Some((c, _)) => mv.is_capture() && c == them,
            None => !mv.is_capture(),
        }
    }

    /// Leaf-node count of the legal move tree, for generator validation.
    #[must_use]
    pub fn perft(&mut self, depth: u32) -> u64 {
        if depth == 0 {
            return 1;
        }
        let moves = self.generate_moves();
        if depth == 1 {
            return moves.len() as u64;
        }
        let mut nodes = 0;
        for &mv in moves.iter() {
            let info = self.make_move(mv);
            nodes += self.perft(depth - 1);
            self.unmake_move(mv, info);
        }
        nodes
    }
}
