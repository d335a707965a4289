//! Knight, slider, and king move generation, plus the targeted helpers the
//! evasion generator uses.

use super::super::attack_tables::{
    bishop_attacks, king_attacks, knight_attacks, pawn_attacks, queen_attacks, rook_attacks,
};
use super::super::state::Board;
use super::super::types::{Move, MoveList, Piece, Square, PROMOTION_PIECES};

impl Board {
    /// Captures by knights, bishops, rooks, queens, and the king.
    pub(crate) fn piece_captures(&self, list: &mut MoveList) {
        let us = self.side_to_move;
        let enemy = self.occupancy(us.opponent());
        let occ = self.all_occupied;

        for from in self.piece_bb(us, Piece::Knight).iter() {
            for to in (knight_attacks(from) & enemy).iter() {
                list.push(Move::capture(from, to));
            }
        }
        for from in self.piece_bb(us, Piece::Bishop).iter() {
            for to in (bishop_attacks(from, occ) & enemy).iter() {
                list.push(Move::capture(from, to));
            }
        }
        for from in self.piece_bb(us, Piece::Rook).iter() {
            for to in (rook_attacks(from, occ) & enemy).iter() {
                list.push(Move::capture(from, to));
            }
        }
        for from in self.piece_bb(us, Piece::Queen).iter() {
            for to in (queen_attacks(from, occ) & enemy).iter() {
                list.push(Move::capture(from, to));
            }
        }
        let king = self.king_square(us);
        for to in (king_attacks(king) & enemy).iter() {
            list.push(Move::capture(king, to));
        }
    }

    /// Non-capturing moves by knights, sliders, and the king.
    pub(crate) fn piece_quiets(&self, list: &mut MoveList) {
        let us = self.side_to_move;
        let empty = !self.all_occupied;
        let occ = self.all_occupied;

        for from in self.piece_bb(us, Piece::Knight).iter() {
            for to in (knight_attacks(from) & empty).iter() {
                list.push(Move::quiet(from, to));
            }
        }
        for from in self.piece_bb(us, Piece::Bishop).iter() {
            for to in (bishop_attacks(from, occ) & empty).iter() {
                list.push(Move::quiet(from, to));
            }
        }
        for from in self.piece_bb(us, Piece::Rook).iter() {
            for to in (rook_attacks(from, occ) & empty).iter() {
                list.push(Move::quiet(from, to));
            }
        }
        for from in self.piece_bb(us, Piece::Queen).iter() {
            for to in (queen_attacks(from, occ) & empty).iter() {
                list.push(Move::quiet(from, to));
            }
        }
        let king = self.king_square(us);
        for to in (king_attacks(king) & empty).iter() {
            list.push(Move::quiet(king, to));
        }
    }

    /// Castling moves, emitted fully legal: rights intact, rook in place,
    /// transit squares empty, and neither the king's square nor the squares
    /// it crosses attacked.
    pub(crate) fn castling_moves(&self, list: &mut MoveList) {
        let us = self.side_to_move;
        let them = us.opponent();
        let rank = us.back_rank();
        let king = Square::new(rank, 4);

        if self.king_square(us) != king || self.is_attacked(king, them) {
            return;
        }

        if self.castling_rights.has(us, true)
            && self.piece_at(Square::new(rank, 7)) == Some((us, Piece::Rook))
        {
            let f = Square::new(rank, 5);
            let g = Square::new(rank, 6);
            if !self.all_occupied.contains(f)
                && !self.all_occupied.contains(g)
                && !self.is_attacked(f, them)
                && !self.is_attacked(g, them)
            {
                list.push(Move::castle_kingside(king, g));
            }
        }

        if self.castling_rights.has(us, false)
            && self.piece_at(Square::new(rank, 0)) == Some((us, Piece::Rook))
        {
            let b = Square::new(rank, 1);
            let c = Square::new(rank, 2);
            let d = Square::new(rank, 3);
            // b1/b8 only needs to be empty, not safe.
            if !self.all_occupied.contains(b)
                && !self.all_occupied.contains(c)
                && !self.all_occupied.contains(d)
                && !self.is_attacked(c, them)
                && !self.is_attacked(d, them)
            {
                list.push(Move::castle_queenside(king, c));
            }
        }
    }

    /// Non-king captures landing on `target`. King captures are emitted by
    /// the evasion king loop, which already vets destination safety.
    pub(crate) fn captures_of(&self, target: Square, list: &mut MoveList) {
        let us = self.side_to_move;
        let them = us.opponent();
        let occ = self.all_occupied;

        let pawns = pawn_attacks(them, target) & self.piece_bb(us, Piece::Pawn);
        for from in pawns.iter() {
            if target.rank() == us.promotion_rank() {
                for &piece in &PROMOTION_PIECES {
                    list.push(Move::promotion(from, target, piece, true));
                }
            } else {
                list.push(Move::capture(from, target));
            }
        }

        let mut attackers = knight_attacks(target) & self.piece_bb(us, Piece::Knight);
        attackers |= bishop_attacks(target, occ)
            & (self.piece_bb(us, Piece::Bishop) | self.piece_bb(us, Piece::Queen));
        attackers |= rook_attacks(target, occ)
            & (self.piece_bb(us, Piece::Rook) | self.piece_bb(us, Piece::Queen));
        for from in attackers.iter() {
            list.push(Move::capture(from, target));
        }
    }

    /// Non-king quiet moves landing on the empty square `to`, used to
    /// generate interpositions against a checking slider.
    pub(crate) fn quiet_moves_to(&self, to: Square, list: &mut MoveList) {
        debug_assert!(!self.all_occupied.contains(to));
        let us = self.side_to_move;
        let occ = self.all_occupied;

        let mut sources = knight_attacks(to) & self.piece_bb(us, Piece::Knight);
        sources |= bishop_attacks(to, occ)
            & (self.piece_bb(us, Piece::Bishop) | self.piece_bb(us, Piece::Queen));
        sources |= rook_attacks(to, occ)
            & (self.piece_bb(us, Piece::Rook) | self.piece_bb(us, Piece::Queen));
        for from in sources.iter() {
            list.push(Move::quiet(from, to));
        }

        // A pawn can block by pushing onto the square.
        let dir = us.pawn_direction();
        let behind_rank = to.rank() as i8 - dir;
        if !(0..8).contains(&behind_rank) {
            return;
        }
        let one_behind = to.offset_ranks(-dir);
        if self.piece_bb(us, Piece::Pawn).contains(one_behind) {
            if to.rank() == us.promotion_rank() {
                for &piece in &PROMOTION_PIECES {
                    list.push(Move::promotion(one_behind, to, piece, false));
                }
            } else {
                list.push(Move::quiet(one_behind, to));
            }
        } else if to.rank() as i8 == us.pawn_start_rank() as i8 + 2 * dir
            && !occ.contains(one_behind)
        {
            let two_behind = to.offset_ranks(-2 * dir);
            if self.piece_bb(us, Piece::Pawn).contains(two_behind) {
                list.push(Move::double_push(two_behind, to));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn knight_captures_and_quiets() {
        let board: Board = "4k3/8/8/3p4/8/4N3/8/4K3 w - - 0 1".parse().unwrap();
        let mut captures = MoveList::new();
        board.piece_captures(&mut captures);
        assert!(captures
            .iter()
            .any(|m| m.from() == Square::new(2, 4) && m.to() == Square::new(4, 3)));

        let mut quiets = MoveList::new();
        board.piece_quiets(&mut quiets);
        assert!(quiets.iter().all(|m| !m.is_capture()));
    }

    #[test]
    fn castling_requires_empty_and_safe_transit() {
        // Both sides clear: white may castle either way.
        let open: Board = "4k3/8/8/8/8/8/8/R3K2R w KQ - 0 1".parse().unwrap();
        let mut list = MoveList::new();
        open.castling_moves(&mut list);
        assert_eq!(list.len(), 2);

        // Rook on g3 covers g1: kingside is out, queenside survives.
        let covered: Board = "4k3/8/8/8/8/6r1/8/R3K2R w KQ - 0 1".parse().unwrap();
        let mut list = MoveList::new();
        covered.castling_moves(&mut list);
        assert_eq!(list.len(), 1);
        assert!(!list[0].is_castle_kingside());

        // A piece on b1 blocks queenside even though b1 safety is irrelevant.
        let blocked: Board = "4k3/8/8/8/8/8/8/RN2K2R w KQ - 0 1".parse().unwrap();
        let mut list = MoveList::new();
        blocked.castling_moves(&mut list);
        assert_eq!(list.len(), 1);
        assert!(list[0].is_castle_kingside());
    }

    #[test]
    fn no_castling_out_of_check() {
        let board: Board = "4k3/8/8/8/8/8/4r3/R3K2R w KQ - 0 1".parse().unwrap();
        let mut list = MoveList::new();
        board.castling_moves(&mut list);
        assert!(list.is_empty());
    }

    #[test]
    fn captures_of_finds_every_attacker() {
        // Pawn, knight, and rook can all take the queen on d5.
        let board: Board = "4k3/8/8/3q4/2P5/2N5/8/3RK3 w - - 0 1".parse().unwrap();
        let mut list = MoveList::new();
        board.captures_of(Square::new(4, 3), &mut list);
        assert_eq!(list.len(), 3);
        assert!(list.iter().all(|m| m.to() == Square::new(4, 3)));
    }

    #[test]
    fn quiet_moves_to_includes_pawn_blocks() {
        // d4 is empty; the d2 pawn can double-push there and the knight
        // from f3 can hop in.
        let board: Board = "4k3/8/8/8/8/5N2/3P4/4K3 w - - 0 1".parse().unwrap();
        let mut list = MoveList::new();
        board.quiet_moves_to(Square::new(3, 3), &mut list);
        assert_eq!(list.len(), 2);
        assert!(list.iter().any(|m| m.is_double_push()));
    }
}
