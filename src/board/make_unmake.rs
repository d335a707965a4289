//! Making and unmaking moves.
//!
//! `make_move` returns an [`UnmakeInfo`] capturing everything a move
//! destroys: the captured piece, the prior en-passant/castling/halfmove
//! state, and the prior hashes. `unmake_move` consumes it to restore the
//! position exactly; both hashes must match a from-scratch recomputation
//! after either direction.

use crate::zobrist::ZOBRIST;

use super::attack_tables::pawn_attacks;
use super::state::Board;
use super::types::{CastlingRights, Move, Piece, Square};

/// State a move overwrites, needed to take it back.
#[derive(Clone, Copy, Debug)]
pub struct UnmakeInfo {
    captured: Option<Piece>,
    prev_en_passant: Option<Square>,
    prev_castling: CastlingRights,
    prev_halfmove: u32,
    prev_hash: u64,
    prev_pawn_hash: u64,
}

/// State a null move overwrites.
#[derive(Clone, Copy, Debug)]
pub(crate) struct NullUnmakeInfo {
    prev_en_passant: Option<Square>,
    prev_halfmove: u32,
    prev_hash: u64,
}

impl Board {
    /// Apply a pseudo-legal move. The caller is responsible for having
    /// checked legality first.
    pub fn make_move(&mut self, mv: Move) -> UnmakeInfo {
        let us = self.side_to_move;
        let them = us.opponent();
        let from = mv.from();
        let to = mv.to();

        let info = UnmakeInfo {
            captured: None,
            prev_en_passant: self.en_passant_target,
            prev_castling: self.castling_rights,
            prev_halfmove: self.halfmove_clock,
            prev_hash: self.hash,
            prev_pawn_hash: self.pawn_hash,
        };

        // Hint moves are re-validated before they get here; an empty
        // from-square means the move does not belong to this position.
        // Leave the board untouched rather than corrupt it.
        let Some((_, piece)) = self.piece_at(from) else {
            debug_assert!(false, "make_move from an empty square: {mv:?}");
            return info;
        };

        if let Some(ep) = self.en_passant_target.take() {
            self.hash ^= ZOBRIST.en_passant(ep);
        }

        let mut captured = None;
        if mv.is_en_passant() {
            let victim_sq = to.offset_ranks(-us.pawn_direction());
            self.take_piece(them, Piece::Pawn, victim_sq);
            captured = Some(Piece::Pawn);
        } else if mv.is_capture() {
            if let Some((_, victim)) = self.piece_at(to) {
                self.take_piece(them, victim, to);
                captured = Some(victim);
            } else {
                debug_assert!(false, "capture of an empty square: {mv:?}");
            }
        }

        self.take_piece(us, piece, from);
        self.put_piece(us, mv.promotion_piece().unwrap_or(piece), to);

        if mv.is_castle() {
            let rank = us.back_rank();
            let (rook_from, rook_to) = if mv.is_castle_kingside() { (7, 5) } else { (0, 3) };
            self.take_piece(us, Piece::Rook, Square::new(rank, rook_from));
            self.put_piece(us, Piece::Rook, Square::new(rank, rook_to));
        }

        let old_rights = self.castling_rights;
        if piece == Piece::King {
            self.castling_rights.revoke_both(us);
        } else if piece == Piece::Rook {
            if from == Square::new(us.back_rank(), 7) {
                self.castling_rights.revoke(us, true);
            } else if from == Square::new(us.back_rank(), 0) {
                self.castling_rights.revoke(us, false);
            }
        }
        if captured == Some(Piece::Rook) {
            if to == Square::new(them.back_rank(), 7) {
                self.castling_rights.revoke(them, true);
            } else if to == Square::new(them.back_rank(), 0) {
                self.castling_rights.revoke(them, false);
            }
        }
        if self.castling_rights != old_rights {
            self.hash ^= ZOBRIST.castling(old_rights.as_u8())
                ^ ZOBRIST.castling(self.castling_rights.as_u8());
        }

        // Record the en-passant square only when an enemy pawn can actually
        // take; a dead target would split hash-equal positions apart.
        if mv.is_double_push() {
            let ep = from.offset_ranks(us.pawn_direction());
            if (pawn_attacks(us, ep) & self.piece_bb(them, Piece::Pawn)).any() {
                self.en_passant_target = Some(ep);
                self.hash ^= ZOBRIST.en_passant(ep);
            }
        }

        self.halfmove_clock = if piece == Piece::Pawn || captured.is_some() {
            0
        } else {
            self.halfmove_clock + 1
        };

        self.side_to_move = them;
        self.hash ^= ZOBRIST.side_key;
        self.repetitions.increment(self.hash);

        debug_assert_eq!(self.hash, self.calculate_hash());
        debug_assert_eq!(self.pawn_hash, self.calculate_pawn_hash());

        UnmakeInfo { captured, ..info }
    }

    /// Take back a move made by [`Board::make_move`].
    pub fn unmake_move(&mut self, mv: Move, info: UnmakeInfo) {
        self.repetitions.decrement(self.hash);

        let us = self.side_to_move.opponent();
        let them = self.side_to_move;
        let from = mv.from();
        let to = mv.to();

        // An empty destination means this info/move pair was not the last
        // move made here; still restore the scalar state below so the
        // caller gets back what it saved.
        if let Some((_, placed)) = self.piece_at(to) {
            self.take_piece(us, placed, to);
            let piece = if mv.is_promotion() { Piece::Pawn } else { placed };
            self.put_piece(us, piece, from);

            if mv.is_castle() {
                let rank = us.back_rank();
                let (rook_from, rook_to) = if mv.is_castle_kingside() { (7, 5) } else { (0, 3) };
                self.take_piece(us, Piece::Rook, Square::new(rank, rook_to));
                self.put_piece(us, Piece::Rook, Square::new(rank, rook_from));
            }

            if mv.is_en_passant() {
                let victim_sq = to.offset_ranks(-us.pawn_direction());
                self.put_piece(them, Piece::Pawn, victim_sq);
            } else if let Some(victim) = info.captured {
                self.put_piece(them, victim, to);
            }
        } else {
            debug_assert!(false, "unmake of a move with an empty destination: {mv:?}");
        }

        self.side_to_move = us;
        self.en_passant_target = info.prev_en_passant;
        self.castling_rights = info.prev_castling;
        self.halfmove_clock = info.prev_halfmove;
        self.hash = info.prev_hash;
        self.pawn_hash = info.prev_pawn_hash;
    }

    /// Pass the turn without moving. The resulting position is not entered
    /// into the repetition history; it is not reachable by play.
    pub(crate) fn make_null_move(&mut self) -> NullUnmakeInfo {
        let info = NullUnmakeInfo {
            prev_en_passant: self.en_passant_target,
            prev_halfmove: self.halfmove_clock,
            prev_hash: self.hash,
        };
        if let Some(ep) = self.en_passant_target.take() {
            self.hash ^= ZOBRIST.en_passant(ep);
        }
        self.side_to_move = self.side_to_move.opponent();
        self.hash ^= ZOBRIST.side_key;
        self.halfmove_clock += 1;
        info
    }

    pub(crate) fn unmake_null_move(&mut self, info: NullUnmakeInfo) {
        self.side_to_move = self.side_to_move.opponent();
        self.en_passant_target = info.prev_en_passant;
        self.halfmove_clock = info.prev_halfmove;
        self.hash = info.prev_hash;
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::super::types::Color;
    use super::*;

    fn find_move(board: &mut Board, notation: &str) -> Move {
        board.parse_move(notation).unwrap()
    }

    fn snapshot(board: &Board) -> (String, u64, u64, i32, i32) {
        (
            board.to_fen(),
            board.hash(),
            board.pawn_hash(),
            board.material(Color::White),
            board.material(Color::Black),
        )
    }

    #[test]
    fn make_unmake_restores_position() {
        let mut board = Board::new();
        let before = snapshot(&board);
        let mv = find_move(&mut board, "e2e4");
        let info = board.make_move(mv);
        assert_ne!(board.hash(), before.1);
        board.unmake_move(mv, info);
        assert_eq!(snapshot(&board), before);
    }

    #[test]
    fn capture_and_unmake() {
        let mut board: Board = "4k3/8/8/3p4/4P3/8/8/4K3 w - - 0 1".parse().unwrap();
        let before = snapshot(&board);
        let mv = find_move(&mut board, "e4d5");
        let info = board.make_move(mv);
        assert_eq!(board.material(Color::Black), 0);
        board.unmake_move(mv, info);
        assert_eq!(snapshot(&board), before);
    }

    #[test]
    fn en_passant_full_cycle() {
        let mut board: Board = "4k3/8/8/8/3p4/8/4P3/4K3 w - - 0 1".parse().unwrap();
        let push = find_move(&mut board, "e2e4");
        board.make_move(push);
        assert_eq!(board.en_passant_target(), Some(Square::new(2, 4)));
        let before = snapshot(&board);
        let ep = find_move(&mut board, "d4e3");
        assert!(ep.is_en_passant());
        let info = board.make_move(ep);
        assert_eq!(board.material(Color::White), 0);
        board.unmake_move(ep, info);
        assert_eq!(snapshot(&board), before);
    }

    #[test]
    fn ep_target_only_recorded_when_capturable() {
        // No black pawn can take on e3, so the double push sets no target.
        let mut board = Board::new();
        let mv = find_move(&mut board, "e2e4");
        board.make_move(mv);
        assert_eq!(board.en_passant_target(), None);
    }

    #[test]
    fn castling_moves_both_pieces_and_drops_rights() {
        let mut board: Board = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1".parse().unwrap();
        let before = snapshot(&board);
        let mv = find_move(&mut board, "e1g1");
        assert!(mv.is_castle_kingside());
        let info = board.make_move(mv);
        assert_eq!(
            board.piece_at(Square::new(0, 6)),
            Some((Color::White, Piece::King))
        );
        assert_eq!(
            board.piece_at(Square::new(0, 5)),
            Some((Color::White, Piece::Rook))
        );
        assert!(!board.castling_rights().has(Color::White, true));
        assert!(!board.castling_rights().has(Color::White, false));
        board.unmake_move(mv, info);
        assert_eq!(snapshot(&board), before);
    }

    #[test]
    fn rook_capture_revokes_victims_rights() {
        let mut board: Board = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1".parse().unwrap();
        let mv = find_move(&mut board, "a1a8");
        board.make_move(mv);
        assert!(!board.castling_rights().has(Color::Black, false));
        assert!(board.castling_rights().has(Color::Black, true));
    }

    #[test]
    fn promotion_make_unmake() {
        let mut board: Board = "3n4/2P5/8/8/8/8/8/K1k5 w - - 0 1".parse().unwrap();
        let before = snapshot(&board);
        let mv = find_move(&mut board, "c7d8q");
        let info = board.make_move(mv);
        assert_eq!(
            board.piece_at(Square::new(7, 3)),
            Some((Color::White, Piece::Queen))
        );
        assert_eq!(board.material(Color::White), 900);
        board.unmake_move(mv, info);
        assert_eq!(snapshot(&board), before);
    }

    #[test]
    fn null_move_round_trip() {
        let mut board: Board = "rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 2"
            .parse()
            .unwrap();
        let before = snapshot(&board);
        let info = board.make_null_move();
        assert_eq!(board.side_to_move(), Color::White);
        assert_eq!(board.en_passant_target(), None);
        assert_eq!(board.hash(), board.calculate_hash());
        board.unmake_null_move(info);
        assert_eq!(snapshot(&board), before);
    }

    #[test]
    fn random_playout_keeps_hashes_consistent() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut board = Board::new();
        let start = snapshot(&board);
        let mut history = Vec::new();

        for _ in 0..120 {
            let moves = board.generate_moves();
            if moves.is_empty() || board.is_draw() {
                break;
            }
            let mv = moves[rng.gen_range(0..moves.len())];
            let info = board.make_move(mv);
            history.push((mv, info));
            assert_eq!(board.hash(), board.calculate_hash());
            assert_eq!(board.pawn_hash(), board.calculate_pawn_hash());
        }

        while let Some((mv, info)) = history.pop() {
            board.unmake_move(mv, info);
        }
        assert_eq!(snapshot(&board), start);
    }
}
