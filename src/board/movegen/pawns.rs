//! Pawn move generation: captures, promotions, en passant, pushes.

use super::super::attack_tables::pawn_attacks;
use super::super::state::Board;
use super::super::types::{Move, MoveList, Piece, PROMOTION_PIECES};

impl Board {
    /// Pawn captures and all promotions. Quiet promotion pushes count as
    /// tactical and are generated here rather than with the pushes.
    pub(crate) fn pawn_captures_and_promotions(&self, list: &mut MoveList) {
        let us = self.side_to_move;
        let them = us.opponent();
        let enemy = self.occupancy(them);
        let promo_rank = us.promotion_rank();
        let dir = us.pawn_direction();

        for from in self.piece_bb(us, Piece::Pawn).iter() {
            for to in (pawn_attacks(us, from) & enemy).iter() {
                if to.rank() == promo_rank {
                    for &piece in &PROMOTION_PIECES {
                        list.push(Move::promotion(from, to, piece, true));
                    }
                } else {
                    list.push(Move::capture(from, to));
                }
            }

            let ahead = from.offset_ranks(dir);
            if ahead.rank() == promo_rank && !self.all_occupied.contains(ahead) {
                for &piece in &PROMOTION_PIECES {
                    list.push(Move::promotion(from, ahead, piece, false));
                }
            }
        }

        if let Some(ep) = self.en_passant_target {
            let candidates = pawn_attacks(them, ep) & self.piece_bb(us, Piece::Pawn);
            for from in candidates.iter() {
                list.push(Move::en_passant(from, ep));
            }
        }
    }

    /// Non-promoting single and double pawn pushes.
    pub(crate) fn pawn_pushes(&self, list: &mut MoveList) {
        let us = self.side_to_move;
        let promo_rank = us.promotion_rank();
        let start_rank = us.pawn_start_rank();
        let dir = us.pawn_direction();

        for from in self.piece_bb(us, Piece::Pawn).iter() {
            let ahead = from.offset_ranks(dir);
            if self.all_occupied.contains(ahead) || ahead.rank() == promo_rank {
                continue;
            }
            list.push(Move::quiet(from, ahead));
            if from.rank() == start_rank {
                let two = from.offset_ranks(2 * dir);
                if !self.all_occupied.contains(two) {
                    list.push(Move::double_push(from, two));
                }
            }
        }
    }
}
