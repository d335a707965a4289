//! Static exchange evaluation.
//!
//! Plays out the capture sequence on one square, each side always answering
//! with its least valuable attacker, and backs up the material balance. Used
//! by the move orderer to push losing captures behind the quiet moves.

use super::attack_tables::{bishop_attacks, king_attacks, knight_attacks, pawn_attacks, rook_attacks};
use super::state::Board;
use super::types::{Bitboard, Color, Move, Piece, Square};

impl Board {
    /// All pieces of both colors attacking `sq` under the given occupancy.
    /// Recomputed after every removal so x-ray attackers appear once the
    /// piece in front of them is gone.
    pub(crate) fn attackers_to(&self, sq: Square, occupancy: Bitboard) -> Bitboard {
        let mut attackers =
            pawn_attacks(Color::Black, sq) & self.piece_bb(Color::White, Piece::Pawn);
        attackers |= pawn_attacks(Color::White, sq) & self.piece_bb(Color::Black, Piece::Pawn);
        attackers |= knight_attacks(sq)
            & (self.piece_bb(Color::White, Piece::Knight)
                | self.piece_bb(Color::Black, Piece::Knight));
        attackers |= king_attacks(sq)
            & (self.piece_bb(Color::White, Piece::King) | self.piece_bb(Color::Black, Piece::King));
        let diag = self.piece_bb(Color::White, Piece::Bishop)
            | self.piece_bb(Color::Black, Piece::Bishop)
            | self.piece_bb(Color::White, Piece::Queen)
            | self.piece_bb(Color::Black, Piece::Queen);
        attackers |= bishop_attacks(sq, occupancy) & diag;
        let straight = self.piece_bb(Color::White, Piece::Rook)
            | self.piece_bb(Color::Black, Piece::Rook)
            | self.piece_bb(Color::White, Piece::Queen)
            | self.piece_bb(Color::Black, Piece::Queen);
        attackers |= rook_attacks(sq, occupancy) & straight;
        attackers
    }

    /// Material outcome of the full exchange started by `mv`, in centipawns
    /// from the mover's point of view. Non-captures score zero.
    #[must_use]
    pub fn see(&self, mv: Move) -> i32 {
        if !mv.is_capture() {
            return 0;
        }
        let from = mv.from();
        let to = mv.to();
        let Some((us, first_attacker)) = self.piece_at(from) else {
            return 0;
        };

        let mut occ = self.all_occupied;
        let first_gain = if mv.is_en_passant() {
            occ.clear(to.offset_ranks(-us.pawn_direction()));
            Piece::Pawn.value()
        } else {
            match self.piece_at(to) {
                Some((_, victim)) => victim.value(),
                None => return 0,
            }
        };

        let mut gain = [0i32; 32];
        gain[0] = first_gain;
        let mut depth = 0usize;
        let mut attacker = first_attacker;
        let mut side = us.opponent();
        occ.clear(from);

        loop {
            let attackers = self.attackers_to(to, occ) & occ;
            let (lva_sq, lva_piece) = match self.least_valuable(attackers & self.occupancy(side)) {
                Some(found) => found,
                None => break,
            };
            // The king may only keep capturing if it cannot be recaptured.
            if attacker == Piece::King {
                break;
            }
            if lva_piece == Piece::King
                && (self.attackers_to(to, occ) & occ & self.occupancy(side.opponent())).any()
            {
                break;
            }

            depth += 1;
            gain[depth] = attacker.value() - gain[depth - 1];
            if gain[depth].max(-gain[depth - 1]) < 0 {
                break;
            }

            occ.clear(lva_sq);
            attacker = lva_piece;
            side = side.opponent();
        }

        while depth > 0 {
            gain[depth - 1] = -((-gain[depth - 1]).max(gain[depth]));
            depth -= 1;
        }
        gain[0]
    }

    fn least_valuable(&self, candidates: Bitboard) -> Option<(Square, Piece)> {
        for piece in Piece::ALL {
            for color in Color::BOTH {
                let subset = candidates & self.piece_bb(color, piece);
                if let Some(sq) = subset.lsb() {
                    return Some((sq, piece));
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn see_of(fen: &str, notation: &str) -> i32 {
        let mut board: Board = fen.parse().unwrap();
        let mv = board.parse_move(notation).unwrap();
        board.see(mv)
    }

    #[test]
    fn free_capture_wins_the_piece() {
        assert_eq!(see_of("4k3/8/8/3p4/4B3/8/8/4K3 w - - 0 1", "e4d5"), 100);
    }

    #[test]
    fn defended_pawn_costs_the_bishop() {
        // Pawn on d5 defended by the pawn on c6.
        assert_eq!(
            see_of("4k3/8/2p5/3p4/4B3/8/8/4K3 w - - 0 1", "e4d5"),
            100 - 330
        );
    }

    #[test]
    fn recapture_chain_backs_up_correctly() {
        // RxR with our queen behind: rook trade, then queen takes back.
        assert_eq!(
            see_of("3rk3/8/8/8/8/8/8/3RK3 w - - 0 1", "d1d8"),
            500 - 500
        );
    }

    #[test]
    fn xray_attacker_joins_the_exchange() {
        // Rook takes the d5 pawn; black rook recaptures; the doubled rook
        // behind on d1 recaptures through the vacated file.
        assert_eq!(
            see_of("3rk3/8/8/3p4/8/8/3R4/3RK3 w - - 0 1", "d2d5"),
            100 - 500 + 500
        );
    }

    #[test]
    fn see_bounded_by_victim_value() {
        let mut board: Board =
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1"
                .parse()
                .unwrap();
        for &mv in board.generate_moves().iter() {
            if mv.is_capture() && !mv.is_en_passant() {
                let victim = board.piece_at(mv.to()).map(|(_, p)| p.value()).unwrap();
                assert!(board.see(mv) <= victim, "{mv} exceeds victim value");
            }
        }
    }
}
