//! Precomputed attack tables.
//!
//! Leapers (pawn, knight, king) are direct per-square lookups. Sliders go
//! through the magic-multiplication tables in [`magics`]: O(1) per query,
//! exact for every occupancy, verified against a ray-walk reference when
//! the tables are first built.

pub(crate) mod magics;

use once_cell::sync::Lazy;

use super::types::{Bitboard, Color, Square};
use magics::SLIDERS;

static KNIGHT_ATTACKS: Lazy<[u64; 64]> = Lazy::new(|| {
    leaper_table(&[
        (2, 1),
        (1, 2),
        (-1, 2),
        (-2, 1),
        (-2, -1),
        (-1, -2),
        (1, -2),
        (2, -1),
    ])
});

static KING_ATTACKS: Lazy<[u64; 64]> = Lazy::new(|| {
    leaper_table(&[
        (1, 0),
        (-1, 0),
        (0, 1),
        (0, -1),
        (1, 1),
        (1, -1),
        (-1, 1),
        (-1, -1),
    ])
});

/// `PAWN_ATTACKS[color][square]`: the squares a pawn of that color attacks.
static PAWN_ATTACKS: Lazy<[[u64; 64]; 2]> = Lazy::new(|| {
    let white = leaper_table(&[(1, 1), (1, -1)]);
    let black = leaper_table(&[(-1, 1), (-1, -1)]);
    [white, black]
});

fn leaper_table(deltas: &[(i8, i8)]) -> [u64; 64] {
    let mut table = [0u64; 64];
    for (sq, slot) in table.iter_mut().enumerate() {
        let (rank, file) = ((sq / 8) as i8, (sq % 8) as i8);
        for &(dr, df) in deltas {
            let (r, f) = (rank + dr, file + df);
            if (0..8).contains(&r) && (0..8).contains(&f) {
                *slot |= 1u64 << (r * 8 + f);
            }
        }
    }
    table
}

/// `BETWEEN[a][b]`: squares strictly between `a` and `b` when they share a
/// rank, file, or diagonal; empty otherwise.
static BETWEEN: Lazy<Box<[[u64; 64]; 64]>> = Lazy::new(|| {
    let mut table = Box::new([[0u64; 64]; 64]);
    for a in 0..64usize {
        for b in 0..64usize {
            if a == b {
                continue;
            }
            let (ar, af) = ((a / 8) as i8, (a % 8) as i8);
            let (br, bf) = ((b / 8) as i8, (b % 8) as i8);
            let (dr, df) = (br - ar, bf - af);
            let aligned = dr == 0 || df == 0 || dr.abs() == df.abs();
            if !aligned {
                continue;
            }
            let step = (dr.signum(), df.signum());
            let (mut r, mut f) = (ar + step.0, af + step.1);
            let mut mask = 0u64;
            while (r, f) != (br, bf) {
                mask |= 1u64 << (r * 8 + f);
                r += step.0;
                f += step.1;
            }
            table[a][b] = mask;
        }
    }
    table
});

/// Squares strictly between two aligned squares.
#[inline]
pub(crate) fn between(a: Square, b: Square) -> Bitboard {
    Bitboard(BETWEEN[a.index()][b.index()])
}

#[inline]
pub(crate) fn knight_attacks(sq: Square) -> Bitboard {
    Bitboard(KNIGHT_ATTACKS[sq.index()])
}

#[inline]
pub(crate) fn king_attacks(sq: Square) -> Bitboard {
    Bitboard(KING_ATTACKS[sq.index()])
}

/// Squares attacked by a pawn of `color` standing on `sq`.
#[inline]
pub(crate) fn pawn_attacks(color: Color, sq: Square) -> Bitboard {
    Bitboard(PAWN_ATTACKS[color.index()][sq.index()])
}

#[inline]
pub(crate) fn bishop_attacks(sq: Square, occupancy: Bitboard) -> Bitboard {
    Bitboard(SLIDERS.bishop(sq.index(), occupancy.0))
}

#[inline]
pub(crate) fn rook_attacks(sq: Square, occupancy: Bitboard) -> Bitboard {
    Bitboard(SLIDERS.rook(sq.index(), occupancy.0))
}

#[inline]
pub(crate) fn queen_attacks(sq: Square, occupancy: Bitboard) -> Bitboard {
    bishop_attacks(sq, occupancy) | rook_attacks(sq, occupancy)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn knight_attack_counts() {
        assert_eq!(knight_attacks(Square::new(0, 0)).popcount(), 2); // a1
        assert_eq!(knight_attacks(Square::new(3, 3)).popcount(), 8); // d4
        assert_eq!(knight_attacks(Square::new(0, 1)).popcount(), 3); // b1
    }

    #[test]
    fn king_attack_counts() {
        assert_eq!(king_attacks(Square::new(0, 0)).popcount(), 3);
        assert_eq!(king_attacks(Square::new(4, 4)).popcount(), 8);
        assert_eq!(king_attacks(Square::new(0, 4)).popcount(), 5);
    }

    #[test]
    fn pawn_attacks_direction_and_edges() {
        let w = pawn_attacks(Color::White, Square::new(1, 4)); // e2
        assert!(w.contains(Square::new(2, 3)) && w.contains(Square::new(2, 5)));
        let b = pawn_attacks(Color::Black, Square::new(6, 0)); // a7
        assert_eq!(b.popcount(), 1);
        assert!(b.contains(Square::new(5, 1)));
        // Pawns on the last rank attack nothing forward of the board.
        assert!(pawn_attacks(Color::White, Square::new(7, 4)).is_empty());
    }

    #[test]
    fn rook_attacks_on_empty_board() {
        let attacks = rook_attacks(Square::new(3, 4), Bitboard::EMPTY); // e4
        let expected = (Bitboard::rank_mask(3) | Bitboard::file_mask(4))
            ^ Bitboard::from_square(Square::new(3, 4));
        assert_eq!(attacks, expected);
    }

    #[test]
    fn rook_attacks_stop_at_blockers() {
        let e4 = Square::new(3, 4);
        let blockers =
            Bitboard::from_square(Square::new(5, 4)) | Bitboard::from_square(Square::new(3, 2));
        let attacks = rook_attacks(e4, blockers);
        assert!(attacks.contains(Square::new(5, 4))); // e6 capturable
        assert!(!attacks.contains(Square::new(6, 4))); // e7 blocked
        assert!(attacks.contains(Square::new(3, 2))); // c4 capturable
        assert!(!attacks.contains(Square::new(3, 1))); // b4 blocked
    }

    #[test]
    fn bishop_attacks_stop_at_blockers() {
        let e4 = Square::new(3, 4);
        let blocker = Bitboard::from_square(Square::new(5, 6)); // g6
        let attacks = bishop_attacks(e4, blocker);
        assert!(attacks.contains(Square::new(5, 6)));
        assert!(!attacks.contains(Square::new(6, 7))); // h7 behind the blocker
        assert!(attacks.contains(Square::new(0, 1))); // b1 on the open diagonal
    }

    #[test]
    fn between_masks() {
        // e1 to e8: the six interior file squares.
        let mask = between(Square::new(0, 4), Square::new(7, 4));
        assert_eq!(mask.popcount(), 6);
        assert!(mask.contains(Square::new(3, 4)));
        // Adjacent and unaligned pairs have nothing between them.
        assert!(between(Square::new(0, 4), Square::new(1, 4)).is_empty());
        assert!(between(Square::new(0, 0), Square::new(2, 1)).is_empty());
        // Diagonal.
        let diag = between(Square::new(0, 0), Square::new(7, 7));
        assert_eq!(diag.popcount(), 6);
        assert!(diag.contains(Square::new(4, 4)));
    }

    #[test]
    fn queen_is_rook_plus_bishop() {
        let sq = Square::new(2, 2);
        let occ = Bitboard(0x0000_1200_4400_0810);
        assert_eq!(
            queen_attacks(sq, occ),
            rook_attacks(sq, occ) | bishop_attacks(sq, occ)
        );
    }
}
