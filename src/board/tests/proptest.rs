//! Property-based consistency checks over random playouts.

use proptest::collection::vec;
use proptest::prelude::*;

use crate::board::Board;

/// Play a pseudo-random game from the start position, one generated
/// legal move per choice byte.
fn playout(choices: &[u8]) -> Board {
    let mut board = Board::new();
    for &choice in choices {
        let moves = board.generate_moves();
        if moves.is_empty() {
            break;
        }
        let mv = moves[choice as usize % moves.len()];
        board.make_move(mv);
    }
    board
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn incremental_hashes_match_recompute(choices in vec(any::<u8>(), 1..60)) {
        let mut board = Board::new();
        let mut stack = Vec::new();
        for &choice in &choices {
            let moves = board.generate_moves();
            if moves.is_empty() {
                break;
            }
            let mv = moves[choice as usize % moves.len()];
            let info = board.make_move(mv);
            stack.push((mv, info));
            prop_assert_eq!(board.hash(), board.calculate_hash());
            prop_assert_eq!(board.pawn_hash(), board.calculate_pawn_hash());
        }
        while let Some((mv, info)) = stack.pop() {
            board.unmake_move(mv, info);
        }
        prop_assert_eq!(board.hash(), Board::new().hash());
        prop_assert_eq!(board.to_fen(), Board::new().to_fen());
    }

    #[test]
    fn fen_round_trip_preserves_the_position(choices in vec(any::<u8>(), 1..40)) {
        let board = playout(&choices);
        let fen = board.to_fen();
        let reparsed: Board = fen.parse().unwrap();
        prop_assert_eq!(reparsed.hash(), board.hash());
        prop_assert_eq!(reparsed.to_fen(), fen);
    }

    #[test]
    fn generated_moves_are_pseudo_legal(choices in vec(any::<u8>(), 0..40)) {
        let mut board = playout(&choices);
        for &mv in board.generate_moves().iter() {
            prop_assert!(board.is_pseudo_legal(mv), "{} rejected in {}", mv, board.to_fen());
        }
    }

    #[test]
    fn see_never_exceeds_the_captured_value(choices in vec(any::<u8>(), 0..40)) {
        let mut board = playout(&choices);
        for &mv in board.generate_moves().iter() {
            if mv.is_capture() && !mv.is_promotion() && !mv.is_en_passant() {
                let victim = board.piece_at(mv.to()).map_or(0, |(_, p)| p.value());
                prop_assert!(board.see(mv) <= victim, "see({}) > {} in {}", mv, victim, board.to_fen());
            }
        }
    }

    #[test]
    fn legal_moves_never_leave_the_king_attacked(choices in vec(any::<u8>(), 0..50)) {
        let mut board = playout(&choices);
        let us = board.side_to_move();
        for &mv in board.generate_moves().iter() {
            let info = board.make_move(mv);
            prop_assert!(!board.is_in_check(us), "{} leaves check in {}", mv, board.to_fen());
            board.unmake_move(mv, info);
        }
    }
}
