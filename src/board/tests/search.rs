//! End-to-end searches over small tactical positions.

use std::sync::Arc;

use crate::board::search::constants::{is_mate_score, MATE_SCORE};
use crate::board::{
    start_search_with, Board, Piece, SearchConfig, SearchLimits, SearchParams,
};
use crate::tt::TranspositionTable;

fn config() -> SearchConfig {
    SearchConfig::default().with_tt(Arc::new(TranspositionTable::new(4)))
}

#[test]
fn king_and_rook_mate_in_two() {
    // 1.Kg6 Kg8 2.Re8# is the only mate in two.
    let mut board: Board = "7k/8/5K2/8/8/8/8/4R3 w - - 0 1".parse().unwrap();
    let outcome = start_search_with(&mut board, &SearchLimits::depth(6), &config());
    assert_eq!(outcome.score, MATE_SCORE - 3, "pv {:?}", outcome.pv);
    assert_eq!(outcome.best_move.to_string(), "f6g6");
}

#[test]
fn promotion_race_queens_the_pawn() {
    let mut board: Board = "8/P7/8/8/8/8/k6K/8 w - - 0 1".parse().unwrap();
    let outcome = start_search_with(&mut board, &SearchLimits::depth(4), &config());
    assert_eq!(outcome.best_move.to_string(), "a7a8q");
    assert_eq!(outcome.best_move.promotion_piece(), Some(Piece::Queen));
}

#[test]
fn pruning_disabled_still_finds_the_tactic() {
    // The undefended d5 queen falls to exd5.
    let fen = "r1b1kbnr/ppp1pppp/2n5/3q4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 1";

    let mut full_board: Board = fen.parse().unwrap();
    let full = start_search_with(&mut full_board, &SearchLimits::depth(4), &config());

    let plain_config = config().with_params(SearchParams::pruning_disabled());
    let mut plain_board: Board = fen.parse().unwrap();
    let plain = start_search_with(&mut plain_board, &SearchLimits::depth(4), &plain_config);

    assert_eq!(full.best_move.to_string(), "e4d5");
    assert_eq!(plain.best_move.to_string(), "e4d5");
    assert!(full.score > 500);
    assert!(plain.score > 500);
}

#[test]
fn deeper_iterations_search_more_nodes() {
    let mut shallow_board = Board::new();
    let shallow = start_search_with(&mut shallow_board, &SearchLimits::depth(2), &config());
    let mut deep_board = Board::new();
    let deep = start_search_with(&mut deep_board, &SearchLimits::depth(5), &config());
    assert!(deep.nodes > shallow.nodes);
}

#[test]
fn shared_table_carries_over_between_searches() {
    let shared_config = config();
    let mut board: Board = "7k/8/5K2/8/8/8/8/4R3 w - - 0 1".parse().unwrap();
    let first = start_search_with(&mut board, &SearchLimits::depth(6), &shared_config);

    let mut again: Board = "7k/8/5K2/8/8/8/8/4R3 w - - 0 1".parse().unwrap();
    let second = start_search_with(&mut again, &SearchLimits::depth(6), &shared_config);

    assert_eq!(first.best_move, second.best_move);
    assert!(is_mate_score(second.score));
    // Warm table: the repeat search should not need more nodes.
    assert!(second.nodes <= first.nodes);
}

#[test]
fn search_does_not_corrupt_the_board() {
    let mut board: Board = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1"
        .parse()
        .unwrap();
    let fen_before = board.to_fen();
    let hash_before = board.hash();
    start_search_with(&mut board, &SearchLimits::depth(4), &config());
    assert_eq!(board.to_fen(), fen_before);
    assert_eq!(board.hash(), hash_before);
}
