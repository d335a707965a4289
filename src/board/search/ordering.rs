//! Staged move ordering.
//!
//! The picker is an explicit state machine that generates moves lazily:
//! the hash move is tried before any generation happens, captures before
//! quiets, and losing captures last. Nodes that cut off early never pay
//! for the stages they skipped.
//!
//! Everything the picker yields is pseudo-legal at most; the search still
//! runs [`Board::is_legal`] before making the move.

use super::super::state::Board;
use super::super::types::{Move, MoveList, Piece, ScoredMoveList};
use super::history::HistoryTable;

const MAX_EXCLUDED: usize = 8;

/// Quiet-move suggestions gathered from the tables for one node, in the
/// order they will be tried after the winning captures.
#[derive(Clone, Copy, Default)]
pub(crate) struct QuietHints {
    pub killers: [Move; 4],
    pub counters: [Move; 2],
    pub pairs: [Move; 2],
}

impl QuietHints {
    fn queue(&self) -> [Move; 8] {
        [
            self.killers[0],
            self.killers[1],
            self.killers[2],
            self.killers[3],
            self.counters[0],
            self.counters[1],
            self.pairs[0],
            self.pairs[1],
        ]
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Stage {
    Hash,
    GenerateCaptures,
    WinningCaptures,
    Hints,
    GenerateQuiets,
    Quiets,
    LosingCaptures,
    GenerateEvasions,
    Evasions,
    Done,
}

/// Incremental move source for one node.
pub(crate) struct MovePicker {
    stage: Stage,
    hash_move: Move,
    hints: [Move; 8],
    hint_idx: usize,

    captures: ScoredMoveList,
    capture_idx: usize,
    losing: ScoredMoveList,
    losing_idx: usize,
    quiets: ScoredMoveList,
    quiet_idx: usize,

    emitted: [Move; 1 + 8],
    emitted_len: usize,
    excluded: [Move; MAX_EXCLUDED],
    excluded_len: usize,

    defer_losing_captures: bool,
    skip_quiets: bool,
}

/// MVV-LVA: most valuable victim first, cheapest attacker breaking ties.
/// Promotions count the promoted piece as part of the haul.
pub(super) fn capture_score(board: &Board, mv: Move) -> i32 {
    let victim = if mv.is_en_passant() {
        Piece::Pawn.value()
    } else {
        board.piece_at(mv.to()).map_or(0, |(_, p)| p.value())
    };
    let attacker = board
        .piece_at(mv.from())
        .map_or(0, |(_, p)| p.value());
    let promo = mv
        .promotion_piece()
        .map_or(0, |p| p.value() - Piece::Pawn.value());
    victim * 10 + promo - attacker / 10
}

impl MovePicker {
    pub(crate) fn new(board: &Board, hash_move: Move, hints: QuietHints) -> Self {
        let stage = if board.is_in_check(board.side_to_move()) {
            Stage::GenerateEvasions
        } else {
            Stage::Hash
        };
        MovePicker {
            stage,
            hash_move,
            hints: hints.queue(),
            hint_idx: 0,
            captures: ScoredMoveList::new(),
            capture_idx: 0,
            losing: ScoredMoveList::new(),
            losing_idx: 0,
            quiets: ScoredMoveList::new(),
            quiet_idx: 0,
            emitted: [Move::NONE; 9],
            emitted_len: 0,
            excluded: [Move::NONE; MAX_EXCLUDED],
            excluded_len: 0,
            defer_losing_captures: true,
            skip_quiets: false,
        }
    }

    /// Try every capture in MVV-LVA order regardless of its exchange
    /// outcome. Used when static exchange pruning is disabled.
    pub(crate) fn keep_losing_captures(&mut self) {
        self.defer_losing_captures = false;
    }

    /// Mark a move as never to be yielded from this node.
    pub(crate) fn exclude(&mut self, mv: Move) {
        if mv.is_some() && self.excluded_len < MAX_EXCLUDED {
            self.excluded[self.excluded_len] = mv;
            self.excluded_len += 1;
        }
    }

    /// Stop yielding quiet moves. Losing captures are still produced so a
    /// futility-pruned node can finish its tactical business.
    pub(crate) fn skip_quiets(&mut self) {
        self.skip_quiets = true;
    }

    fn is_excluded(&self, mv: Move) -> bool {
        self.excluded[..self.excluded_len].contains(&mv)
    }

    fn was_emitted(&self, mv: Move) -> bool {
        self.emitted[..self.emitted_len].contains(&mv)
    }

    fn mark_emitted(&mut self, mv: Move) {
        debug_assert!(self.emitted_len < self.emitted.len());
        self.emitted[self.emitted_len] = mv;
        self.emitted_len += 1;
    }

    /// Produce the next candidate move, or `None` when the node is
    /// exhausted.
    pub(crate) fn next(&mut self, board: &Board, history: &HistoryTable) -> Option<Move> {
        loop {
            match self.stage {
                Stage::Hash => {
                    self.stage = Stage::GenerateCaptures;
                    let mv = self.hash_move;
                    if mv.is_some() && !self.is_excluded(mv) && board.is_pseudo_legal(mv) {
                        self.mark_emitted(mv);
                        return Some(mv);
                    }
                }

                Stage::GenerateCaptures => {
                    let mut raw = MoveList::new();
                    board.generate_captures(&mut raw);
                    for &mv in raw.iter() {
                        if self.was_emitted(mv) || self.is_excluded(mv) {
                            continue;
                        }
                        self.captures.push(mv, capture_score(board, mv));
                    }
                    self.stage = Stage::WinningCaptures;
                }

                Stage::WinningCaptures => {
                    while let Some(sm) = self.captures.pick_best(self.capture_idx) {
                        self.capture_idx += 1;
                        if self.defer_losing_captures
                            && sm.mv.is_capture()
                            && !sm.mv.is_promotion()
                            && board.see(sm.mv) < 0
                        {
                            self.losing.push(sm.mv, sm.score);
                            continue;
                        }
                        return Some(sm.mv);
                    }
                    self.stage = Stage::Hints;
                }

                Stage::Hints => {
                    while self.hint_idx < self.hints.len() {
                        let mv = self.hints[self.hint_idx];
                        self.hint_idx += 1;
                        if mv.is_some()
                            && mv.is_quiet()
                            && !self.was_emitted(mv)
                            && !self.is_excluded(mv)
                            && board.is_pseudo_legal(mv)
                        {
                            self.mark_emitted(mv);
                            if !self.skip_quiets {
                                return Some(mv);
                            }
                        }
                    }
                    self.stage = Stage::GenerateQuiets;
                }

                Stage::GenerateQuiets => {
                    if self.skip_quiets {
                        self.stage = Stage::LosingCaptures;
                        continue;
                    }
                    let us = board.side_to_move();
                    let mut raw = MoveList::new();
                    board.generate_quiet(&mut raw);
                    for &mv in raw.iter() {
                        if self.was_emitted(mv) || self.is_excluded(mv) {
                            continue;
                        }
                        self.quiets.push(mv, history.score(us, mv));
                    }
                    self.stage = Stage::Quiets;
                }

                Stage::Quiets => {
                    if self.skip_quiets {
                        self.stage = Stage::LosingCaptures;
                        continue;
                    }
                    if let Some(sm) = self.quiets.pick_best(self.quiet_idx) {
                        self.quiet_idx += 1;
                        return Some(sm.mv);
                    }
                    self.stage = Stage::LosingCaptures;
                }

                Stage::LosingCaptures => {
                    if let Some(sm) = self.losing.pick_best(self.losing_idx) {
                        self.losing_idx += 1;
                        return Some(sm.mv);
                    }
                    self.stage = Stage::Done;
                }

                Stage::GenerateEvasions => {
                    let mut raw = MoveList::new();
                    board.generate_check_evasions(&mut raw);
                    let us = board.side_to_move();
                    for &mv in raw.iter() {
                        if self.is_excluded(mv) {
                            continue;
                        }
                        // In check there are few moves; one ordered list
                        // covers hash move, captures, and quiets together.
                        let score = if mv == self.hash_move {
                            1_000_000
                        } else if mv.is_capture() || mv.is_promotion() {
                            100_000 + capture_score(board, mv)
                        } else {
                            history.score(us, mv)
                        };
                        self.captures.push(mv, score);
                    }
                    self.stage = Stage::Evasions;
                }

                Stage::Evasions => {
                    if let Some(sm) = self.captures.pick_best(self.capture_idx) {
                        self.capture_idx += 1;
                        return Some(sm.mv);
                    }
                    self.stage = Stage::Done;
                }

                Stage::Done => return None,
            }
        }
    }
}
