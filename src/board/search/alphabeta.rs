//! Principal variation search with quiescence.
//!
//! Fail-soft alpha-beta over the staged move picker. The first move at a
//! node gets the full window; later moves are probed with a null window
//! and re-searched only when they beat alpha. Pruning families (null
//! move, futility, late move reductions, static exchange pruning) are
//! individually switchable through [`SearchParams`], and with everything
//! off the function is plain alpha-beta plus quiescence.
//!
//! Abort handling is cooperative: once the stop flag is seen every frame
//! unwinds returning a dummy score, and no aborted result reaches the
//! transposition table.

use super::super::state::Board;
use super::super::types::{Color, Move, MoveList, Piece, ScoredMoveList, Square, MAX_PLY};
use super::constants::{
    is_mate_score, mated_in, DRAW_SCORE, INFINITY, MATE_SCORE, STOP_CHECK_INTERVAL,
};
use super::ordering::{capture_score, MovePicker, QuietHints};
use super::{SearchState, SharedSearch};
use crate::tt::BoundType;

#[cfg(doc)]
use super::params::SearchParams;

/// One thread's view of a running search: its private board and tables
/// plus the shared control block.
pub(crate) struct SearchContext<'a> {
    pub(crate) board: &'a mut Board,
    pub(crate) state: &'a mut SearchState,
    pub(crate) shared: &'a SharedSearch,
    aborted: bool,
    unflushed: u64,
}

/// True when a pawn of `us` stands one step short of promotion.
fn pawn_on_seventh(us: Color, to: Square) -> bool {
    i32::from(to.rank()) + i32::from(us.pawn_direction()) == i32::from(us.promotion_rank())
}

impl<'a> SearchContext<'a> {
    pub(crate) fn new(
        board: &'a mut Board,
        state: &'a mut SearchState,
        shared: &'a SharedSearch,
    ) -> Self {
        SearchContext {
            board,
            state,
            shared,
            aborted: false,
            unflushed: 0,
        }
    }

    pub(crate) fn aborted(&self) -> bool {
        self.aborted
    }

    /// Push any privately counted nodes into the shared total.
    pub(crate) fn flush_nodes(&mut self) {
        self.shared.add_nodes(self.unflushed);
        self.unflushed = 0;
    }

    /// Per-node bookkeeping. Returns true once the search must unwind.
    fn tick(&mut self) -> bool {
        self.state.stats.nodes += 1;
        self.unflushed += 1;
        if self.unflushed >= STOP_CHECK_INTERVAL {
            self.flush_nodes();
            if self.shared.budget_exceeded() {
                self.shared.request_stop();
            }
        }
        if !self.aborted && self.shared.stopped() {
            self.aborted = true;
        }
        self.aborted
    }

    fn has_non_pawn_material(&self, us: Color) -> bool {
        let pawns = self.board.piece_bb(us, Piece::Pawn).popcount() as i32;
        self.board.material(us) > pawns * Piece::Pawn.value()
    }

    fn quiet_hints(&self, ply: usize) -> QuietHints {
        let grand = self.state.killers.grandparent(ply);
        QuietHints {
            killers: [
                self.state.killers.first(ply),
                self.state.killers.second(ply),
                grand[0],
                grand[1],
            ],
            counters: self.state.counters.get(self.state.frames.prior_move(ply)),
            pairs: self.state.pairs.get(self.state.frames.own_prior_move(ply)),
        }
    }

    /// Credit the move that refuted this node and charge the quiet moves
    /// tried before it.
    fn reward_cutoff(&mut self, ply: usize, mv: Move, depth: u32, tried_quiets: &[Move]) {
        let us = self.board.side_to_move();
        self.state.killers.record(ply, mv);
        self.state
            .counters
            .record(self.state.frames.prior_move(ply), mv);
        self.state
            .pairs
            .record(self.state.frames.own_prior_move(ply), mv);
        self.state.history.reward(us, mv, depth);
        for &quiet in tried_quiets {
            if quiet != mv {
                self.state.history.punish(us, quiet, depth);
            }
        }
    }

    /// Search one node to `depth` plies. `ply` is the distance from the
    /// root, `allow_null` gates consecutive null moves.
    pub(crate) fn pvs(
        &mut self,
        mut alpha: i32,
        mut beta: i32,
        depth: u32,
        ply: usize,
        allow_null: bool,
    ) -> i32 {
        self.state.frames.clear_pv(ply);
        if self.tick() {
            return 0;
        }

        let is_pv = beta - alpha > 1;

        if ply > 0 && (self.board.is_search_draw() || self.board.is_insufficient_material()) {
            return DRAW_SCORE;
        }
        if ply >= MAX_PLY {
            return DRAW_SCORE;
        }

        // Mate distance pruning: no line from here can beat a mate that
        // is already shorter than `ply`.
        alpha = alpha.max(mated_in(ply));
        beta = beta.min(MATE_SCORE - ply as i32);
        if alpha >= beta {
            return alpha;
        }

        let us = self.board.side_to_move();
        let in_check = self.board.is_in_check(us);

        if depth == 0 {
            return self.quiesce(alpha, beta, ply);
        }

        let hash = self.board.hash();
        let mut hash_move = Move::NONE;
        if let Some(entry) = self.shared.tt.probe(hash, ply) {
            hash_move = entry.best_move;
            if !is_pv && entry.depth >= depth {
                let cutoff = match entry.bound {
                    BoundType::Exact => true,
                    BoundType::Lower => entry.score >= beta,
                    BoundType::Upper => entry.score <= alpha,
                };
                if cutoff {
                    self.state.stats.tt_cutoffs += 1;
                    return entry.score;
                }
            }
        }

        let static_eval = if in_check {
            -INFINITY
        } else {
            self.shared.eval.evaluate(self.board)
        };
        self.state.frames.frame_mut(ply).static_eval = static_eval;
        let improving = !in_check
            && self
                .state
                .frames
                .static_eval_two_back(ply)
                .is_some_and(|prev| static_eval > prev);

        // Reverse futility: the static eval is so far above beta that a
        // shallow search will not bring it back down. A worsening eval
        // trend earns one extra effective depth of margin.
        if self.shared.params.use_futility
            && !is_pv
            && !in_check
            && depth <= self.shared.params.futility_max_depth
            && !is_mate_score(beta)
            && static_eval
                - self.shared.params.reverse_futility_margin
                    * depth.saturating_sub(u32::from(improving)) as i32
                >= beta
        {
            return static_eval;
        }

        // Null move: hand the opponent a free tempo; if the reduced search
        // still fails high the real moves will too. Unsound in zugzwang,
        // hence the non-pawn-material gate.
        if self.shared.params.use_null_move
            && allow_null
            && !is_pv
            && !in_check
            && depth >= self.shared.params.null_min_depth
            && static_eval >= beta
            && self.has_non_pawn_material(us)
        {
            let margin = (static_eval - beta) / self.shared.params.null_eval_divisor;
            let reduction =
                self.shared.params.null_base_reduction + depth / 6 + margin.clamp(0, 3) as u32;
            let null_depth = depth.saturating_sub(1 + reduction);
            let info = self.board.make_null_move();
            let score = -self.pvs(-beta, -beta + 1, null_depth, ply + 1, false);
            self.board.unmake_null_move(info);
            if self.aborted {
                return 0;
            }
            if score >= beta && !is_mate_score(score) {
                self.state.stats.null_cutoffs += 1;
                return beta;
            }
        }

        // Internal iterative deepening: a PV node with no hash move gets
        // a reduced search first, purely to seed the ordering.
        if self.shared.params.use_iid
            && is_pv
            && hash_move.is_none()
            && depth >= self.shared.params.iid_min_depth
        {
            let iid_depth = depth - self.shared.params.iid_reduction;
            self.pvs(alpha, beta, iid_depth, ply, false);
            if self.aborted {
                return 0;
            }
            if let Some(entry) = self.shared.tt.probe(hash, ply) {
                hash_move = entry.best_move;
            }
        }

        let futile = self.shared.params.use_futility
            && !is_pv
            && !in_check
            && depth <= self.shared.params.futility_max_depth
            && !is_mate_score(alpha)
            && static_eval + self.shared.params.futility_margin * depth as i32 <= alpha;

        let prior = self.state.frames.prior_move(ply);
        let mut picker = MovePicker::new(self.board, hash_move, self.quiet_hints(ply));
        if !self.shared.params.use_see_pruning {
            picker.keep_losing_captures();
        }

        let original_alpha = alpha;
        let mut best_score = -INFINITY;
        let mut best_move = Move::NONE;
        let mut searched = 0usize;
        let mut tried_quiets = [Move::NONE; 32];
        let mut tried_quiet_count = 0usize;

        while let Some(mv) = picker.next(self.board, &self.state.history) {
            if !self.board.is_legal(mv) {
                continue;
            }

            let moved_piece = self.board.piece_at(mv.from()).map(|(_, p)| p);
            self.state.frames.frame_mut(ply).current_move = mv;

            let info = self.board.make_move(mv);
            let gives_check = self.board.is_in_check(self.board.side_to_move());

            let mut extension = 0u32;
            if self.shared.params.use_extensions {
                let recapture = is_pv
                    && mv.is_capture()
                    && prior.is_capture()
                    && prior.to() == mv.to();
                if gives_check
                    || (moved_piece == Some(Piece::Pawn) && pawn_on_seventh(us, mv.to()))
                    || recapture
                {
                    extension = 1;
                }
            }
            let new_depth = depth - 1 + extension;

            let score = if searched == 0 {
                -self.pvs(-beta, -alpha, new_depth, ply + 1, true)
            } else {
                let mut reduction = 0u32;
                if self.shared.params.use_lmr
                    && extension == 0
                    && mv.is_quiet()
                    && !in_check
                    && depth >= self.shared.params.lmr_min_depth
                    && searched >= self.shared.params.lmr_min_move
                {
                    reduction = 1 + u32::from(searched >= 2 * self.shared.params.lmr_min_move);
                    reduction = reduction.min(new_depth.saturating_sub(1));
                }
                let mut s = -self.pvs(-alpha - 1, -alpha, new_depth - reduction, ply + 1, true);
                if s > alpha && reduction > 0 {
                    // Reduced search was optimistic; verify at full depth.
                    s = -self.pvs(-alpha - 1, -alpha, new_depth, ply + 1, true);
                }
                if s > alpha && s < beta && is_pv {
                    s = -self.pvs(-beta, -alpha, new_depth, ply + 1, true);
                }
                s
            };

            self.board.unmake_move(mv, info);
            if self.aborted {
                return 0;
            }
            searched += 1;

            if mv.is_quiet() && tried_quiet_count < tried_quiets.len() {
                tried_quiets[tried_quiet_count] = mv;
                tried_quiet_count += 1;
            }

            if score > best_score {
                best_score = score;
                best_move = mv;
                if score > alpha {
                    alpha = score;
                    self.state.frames.adopt_pv(ply, mv);
                    if alpha >= beta {
                        self.state.stats.beta_cutoffs += 1;
                        if mv.is_quiet() {
                            self.reward_cutoff(
                                ply,
                                mv,
                                depth,
                                &tried_quiets[..tried_quiet_count],
                            );
                        }
                        break;
                    }
                }
            }

            // A futile node still searches its first move and every
            // tactical move, but drops the remaining quiets.
            if futile && searched == 1 {
                picker.skip_quiets();
            }
        }

        if searched == 0 {
            return if in_check {
                mated_in(ply)
            } else {
                DRAW_SCORE
            };
        }

        if !self.aborted {
            let bound = if best_score >= beta {
                BoundType::Lower
            } else if best_score > original_alpha {
                BoundType::Exact
            } else {
                BoundType::Upper
            };
            self.shared.tt.store(
                hash,
                depth,
                best_score,
                bound,
                best_move,
                ply,
                self.shared.generation,
            );
        }
        best_score
    }

    /// Resolve tactical noise at the horizon: captures and promotions
    /// only, or full evasions while in check.
    fn quiesce(&mut self, mut alpha: i32, beta: i32, ply: usize) -> i32 {
        if self.tick() {
            return 0;
        }
        self.state.stats.qnodes += 1;

        if self.board.is_search_draw() || self.board.is_insufficient_material() {
            return DRAW_SCORE;
        }

        let us = self.board.side_to_move();
        let in_check = self.board.is_in_check(us);

        if ply >= MAX_PLY {
            return DRAW_SCORE;
        }

        if in_check {
            // No stand pat while the king hangs; every evasion is tried.
            let mut evasions = MoveList::new();
            self.board.generate_check_evasions(&mut evasions);
            let mut best = -INFINITY;
            let mut legal = 0usize;
            for &mv in evasions.iter() {
                if !self.board.is_legal(mv) {
                    continue;
                }
                let info = self.board.make_move(mv);
                let score = -self.quiesce(-beta, -alpha, ply + 1);
                self.board.unmake_move(mv, info);
                if self.aborted {
                    return 0;
                }
                legal += 1;
                if score > best {
                    best = score;
                    if score > alpha {
                        alpha = score;
                        if alpha >= beta {
                            break;
                        }
                    }
                }
            }
            if legal == 0 {
                return mated_in(ply);
            }
            return best;
        }

        let stand_pat = self.shared.eval.evaluate(self.board);
        if stand_pat >= beta {
            return stand_pat;
        }
        let mut best = stand_pat;
        alpha = alpha.max(stand_pat);

        let mut raw = MoveList::new();
        self.board.generate_captures(&mut raw);
        let mut scored = ScoredMoveList::new();
        for &mv in raw.iter() {
            scored.push(mv, capture_score(self.board, mv));
        }

        let mut idx = 0;
        while let Some(sm) = scored.pick_best(idx) {
            idx += 1;
            let mv = sm.mv;
            // Losing exchanges rarely rescue a position that already
            // failed to stand pat.
            if self.shared.params.use_see_pruning
                && !mv.is_promotion()
                && self.board.see(mv) < 0
            {
                continue;
            }
            if !self.board.is_legal(mv) {
                continue;
            }
            let info = self.board.make_move(mv);
            let score = -self.quiesce(-beta, -alpha, ply + 1);
            self.board.unmake_move(mv, info);
            if self.aborted {
                return 0;
            }
            if score > best {
                best = score;
                if score > alpha {
                    alpha = score;
                    if alpha >= beta {
                        break;
                    }
                }
            }
        }
        best
    }
}
