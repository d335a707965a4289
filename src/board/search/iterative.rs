//! Iterative deepening driver and public search entry points.
//!
//! Each iteration searches the root move list one ply deeper inside an
//! aspiration window around the previous score. A fail outside the window
//! resets it to unbounded and re-searches the same depth once; a fail
//! high additionally promotes the responsible move to the front of the
//! root list so the retry starts there. Between iterations the driver
//! checks the soft time budget, the stop flag, and the shortcuts (forced
//! mate found, only one legal reply).

use std::sync::atomic::AtomicBool;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::super::eval::{Evaluate, MaterialEval};
use super::super::state::Board;
use super::super::types::{Move, MoveList, MAX_PLY};
use super::alphabeta::SearchContext;
use super::constants::{is_mate_score, mated_in, DRAW_SCORE, INFINITY};
use super::log::search_log;
use super::params::SearchParams;
use super::split;
use super::{SearchState, SharedSearch};
use crate::tt::{TranspositionTable, DEFAULT_TT_MB};

/// What bounds the search. All-`None` means "search to the ply ceiling".
#[derive(Clone, Debug, Default)]
pub struct SearchLimits {
    /// Maximum iteration depth in plies.
    pub depth: Option<u32>,
    /// Total node budget across all threads.
    pub nodes: Option<u64>,
    /// Stop starting new iterations after this much time.
    pub soft_time: Option<Duration>,
    /// Abort mid-iteration at this deadline.
    pub hard_time: Option<Duration>,
    /// Ignore time budgets entirely; stop only via the stop flag or the
    /// depth/node limits.
    pub infinite: bool,
}

impl SearchLimits {
    #[must_use]
    pub fn depth(depth: u32) -> Self {
        SearchLimits {
            depth: Some(depth),
            ..SearchLimits::default()
        }
    }

    #[must_use]
    pub fn nodes(nodes: u64) -> Self {
        SearchLimits {
            nodes: Some(nodes),
            ..SearchLimits::default()
        }
    }

    /// Fixed time per move: the soft and hard budgets coincide.
    #[must_use]
    pub fn move_time(millis: u64) -> Self {
        let budget = Duration::from_millis(millis);
        SearchLimits {
            soft_time: Some(budget),
            hard_time: Some(budget),
            ..SearchLimits::default()
        }
    }

    /// Clock management: finish the current iteration after `soft`, cut
    /// the search dead at `hard`.
    #[must_use]
    pub fn timed(soft: Duration, hard: Duration) -> Self {
        SearchLimits {
            soft_time: Some(soft),
            hard_time: Some(hard),
            ..SearchLimits::default()
        }
    }

    #[must_use]
    pub fn infinite() -> Self {
        SearchLimits {
            infinite: true,
            ..SearchLimits::default()
        }
    }

    /// Ponder on the opponent's predicted reply: run with no clock until
    /// the frontend raises the stop flag (on a ponder-hit it would restart
    /// with real time limits).
    #[must_use]
    pub fn ponder() -> Self {
        SearchLimits::infinite()
    }
}

struct SearchClock {
    start: Instant,
    soft: Option<Duration>,
    hard: Option<Duration>,
}

impl SearchClock {
    fn start(limits: &SearchLimits) -> Self {
        let (soft, hard) = if limits.infinite {
            (None, None)
        } else {
            (limits.soft_time, limits.hard_time)
        };
        SearchClock {
            start: Instant::now(),
            soft,
            hard,
        }
    }

    fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    fn soft_expired(&self) -> bool {
        self.soft.is_some_and(|soft| self.elapsed() >= soft)
    }

    fn hard_deadline(&self) -> Option<Instant> {
        self.hard.map(|hard| self.start + hard)
    }
}

/// Progress report delivered after every completed iteration.
#[derive(Clone, Debug)]
pub struct SearchIterationInfo {
    pub depth: u32,
    pub score: i32,
    pub nodes: u64,
    pub elapsed: Duration,
    pub pv: Vec<Move>,
    /// Transposition table occupancy in per mille.
    pub hashfull: u32,
}

/// Iteration callback; runs on the searching thread.
pub type SearchInfoCallback = Arc<dyn Fn(&SearchIterationInfo) + Send + Sync>;

/// Final result of a search.
#[derive(Clone, Debug)]
pub struct SearchOutcome {
    /// Best move found, or [`Move::NONE`] if the position is already over.
    pub best_move: Move,
    /// Score from the mover's point of view, centipawns or mate distance.
    pub score: i32,
    pub pv: Vec<Move>,
    /// Last fully completed iteration depth.
    pub depth: u32,
    pub nodes: u64,
}

impl SearchOutcome {
    /// True if the score encodes a forced mate for either side.
    #[must_use]
    pub fn is_mate(&self) -> bool {
        is_mate_score(self.score)
    }

    /// Moves until mate, positive when the mover delivers it. `None` for
    /// non-mate scores.
    #[must_use]
    pub fn mate_in(&self) -> Option<i32> {
        if !self.is_mate() {
            return None;
        }
        let plies = super::constants::MATE_SCORE - self.score.abs();
        let moves = (plies + 1) / 2;
        Some(if self.score > 0 { moves } else { -moves })
    }
}

/// Everything a search needs besides the position and the limits.
/// Callers that keep state between moves hold onto one of these so the
/// transposition table survives across searches.
#[derive(Clone)]
pub struct SearchConfig {
    pub eval: Arc<dyn Evaluate>,
    pub tt: Arc<TranspositionTable>,
    pub params: SearchParams,
    pub threads: usize,
    pub on_iteration: Option<SearchInfoCallback>,
    /// Externally owned stop flag; set it to abort an infinite search.
    pub stop: Option<Arc<AtomicBool>>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            eval: Arc::new(MaterialEval),
            tt: Arc::new(TranspositionTable::new(DEFAULT_TT_MB)),
            params: SearchParams::default(),
            threads: 1,
            on_iteration: None,
            stop: None,
        }
    }
}

impl SearchConfig {
    #[must_use]
    pub fn with_eval(mut self, eval: Arc<dyn Evaluate>) -> Self {
        self.eval = eval;
        self
    }

    #[must_use]
    pub fn with_tt(mut self, tt: Arc<TranspositionTable>) -> Self {
        self.tt = tt;
        self
    }

    #[must_use]
    pub fn with_params(mut self, params: SearchParams) -> Self {
        self.params = params;
        self
    }

    #[must_use]
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads.max(1);
        self
    }

    #[must_use]
    pub fn with_callback(mut self, callback: SearchInfoCallback) -> Self {
        self.on_iteration = Some(callback);
        self
    }

    #[must_use]
    pub fn with_stop_flag(mut self, stop: Arc<AtomicBool>) -> Self {
        self.stop = Some(stop);
        self
    }
}

/// Result of one window attempt at one depth.
pub(crate) struct RootPass {
    pub(crate) score: i32,
    pub(crate) best_idx: usize,
    pub(crate) pv: Vec<Move>,
    pub(crate) aborted: bool,
}

/// Generations distinguish entries from successive searches sharing one
/// table; the replacement policy prefers evicting old ones.
static GENERATION: AtomicU8 = AtomicU8::new(0);

fn next_generation() -> u8 {
    GENERATION.fetch_add(1, Ordering::Relaxed) & 0x3F
}

/// Search with default configuration: material evaluation, a fresh
/// table, one thread.
pub fn start_search(board: &mut Board, limits: &SearchLimits) -> SearchOutcome {
    start_search_with(board, limits, &SearchConfig::default())
}

/// Search with explicit configuration.
pub fn start_search_with(
    board: &mut Board,
    limits: &SearchLimits,
    config: &SearchConfig,
) -> SearchOutcome {
    let clock = SearchClock::start(limits);
    let mut shared = SharedSearch::new(
        config.tt.clone(),
        config.eval.clone(),
        config.params.clone(),
        next_generation(),
    )
    .with_budget(limits.nodes, clock.hard_deadline());
    if let Some(stop) = &config.stop {
        shared = shared.with_stop_flag(stop.clone());
    }

    let us = board.side_to_move();
    let mut root_moves = board.generate_moves();
    if root_moves.is_empty() {
        let score = if board.is_in_check(us) {
            mated_in(0)
        } else {
            DRAW_SCORE
        };
        return SearchOutcome {
            best_move: Move::NONE,
            score,
            pv: Vec::new(),
            depth: 0,
            nodes: 0,
        };
    }
    let single_reply = root_moves.len() == 1;

    let mut state = SearchState::new(&shared.params);
    // Helper threads keep their own tables for the whole search so the
    // ordering heuristics mature across iterations just like the
    // master's do.
    let mut helpers: Vec<SearchState> = (1..config.threads)
        .map(|_| SearchState::new(&shared.params))
        .collect();
    let max_depth = limits
        .depth
        .unwrap_or(MAX_PLY as u32 - 1)
        .clamp(1, MAX_PLY as u32 - 1);

    let mut outcome = SearchOutcome {
        best_move: root_moves[0],
        score: 0,
        pv: vec![root_moves[0]],
        depth: 0,
        nodes: 0,
    };
    let mut prev_score = 0;

    for depth in 1..=max_depth {
        state.begin_iteration();
        for helper in &mut helpers {
            helper.begin_iteration();
        }
        let pass = search_iteration(
            board,
            &mut root_moves,
            depth,
            prev_score,
            &shared,
            &mut state,
            &mut helpers,
        );
        if pass.aborted {
            break;
        }

        root_moves.promote_to_front(pass.best_idx);
        prev_score = pass.score;
        outcome.score = pass.score;
        outcome.depth = depth;
        outcome.nodes = shared.total_nodes();
        if let Some(&first) = pass.pv.first() {
            outcome.best_move = first;
            outcome.pv = pass.pv;
        }
        search_log!(
            "depth {depth} score {prev_score} nodes {} pv {:?}",
            outcome.nodes,
            outcome.pv
        );

        if let Some(callback) = &config.on_iteration {
            callback(&SearchIterationInfo {
                depth,
                score: prev_score,
                nodes: outcome.nodes,
                elapsed: clock.elapsed(),
                pv: outcome.pv.clone(),
                hashfull: shared.tt.hashfull_per_mille(),
            });
        }

        if shared.stopped()
            || is_mate_score(prev_score)
            || single_reply
            || clock.soft_expired()
        {
            break;
        }
    }

    shared.request_stop();
    outcome.nodes = shared.total_nodes();
    outcome
}

/// One depth iteration: aspiration window, then an unbounded retry of
/// the same depth if the score lands outside it.
fn search_iteration(
    board: &mut Board,
    root_moves: &mut MoveList,
    depth: u32,
    prev_score: i32,
    shared: &SharedSearch,
    state: &mut SearchState,
    helpers: &mut [SearchState],
) -> RootPass {
    let delta = shared.params.aspiration_window;
    let (mut alpha, mut beta) =
        if shared.params.use_aspiration && depth >= 4 && !is_mate_score(prev_score) {
            (prev_score - delta, prev_score + delta)
        } else {
            (-INFINITY, INFINITY)
        };

    loop {
        let pass = if !helpers.is_empty() && depth >= shared.params.min_split_depth {
            split::search_root_parallel(
                board,
                root_moves,
                depth,
                (alpha, beta),
                shared,
                state,
                helpers,
            )
        } else {
            root_pass(board, root_moves, depth, alpha, beta, shared, state)
        };
        if pass.aborted {
            return pass;
        }

        if pass.score <= alpha {
            search_log!("depth {depth}: fail low {} <= {alpha}, re-searching", pass.score);
        } else if pass.score >= beta {
            search_log!("depth {depth}: fail high {} >= {beta}, re-searching", pass.score);
            // The fail-high move leads the retry.
            root_moves.promote_to_front(pass.best_idx);
        } else {
            return pass;
        }
        // Real scores always fit inside the open full window, so the
        // retried depth resolves in one more pass.
        (alpha, beta) = (-INFINITY, INFINITY);
    }
}

/// Search every root move at `depth` on the calling thread.
fn root_pass(
    board: &mut Board,
    root_moves: &MoveList,
    depth: u32,
    alpha0: i32,
    beta0: i32,
    shared: &SharedSearch,
    state: &mut SearchState,
) -> RootPass {
    let mut ctx = SearchContext::new(board, state, shared);
    let mut alpha = alpha0;
    let mut best_score = -INFINITY;
    let mut best_idx = 0;
    let mut pv = Vec::new();

    for (idx, &mv) in root_moves.iter().enumerate() {
        ctx.state.frames.frame_mut(0).current_move = mv;
        let info = ctx.board.make_move(mv);
        let score = if idx == 0 {
            -ctx.pvs(-beta0, -alpha, depth - 1, 1, true)
        } else {
            let mut s = -ctx.pvs(-alpha - 1, -alpha, depth - 1, 1, true);
            if s > alpha && s < beta0 {
                s = -ctx.pvs(-beta0, -alpha, depth - 1, 1, true);
            }
            s
        };
        ctx.board.unmake_move(mv, info);

        if ctx.aborted() {
            ctx.flush_nodes();
            return RootPass {
                score: best_score,
                best_idx,
                pv,
                aborted: true,
            };
        }

        if score > best_score {
            best_score = score;
            best_idx = idx;
            pv = std::iter::once(mv)
                .chain(ctx.state.frames.frame(1).pv().iter().copied())
                .collect();
            if score > alpha {
                alpha = score;
            }
            if score >= beta0 {
                break;
            }
        }
    }

    ctx.flush_nodes();
    RootPass {
        score: best_score,
        best_idx,
        pv,
        aborted: false,
    }
}

#[cfg(test)]
mod tests {
    use super::super::super::types::Square;
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn small_config() -> SearchConfig {
        SearchConfig::default().with_tt(Arc::new(TranspositionTable::new(2)))
    }

    #[test]
    fn startpos_search_returns_a_legal_move() {
        let mut board = Board::new();
        let outcome = start_search_with(&mut board, &SearchLimits::depth(3), &small_config());
        assert!(board.generate_moves().contains(outcome.best_move));
        assert_eq!(outcome.depth, 3);
        assert!(outcome.nodes > 0);
        assert_eq!(outcome.pv.first(), Some(&outcome.best_move));
    }

    #[test]
    fn finds_the_back_rank_mate() {
        let mut board: Board = "6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1".parse().unwrap();
        let outcome = start_search_with(&mut board, &SearchLimits::depth(4), &small_config());
        assert_eq!(
            outcome.best_move,
            Move::quiet(Square::new(0, 0), Square::new(7, 0)),
            "expected Ra8 mate, got {}",
            outcome.best_move
        );
        assert!(is_mate_score(outcome.score));
    }

    #[test]
    fn mated_position_reports_no_move() {
        let mut board: Board = "R5k1/5ppp/8/8/8/8/8/6K1 b - - 0 1".parse().unwrap();
        let outcome = start_search_with(&mut board, &SearchLimits::depth(4), &small_config());
        assert!(outcome.best_move.is_none());
        assert_eq!(outcome.score, mated_in(0));
    }

    #[test]
    fn stalemate_reports_draw() {
        let mut board: Board = "7k/5Q2/6K1/8/8/8/8/8 b - - 0 1".parse().unwrap();
        let outcome = start_search_with(&mut board, &SearchLimits::depth(4), &small_config());
        assert!(outcome.best_move.is_none());
        assert_eq!(outcome.score, DRAW_SCORE);
    }

    #[test]
    fn single_reply_cuts_the_search_short() {
        // Ka1 is in check from the adjacent undefended queen; taking it
        // is the only legal move.
        let mut board: Board = "k7/8/8/8/8/8/1q6/K7 w - - 0 1".parse().unwrap();
        let outcome = start_search_with(&mut board, &SearchLimits::depth(8), &small_config());
        assert_eq!(
            outcome.best_move,
            Move::capture(Square::new(0, 0), Square::new(1, 1))
        );
        assert_eq!(outcome.depth, 1);
    }

    #[test]
    fn node_limit_stops_the_search() {
        let mut board = Board::new();
        let limits = SearchLimits::nodes(5_000);
        let outcome = start_search_with(&mut board, &limits, &small_config());
        // Budget checks run every couple thousand nodes, so allow slack.
        assert!(outcome.nodes < 20_000, "searched {} nodes", outcome.nodes);
        assert!(outcome.best_move.is_some());
    }

    #[test]
    fn iteration_callback_reports_increasing_depth() {
        let depths = Arc::new(AtomicU32::new(0));
        let seen = depths.clone();
        let config = small_config().with_callback(Arc::new(move |info: &SearchIterationInfo| {
            let prev = seen.swap(info.depth, Ordering::Relaxed);
            assert!(info.depth > prev);
            assert!(!info.pv.is_empty());
        }));
        let mut board = Board::new();
        let outcome = start_search_with(&mut board, &SearchLimits::depth(4), &config);
        assert_eq!(depths.load(Ordering::Relaxed), 4);
        assert_eq!(outcome.depth, 4);
    }

    #[test]
    fn aspiration_misprediction_converges_on_the_unbounded_retry() {
        // Plain alpha-beta (pruning families off) so the depth-4 score
        // does not depend on move ordering; aspiration stays on.
        let mut params = SearchParams::pruning_disabled();
        params.use_aspiration = true;

        let run = |stale_score: i32| {
            let shared = SharedSearch::new(
                Arc::new(TranspositionTable::new(2)),
                Arc::new(MaterialEval),
                params.clone(),
                0,
            );
            let mut board = Board::new();
            let mut moves = board.generate_moves();
            let mut state = SearchState::new(&shared.params);
            let mut helpers: Vec<SearchState> = Vec::new();
            let pass = search_iteration(
                &mut board,
                &mut moves,
                4,
                stale_score,
                &shared,
                &mut state,
                &mut helpers,
            );
            assert!(!pass.aborted);
            pass.score
        };

        let reference = run(0);
        // Stale predictions far on either side of the truth: the first
        // pass fails low (resp. high) and the unbounded re-search must
        // land on the same exact score.
        assert_eq!(run(800), reference);
        assert_eq!(run(-800), reference);
    }

    #[test]
    fn external_stop_flag_aborts() {
        let stop = Arc::new(AtomicBool::new(true));
        let config = small_config().with_stop_flag(stop);
        let mut board = Board::new();
        // Already-set flag: the first iteration aborts and the fallback
        // move is still legal.
        let outcome = start_search_with(&mut board, &SearchLimits::depth(6), &config);
        assert!(board.generate_moves().contains(outcome.best_move));
    }
}
