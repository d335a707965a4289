//! Root-level work splitting.
//!
//! The master searches the first root move alone to establish a real
//! alpha, then the remaining moves become a shared queue. Each worker
//! owns a clone of the board and its own tables; the only shared state
//! is the transposition table, the raising alpha, and two flags. A beta
//! cutoff or an external stop aborts the group, and any move still in
//! flight is returned to the queue so the retry searches it again.

use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::thread;

use parking_lot::Mutex;

use super::super::state::Board;
use super::super::types::{Move, MoveList};
use super::alphabeta::SearchContext;
use super::constants::INFINITY;
use super::iterative::RootPass;
use super::log::search_log;
use super::{SearchState, SharedSearch};

/// Deep PV lines recurse a long way; give workers room.
const WORKER_STACK_BYTES: usize = 32 * 1024 * 1024;

#[derive(Clone, Copy, PartialEq, Eq)]
enum SlotState {
    Pending,
    InFlight,
    Done,
}

struct BestLine {
    score: i32,
    idx: usize,
    pv: Vec<Move>,
}

struct SplitGroup<'a> {
    shared: &'a SharedSearch,
    template: &'a Board,
    depth: u32,
    beta: i32,
    alpha: AtomicI32,
    cutoff: AtomicBool,
    slots: Mutex<Vec<SlotState>>,
    best: Mutex<BestLine>,
}

impl SplitGroup<'_> {
    fn aborted(&self) -> bool {
        self.cutoff.load(Ordering::Relaxed) || self.shared.stopped()
    }

    fn alpha(&self) -> i32 {
        self.alpha.load(Ordering::Relaxed)
    }

    /// Take the next pending root move, marking it in flight.
    fn claim(&self) -> Option<usize> {
        let mut slots = self.slots.lock();
        let idx = slots.iter().position(|s| *s == SlotState::Pending)?;
        slots[idx] = SlotState::InFlight;
        Some(idx)
    }

    /// Return an unfinished move to the queue after an abort.
    fn release(&self, idx: usize) {
        self.slots.lock()[idx] = SlotState::Pending;
    }

    /// Publish a finished move: raise alpha, maybe take over the best
    /// line, and cut the group off on a beta failure.
    fn finish(&self, idx: usize, score: i32, pv: Vec<Move>) {
        self.slots.lock()[idx] = SlotState::Done;
        self.alpha.fetch_max(score.min(self.beta), Ordering::Relaxed);
        {
            let mut best = self.best.lock();
            if score > best.score {
                best.score = score;
                best.idx = idx;
                best.pv = pv;
            }
        }
        if score >= self.beta {
            self.cutoff.store(true, Ordering::Relaxed);
        }
    }
}

/// Search one already-claimed root move on a worker's private board.
/// Returns `None` when the search was aborted mid-move.
fn search_one(
    board: &mut Board,
    state: &mut SearchState,
    group: &SplitGroup<'_>,
    mv: Move,
    first: bool,
) -> Option<(i32, Vec<Move>)> {
    state.frames.frame_mut(0).current_move = mv;
    let depth = group.depth;
    let beta = group.beta;
    let aborted;
    let score;
    {
        let mut ctx = SearchContext::new(board, state, group.shared);
        let info = ctx.board.make_move(mv);
        let alpha = group.alpha();
        score = if first {
            -ctx.pvs(-beta, -alpha, depth - 1, 1, true)
        } else {
            let mut s = -ctx.pvs(-alpha - 1, -alpha, depth - 1, 1, true);
            if s > alpha && s < beta {
                // Alpha may have risen while the probe ran.
                let latest = group.alpha().max(alpha);
                if s > latest {
                    s = -ctx.pvs(-beta, -latest, depth - 1, 1, true);
                }
            }
            s
        };
        ctx.board.unmake_move(mv, info);
        ctx.flush_nodes();
        aborted = ctx.aborted();
    }
    if aborted {
        return None;
    }
    let pv = std::iter::once(mv)
        .chain(state.frames.frame(1).pv().iter().copied())
        .collect();
    Some((score, pv))
}

fn worker_loop(group: &SplitGroup<'_>, root_moves: &MoveList, state: &mut SearchState) {
    let mut board = group.template.clone();
    while !group.aborted() {
        let Some(idx) = group.claim() else { break };
        let mv = root_moves[idx];
        match search_one(&mut board, state, group, mv, false) {
            Some((score, pv)) => group.finish(idx, score, pv),
            None => {
                group.release(idx);
                break;
            }
        }
    }
}

/// Search the root move list at `depth` across the master plus one
/// worker per helper state. The states outlive the pass, so killer,
/// counter, and history tables carry over between iterations.
pub(crate) fn search_root_parallel(
    board: &Board,
    root_moves: &MoveList,
    depth: u32,
    window: (i32, i32),
    shared: &SharedSearch,
    master_state: &mut SearchState,
    helpers: &mut [SearchState],
) -> RootPass {
    let (alpha0, beta0) = window;
    debug_assert!(root_moves.len() > 1);

    let group = SplitGroup {
        shared,
        template: board,
        depth,
        beta: beta0,
        alpha: AtomicI32::new(alpha0),
        cutoff: AtomicBool::new(false),
        slots: Mutex::new(vec![SlotState::Pending; root_moves.len()]),
        best: Mutex::new(BestLine {
            score: -INFINITY,
            idx: 0,
            pv: Vec::new(),
        }),
    };

    // The first move runs alone so the workers start from a real alpha
    // instead of probing against the window edge.
    group.slots.lock()[0] = SlotState::InFlight;
    let first_move = root_moves[0];
    let mut master_board = board.clone();
    match search_one(&mut master_board, master_state, &group, first_move, true) {
        Some((score, pv)) => group.finish(0, score, pv),
        None => {
            return RootPass {
                score: -INFINITY,
                best_idx: 0,
                pv: Vec::new(),
                aborted: true,
            }
        }
    }

    if !group.aborted() {
        search_log!(
            "splitting {} root moves at depth {depth} across {} threads",
            root_moves.len() - 1,
            helpers.len() + 1
        );
        let group = &group;
        thread::scope(|scope| {
            for (i, helper) in helpers.iter_mut().enumerate() {
                let spawned = thread::Builder::new()
                    .name(format!("search-{}", i + 1))
                    .stack_size(WORKER_STACK_BYTES)
                    .spawn_scoped(scope, move || worker_loop(group, root_moves, helper));
                if spawned.is_err() {
                    break;
                }
            }
            worker_loop(group, root_moves, master_state);
        });
    }

    let best = group.best.into_inner();
    RootPass {
        score: best.score,
        best_idx: best.idx,
        pv: best.pv,
        aborted: shared.stopped(),
    }
}

#[cfg(test)]
mod tests {
    use super::super::super::eval::MaterialEval;
    use super::super::super::state::Board;
    use super::super::super::types::Square;
    use super::super::iterative::{start_search_with, SearchConfig, SearchLimits};
    use super::{search_root_parallel, SearchState, SharedSearch, INFINITY};
    use crate::tt::TranspositionTable;
    use std::sync::Arc;

    fn threaded_config(threads: usize) -> SearchConfig {
        SearchConfig::default()
            .with_tt(Arc::new(TranspositionTable::new(4)))
            .with_threads(threads)
    }

    #[test]
    fn parallel_search_returns_a_legal_move() {
        let mut board = Board::new();
        let outcome =
            start_search_with(&mut board, &SearchLimits::depth(6), &threaded_config(4));
        assert!(board.generate_moves().contains(outcome.best_move));
        assert_eq!(outcome.depth, 6);
    }

    #[test]
    fn parallel_and_serial_agree_on_a_won_position() {
        // White wins the d5 knight; any sensible search takes it.
        let fen = "r1bqkbnr/pppppppp/8/3n4/8/2N2Q2/PPPP1PPP/R1B1KBNR w KQkq - 0 1";
        let mut serial_board: Board = fen.parse().unwrap();
        let serial = start_search_with(
            &mut serial_board,
            &SearchLimits::depth(6),
            &threaded_config(1),
        );
        let mut parallel_board: Board = fen.parse().unwrap();
        let parallel = start_search_with(
            &mut parallel_board,
            &SearchLimits::depth(6),
            &threaded_config(2),
        );
        assert!(serial.score > 200);
        assert!(parallel.score > 200);
        // Both captures of the knight win equally; either searcher must
        // land on d5.
        let d5 = Square::new(4, 3);
        assert_eq!(serial.best_move.to(), d5);
        assert_eq!(parallel.best_move.to(), d5);
    }

    #[test]
    fn worker_tables_survive_between_passes() {
        // Successive passes at growing depth reuse the same master and
        // helper states, the way the deepening driver drives them, so
        // killer/history signal accumulates instead of starting over.
        let shared = SharedSearch::for_tests(Arc::new(MaterialEval));
        let mut board = Board::new();
        let moves = board.generate_moves();
        let mut master = SearchState::new(&shared.params);
        let mut helpers = vec![SearchState::new(&shared.params)];

        let window = (-INFINITY, INFINITY);
        let first =
            search_root_parallel(&board, &moves, 5, window, &shared, &mut master, &mut helpers);
        assert!(!first.aborted);
        let master_nodes = master.stats.nodes;
        assert!(master_nodes > 0);

        let second =
            search_root_parallel(&board, &moves, 6, window, &shared, &mut master, &mut helpers);
        assert!(!second.aborted);
        // The master searched the first move in both passes on the same
        // state; its counters kept growing rather than resetting.
        assert!(master.stats.nodes > master_nodes);
        assert!(board.generate_moves().contains(second.pv[0]));
    }
}
