//! Iteratively deepened principal variation search.
//!
//! The driver in [`iterative`] deepens one ply at a time inside an
//! aspiration window; each node runs the staged move picker over the
//! pseudo-legal generators and shares results through the lockless
//! transposition table. With more than one thread configured, root moves
//! are split across workers that share the table and a stop flag but
//! nothing else.

pub(crate) mod constants;

mod alphabeta;
mod frame;
mod history;
mod iterative;
mod log;
mod ordering;
mod params;
mod split;

pub use iterative::{
    start_search, start_search_with, SearchConfig, SearchInfoCallback, SearchIterationInfo,
    SearchLimits, SearchOutcome,
};
pub use params::SearchParams;

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::tt::TranspositionTable;

use super::eval::Evaluate;
use frame::FrameArena;
use history::{CounterTable, HistoryTable, KillerTable, PairTable};

/// Node counters for one thread.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct SearchStats {
    pub(crate) nodes: u64,
    pub(crate) qnodes: u64,
    pub(crate) tt_cutoffs: u64,
    pub(crate) beta_cutoffs: u64,
    pub(crate) null_cutoffs: u64,
}

/// Per-thread search tables. Never shared; each worker owns one.
pub(crate) struct SearchState {
    pub(crate) killers: KillerTable,
    pub(crate) counters: CounterTable,
    pub(crate) pairs: PairTable,
    pub(crate) history: HistoryTable,
    pub(crate) frames: FrameArena,
    pub(crate) stats: SearchStats,
}

impl SearchState {
    pub(crate) fn new(params: &SearchParams) -> Self {
        SearchState {
            killers: KillerTable::new(),
            counters: CounterTable::new(),
            pairs: PairTable::new(),
            history: HistoryTable::new(params.history_max),
            frames: FrameArena::new(),
            stats: SearchStats::default(),
        }
    }

    /// Between depth iterations old history fades but is not forgotten.
    pub(crate) fn begin_iteration(&mut self) {
        self.history.decay();
    }
}

/// Search-wide control block shared by every thread: the table, the
/// evaluator, the stop flag, and the node/time budget.
pub(crate) struct SharedSearch {
    pub(crate) tt: Arc<TranspositionTable>,
    pub(crate) eval: Arc<dyn Evaluate>,
    pub(crate) params: SearchParams,
    pub(crate) generation: u8,
    stop: Arc<AtomicBool>,
    nodes: AtomicU64,
    pub(crate) node_limit: Option<u64>,
    pub(crate) hard_deadline: Option<Instant>,
}

impl SharedSearch {
    pub(crate) fn new(
        tt: Arc<TranspositionTable>,
        eval: Arc<dyn Evaluate>,
        params: SearchParams,
        generation: u8,
    ) -> Self {
        SharedSearch {
            tt,
            eval,
            params,
            generation,
            stop: Arc::new(AtomicBool::new(false)),
            nodes: AtomicU64::new(0),
            node_limit: None,
            hard_deadline: None,
        }
    }

    /// Share an externally owned stop flag, letting the caller abort an
    /// infinite search from another thread.
    pub(crate) fn with_stop_flag(mut self, stop: Arc<AtomicBool>) -> Self {
        self.stop = stop;
        self
    }

    pub(crate) fn with_budget(
        mut self,
        node_limit: Option<u64>,
        hard_deadline: Option<Instant>,
    ) -> Self {
        self.node_limit = node_limit;
        self.hard_deadline = hard_deadline;
        self
    }

    pub(crate) fn request_stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    pub(crate) fn stopped(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    pub(crate) fn add_nodes(&self, n: u64) {
        if n > 0 {
            self.nodes.fetch_add(n, Ordering::Relaxed);
        }
    }

    pub(crate) fn total_nodes(&self) -> u64 {
        self.nodes.load(Ordering::Relaxed)
    }

    /// Hard budget check, polled every few thousand nodes.
    pub(crate) fn budget_exceeded(&self) -> bool {
        if let Some(deadline) = self.hard_deadline {
            if Instant::now() >= deadline {
                return true;
            }
        }
        if let Some(limit) = self.node_limit {
            if self.total_nodes() >= limit {
                return true;
            }
        }
        false
    }

    #[cfg(test)]
    pub(crate) fn for_tests(eval: Arc<dyn Evaluate>) -> Self {
        SharedSearch::new(
            Arc::new(TranspositionTable::new(1)),
            eval,
            SearchParams::default(),
            0,
        )
    }
}
