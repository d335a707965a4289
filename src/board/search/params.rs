//! Tuned search thresholds.
//!
//! Every pruning/reduction family carries an enable flag; with all flags
//! off the search reduces to plain alpha-beta plus quiescence, which the
//! consistency tests compare against minimax. The numeric thresholds are
//! performance tuning, not correctness contracts.

/// Search configuration knobs.
#[derive(Clone, Debug)]
#[allow(clippy::struct_excessive_bools)]
pub struct SearchParams {
    /// Aspiration half-width around the previous iteration's score.
    pub aspiration_window: i32,
    pub use_aspiration: bool,

    pub use_null_move: bool,
    /// Minimum remaining depth for a null-move attempt.
    pub null_min_depth: u32,
    /// Base depth reduction of the null search.
    pub null_base_reduction: u32,
    /// Extra reduction per this many points of eval above beta.
    pub null_eval_divisor: i32,

    pub use_futility: bool,
    /// Margin per ply of remaining depth for forward futility.
    pub futility_margin: i32,
    /// Margin per ply for reverse futility (static beta cutoff).
    pub reverse_futility_margin: i32,
    /// Futility applies at remaining depth at or below this.
    pub futility_max_depth: u32,

    pub use_lmr: bool,
    pub lmr_min_depth: u32,
    /// First move index eligible for reduction.
    pub lmr_min_move: usize,

    pub use_iid: bool,
    pub iid_min_depth: u32,
    pub iid_reduction: u32,

    pub use_extensions: bool,

    /// Skip losing captures in quiescence and defer them in ordering.
    pub use_see_pruning: bool,

    /// History counters saturate at this value, then the table rescales.
    pub history_max: i32,

    /// Minimum remaining depth at which a node may be split across workers.
    pub min_split_depth: u32,
}

impl Default for SearchParams {
    fn default() -> Self {
        SearchParams {
            aspiration_window: 50,
            use_aspiration: true,
            use_null_move: true,
            null_min_depth: 3,
            null_base_reduction: 2,
            null_eval_divisor: 200,
            use_futility: true,
            futility_margin: 150,
            reverse_futility_margin: 120,
            futility_max_depth: 3,
            use_lmr: true,
            lmr_min_depth: 3,
            lmr_min_move: 4,
            use_iid: true,
            iid_min_depth: 5,
            iid_reduction: 2,
            use_extensions: true,
            use_see_pruning: true,
            history_max: 16_384,
            min_split_depth: 5,
        }
    }
}

impl SearchParams {
    /// All pruning, reduction, and extension families disabled; the search
    /// becomes plain alpha-beta with quiescence.
    #[must_use]
    pub fn pruning_disabled() -> Self {
        SearchParams {
            use_aspiration: false,
            use_null_move: false,
            use_futility: false,
            use_lmr: false,
            use_iid: false,
            use_extensions: false,
            use_see_pruning: false,
            ..SearchParams::default()
        }
    }
}
