//! Quiet-move memory: killers, counter-moves, move pairs, and the history
//! table.
//!
//! All of these are hints. The orderer re-validates every move pulled from
//! here against the board before trying it, so stale entries cost a lookup,
//! never a crash.

use super::super::types::{Color, Move, MAX_PLY};

/// Two killer slots per ply. The orderer additionally reads the slots from
/// two plies back as its third and fourth killers.
pub(crate) struct KillerTable {
    slots: [[Move; 2]; MAX_PLY],
}

impl KillerTable {
    pub(crate) fn new() -> Self {
        KillerTable {
            slots: [[Move::NONE; 2]; MAX_PLY],
        }
    }

    pub(crate) fn first(&self, ply: usize) -> Move {
        self.slots.get(ply).map_or(Move::NONE, |s| s[0])
    }

    pub(crate) fn second(&self, ply: usize) -> Move {
        self.slots.get(ply).map_or(Move::NONE, |s| s[1])
    }

    /// Killers recorded two plies earlier: the same side to move, one full
    /// move ago. Frequently still a refutation at this ply.
    pub(crate) fn grandparent(&self, ply: usize) -> [Move; 2] {
        if ply >= 2 {
            self.slots[ply - 2]
        } else {
            [Move::NONE; 2]
        }
    }

    pub(crate) fn record(&mut self, ply: usize, mv: Move) {
        if ply >= MAX_PLY {
            return;
        }
        let row = &mut self.slots[ply];
        if row[0] != mv {
            row[1] = row[0];
            row[0] = mv;
        }
    }

}

/// Replies that refuted a specific opponent move, indexed by that move's
/// from/to squares. Two slots, most recent first.
pub(crate) struct CounterTable {
    entries: Box<[[[Move; 2]; 64]; 64]>,
}

impl CounterTable {
    pub(crate) fn new() -> Self {
        CounterTable {
            entries: Box::new([[[Move::NONE; 2]; 64]; 64]),
        }
    }

    pub(crate) fn get(&self, prev: Move) -> [Move; 2] {
        if prev.is_none() {
            return [Move::NONE; 2];
        }
        self.entries[prev.from().index()][prev.to().index()]
    }

    pub(crate) fn record(&mut self, prev: Move, mv: Move) {
        if prev.is_none() {
            return;
        }
        let slot = &mut self.entries[prev.from().index()][prev.to().index()];
        if slot[0] != mv {
            slot[1] = slot[0];
            slot[0] = mv;
        }
    }

}

/// Follow-up moves that worked after the mover's own move two plies
/// earlier. Same shape as [`CounterTable`], different key.
pub(crate) struct PairTable {
    entries: Box<[[[Move; 2]; 64]; 64]>,
}

impl PairTable {
    pub(crate) fn new() -> Self {
        PairTable {
            entries: Box::new([[[Move::NONE; 2]; 64]; 64]),
        }
    }

    pub(crate) fn get(&self, own_prev: Move) -> [Move; 2] {
        if own_prev.is_none() {
            return [Move::NONE; 2];
        }
        self.entries[own_prev.from().index()][own_prev.to().index()]
    }

    pub(crate) fn record(&mut self, own_prev: Move, mv: Move) {
        if own_prev.is_none() {
            return;
        }
        let slot = &mut self.entries[own_prev.from().index()][own_prev.to().index()];
        if slot[0] != mv {
            slot[1] = slot[0];
            slot[0] = mv;
        }
    }

}

/// Per-color from/to history counters.
///
/// Counters saturate into `[0, max]` through explicit clamps; when one hits
/// the ceiling the whole table is rescaled by half so relative order
/// survives.
pub(crate) struct HistoryTable {
    entries: Box<[[i32; 4096]; 2]>,
    max: i32,
}

impl HistoryTable {
    pub(crate) fn new(max: i32) -> Self {
        HistoryTable {
            entries: Box::new([[0; 4096]; 2]),
            max,
        }
    }

    #[inline]
    fn index(mv: Move) -> usize {
        mv.from().index() * 64 + mv.to().index()
    }

    pub(crate) fn score(&self, color: Color, mv: Move) -> i32 {
        self.entries[color.index()][Self::index(mv)]
    }

    /// Reward a move that caused a cutoff. Bonus grows with depth squared.
    pub(crate) fn reward(&mut self, color: Color, mv: Move, depth: u32) {
        let bonus = (depth * depth) as i32;
        let entry = &mut self.entries[color.index()][Self::index(mv)];
        *entry = (*entry + bonus).clamp(0, self.max);
        if *entry == self.max {
            self.rescale();
        }
    }

    /// Penalize a quiet move that was searched before the cutoff move.
    pub(crate) fn punish(&mut self, color: Color, mv: Move, depth: u32) {
        let penalty = depth as i32;
        let entry = &mut self.entries[color.index()][Self::index(mv)];
        *entry = (*entry - penalty).clamp(0, self.max);
    }

    fn rescale(&mut self) {
        for side in self.entries.iter_mut() {
            for entry in side.iter_mut() {
                *entry /= 2;
            }
        }
    }

    pub(crate) fn decay(&mut self) {
        for side in self.entries.iter_mut() {
            for entry in side.iter_mut() {
                *entry /= 4;
            }
        }
    }

}

#[cfg(test)]
mod tests {
    use super::super::super::types::Square;
    use super::*;

    fn mv(ff: u8, tf: u8) -> Move {
        Move::quiet(Square::new(0, ff), Square::new(1, tf))
    }

    #[test]
    fn killers_shift_and_dedup() {
        let mut killers = KillerTable::new();
        killers.record(4, mv(0, 0));
        killers.record(4, mv(1, 1));
        assert_eq!(killers.first(4), mv(1, 1));
        assert_eq!(killers.second(4), mv(0, 0));
        // Recording the current first killer again must not duplicate it.
        killers.record(4, mv(1, 1));
        assert_eq!(killers.second(4), mv(0, 0));
    }

    #[test]
    fn grandparent_killers_come_from_two_plies_back() {
        let mut killers = KillerTable::new();
        killers.record(2, mv(2, 2));
        killers.record(4, mv(3, 3));
        assert_eq!(killers.grandparent(4), [mv(2, 2), Move::NONE]);
        assert_eq!(killers.grandparent(6), [mv(3, 3), Move::NONE]);
        // Near the root there is no grandparent ply.
        assert_eq!(killers.grandparent(1), [Move::NONE; 2]);
    }

    #[test]
    fn history_saturates_and_rescales() {
        let mut history = HistoryTable::new(100);
        let m = mv(0, 1);
        for _ in 0..50 {
            history.reward(Color::White, m, 4);
        }
        assert!(history.score(Color::White, m) <= 100);
        // Rescale keeps relative order.
        let other = mv(2, 3);
        history.reward(Color::White, other, 2);
        assert!(history.score(Color::White, m) >= history.score(Color::White, other));
    }

    #[test]
    fn history_never_goes_negative() {
        let mut history = HistoryTable::new(100);
        let m = mv(0, 1);
        history.punish(Color::Black, m, 10);
        assert_eq!(history.score(Color::Black, m), 0);
    }

    #[test]
    fn counters_and_pairs_index_by_prior_move() {
        let mut counters = CounterTable::new();
        let prev = mv(4, 4);
        counters.record(prev, mv(5, 5));
        counters.record(prev, mv(6, 6));
        assert_eq!(counters.get(prev), [mv(6, 6), mv(5, 5)]);
        assert_eq!(counters.get(mv(7, 7)), [Move::NONE; 2]);
        assert_eq!(counters.get(Move::NONE), [Move::NONE; 2]);
    }
}
