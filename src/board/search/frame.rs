//! Per-thread search frames.
//!
//! One arena per thread, one frame per ply, allocated once when the thread
//! starts searching. Nothing in here is ever shared; parallel workers each
//! own their arena and hand results back only through the split group.

use super::super::types::{Move, MAX_PLY};

/// Per-ply search state that outlives the recursive call: the PV collected
/// below this node and the move being searched here.
#[derive(Clone)]
pub(crate) struct Frame {
    pv: [Move; MAX_PLY],
    pv_len: usize,
    pub current_move: Move,
    pub static_eval: i32,
}

impl Frame {
    fn new() -> Self {
        Frame {
            pv: [Move::NONE; MAX_PLY],
            pv_len: 0,
            current_move: Move::NONE,
            static_eval: 0,
        }
    }

    pub(crate) fn pv(&self) -> &[Move] {
        &self.pv[..self.pv_len]
    }
}

/// Fixed arena of frames indexed by ply.
pub(crate) struct FrameArena {
    frames: Box<[Frame]>,
}

impl FrameArena {
    pub(crate) fn new() -> Self {
        FrameArena {
            frames: vec![Frame::new(); MAX_PLY + 1].into_boxed_slice(),
        }
    }

    pub(crate) fn frame(&self, ply: usize) -> &Frame {
        &self.frames[ply]
    }

    pub(crate) fn frame_mut(&mut self, ply: usize) -> &mut Frame {
        &mut self.frames[ply]
    }

    pub(crate) fn clear_pv(&mut self, ply: usize) {
        self.frames[ply].pv_len = 0;
    }

    /// Set this ply's PV to `mv` followed by the child ply's PV.
    pub(crate) fn adopt_pv(&mut self, ply: usize, mv: Move) {
        let (parents, children) = self.frames.split_at_mut(ply + 1);
        let parent = &mut parents[ply];
        let child = &children[0];
        parent.pv[0] = mv;
        let tail = child.pv_len.min(MAX_PLY - 1);
        parent.pv[1..=tail].copy_from_slice(&child.pv[..tail]);
        parent.pv_len = tail + 1;
    }

    /// The move played to reach the current node (the opponent's last move).
    pub(crate) fn prior_move(&self, ply: usize) -> Move {
        if ply >= 1 {
            self.frames[ply - 1].current_move
        } else {
            Move::NONE
        }
    }

    /// The mover's own previous move, two plies back.
    pub(crate) fn own_prior_move(&self, ply: usize) -> Move {
        if ply >= 2 {
            self.frames[ply - 2].current_move
        } else {
            Move::NONE
        }
    }

    /// Our static eval two plies ago, for the "improving" test.
    pub(crate) fn static_eval_two_back(&self, ply: usize) -> Option<i32> {
        (ply >= 2).then(|| self.frames[ply - 2].static_eval)
    }
}

#[cfg(test)]
mod tests {
    use super::super::super::types::Square;
    use super::*;

    fn mv(file: u8) -> Move {
        Move::quiet(Square::new(0, file), Square::new(1, file))
    }

    #[test]
    fn pv_adoption_builds_the_line() {
        let mut arena = FrameArena::new();
        arena.clear_pv(2);
        arena.adopt_pv(1, mv(1));
        arena.adopt_pv(0, mv(0));
        assert_eq!(arena.frame(0).pv(), &[mv(0), mv(1)]);
    }

    #[test]
    fn prior_moves_walk_the_stack() {
        let mut arena = FrameArena::new();
        arena.frame_mut(0).current_move = mv(0);
        arena.frame_mut(1).current_move = mv(1);
        assert_eq!(arena.prior_move(2), mv(1));
        assert_eq!(arena.own_prior_move(2), mv(0));
        assert_eq!(arena.prior_move(0), Move::NONE);
        assert_eq!(arena.own_prior_move(1), Move::NONE);
    }
}
