//! Lockless transposition table.
//!
//! Each slot stores two atomic words: the packed entry and the position key
//! XORed with it. A reader recomputes the XOR and treats any mismatch — a
//! wrong position or a torn read under concurrent writes — as a miss, never
//! as an error. Mate scores are stored as distance-to-mate from the entry's
//! node and re-anchored to the probing ply, so a mate cached at one depth
//! reads back correctly anywhere in the tree.

use std::mem;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::board::search::constants::MATE_THRESHOLD;
use crate::board::Move;

/// Default table size in MiB.
pub const DEFAULT_TT_MB: usize = 64;

/// How a stored score relates to the true value of the position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoundType {
    /// Score is exact (searched with an open window).
    Exact,
    /// Score is at least this value (fail high).
    Lower,
    /// Score is at most this value (fail low).
    Upper,
}

impl BoundType {
    fn to_bits(self) -> u8 {
        match self {
            BoundType::Exact => 0,
            BoundType::Lower => 1,
            BoundType::Upper => 2,
        }
    }

    fn from_bits(v: u8) -> Self {
        match v & 0x3 {
            0 => BoundType::Exact,
            1 => BoundType::Lower,
            _ => BoundType::Upper,
        }
    }
}

/// An unpacked table entry. The score has already been re-anchored to the
/// probing ply.
#[derive(Clone, Copy, Debug)]
pub struct TTEntry {
    pub depth: u32,
    pub score: i32,
    pub bound: BoundType,
    pub best_move: Move,
    pub generation: u8,
}

// Packed layout (64 bits):
//   0-15  move
//  16-31  score as i16
//  32-39  depth
//  40-41  bound
//  42-47  generation (mod 64)
fn pack(depth: u8, score: i16, bound: BoundType, mv: Move, generation: u8) -> u64 {
    u64::from(mv.as_u16())
        | (u64::from(score as u16) << 16)
        | (u64::from(depth) << 32)
        | (u64::from(bound.to_bits()) << 40)
        | (u64::from(generation & 0x3F) << 42)
}

fn unpack(data: u64) -> (u8, i16, BoundType, Move, u8) {
    let mv = Move::from_u16((data & 0xFFFF) as u16);
    let score = ((data >> 16) & 0xFFFF) as u16 as i16;
    let depth = ((data >> 32) & 0xFF) as u8;
    let bound = BoundType::from_bits(((data >> 40) & 0x3) as u8);
    let generation = ((data >> 42) & 0x3F) as u8;
    (depth, score, bound, mv, generation)
}

/// Shift a score into ply-independent form for storage: mate scores become
/// distance from the storing node rather than from the root.
fn score_to_tt(score: i32, ply: usize) -> i32 {
    if score >= MATE_THRESHOLD {
        score + ply as i32
    } else if score <= -MATE_THRESHOLD {
        score - ply as i32
    } else {
        score
    }
}

/// Inverse of [`score_to_tt`], anchoring a stored mate distance to the
/// probing ply.
fn score_from_tt(score: i32, ply: usize) -> i32 {
    if score >= MATE_THRESHOLD {
        score - ply as i32
    } else if score <= -MATE_THRESHOLD {
        score + ply as i32
    } else {
        score
    }
}

struct Slot {
    key_xor: AtomicU64,
    data: AtomicU64,
}

impl Slot {
    fn new() -> Self {
        Slot {
            key_xor: AtomicU64::new(0),
            data: AtomicU64::new(0),
        }
    }

    fn write(&self, hash: u64, packed: u64) {
        self.data.store(packed, Ordering::Relaxed);
        self.key_xor.store(hash ^ packed, Ordering::Relaxed);
    }

    /// Raw packed data if the key verifies, else None (miss or torn read).
    fn read(&self, hash: u64) -> Option<u64> {
        let key_xor = self.key_xor.load(Ordering::Relaxed);
        let data = self.data.load(Ordering::Relaxed);
        (data != 0 && key_xor ^ data == hash).then_some(data)
    }

    fn is_empty(&self) -> bool {
        self.data.load(Ordering::Relaxed) == 0
    }

    fn depth(&self) -> u8 {
        ((self.data.load(Ordering::Relaxed) >> 32) & 0xFF) as u8
    }

    fn generation(&self) -> u8 {
        ((self.data.load(Ordering::Relaxed) >> 42) & 0x3F) as u8
    }
}

const BUCKET_SLOTS: usize = 4;

struct Bucket {
    slots: [Slot; BUCKET_SLOTS],
}

impl Bucket {
    fn new() -> Self {
        Bucket {
            slots: [Slot::new(), Slot::new(), Slot::new(), Slot::new()],
        }
    }
}

/// Shared, lock-free transposition table.
///
/// Callers are expected to suppress stores from aborted searches; the table
/// itself accepts every write.
pub struct TranspositionTable {
    buckets: Vec<Bucket>,
    mask: usize,
}

impl TranspositionTable {
    /// Allocate a table of roughly `size_mb` MiB (rounded down to a power
    /// of two buckets).
    #[must_use]
    pub fn new(size_mb: usize) -> Self {
        let bucket_bytes = mem::size_of::<Bucket>();
        let mut num_buckets = (size_mb.max(1) * 1024 * 1024) / bucket_bytes;
        num_buckets = num_buckets.next_power_of_two() / 2;
        if num_buckets == 0 {
            num_buckets = 1024;
        }
        let buckets = (0..num_buckets).map(|_| Bucket::new()).collect();
        TranspositionTable {
            buckets,
            mask: num_buckets - 1,
        }
    }

    fn bucket(&self, hash: u64) -> &Bucket {
        &self.buckets[(hash as usize) & self.mask]
    }

    /// Look up `hash`, re-anchoring any mate score to `ply`.
    #[must_use]
    pub fn probe(&self, hash: u64, ply: usize) -> Option<TTEntry> {
        for slot in &self.bucket(hash).slots {
            if let Some(data) = slot.read(hash) {
                let (depth, score, bound, best_move, generation) = unpack(data);
                return Some(TTEntry {
                    depth: u32::from(depth),
                    score: score_from_tt(i32::from(score), ply),
                    bound,
                    best_move,
                    generation,
                });
            }
        }
        None
    }

    /// Store a search result. `ply` is the node's distance from the root,
    /// used to normalize mate scores. Replacement prefers the slot already
    /// holding this position, then an empty slot, then the shallowest entry
    /// of the oldest generation.
    pub fn store(
        &self,
        hash: u64,
        depth: u32,
        score: i32,
        bound: BoundType,
        best_move: Move,
        ply: usize,
        generation: u8,
    ) {
        let stored = score_to_tt(score, ply).clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16;
        let packed = pack(depth.min(255) as u8, stored, bound, best_move, generation);
        let bucket = self.bucket(hash);

        for slot in &bucket.slots {
            if slot.read(hash).is_some() || slot.is_empty() {
                slot.write(hash, packed);
                return;
            }
        }

        let mut victim = 0;
        let mut worst = i32::MAX;
        for (idx, slot) in bucket.slots.iter().enumerate() {
            let age = i32::from(generation.wrapping_sub(slot.generation()) & 0x3F);
            let priority = i32::from(slot.depth()) * 2 - age;
            if priority < worst {
                worst = priority;
                victim = idx;
            }
        }
        bucket.slots[victim].write(hash, packed);
    }

    /// Occupancy estimate in per mille, sampled over the first buckets.
    #[must_use]
    pub fn hashfull_per_mille(&self) -> u32 {
        let sample = self.buckets.len().min(1000);
        let occupied: usize = self
            .buckets
            .iter()
            .take(sample)
            .flat_map(|b| b.slots.iter())
            .filter(|s| !s.is_empty())
            .count();
        ((occupied * 1000) / (sample * BUCKET_SLOTS)) as u32
    }

    /// Drop every entry. Only called between searches.
    pub fn clear(&self) {
        for bucket in &self.buckets {
            for slot in &bucket.slots {
                slot.key_xor.store(0, Ordering::Relaxed);
                slot.data.store(0, Ordering::Relaxed);
            }
        }
    }
}
