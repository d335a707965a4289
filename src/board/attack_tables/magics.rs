//! Magic multiplication tables for sliding-piece attacks.
//!
//! Each square has a relevant-occupancy mask (board edges excluded), a
//! 64-bit magic factor, and a shift. `((occ & mask) * magic) >> shift`
//! indexes a precomputed attack set. The whole table is verified against
//! the slow ray-walk generators when it is built; a magic that maps two
//! occupancies with different attack sets to one slot is a construction
//! bug and panics immediately.

use once_cell::sync::Lazy;

pub(crate) const ROOK_MAGICS: [u64; 64] = [
    0x0a8002c000108020, 0x06c00049b0002001, 0x0100200010090040, 0x2480041000800801,
    0x0280028004000800, 0x0900410008040022, 0x0280020001001080, 0x2880002041000080,
    0xa000800080400034, 0x0004808020004000, 0x2290802004801000, 0x0411000d00100020,
    0x0402800800040080, 0x000b000401004208, 0x2409000100040200, 0x0001002100004082,
    0x0022878001e24000, 0x1090810021004010, 0x0801030040200012, 0x0500808008001000,
    0x0a08018014000880, 0x8000808004000200, 0x0201008080010200, 0x0801020000441091,
    0x0000800080204005, 0x1040200040100048, 0x0000120200402082, 0x0d14880480100080,
    0x0012040280080080, 0x0100040080020080, 0x9020010080800200, 0x0813241200148449,
    0x0491604001800080, 0x0100401000402001, 0x4820010021001040, 0x0400402202000812,
    0x0209009005000802, 0x0810800601800400, 0x4301083214000150, 0x204026458e001401,
    0x0040204000808000, 0x8001008040010020, 0x8410820820420010, 0x1003001000090020,
    0x0804040008008080, 0x0012000810020004, 0x1000100200040208, 0x430000a044020001,
    0x0280009023410300, 0x00e0100040002240, 0x0000200100401700, 0x2244100408008080,
    0x0008000400801980, 0x0002000810040200, 0x8010100228810400, 0x2000009044210200,
    0x4080008040102101, 0x0040002080411d01, 0x2005524060000901, 0x0502001008400422,
    0x489a000810200402, 0x0001004400080a13, 0x4000011008020084, 0x0026002114058042,
];

pub(crate) const BISHOP_MAGICS: [u64; 64] = [
    0x89a1121896040240, 0x2004844802002010, 0x2068080051921000, 0x62880a0220200808,
    0x0004042004000000, 0x0100822020200011, 0xc00444222012000a, 0x0028808801216001,
    0x0400492088408100, 0x0201c401040c0084, 0x00840800910a0010, 0x0000082080240060,
    0x2000840504006000, 0x30010c4108405004, 0x1008005410080802, 0x8144042209100900,
    0x0208081020014400, 0x004800201208ca00, 0x0f18140408012008, 0x1004002802102001,
    0x0841000820080811, 0x0040200200a42008, 0x0000800054042000, 0x88010400410c9000,
    0x0520040470104290, 0x1004040051500081, 0x2002081833080021, 0x000400c00c010142,
    0x941408200c002000, 0x0658810000806011, 0x0188071040440a00, 0x4800404002011c00,
    0x0104442040404200, 0x0511080202091021, 0x0004022401120400, 0x80c0040400080120,
    0x8040010040820802, 0x0480810700020090, 0x0102008e00040242, 0x0809005202050100,
    0x8002024220104080, 0x0431008804142000, 0x0019001802081400, 0x0200014208040080,
    0x3308082008200100, 0x041010500040c020, 0x4012020c04210308, 0x208220a202004080,
    0x0111040120082000, 0x6803040141280a00, 0x2101004202410000, 0x8200000041108022,
    0x0000021082088000, 0x0002410204010040, 0x0040100400809000, 0x0822088220820214,
    0x0040808090012004, 0x00910224040218c9, 0x0402814422015008, 0x0090014004842410,
    0x0001000042304105, 0x0010008830412a00, 0x2520081090008908, 0x40102000a0a60140,
];

pub(crate) const BISHOP_SHIFTS: [u8; 64] = [
    58, 59, 59, 59, 59, 59, 59, 58,
    59, 59, 59, 59, 59, 59, 59, 59,
    59, 59, 57, 57, 57, 57, 59, 59,
    59, 59, 57, 55, 55, 57, 59, 59,
    59, 59, 57, 55, 55, 57, 59, 59,
    59, 59, 57, 57, 57, 57, 59, 59,
    59, 59, 59, 59, 59, 59, 59, 59,
    58, 59, 59, 59, 59, 59, 59, 58,
];

pub(crate) const ROOK_SHIFTS: [u8; 64] = [
    52, 53, 53, 53, 53, 53, 53, 52,
    53, 54, 54, 54, 54, 54, 54, 53,
    53, 54, 54, 54, 54, 54, 54, 53,
    53, 54, 54, 54, 54, 54, 54, 53,
    53, 54, 54, 54, 54, 54, 54, 53,
    53, 54, 54, 54, 54, 54, 54, 53,
    53, 54, 54, 54, 54, 54, 54, 53,
    52, 53, 53, 53, 53, 53, 53, 52,
];

const BISHOP_DIRS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
const ROOK_DIRS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Relevant-occupancy mask for a bishop: the diagonals, edges excluded.
pub(crate) fn bishop_mask(sq: usize) -> u64 {
    let mut mask = 0u64;
    let (rank, file) = ((sq / 8) as i8, (sq % 8) as i8);
    for (dr, df) in BISHOP_DIRS {
        let (mut r, mut f) = (rank + dr, file + df);
        while (1..7).contains(&r) && (1..7).contains(&f) {
            mask |= 1u64 << (r * 8 + f);
            r += dr;
            f += df;
        }
    }
    mask
}

/// Relevant-occupancy mask for a rook: rank and file, edges excluded.
pub(crate) fn rook_mask(sq: usize) -> u64 {
    let mut mask = 0u64;
    let (rank, file) = ((sq / 8) as i8, (sq % 8) as i8);
    for (dr, df) in ROOK_DIRS {
        let (mut r, mut f) = (rank + dr, file + df);
        while (0..8).contains(&r) && (0..8).contains(&f) {
            // The edge square in the travel direction never blocks anything.
            if (dr != 0 && (1..7).contains(&r)) || (df != 0 && (1..7).contains(&f)) {
                mask |= 1u64 << (r * 8 + f);
            }
            r += dr;
            f += df;
        }
    }
    mask
}

fn ray_attacks(sq: usize, occupancy: u64, dirs: &[(i8, i8); 4]) -> u64 {
    let mut attacks = 0u64;
    let (rank, file) = ((sq / 8) as i8, (sq % 8) as i8);
    for &(dr, df) in dirs {
        let (mut r, mut f) = (rank + dr, file + df);
        while (0..8).contains(&r) && (0..8).contains(&f) {
            let bit = 1u64 << (r * 8 + f);
            attacks |= bit;
            if occupancy & bit != 0 {
                break;
            }
            r += dr;
            f += df;
        }
    }
    attacks
}

/// Slow reference: walk the diagonals until blocked.
pub(crate) fn bishop_attacks_slow(sq: usize, occupancy: u64) -> u64 {
    ray_attacks(sq, occupancy, &BISHOP_DIRS)
}

/// Slow reference: walk rank and file until blocked.
pub(crate) fn rook_attacks_slow(sq: usize, occupancy: u64) -> u64 {
    ray_attacks(sq, occupancy, &ROOK_DIRS)
}

/// Expand subset number `index` of `mask` into an occupancy bitboard.
pub(crate) fn occupancy_from_index(index: usize, mask: u64) -> u64 {
    let mut occupancy = 0u64;
    let mut rest = mask;
    for i in 0..mask.count_ones() {
        let sq = rest.trailing_zeros();
        rest &= rest - 1;
        if index & (1 << i) != 0 {
            occupancy |= 1u64 << sq;
        }
    }
    occupancy
}

pub(crate) struct SquareMagic {
    pub mask: u64,
    pub magic: u64,
    pub shift: u8,
    pub offset: usize,
}

impl SquareMagic {
    #[inline]
    fn slot(&self, occupancy: u64) -> usize {
        self.offset + (((occupancy & self.mask).wrapping_mul(self.magic)) >> self.shift) as usize
    }
}

pub(crate) struct SliderTables {
    rook: [SquareMagic; 64],
    bishop: [SquareMagic; 64],
    attacks: Vec<u64>,
}

const UNFILLED: u64 = u64::MAX;

impl SliderTables {
    fn build() -> Self {
        let mut attacks = Vec::new();
        let rook = Self::build_piece(&mut attacks, &ROOK_MAGICS, &ROOK_SHIFTS, rook_mask, rook_attacks_slow);
        let bishop = Self::build_piece(
            &mut attacks,
            &BISHOP_MAGICS,
            &BISHOP_SHIFTS,
            bishop_mask,
            bishop_attacks_slow,
        );
        SliderTables { rook, bishop, attacks }
    }

    fn build_piece(
        attacks: &mut Vec<u64>,
        magics: &[u64; 64],
        shifts: &[u8; 64],
        mask_fn: fn(usize) -> u64,
        slow_fn: fn(usize, u64) -> u64,
    ) -> [SquareMagic; 64] {
        std::array::from_fn(|sq| {
            let entry = SquareMagic {
                mask: mask_fn(sq),
                magic: magics[sq],
                shift: shifts[sq],
                offset: attacks.len(),
            };
            let slots = 1usize << (64 - entry.shift);
            attacks.resize(attacks.len() + slots, UNFILLED);

            // Enumerate every occupancy subset of the mask; verify the magic
            // never maps two subsets with different attack sets to one slot.
            let subsets = 1usize << entry.mask.count_ones();
            for index in 0..subsets {
                let occupancy = occupancy_from_index(index, entry.mask);
                let reference = slow_fn(sq, occupancy);
                let slot = entry.slot(occupancy);
                let current = attacks[slot];
                if current == UNFILLED {
                    attacks[slot] = reference;
                } else if current != reference {
                    panic!("magic collision on square {sq} (magic {:#x})", entry.magic);
                }
            }
            entry
        })
    }

    #[inline]
    pub(crate) fn rook(&self, sq: usize, occupancy: u64) -> u64 {
        self.attacks[self.rook[sq].slot(occupancy)]
    }

    #[inline]
    pub(crate) fn bishop(&self, sq: usize, occupancy: u64) -> u64 {
        self.attacks[self.bishop[sq].slot(occupancy)]
    }
}

pub(crate) static SLIDERS: Lazy<SliderTables> = Lazy::new(SliderTables::build);
