//! King and pawn versus king bitbase.
//!
//! One bit per position with the strong side normalized to White and the
//! pawn on files a-d. A set bit means the position is a draw with best play.
//! The table is generated on first use by retrograde iteration.

use once_cell::sync::Lazy;

use crate::board::attack_tables::{KING_ATTACKS, PAWN_ATTACKS};
use crate::board::{Color, Square};

/// Normalized positions: 2 sides to move x 64 x 64 king squares x 24 pawn squares.
pub const KPK_POSITIONS: usize = 2 * 64 * 64 * 24;

/// Size of the packed table in bytes.
pub const KPK_TABLE_BYTES: usize = KPK_POSITIONS / 8;

const _: () = assert!(KPK_TABLE_BYTES == 24_576);

const INVALID: u8 = 0;
const UNKNOWN: u8 = 1;
const DRAW: u8 = 2;
const WIN: u8 = 4;

static KPK_DRAWS: Lazy<Box<[u8; KPK_TABLE_BYTES]>> = Lazy::new(generate);

/// Table index for a normalized position (strong side is White).
///
/// Mirrors files e-h onto d-a. `weak_to_move` is 1 when the defending side
/// moves. The pawn must stand on ranks 2-7.
#[inline]
fn kpk_index(strong_king: usize, weak_king: usize, pawn: usize, weak_to_move: usize) -> usize {
    let mirror = if pawn & 7 > 3 { 7 } else { 0 };
    let (strong_king, weak_king, pawn) = (strong_king ^ mirror, weak_king ^ mirror, pawn ^ mirror);
    debug_assert!((8..56).contains(&pawn));
    let pawn_field = (((pawn & 0x38) - 8) >> 1) | (pawn & 7);
    strong_king | (weak_king << 6) | (weak_to_move << 12) | (pawn_field << 13)
}

/// True when the single-pawn ending is a draw with best play.
///
/// `strong` owns the pawn; `stm` is the side to move.
#[must_use]
pub fn kpk_draw(
    strong: Color,
    strong_king: Square,
    weak_king: Square,
    pawn: Square,
    stm: Color,
) -> bool {
    let flip = match strong {
        Color::White => 0,
        Color::Black => 56,
    };
    let idx = kpk_index(
        strong_king.index() ^ flip,
        weak_king.index() ^ flip,
        pawn.index() ^ flip,
        usize::from(stm != strong),
    );
    KPK_DRAWS[idx >> 3] & (1 << (idx & 7)) != 0
}

#[derive(Clone, Copy)]
struct KpkPosition {
    strong_king: usize,
    weak_king: usize,
    pawn: usize,
    strong_to_move: bool,
}

impl KpkPosition {
    fn decode(idx: usize) -> Self {
        let pawn_field = idx >> 13;
        KpkPosition {
            strong_king: idx & 63,
            weak_king: (idx >> 6) & 63,
            pawn: ((pawn_field >> 2) + 1) * 8 + (pawn_field & 3),
            strong_to_move: (idx >> 12) & 1 == 0,
        }
    }

    fn initial_result(self) -> u8 {
        let Self {
            strong_king,
            weak_king,
            pawn,
            strong_to_move,
        } = self;
        let wk_bit = 1u64 << weak_king;
        let pawn_bit = 1u64 << pawn;
        let pawn_attacks = PAWN_ATTACKS[Color::White.index()][pawn];
        let king_distance = Square::from_index(strong_king).distance(Square::from_index(weak_king));

        if king_distance <= 1
            || strong_king == pawn
            || weak_king == pawn
            || (strong_to_move && pawn_attacks & wk_bit != 0)
        {
            return INVALID;
        }

        if strong_to_move {
            // Promotion the defender cannot stop
            let push = pawn + 8;
            if pawn >> 3 == 6
                && strong_king != push
                && (Square::from_index(weak_king).distance(Square::from_index(push)) > 1
                    || KING_ATTACKS[strong_king] & (1u64 << push) != 0)
            {
                return WIN;
            }
            return UNKNOWN;
        }

        let escapes = KING_ATTACKS[weak_king] & !(KING_ATTACKS[strong_king] | pawn_attacks);
        if escapes == 0 {
            return if pawn_attacks & wk_bit != 0 { WIN } else { DRAW };
        }
        // Undefended pawn can be taken
        if KING_ATTACKS[weak_king] & pawn_bit & !KING_ATTACKS[strong_king] != 0 {
            return DRAW;
        }
        UNKNOWN
    }

    fn classify(self, db: &[u8]) -> u8 {
        let Self {
            strong_king,
            weak_king,
            pawn,
            strong_to_move,
        } = self;
        let mut reached = INVALID;

        if strong_to_move {
            let mut moves = KING_ATTACKS[strong_king];
            while moves != 0 {
                let to = moves.trailing_zeros() as usize;
                moves &= moves - 1;
                reached |= db[kpk_index(to, weak_king, pawn, 1)];
            }
            if pawn >> 3 < 6 {
                let push = pawn + 8;
                reached |= db[kpk_index(strong_king, weak_king, push, 1)];
                if pawn >> 3 == 1 && push != strong_king && push != weak_king {
                    reached |= db[kpk_index(strong_king, weak_king, push + 8, 1)];
                }
            }
            if reached & WIN != 0 {
                WIN
            } else if reached & UNKNOWN != 0 {
                UNKNOWN
            } else {
                DRAW
            }
        } else {
            let mut moves = KING_ATTACKS[weak_king];
            while moves != 0 {
                let to = moves.trailing_zeros() as usize;
                moves &= moves - 1;
                reached |= db[kpk_index(strong_king, to, pawn, 0)];
            }
            if reached & DRAW != 0 {
                DRAW
            } else if reached & UNKNOWN != 0 {
                UNKNOWN
            } else {
                WIN
            }
        }
    }
}

fn generate() -> Box<[u8; KPK_TABLE_BYTES]> {
    let mut db: Vec<u8> = (0..KPK_POSITIONS)
        .map(|idx| KpkPosition::decode(idx).initial_result())
        .collect();

    let mut changed = true;
    while changed {
        changed = false;
        for idx in 0..KPK_POSITIONS {
            if db[idx] == UNKNOWN {
                let result = KpkPosition::decode(idx).classify(&db);
                if result != UNKNOWN {
                    db[idx] = result;
                    changed = true;
                }
            }
        }
    }

    let mut table = Box::new([0u8; KPK_TABLE_BYTES]);
    for (idx, &result) in db.iter().enumerate() {
        // Positions no line resolves are draws
        if result == DRAW || result == UNKNOWN {
            table[idx >> 3] |= 1 << (idx & 7);
        }
    }
    log::debug!("KPK bitbase generated");
    table
}
