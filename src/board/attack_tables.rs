//! Precomputed attack tables for kings and pawns.
//!
//! Indexed by square index (a1 = 0, h8 = 63).

use std::sync::LazyLock;

fn leaper_attacks(deltas: &[(isize, isize)]) -> [u64; 64] {
    let mut attacks = [0u64; 64];
    for (sq, slot) in attacks.iter_mut().enumerate() {
        let r = (sq / 8) as isize;
        let f = (sq % 8) as isize;
        let mut mask = 0u64;
        for &(dr, df) in deltas {
            let nr = r + dr;
            let nf = f + df;
            if (0..8).contains(&nr) && (0..8).contains(&nf) {
                mask |= 1u64 << ((nr as usize) * 8 + (nf as usize));
            }
        }
        *slot = mask;
    }
    attacks
}

pub(crate) static KING_ATTACKS: LazyLock<[u64; 64]> = LazyLock::new(|| {
    leaper_attacks(&[
        (1, 0),
        (-1, 0),
        (0, 1),
        (0, -1),
        (1, 1),
        (1, -1),
        (-1, 1),
        (-1, -1),
    ])
});

/// Squares attacked by a pawn, indexed by `[color][square]`.
pub(crate) static PAWN_ATTACKS: LazyLock<[[u64; 64]; 2]> = LazyLock::new(|| {
    [
        leaper_attacks(&[(1, -1), (1, 1)]),
        leaper_attacks(&[(-1, -1), (-1, 1)]),
    ]
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_king_attacks_corner_and_center() {
        assert_eq!(KING_ATTACKS[0].count_ones(), 3);
        assert_eq!(KING_ATTACKS[27].count_ones(), 8);
    }

    #[test]
    fn test_pawn_attacks_do_not_wrap() {
        // White pawn on a2 only attacks b3
        assert_eq!(PAWN_ATTACKS[0][8], 1u64 << 17);
        // Black pawn on h7 only attacks g6
        assert_eq!(PAWN_ATTACKS[1][55], 1u64 << 46);
        assert_eq!(PAWN_ATTACKS[0][63], 0);
    }
}
