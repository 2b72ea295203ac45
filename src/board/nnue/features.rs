//! Input feature layout.
//!
//! Each perspective sees the board from its own side: the Black perspective
//! mirrors squares vertically so both views share one weight table. Files
//! e-h fold onto d-a, and a 2x2 king bucket records whether the piece shares
//! the king's file half and rank half.

use crate::board::{Color, Piece, Square};

/// Features per king bucket.
pub const BUCKET_STRIDE: usize = 32;

/// Features per (piece type, relative color) pair.
pub const PIECE_STRIDE: usize = 4 * BUCKET_STRIDE;

/// Total input features: 6 piece types x 2 relative colors x 4 buckets x 32 squares.
pub const N_FEATURES: usize = 12 * PIECE_STRIDE;

#[rustfmt::skip]
const HALF_PSQT: [usize; 64] = [
     0,  1,  2,  3,  3,  2,  1,  0,
     4,  5,  6,  7,  7,  6,  5,  4,
     8,  9, 10, 11, 11, 10,  9,  8,
    12, 13, 14, 15, 15, 14, 13, 12,
    16, 17, 18, 19, 19, 18, 17, 16,
    20, 21, 22, 23, 23, 22, 21, 20,
    24, 25, 26, 27, 27, 26, 25, 24,
    28, 29, 30, 31, 31, 30, 29, 28,
];

// [perspective][piece color][piece type]
const PIECE_OFFSETS: [[[usize; 6]; 2]; 2] = build_piece_offsets();

const fn build_piece_offsets() -> [[[usize; 6]; 2]; 2] {
    let mut table = [[[0; 6]; 2]; 2];
    let mut perspective = 0;
    while perspective < 2 {
        let mut color = 0;
        while color < 2 {
            let mut piece = 0;
            while piece < 6 {
                let theirs = (perspective != color) as usize;
                table[perspective][color][piece] = (piece * 2 + theirs) * PIECE_STRIDE;
                piece += 1;
            }
            color += 1;
        }
        perspective += 1;
    }
    table
}

/// King bucket of `sq` relative to `king`, in `0..4`.
#[inline]
#[must_use]
pub const fn king_bucket(king: Square, sq: Square) -> usize {
    let (k, s) = (king.index(), sq.index());
    2 * ((k & 4) == (s & 4)) as usize + ((k & 32) == (s & 32)) as usize
}

/// True when a king move from `from` to `to` changes the bucket of some square.
#[inline]
#[must_use]
pub const fn king_bucket_changed(from: Square, to: Square) -> bool {
    (from.index() ^ to.index()) & 36 != 0
}

/// Index of the feature for `piece` of `color` on `sq`, seen by `perspective`
/// whose king stands on `king`.
#[inline]
#[must_use]
pub fn feature_index(
    perspective: Color,
    color: Color,
    piece: Piece,
    sq: Square,
    king: Square,
) -> usize {
    let oriented = match perspective {
        Color::White => sq.index(),
        Color::Black => sq.index() ^ 56,
    };
    let idx = PIECE_OFFSETS[perspective.index()][color.index()][piece.index()]
        + king_bucket(king, sq) * BUCKET_STRIDE
        + HALF_PSQT[oriented];
    debug_assert!(idx < N_FEATURES);
    idx
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn all_squares() -> impl Iterator<Item = Square> {
        (0..64).map(Square::from_index)
    }

    #[test]
    fn test_indices_in_range_and_distinct() {
        for perspective in Color::BOTH {
            for king in all_squares() {
                let mut seen = HashSet::new();
                for color in Color::BOTH {
                    for piece in Piece::ALL {
                        for sq in all_squares() {
                            let idx = feature_index(perspective, color, piece, sq, king);
                            assert!(idx < N_FEATURES);
                            seen.insert(idx);
                        }
                    }
                }
                // The bucket separates the two folded files
                assert_eq!(seen.len(), 2 * 6 * 64);
            }
        }
    }

    #[test]
    fn test_perspectives_are_mirror_images() {
        for king in all_squares() {
            for color in Color::BOTH {
                for piece in Piece::ALL {
                    for sq in all_squares() {
                        let white = feature_index(Color::White, color, piece, sq, king);
                        let black = feature_index(
                            Color::Black,
                            color.opponent(),
                            piece,
                            sq.flip_vertical(),
                            king.flip_vertical(),
                        );
                        assert_eq!(white, black);
                    }
                }
            }
        }
    }

    #[test]
    fn test_king_bucket_boundaries() {
        let e1 = Square(0, 4);
        assert_eq!(king_bucket(e1, Square(0, 7)), 3);
        assert_eq!(king_bucket(e1, Square(0, 0)), 1);
        assert_eq!(king_bucket(e1, Square(7, 7)), 2);
        assert_eq!(king_bucket(e1, Square(7, 0)), 0);
        assert!(!king_bucket_changed(e1, Square(0, 6)));
        assert!(king_bucket_changed(e1, Square(0, 2)));
        assert!(king_bucket_changed(Square(3, 4), Square(4, 4)));
    }
}
