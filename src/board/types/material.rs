//! Packed material signature.
//!
//! One 4-bit field per (piece type, color) pair for pawns through queens,
//! laid out as `(piece * 2 + color) * 4`. Kings are never counted. Fields
//! saturate at 15, which no legal position reaches.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::piece::{Color, Piece};

const FIELD_BITS: u32 = 4;
const FIELD_MASK: u64 = (1 << FIELD_BITS) - 1;

/// Largest count a single field can hold.
pub const FIELD_MAX: u32 = FIELD_MASK as u32;

/// Packed per-(piece, color) piece counts.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MaterialSignature(u64);

impl MaterialSignature {
    /// Bare kings.
    pub const KINGS_ONLY: MaterialSignature = MaterialSignature(0);

    #[inline]
    const fn shift(color: Color, piece: Piece) -> u32 {
        ((piece.index() * 2 + color.index()) as u32) * FIELD_BITS
    }

    /// Number of `piece`s of `color`. Always 0 for kings.
    #[inline]
    #[must_use]
    pub const fn count(self, color: Color, piece: Piece) -> u32 {
        if matches!(piece, Piece::King) {
            return 0;
        }
        ((self.0 >> Self::shift(color, piece)) & FIELD_MASK) as u32
    }

    /// Copy of the signature with one field replaced, saturating at [`FIELD_MAX`].
    #[inline]
    #[must_use]
    pub const fn with_count(self, color: Color, piece: Piece, count: u32) -> Self {
        if matches!(piece, Piece::King) {
            return self;
        }
        let count = if count > FIELD_MAX { FIELD_MAX } else { count };
        let shift = Self::shift(color, piece);
        MaterialSignature((self.0 & !(FIELD_MASK << shift)) | ((count as u64) << shift))
    }

    /// Build a signature from explicit piece lists, one per color.
    #[must_use]
    pub fn from_pieces(white: &[Piece], black: &[Piece]) -> Self {
        let mut sig = Self::KINGS_ONLY;
        for (color, pieces) in [(Color::White, white), (Color::Black, black)] {
            for &piece in pieces {
                sig = sig.with_count(color, piece, sig.count(color, piece) + 1);
            }
        }
        sig
    }

    /// Swap the two colors' fields.
    #[must_use]
    pub fn mirrored(self) -> Self {
        let mut sig = Self::KINGS_ONLY;
        for piece in Piece::NON_KING {
            sig = sig
                .with_count(Color::White, piece, self.count(Color::Black, piece))
                .with_count(Color::Black, piece, self.count(Color::White, piece));
        }
        sig
    }
}

impl fmt::Debug for MaterialSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MaterialSignature({self} {:#x})", self.0)
    }
}

impl fmt::Display for MaterialSignature {
    /// Renders as e.g. `KBNvK`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, color) in Color::BOTH.into_iter().enumerate() {
            if i == 1 {
                write!(f, "v")?;
            }
            write!(f, "K")?;
            for piece in Piece::NON_KING.iter().rev() {
                for _ in 0..self.count(color, *piece) {
                    write!(f, "{}", piece.to_char().to_ascii_uppercase())?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields_are_independent() {
        let sig = MaterialSignature::from_pieces(&[Piece::Bishop, Piece::Knight], &[Piece::Pawn]);
        assert_eq!(sig.count(Color::White, Piece::Bishop), 1);
        assert_eq!(sig.count(Color::White, Piece::Knight), 1);
        assert_eq!(sig.count(Color::Black, Piece::Pawn), 1);
        assert_eq!(sig.count(Color::White, Piece::Pawn), 0);
        assert_eq!(sig.to_string(), "KBNvKP");
    }

    #[test]
    fn test_field_saturates() {
        let sig = MaterialSignature::KINGS_ONLY.with_count(Color::Black, Piece::Queen, 40);
        assert_eq!(sig.count(Color::Black, Piece::Queen), FIELD_MAX);
        assert_eq!(sig.count(Color::White, Piece::Queen), 0);
        assert_eq!(sig.count(Color::Black, Piece::Rook), 0);
    }

    #[test]
    fn test_mirror_swaps_colors() {
        let sig = MaterialSignature::from_pieces(&[Piece::Rook], &[]);
        let mirrored = sig.mirrored();
        assert_eq!(mirrored.count(Color::Black, Piece::Rook), 1);
        assert_eq!(mirrored.count(Color::White, Piece::Rook), 0);
        assert_eq!(mirrored.mirrored(), sig);
    }

    #[test]
    fn test_kings_not_counted() {
        let sig = MaterialSignature::KINGS_ONLY.with_count(Color::White, Piece::King, 1);
        assert_eq!(sig, MaterialSignature::KINGS_ONLY);
    }
}
