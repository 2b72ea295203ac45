//! Core chess types.
//!
//! This module contains the fundamental types the evaluation core reads:
//! - `Piece` and `Color` - chess piece types and colors
//! - `Square` - (rank, file) board square
//! - `Bitboard` - 64-bit board representation
//! - `Move` - compact move representation
//! - `CastlingRights` - castling state
//! - `MaterialSignature` - packed piece counts used for ending dispatch

mod bitboard;
mod castling;
mod material;
mod moves;
mod piece;
mod square;

pub use bitboard::{Bitboard, BitboardIter};
pub use castling::CastlingRights;
pub use material::{MaterialSignature, FIELD_MAX};
pub use moves::Move;
pub use piece::{Color, Piece};
pub use square::Square;

pub(crate) use square::{file_to_index, rank_to_index};
