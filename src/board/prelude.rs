//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types and functions.
//!
//! # Example
//! ```
//! use chess_eval::board::prelude::*;
//!
//! let network = NnueNetwork::synthetic(1).unwrap();
//! assert_eq!(evaluate(&mut Board::from_fen("8/8/8/8/8/8/8/K6k w - - 0 1"), &network), 0);
//! ```

pub use super::{
    evaluate, Board, BoardBuilder, CastlingRights, Color, FenError, MagicPolicy, Move,
    MoveParseError, NetworkError, NnueNetwork, Piece, Square, SquareError,
};
