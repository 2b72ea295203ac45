//! Chess position representation and static evaluation.
//!
//! Uses bitboards for piece placement and keeps per-ply network
//! accumulators in step with [`Board::make_move`] / [`Board::unmake_move`].
//!
//! # Example
//! ```
//! use chess_eval::board::{evaluate, Board, NnueNetwork};
//!
//! let network = NnueNetwork::synthetic(7).unwrap();
//! let mut board = Board::new();
//! board.make_move_uci("e2e4").unwrap();
//! let score = evaluate(&mut board, &network);
//! println!("Black to move scores {score}");
//! ```

mod attack_tables;
mod builder;
pub mod endgame;
mod error;
mod eval;
mod fen;
mod make_unmake;
pub mod nnue;
pub mod prelude;
mod state;
mod types;

#[cfg(test)]
mod tests;

// Public API - types users need
pub use builder::BoardBuilder;
pub use error::{FenError, MoveParseError, NetworkError, SquareError};
pub use state::{Board, MAX_PHASE};
pub use types::{
    Bitboard, BitboardIter, CastlingRights, Color, MaterialSignature, Move, Piece, Square,
    FIELD_MAX,
};

// Public API - evaluation
pub use eval::{
    cornered_bishop_correction, evaluate, CHECKMATE, MATE_BOUND, MAX_SEARCH_PLY, TB_WIN_BOUND,
};
pub use nnue::{MagicPolicy, NnueNetwork, SimdBackend};

// Internal types exposed for advanced usage
pub use state::{NullMoveInfo, UnmakeInfo};

pub(crate) use types::{file_to_index, rank_to_index};
