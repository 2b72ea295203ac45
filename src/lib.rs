//! Static evaluation core for a chess engine.
//!
//! Combines an incrementally updated NNUE network, a single-pawn endgame
//! bitbase and mating heuristics for simple endings. See [`board::evaluate`].

pub mod board;
pub mod engine;

pub use board::{evaluate, Board, Color, Move, NnueNetwork, Piece, Square};
pub use engine::{EngineController, EngineOptions};
