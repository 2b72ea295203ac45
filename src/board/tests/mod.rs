//! Board module tests.
//!
//! Tests are organized into separate files by category:
//! - `make_unmake.rs` - Make/unmake move correctness
//! - `incremental.rs` - Incremental accumulators against full rebuilds
//! - `eval.rs` - Evaluation pipeline ordering, scaling and bounds
//! - `proptest.rs` - Property-based tests

mod eval;
mod make_unmake;

use crate::board::{Board, Color, NnueNetwork};

pub(super) const KIWIPETE: &str =
    "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";

/// Panics unless both accumulators of the current ply match a full rebuild.
pub(super) fn assert_accumulators_in_sync(board: &Board, network: &NnueNetwork) {
    for perspective in Color::BOTH {
        let incremental = board
            .accumulators()
            .get(board.ply(), perspective)
            .unwrap_or_else(|| panic!("{perspective:?} accumulator stale at ply {}", board.ply()));
        assert_eq!(
            *incremental,
            network.refresh(board, perspective),
            "{perspective:?} perspective after {}",
            board.to_fen()
        );
    }
}
