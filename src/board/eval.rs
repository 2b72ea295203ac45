//! Position evaluation: material draws, endgame knowledge, then the network.

use super::endgame;
use super::nnue::NnueNetwork;
use super::{Board, Color, Piece, Square};

/// Score of mate at the root.
pub const CHECKMATE: i32 = 32_200;
/// Deepest ply a search may reach.
pub const MAX_SEARCH_PLY: i32 = 201;
/// Scores beyond this encode a forced mate.
pub const MATE_BOUND: i32 = CHECKMATE - MAX_SEARCH_PLY;
/// Scores beyond this encode a tablebase win; static evaluation stays inside.
pub const TB_WIN_BOUND: i32 = MATE_BOUND - MAX_SEARCH_PLY;

const CORNERED_BISHOP_PENALTY: i32 = 25;
const PHASE_SCALE: i32 = 128;

/// (bishop corner, own pawn, escape square) for each color.
const CORNERED_BISHOPS: [[(Square, Square, Square); 2]; 2] = [
    [
        (Square(0, 0), Square(1, 1), Square(2, 1)),
        (Square(0, 7), Square(1, 6), Square(2, 6)),
    ],
    [
        (Square(7, 0), Square(6, 1), Square(5, 1)),
        (Square(7, 7), Square(6, 6), Square(5, 6)),
    ],
];

/// Static evaluation in centipawns, relative to the side to move.
///
/// Brings the current ply's accumulators up to date if needed, which is why
/// the board is borrowed mutably. The result always lies strictly inside
/// `(-TB_WIN_BOUND, TB_WIN_BOUND)`.
pub fn evaluate(board: &mut Board, network: &NnueNetwork) -> i32 {
    if board.is_material_draw() {
        return 0;
    }
    if let Some(score) = endgame::evaluate_known(board) {
        return score;
    }

    board.ensure_accumulators(network);
    let stm = board.side_to_move();
    let (us, them) = board.accumulators.pair(board.ply, stm);
    let mut score = network.forward(us, them);

    if board.is_chess960() {
        score += cornered_bishop_correction(board);
    }
    // Contempt is caller supplied and unbounded
    let mut wide = i64::from(score) + i64::from(board.contempt_for(stm));
    wide = wide * i64::from(PHASE_SCALE + board.phase()) / i64::from(PHASE_SCALE);

    let bound = i64::from(TB_WIN_BOUND - 1);
    wide.clamp(-bound, bound) as i32
}

/// Penalty for a bishop shut in a corner by its own pawn, as seen by the side to move.
///
/// Only arises from non-standard starting setups.
#[must_use]
pub fn cornered_bishop_correction(board: &Board) -> i32 {
    let occupied = board.occupied();
    let mut white_penalty = 0;
    for color in Color::BOTH {
        let bishops = board.pieces(color, Piece::Bishop);
        let pawns = board.pieces(color, Piece::Pawn);
        let mut penalty = 0;
        for &(corner, pawn, escape) in &CORNERED_BISHOPS[color.index()] {
            if bishops.contains(corner) && pawns.contains(pawn) {
                let blocked = i32::from(occupied.contains(escape));
                penalty += (3 + blocked) * CORNERED_BISHOP_PENALTY;
            }
        }
        white_penalty += match color {
            Color::White => -penalty,
            Color::Black => penalty,
        };
    }
    match board.side_to_move() {
        Color::White => white_penalty,
        Color::Black => -white_penalty,
    }
}
