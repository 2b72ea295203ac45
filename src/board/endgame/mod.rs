//! Endgame knowledge: drawn material, single-pawn bitbase and mating
//! heuristics for endings the network handles poorly.
//!
//! Scores from [`evaluate_known`] are relative to the side to move. Won
//! endings sit above [`WINNING_ENDGAME`] and grow as the defending king is
//! driven toward the edge or corner where mate happens.

mod kpk;
mod table;

pub use kpk::{kpk_draw, KPK_POSITIONS, KPK_TABLE_BYTES};
pub use table::{classify, known_signatures, EndgameKind};

use crate::board::{Board, Color, Piece, Square};

/// Base score of a won ending.
pub const WINNING_ENDGAME: i32 = 20_000;

const PAWN_QUEENING_OFFSET: i32 = 10;
const PAWN_KING_OFFSET: i32 = 2;
// Keeps every mating-material score above the best pawn-ending score
const MAJOR_ENDGAME_OFFSET: i32 = PAWN_QUEENING_OFFSET * 10 + PAWN_KING_OFFSET * 10;
const LOSING_KING_EDGE_OFFSET: i32 = 2;
const WINNING_KING_DISTANCE_OFFSET: i32 = 10;
const BISHOP_CORNER_OFFSET: i32 = 30;

/// Score a recognized ending, or `None` when the material is not recognized.
#[must_use]
pub fn evaluate_known(board: &Board) -> Option<i32> {
    let (strong, score) = match classify(board.material_signature())? {
        EndgameKind::InsufficientMaterial => return Some(0),
        EndgameKind::PawnEnding { strong } => (strong, pawn_ending(board, strong)?),
        EndgameKind::MajorPieces { strong } => (strong, major_pieces(board, strong)),
        EndgameKind::BishopKnight { strong } => (strong, bishop_knight(board, strong)),
    };
    Some(if strong == board.side_to_move() {
        score
    } else {
        -score
    })
}

/// Distance from the nearest edge along one coordinate: 0 on the edge, 3 in the center.
#[inline]
fn edge_distance(coord: usize) -> i32 {
    (if coord > 3 { 7 - coord } else { coord }) as i32
}

fn material(board: &Board, color: Color) -> i32 {
    let sig = board.material_signature();
    Piece::NON_KING
        .iter()
        .map(|&p| sig.count(color, p) as i32 * p.value())
        .sum()
}

/// Reward the strong king for closing in and the weak king for being near an edge.
fn push_to_edge(board: &Board, strong: Color) -> i32 {
    let winning_king = board.king_square(strong);
    let losing_king = board.king_square(strong.opponent());
    let king_distance = winning_king.distance(losing_king) as i32;
    WINNING_KING_DISTANCE_OFFSET * (7 - king_distance)
        + LOSING_KING_EDGE_OFFSET * (3 - edge_distance(losing_king.file()))
        + LOSING_KING_EDGE_OFFSET * (3 - edge_distance(losing_king.rank()))
}

/// `Some(0)` for bitbase draws, otherwise a won score that rises as the
/// pawn and its king approach the queening square.
fn pawn_ending(board: &Board, strong: Color) -> Option<i32> {
    let pawn = board.pieces(strong, Piece::Pawn).lsb()?;
    // An unpromoted pawn on a back rank has no bitbase entry
    if pawn.rank() == 0 || pawn.rank() == 7 {
        return None;
    }
    let strong_king = board.king_square(strong);
    let weak_king = board.king_square(strong.opponent());
    if kpk_draw(strong, strong_king, weak_king, pawn, board.side_to_move()) {
        return Some(0);
    }
    let queening = Square(strong.pawn_promotion_rank(), pawn.file());
    Some(
        WINNING_ENDGAME
            + PAWN_QUEENING_OFFSET * (7 - pawn.distance(queening) as i32)
            + PAWN_KING_OFFSET * (7 - strong_king.distance(queening) as i32),
    )
}

fn major_pieces(board: &Board, strong: Color) -> i32 {
    WINNING_ENDGAME + MAJOR_ENDGAME_OFFSET + material(board, strong) + push_to_edge(board, strong)
}

/// The weak king must be driven to a corner of the bishop's color.
fn bishop_knight(board: &Board, strong: Color) -> i32 {
    let losing_king = board.king_square(strong.opponent());
    let winning_king = board.king_square(strong);
    let corners = match board.pieces(strong, Piece::Bishop).lsb() {
        Some(bishop) if bishop.is_light() => [Square(7, 0), Square(0, 7)],
        _ => [Square(0, 0), Square(7, 7)],
    };
    let corner_distance = corners
        .iter()
        .map(|&c| losing_king.distance(c))
        .min()
        .unwrap_or(7) as i32;

    WINNING_ENDGAME
        + material(board, strong)
        + WINNING_KING_DISTANCE_OFFSET * (7 - winning_king.distance(losing_king) as i32)
        + BISHOP_CORNER_OFFSET * (7 - corner_distance)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_distance() {
        assert_eq!(edge_distance(0), 0);
        assert_eq!(edge_distance(3), 3);
        assert_eq!(edge_distance(4), 3);
        assert_eq!(edge_distance(7), 0);
    }

    #[test]
    fn test_krk_prefers_cornered_king() {
        let edge = Board::from_fen("7k/8/5K2/8/8/8/8/R7 w - - 0 1");
        let center = Board::from_fen("8/8/8/3k4/8/3K4/8/R7 w - - 0 1");
        let edge_score = evaluate_known(&edge).unwrap();
        let center_score = evaluate_known(&center).unwrap();
        assert!(edge_score > WINNING_ENDGAME);
        assert!(edge_score > center_score);
    }

    #[test]
    fn test_score_sign_follows_side_to_move() {
        let white = Board::from_fen("7k/8/5K2/8/8/8/8/Q7 w - - 0 1");
        let black = Board::from_fen("7k/8/5K2/8/8/8/8/Q7 b - - 0 1");
        assert_eq!(evaluate_known(&white), evaluate_known(&black).map(|s| -s));
    }

    #[test]
    fn test_kbnk_prefers_bishop_corner() {
        // Light-squared bishop on e4 covers a8 and h1
        let light_corner = Board::from_fen("k7/8/2K5/8/4B3/8/8/6N1 w - - 0 1");
        let center = Board::from_fen("8/8/3K4/8/3k4/8/8/5B1N w - - 0 1");
        let dark_corner = Board::from_fen("8/8/8/8/4B3/2K5/8/k5N1 w - - 0 1");

        let light = evaluate_known(&light_corner).unwrap();
        let middle = evaluate_known(&center).unwrap();
        let dark = evaluate_known(&dark_corner).unwrap();
        assert!(light > middle, "{light} <= {middle}");
        assert!(middle > dark, "{middle} <= {dark}");
    }

    #[test]
    fn test_kpk_draw_scores_zero() {
        let board = Board::from_fen("8/1k6/8/8/P7/8/8/7K w - - 0 1");
        assert_eq!(evaluate_known(&board), Some(0));
    }

    #[test]
    fn test_kpk_win_rewards_advanced_pawn() {
        let board = Board::from_fen("4k3/8/4K3/4P3/8/8/8/8 w - - 0 1");
        let further = Board::from_fen("4k3/4P3/3K4/8/8/8/8/8 b - - 0 1");
        let score = evaluate_known(&board).unwrap();
        assert!(score > WINNING_ENDGAME);
        assert!(score < WINNING_ENDGAME + MAJOR_ENDGAME_OFFSET);
        // Black to move, so the score is negative for the side to move
        assert!(-evaluate_known(&further).unwrap() > score);
    }

    #[test]
    fn test_unpromoted_back_rank_pawn_is_not_scored() {
        let mut board = Board::from_fen("4k3/P7/8/8/8/8/8/4K3 w - - 0 1");
        assert!(evaluate_known(&board).unwrap() > WINNING_ENDGAME);
        board.make_move_uci("a7a8").unwrap();
        assert_eq!(evaluate_known(&board), None);
    }

    #[test]
    fn test_unrecognized_material() {
        assert_eq!(evaluate_known(&Board::new()), None);
    }
}
