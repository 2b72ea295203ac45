//! Make/unmake move tests.

use super::KIWIPETE;
use crate::board::{Board, Color, MaterialSignature, Move, Piece, Square, UnmakeInfo};

fn play(board: &mut Board, moves: &[&str]) -> Vec<(Move, UnmakeInfo)> {
    moves
        .iter()
        .map(|uci| {
            let mv = board.parse_move(uci).expect("legal test move");
            (mv, board.make_move(mv, None))
        })
        .collect()
}

fn take_back(board: &mut Board, history: Vec<(Move, UnmakeInfo)>) {
    for (mv, info) in history.into_iter().rev() {
        board.unmake_move(mv, info);
    }
}

#[test]
fn test_opening_sequence_round_trip() {
    let mut board = Board::new();
    let start = board.to_fen();
    let history = play(
        &mut board,
        &["e2e4", "e7e5", "g1f3", "b8c6", "f1c4", "g8f6", "e1g1"],
    );

    assert_eq!(
        board.to_fen(),
        "r1bqkb1r/pppp1ppp/2n2n2/4p3/2B1P3/5N2/PPPP1PPP/RNBQ1RK1 b kq - 5 1"
    );
    assert_eq!(board.ply(), 7);
    assert_eq!(board.king_square(Color::White), Square(0, 6));

    take_back(&mut board, history);
    assert_eq!(board.to_fen(), start);
    assert_eq!(board.ply(), 0);
    assert_eq!(board.king_square(Color::White), Square(0, 4));
}

#[test]
fn test_en_passant_make_unmake() {
    let mut board =
        Board::from_fen("rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3");
    let original = board.to_fen();
    let history = play(&mut board, &["e5f6"]);

    assert!(board.piece_at(Square(4, 5)).is_none());
    assert_eq!(board.material_signature().count(Color::Black, Piece::Pawn), 7);
    assert_eq!(board.halfmove_clock(), 0);

    take_back(&mut board, history);
    assert_eq!(board.to_fen(), original);
    assert_eq!(board.material_signature().count(Color::Black, Piece::Pawn), 8);
}

#[test]
fn test_promotion_make_unmake() {
    let mut board = Board::from_fen("8/P7/8/8/8/8/8/K1k5 w - - 0 1");
    let phase = board.phase();
    let history = play(&mut board, &["a7a8q"]);

    assert_eq!(
        board.material_signature(),
        MaterialSignature::from_pieces(&[Piece::Queen], &[])
    );
    assert!(board.phase() < phase);

    take_back(&mut board, history);
    assert_eq!(
        board.piece_at(Square(6, 0)),
        Some((Color::White, Piece::Pawn))
    );
    assert_eq!(board.phase(), phase);
}

#[test]
fn test_rook_capture_clears_castling_right() {
    let mut board = Board::from_fen("r3k2r/8/8/8/8/8/6B1/R3K2R w KQkq - 0 1");
    let history = play(&mut board, &["g2a8"]);
    assert!(!board.castling_rights().has(Color::Black, false));
    assert!(board.castling_rights().has(Color::Black, true));

    take_back(&mut board, history);
    assert!(board.castling_rights().has(Color::Black, false));
}

#[test]
fn test_kiwipete_castling_both_ways() {
    for (uci, king, rook) in [
        ("e1g1", Square(0, 6), Square(0, 5)),
        ("e1c1", Square(0, 2), Square(0, 3)),
    ] {
        let mut board = Board::from_fen(KIWIPETE);
        let history = play(&mut board, &[uci]);
        assert_eq!(board.piece_at(king), Some((Color::White, Piece::King)));
        assert_eq!(board.piece_at(rook), Some((Color::White, Piece::Rook)));
        assert!(!board.castling_rights().has(Color::White, true));
        assert!(!board.castling_rights().has(Color::White, false));

        take_back(&mut board, history);
        assert_eq!(board.to_fen(), KIWIPETE);
    }
}

#[test]
fn test_null_move_make_unmake_restores_ep() {
    let mut board =
        Board::from_fen("rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3");
    let original = board.to_fen();

    let info = board.make_null_move(None);
    assert_eq!(board.en_passant_target(), None);
    assert_eq!(board.side_to_move(), Color::Black);
    assert_eq!(board.ply(), 1);

    board.unmake_null_move(info);
    assert_eq!(board.to_fen(), original);
    assert_eq!(board.ply(), 0);
}
