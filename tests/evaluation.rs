use serde::Deserialize;

use chess_eval::board::endgame::WINNING_ENDGAME;
use chess_eval::board::prelude::*;
use chess_eval::board::TB_WIN_BOUND;
use chess_eval::engine::{EngineController, EngineOptions};

#[derive(Deserialize)]
struct EndingSet {
    positions: Vec<Ending>,
}

#[derive(Deserialize)]
#[serde(rename_all = "lowercase")]
enum Outcome {
    Draw,
    Win,
    Loss,
}

#[derive(Deserialize)]
struct Ending {
    name: String,
    fen: String,
    outcome: Outcome,
}

fn network() -> NnueNetwork {
    NnueNetwork::synthetic(99).expect("synthetic network")
}

#[test]
fn known_endings_suite() {
    let data = include_str!("data/endings.json");
    let set: EndingSet = serde_json::from_str(data).expect("invalid endings.json");
    let network = network();

    for ending in &set.positions {
        let mut board = Board::from_fen(&ending.fen);
        board.set_contempt(60, Color::White);
        let score = evaluate(&mut board, &network);
        match ending.outcome {
            Outcome::Draw => assert_eq!(score, 0, "{}", ending.name),
            Outcome::Win => assert!(score > WINNING_ENDGAME, "{}: {score}", ending.name),
            Outcome::Loss => assert!(score < -WINNING_ENDGAME, "{}: {score}", ending.name),
        }
        assert!(score.abs() < TB_WIN_BOUND, "{}: {score}", ending.name);
    }
}

#[test]
fn bishop_knight_corner_ordering() {
    let network = network();
    let mut corner = Board::from_fen("k7/8/2K5/8/4B3/8/8/6N1 w - - 0 1");
    let mut center = Board::from_fen("8/8/3K4/8/3k4/8/8/5B1N w - - 0 1");
    let corner_score = evaluate(&mut corner, &network);
    let center_score = evaluate(&mut center, &network);
    assert!(corner_score > center_score);
    assert!(center_score > WINNING_ENDGAME);
}

#[test]
fn incremental_round_trip_matches_recompute() {
    let network = network();
    let mut fresh = Board::new();
    let expected = evaluate(&mut fresh, &network);
    assert_eq!(evaluate(&mut Board::new(), &network), expected);

    let mut board = Board::new();
    evaluate(&mut board, &network);
    let mut history = Vec::new();
    for uci in ["e2e4", "c7c5", "g1f3", "d7d6", "d2d4", "c5d4", "f3d4", "g8f6", "b1c3", "a7a6"] {
        let mv = board.parse_move(uci).unwrap();
        history.push((mv, board.make_move(mv, Some(&network))));
        let incremental = evaluate(&mut board, &network);
        let mut rebuilt = Board::from_fen(&board.to_fen());
        assert_eq!(incremental, evaluate(&mut rebuilt, &network), "after {uci}");
    }
    while let Some((mv, info)) = history.pop() {
        board.unmake_move(mv, info);
    }
    assert_eq!(evaluate(&mut board, &network), expected);
}

#[test]
fn controller_configures_boards() {
    let mut controller =
        EngineController::with_network(EngineOptions::new(), network());
    assert!(controller
        .handle_setoption_line("setoption name Contempt value 25")
        .unwrap());

    let mut neutral = Board::new();
    let baseline = controller.evaluate(&mut neutral);
    let mut board = Board::new();
    controller.prepare_board(&mut board);
    assert_eq!(controller.evaluate(&mut board), baseline + 25);
}

#[test]
fn builder_positions_evaluate_like_fen() {
    let network = network();
    let mut built = BoardBuilder::new()
        .piece(Square(0, 6), Color::White, Piece::King)
        .piece(Square(7, 6), Color::Black, Piece::King)
        .piece(Square(1, 5), Color::White, Piece::Pawn)
        .piece(Square(6, 5), Color::Black, Piece::Pawn)
        .piece(Square(3, 3), Color::White, Piece::Rook)
        .piece(Square(4, 4), Color::Black, Piece::Knight)
        .build()
        .unwrap();
    let mut parsed = Board::from_fen("6k1/5p2/8/4n3/3R4/8/5P2/6K1 w - - 0 1");
    assert_eq!(built.to_fen(), parsed.to_fen());
    assert_eq!(evaluate(&mut built, &network), evaluate(&mut parsed, &network));
}
