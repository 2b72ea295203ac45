//! Evaluation pipeline tests: short-circuits, scaling, contempt and bounds.

use super::KIWIPETE;
use crate::board::endgame::{classify, EndgameKind, WINNING_ENDGAME};
use crate::board::{
    evaluate, Board, BoardBuilder, Color, NnueNetwork, Piece, Square, TB_WIN_BOUND,
};

const MIDDLEGAMES: [&str; 4] = [
    "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
    KIWIPETE,
    "r1bq1rk1/pp2bppp/2n1pn2/3p4/2PP4/2N1PN2/PP3PPP/R2QKB1R b KQ - 0 8",
    "8/5pk1/6p1/8/3R4/6P1/5PK1/2r5 w - - 0 40",
];

#[test]
fn test_scores_stay_inside_tablebase_bound() {
    for seed in [1, 2, 3] {
        let network = NnueNetwork::synthetic(seed).unwrap();
        for fen in MIDDLEGAMES {
            let mut board = Board::from_fen(fen);
            board.set_contempt(500, Color::White);
            let score = evaluate(&mut board, &network);
            assert!(score.abs() < TB_WIN_BOUND, "{fen}: {score}");
        }
    }
}

#[test]
fn test_clamp_holds_for_extreme_networks() {
    let mut network = NnueNetwork::synthetic(8).unwrap();
    network.output_weights = [[0; crate::board::nnue::HIDDEN_SIZE]; 2];
    network.output_bias = i32::MAX / 64;
    let mut board = Board::from_fen(MIDDLEGAMES[3]);
    assert_eq!(evaluate(&mut board, &network), TB_WIN_BOUND - 1);

    network.output_bias = -(i32::MAX / 64);
    board.reset_accumulators();
    assert_eq!(evaluate(&mut board, &network), -(TB_WIN_BOUND - 1));
}

#[test]
fn test_huge_contempt_saturates_at_bound() {
    let network = NnueNetwork::synthetic(8).unwrap();
    let fen = "rnb1kbnr/pppppppp/8/8/8/8/PPPPPPPP/RNB1KBNR w KQkq - 0 1";
    for (magnitude, favored, expected) in [
        (20_000_000, Color::White, TB_WIN_BOUND - 1),
        (20_000_000, Color::Black, -(TB_WIN_BOUND - 1)),
        (i32::MAX, Color::White, TB_WIN_BOUND - 1),
        (i32::MIN, Color::White, -(TB_WIN_BOUND - 1)),
    ] {
        let mut board = Board::from_fen(fen);
        assert_eq!(board.phase(), 20);
        board.set_contempt(magnitude, favored);
        assert_eq!(evaluate(&mut board, &network), expected, "{magnitude} {favored:?}");
    }
}

#[test]
fn test_full_material_is_unscaled_network_output() {
    let network = NnueNetwork::synthetic(5).unwrap();
    let mut board = Board::new();
    assert_eq!(board.phase(), 0);
    let raw = network.predict(&board);
    assert_eq!(evaluate(&mut board, &network), raw);
}

#[test]
fn test_phase_scales_network_output() {
    let network = NnueNetwork::synthetic(5).unwrap();
    let mut board = Board::from_fen("rnb1kbnr/pppppppp/8/8/8/8/PPPPPPPP/RNB1KBNR w KQkq - 0 1");
    assert_eq!(board.phase(), 20);
    let raw = network.predict(&board);
    assert_eq!(evaluate(&mut board, &network), raw * 148 / 128);
}

#[test]
fn test_contempt_follows_side_to_move() {
    let network = NnueNetwork::synthetic(6).unwrap();
    for (fen, sign) in [
        ("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1", 1),
        ("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR b KQkq - 0 1", -1),
    ] {
        let mut neutral = Board::from_fen(fen);
        let mut favored = Board::from_fen(fen);
        favored.set_contempt(30, Color::White);
        assert_eq!(
            evaluate(&mut favored, &network),
            evaluate(&mut neutral, &network) + sign * 30
        );
    }
}

#[test]
fn test_cornered_bishop_only_in_chess960() {
    let network = NnueNetwork::synthetic(7).unwrap();
    let fen = "1rkr4/pppppppp/8/8/8/1P6/1P1PPPPP/BRK1R3 w - - 0 1";
    let mut standard = Board::from_fen(fen);
    let mut shuffled = Board::from_fen(fen);
    shuffled.set_chess960(true);

    let base = evaluate(&mut standard, &network);
    let corrected = evaluate(&mut shuffled, &network);
    let scale = 128 + standard.phase();
    let raw = network.predict(&standard);
    assert_eq!(base, raw * scale / 128);
    assert_eq!(corrected, (raw - 100) * scale / 128);
}

#[test]
fn test_endgame_knowledge_precedes_network() {
    let network = NnueNetwork::synthetic(9).unwrap();
    let mut board = Board::from_fen("7k/8/5K2/8/8/8/8/R7 w - - 0 1");
    board.set_contempt(40, Color::Black);
    let score = evaluate(&mut board, &network);
    assert!(score > WINNING_ENDGAME, "{score}");
    assert_eq!(score, crate::board::endgame::evaluate_known(&board).unwrap());
}

fn minor_board(white: (u32, u32), black: (u32, u32)) -> Board {
    let mut builder = BoardBuilder::new()
        .piece(Square(0, 4), Color::White, Piece::King)
        .piece(Square(7, 4), Color::Black, Piece::King);
    let slots = [(Piece::Knight, [1, 6]), (Piece::Bishop, [2, 5])];
    for (color, rank, (knights, bishops)) in [
        (Color::White, 0, white),
        (Color::Black, 7, black),
    ] {
        for ((piece, files), count) in slots.iter().zip([knights, bishops]) {
            for &file in files.iter().take(count as usize) {
                builder = builder.piece(Square(rank, file), color, *piece);
            }
        }
    }
    builder.build().unwrap()
}

#[test]
fn test_material_draw_agrees_with_ending_table() {
    let network = NnueNetwork::synthetic(10).unwrap();
    let counts = [(0, 0), (1, 0), (0, 1), (2, 0), (1, 1), (0, 2)];
    for white in counts {
        for black in counts {
            let mut board = minor_board(white, black);
            let table_draw = classify(board.material_signature())
                == Some(EndgameKind::InsufficientMaterial);
            assert_eq!(
                board.is_material_draw(),
                table_draw,
                "{}",
                board.material_signature()
            );
            if table_draw {
                assert_eq!(evaluate(&mut board, &network), 0);
            }
        }
    }
}
