//! Fluent builder for constructing chess positions.
//!
//! Allows creating positions piece by piece rather than parsing FEN strings.
//!
//! # Example
//! ```
//! use chess_eval::board::{BoardBuilder, Color, Piece, Square};
//!
//! let board = BoardBuilder::new()
//!     .piece(Square(0, 4), Color::White, Piece::King)
//!     .piece(Square(7, 4), Color::Black, Piece::King)
//!     .piece(Square(1, 0), Color::White, Piece::Pawn)
//!     .side_to_move(Color::White)
//!     .build()
//!     .unwrap();
//! assert_eq!(board.material_signature().to_string(), "KPvK");
//! ```

use super::{Board, CastlingRights, Color, FenError, Piece, Square};

/// A fluent builder for constructing `Board` positions.
#[derive(Clone, Debug)]
pub struct BoardBuilder {
    pieces: Vec<(Square, Color, Piece)>,
    side_to_move: Color,
    castling_rights: CastlingRights,
    en_passant_target: Option<Square>,
    chess960: bool,
    contempt: Option<(i32, Color)>,
}

impl Default for BoardBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl BoardBuilder {
    /// Create a new empty board builder.
    #[must_use]
    pub fn new() -> Self {
        BoardBuilder {
            pieces: Vec::new(),
            side_to_move: Color::White,
            castling_rights: CastlingRights::none(),
            en_passant_target: None,
            chess960: false,
            contempt: None,
        }
    }

    /// Create a builder starting from the standard initial position.
    #[must_use]
    pub fn starting_position() -> Self {
        let board = Board::new();
        let mut builder = Self::new();
        builder.pieces = board
            .piece_squares()
            .map(|(color, piece, sq)| (sq, color, piece))
            .collect();
        builder.castling_rights = CastlingRights::all();
        builder
    }

    /// Place a piece on the board.
    #[must_use]
    pub fn piece(mut self, square: Square, color: Color, piece: Piece) -> Self {
        // Remove any existing piece on this square
        self.pieces.retain(|(sq, _, _)| *sq != square);
        self.pieces.push((square, color, piece));
        self
    }

    /// Remove a piece from a square.
    #[must_use]
    pub fn clear(mut self, square: Square) -> Self {
        self.pieces.retain(|(sq, _, _)| *sq != square);
        self
    }

    /// Set the side to move.
    #[must_use]
    pub const fn side_to_move(mut self, color: Color) -> Self {
        self.side_to_move = color;
        self
    }

    /// Set castling rights.
    #[must_use]
    pub const fn castling(mut self, rights: CastlingRights) -> Self {
        self.castling_rights = rights;
        self
    }

    /// Set the en passant target square.
    #[must_use]
    pub const fn en_passant(mut self, target: Square) -> Self {
        self.en_passant_target = Some(target);
        self
    }

    /// Mark the position as coming from a non-standard starting setup.
    #[must_use]
    pub const fn chess960(mut self, enabled: bool) -> Self {
        self.chess960 = enabled;
        self
    }

    /// Favor `favored` by `magnitude` centipawns.
    #[must_use]
    pub const fn contempt(mut self, magnitude: i32, favored: Color) -> Self {
        self.contempt = Some((magnitude, favored));
        self
    }

    /// Build the board.
    ///
    /// Fails with [`FenError::KingCount`] unless each side has exactly one king,
    /// and with [`FenError::PawnOnBackRank`] for a pawn on the first or eighth rank.
    pub fn build(self) -> Result<Board, FenError> {
        let mut board = Board::empty();

        for (square, color, piece) in self.pieces {
            board.set_piece(square, color, piece);
        }
        board.validate_setup()?;

        board.white_to_move = self.side_to_move == Color::White;
        board.castling_rights = self.castling_rights;
        board.en_passant_target = self.en_passant_target;
        board.chess960 = self.chess960;
        if let Some((magnitude, favored)) = self.contempt {
            board.set_contempt(magnitude, favored);
        }

        Ok(board)
    }
}
