use super::nnue::{AccumulatorHistory, NnueNetwork};
use super::{Bitboard, CastlingRights, Color, FenError, MaterialSignature, Piece, Square};

/// Phase units at which a position counts as a pure middlegame.
pub const MAX_PHASE: i32 = 64;

/// State needed to take back a move made with [`Board::make_move`].
#[derive(Clone, Debug)]
pub struct UnmakeInfo {
    pub(crate) captured: Option<(Color, Piece, Square)>,
    pub(crate) previous_en_passant_target: Option<Square>,
    pub(crate) previous_castling_rights: CastlingRights,
    pub(crate) previous_halfmove_clock: u32,
}

/// State needed to take back [`Board::make_null_move`].
#[derive(Clone, Debug)]
pub struct NullMoveInfo {
    pub(crate) previous_en_passant_target: Option<Square>,
}

#[derive(Clone, Debug)]
pub struct Board {
    pub(crate) pieces: [[Bitboard; 6]; 2],
    pub(crate) occupied: [Bitboard; 2],
    pub(crate) all_occupied: Bitboard,
    pub(crate) king_squares: [Square; 2],
    pub(crate) white_to_move: bool,
    pub(crate) en_passant_target: Option<Square>,
    pub(crate) castling_rights: CastlingRights,
    pub(crate) halfmove_clock: u32,
    pub(crate) material: MaterialSignature,
    pub(crate) phase_material: i32,
    pub(crate) contempt: [i32; 2],
    pub(crate) chess960: bool,
    pub(crate) ply: usize,
    pub(crate) accumulators: AccumulatorHistory,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    pub fn new() -> Self {
        let mut board = Board::empty();
        let back_rank = [
            Piece::Rook,
            Piece::Knight,
            Piece::Bishop,
            Piece::Queen,
            Piece::King,
            Piece::Bishop,
            Piece::Knight,
            Piece::Rook,
        ];
        for (i, piece) in back_rank.iter().enumerate() {
            board.set_piece(Square(0, i), Color::White, *piece);
            board.set_piece(Square(7, i), Color::Black, *piece);
            board.set_piece(Square(1, i), Color::White, Piece::Pawn);
            board.set_piece(Square(6, i), Color::Black, Piece::Pawn);
        }

        board.castling_rights = CastlingRights::all();
        board.white_to_move = true;
        board
    }

    pub(crate) fn empty() -> Self {
        Board {
            pieces: [[Bitboard(0); 6]; 2],
            occupied: [Bitboard(0); 2],
            all_occupied: Bitboard(0),
            king_squares: [Square(0, 4), Square(7, 4)],
            white_to_move: true,
            en_passant_target: None,
            castling_rights: CastlingRights::none(),
            halfmove_clock: 0,
            material: MaterialSignature::KINGS_ONLY,
            phase_material: 0,
            contempt: [0, 0],
            chess960: false,
            ply: 0,
            accumulators: AccumulatorHistory::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn pieces(&self, color: Color, piece: Piece) -> Bitboard {
        self.pieces[color.index()][piece.index()]
    }

    #[inline]
    #[must_use]
    pub fn occupied_by(&self, color: Color) -> Bitboard {
        self.occupied[color.index()]
    }

    #[inline]
    #[must_use]
    pub fn occupied(&self) -> Bitboard {
        self.all_occupied
    }

    #[inline]
    #[must_use]
    pub fn king_square(&self, color: Color) -> Square {
        self.king_squares[color.index()]
    }

    #[inline]
    #[must_use]
    pub fn side_to_move(&self) -> Color {
        if self.white_to_move {
            Color::White
        } else {
            Color::Black
        }
    }

    #[inline]
    #[must_use]
    pub fn opponent(&self) -> Color {
        self.side_to_move().opponent()
    }

    #[inline]
    #[must_use]
    pub fn en_passant_target(&self) -> Option<Square> {
        self.en_passant_target
    }

    #[inline]
    #[must_use]
    pub fn castling_rights(&self) -> CastlingRights {
        self.castling_rights
    }

    #[inline]
    #[must_use]
    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    #[inline]
    #[must_use]
    pub fn material_signature(&self) -> MaterialSignature {
        self.material
    }

    /// Distance in plies from the position the search started at.
    #[inline]
    #[must_use]
    pub fn ply(&self) -> usize {
        self.ply
    }

    /// Remaining game phase: 0 with all pieces on, up to [`MAX_PHASE`] with none.
    #[inline]
    #[must_use]
    pub fn phase(&self) -> i32 {
        (MAX_PHASE - self.phase_material).max(0)
    }

    /// Contempt offsets indexed by color.
    #[inline]
    #[must_use]
    pub fn contempt(&self) -> [i32; 2] {
        self.contempt
    }

    /// Contempt offset added to scores when `color` is to move.
    #[inline]
    #[must_use]
    pub fn contempt_for(&self, color: Color) -> i32 {
        self.contempt[color.index()]
    }

    /// Favor `favored` by `magnitude` centipawns; the other side gets the negation.
    pub fn set_contempt(&mut self, magnitude: i32, favored: Color) {
        self.contempt[favored.index()] = magnitude;
        self.contempt[favored.opponent().index()] = magnitude.saturating_neg();
    }

    #[inline]
    #[must_use]
    pub fn is_chess960(&self) -> bool {
        self.chess960
    }

    pub fn set_chess960(&mut self, enabled: bool) {
        self.chess960 = enabled;
    }

    #[must_use]
    pub fn accumulators(&self) -> &AccumulatorHistory {
        &self.accumulators
    }

    /// Forget every cached accumulator. Needed after switching networks.
    pub fn reset_accumulators(&mut self) {
        self.accumulators.clear();
    }

    /// Bring both accumulators of the current ply up to date.
    pub fn ensure_accumulators(&mut self, network: &NnueNetwork) {
        for perspective in Color::BOTH {
            if !self.accumulators.is_computed(self.ply, perspective) {
                let acc = network.refresh(self, perspective);
                self.accumulators.store(self.ply, perspective, acc);
            }
        }
    }

    #[must_use]
    pub fn piece_at(&self, sq: Square) -> Option<(Color, Piece)> {
        let bit = Bitboard::from_square(sq);
        if (self.all_occupied.0 & bit.0) == 0 {
            return None;
        }
        let color = if (self.occupied[0].0 & bit.0) != 0 {
            Color::White
        } else {
            Color::Black
        };
        for piece in Piece::ALL {
            if (self.pieces[color.index()][piece.index()].0 & bit.0) != 0 {
                return Some((color, piece));
            }
        }
        None
    }

    /// Every piece on the board, white first, pawns to kings.
    pub fn piece_squares(&self) -> impl Iterator<Item = (Color, Piece, Square)> + '_ {
        Color::BOTH.into_iter().flat_map(move |color| {
            Piece::ALL.into_iter().flat_map(move |piece| {
                self.pieces(color, piece)
                    .iter()
                    .map(move |sq| (color, piece, sq))
            })
        })
    }

    /// True when neither side has mating material: no pawns, rooks or
    /// queens, and the minors are one of K v K, KN v K, KB v K, KN v KN,
    /// KN v KB, KB v KB or KNN v K.
    #[must_use]
    pub fn is_material_draw(&self) -> bool {
        let sig = self.material;
        let heavy = [Piece::Pawn, Piece::Rook, Piece::Queen];
        if Color::BOTH
            .iter()
            .any(|&c| heavy.iter().any(|&p| sig.count(c, p) > 0))
        {
            return false;
        }
        let minors = |c: Color| {
            (
                sig.count(c, Piece::Knight),
                sig.count(c, Piece::Bishop),
            )
        };
        matches!(
            (minors(Color::White), minors(Color::Black)),
            ((0, 0), (0, 0))
                | ((1, 0) | (0, 1), (0, 0))
                | ((0, 0), (1, 0) | (0, 1))
                | ((1, 0) | (0, 1), (1, 0) | (0, 1))
                | ((2, 0), (0, 0))
                | ((0, 0), (2, 0))
        )
    }

    /// Checks placement invariants shared by every way of setting up a position.
    pub(crate) fn validate_setup(&self) -> Result<(), FenError> {
        let white = self.pieces(Color::White, Piece::King).popcount();
        let black = self.pieces(Color::Black, Piece::King).popcount();
        if white != 1 || black != 1 {
            return Err(FenError::KingCount { white, black });
        }
        let pawns = Bitboard(
            (self.pieces(Color::White, Piece::Pawn).0 | self.pieces(Color::Black, Piece::Pawn).0)
                & Bitboard::BACK_RANKS.0,
        );
        match pawns.lsb() {
            Some(square) => Err(FenError::PawnOnBackRank { square }),
            None => Ok(()),
        }
    }

    pub(crate) fn set_piece(&mut self, sq: Square, color: Color, piece: Piece) {
        let bit = Bitboard::from_square(sq);
        let (c, p) = (color.index(), piece.index());
        self.pieces[c][p].0 |= bit.0;
        self.occupied[c].0 |= bit.0;
        self.all_occupied.0 |= bit.0;
        if piece == Piece::King {
            self.king_squares[c] = sq;
        } else {
            self.material = self
                .material
                .with_count(color, piece, self.pieces[c][p].popcount());
            self.phase_material += piece.phase_value();
        }
    }

    pub(crate) fn remove_piece(&mut self, sq: Square, color: Color, piece: Piece) {
        let bit = Bitboard::from_square(sq);
        let (c, p) = (color.index(), piece.index());
        self.pieces[c][p].0 &= !bit.0;
        self.occupied[c].0 &= !bit.0;
        self.all_occupied.0 &= !bit.0;
        if piece != Piece::King {
            self.material = self
                .material
                .with_count(color, piece, self.pieces[c][p].popcount());
            self.phase_material -= piece.phase_value();
        }
    }
}
