//! Making and unmaking moves, with incremental accumulator upkeep.

use super::nnue::{king_bucket_changed, NnueNetwork, UpdateRecord};
use super::state::{NullMoveInfo, UnmakeInfo};
use super::{Board, Color, Move, Piece, Square};

/// King-side and queen-side rook (from, to) squares on `rank`.
#[inline]
const fn castle_rook_squares(rank: usize, kingside: bool) -> (Square, Square) {
    if kingside {
        (Square(rank, 7), Square(rank, 5))
    } else {
        (Square(rank, 0), Square(rank, 3))
    }
}

impl Board {
    /// Make `mv`, advancing the ply and, when `network` is given, deriving
    /// the new accumulators from the previous ply's.
    ///
    /// A king move that changes bucket halves rebuilds that side's
    /// accumulator from scratch. If the previous ply has no accumulator the
    /// new slot is left stale and rebuilt on the next evaluation.
    ///
    /// # Panics
    /// Panics if the source square holds no piece.
    pub fn make_move(&mut self, mv: Move, network: Option<&NnueNetwork>) -> UnmakeInfo {
        let mover = self.side_to_move();
        let king_from = self.king_square(mover);
        let (info, record) = self.apply_move(mv);
        let king_to = self.king_square(mover);

        self.ply += 1;
        self.accumulators.begin_ply(self.ply);
        if let Some(network) = network {
            for perspective in Color::BOTH {
                if perspective == mover && king_bucket_changed(king_from, king_to) {
                    let acc = network.refresh(self, perspective);
                    self.accumulators.store(self.ply, perspective, acc);
                } else {
                    let king = self.king_square(perspective);
                    self.accumulators
                        .advance(self.ply, perspective, network, &record, king);
                }
            }
        }
        info
    }

    /// Update pieces and game state for `mv` and describe the feature changes.
    pub(crate) fn apply_move(&mut self, mv: Move) -> (UnmakeInfo, UpdateRecord) {
        let color = self.side_to_move();
        let from = mv.from();
        let to = mv.to();
        let (_, moving) = self.piece_at(from).expect("make_move 'from' empty");

        let mut info = UnmakeInfo {
            captured: None,
            previous_en_passant_target: self.en_passant_target,
            previous_castling_rights: self.castling_rights,
            previous_halfmove_clock: self.halfmove_clock,
        };
        let mut record = UpdateRecord::new();

        if mv.is_en_passant() {
            let captured_sq = Square(from.rank(), to.file());
            if let Some((c, p)) = self.piece_at(captured_sq) {
                self.remove_piece(captured_sq, c, p);
                record.remove(c, p, captured_sq);
                info.captured = Some((c, p, captured_sq));
            }
        } else if !mv.is_castling() {
            if let Some((c, p)) = self.piece_at(to) {
                self.remove_piece(to, c, p);
                record.remove(c, p, to);
                info.captured = Some((c, p, to));
                self.castling_rights.touch_corner(to);
            }
        }

        self.remove_piece(from, color, moving);
        record.remove(color, moving, from);

        if mv.is_castling() {
            let (rook_from, rook_to) =
                castle_rook_squares(color.back_rank(), mv.is_castle_kingside());
            self.remove_piece(rook_from, color, Piece::Rook);
            record.remove(color, Piece::Rook, rook_from);
            self.set_piece(to, color, Piece::King);
            record.add(color, Piece::King, to);
            self.set_piece(rook_to, color, Piece::Rook);
            record.add(color, Piece::Rook, rook_to);
        } else {
            let placed = mv.promotion().unwrap_or(moving);
            self.set_piece(to, color, placed);
            record.add(color, placed, to);
        }

        if moving == Piece::King {
            self.castling_rights.remove(color, true);
            self.castling_rights.remove(color, false);
        }
        self.castling_rights.touch_corner(from);

        self.en_passant_target = if mv.is_double_pawn_push() {
            Some(Square((from.rank() + to.rank()) / 2, from.file()))
        } else {
            None
        };

        if moving == Piece::Pawn || info.captured.is_some() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }

        self.white_to_move = !self.white_to_move;
        (info, record)
    }

    /// Take back `mv`. Accumulators are not touched: the previous ply's slot
    /// is still valid once the ply index steps back.
    pub fn unmake_move(&mut self, mv: Move, info: UnmakeInfo) {
        self.white_to_move = !self.white_to_move;
        self.ply = self.ply.saturating_sub(1);
        let color = self.side_to_move();
        let from = mv.from();
        let to = mv.to();

        if mv.is_castling() {
            let (rook_from, rook_to) =
                castle_rook_squares(color.back_rank(), mv.is_castle_kingside());
            self.remove_piece(to, color, Piece::King);
            self.remove_piece(rook_to, color, Piece::Rook);
            self.set_piece(from, color, Piece::King);
            self.set_piece(rook_from, color, Piece::Rook);
        } else {
            let (_, placed) = self.piece_at(to).expect("unmake_move 'to' empty");
            self.remove_piece(to, color, placed);
            let original = if mv.promotion().is_some() {
                Piece::Pawn
            } else {
                placed
            };
            self.set_piece(from, color, original);
            if let Some((c, p, sq)) = info.captured {
                self.set_piece(sq, c, p);
            }
        }

        self.en_passant_target = info.previous_en_passant_target;
        self.castling_rights = info.previous_castling_rights;
        self.halfmove_clock = info.previous_halfmove_clock;
    }

    /// Pass the move. The new ply's accumulators are copies of the old ones.
    pub fn make_null_move(&mut self, network: Option<&NnueNetwork>) -> NullMoveInfo {
        let info = NullMoveInfo {
            previous_en_passant_target: self.en_passant_target,
        };
        self.en_passant_target = None;
        self.white_to_move = !self.white_to_move;
        self.ply += 1;
        self.accumulators.begin_ply(self.ply);
        if let Some(network) = network {
            let record = UpdateRecord::new();
            for perspective in Color::BOTH {
                let king = self.king_square(perspective);
                self.accumulators
                    .advance(self.ply, perspective, network, &record, king);
            }
        }
        info
    }

    pub fn unmake_null_move(&mut self, info: NullMoveInfo) {
        self.white_to_move = !self.white_to_move;
        self.ply = self.ply.saturating_sub(1);
        self.en_passant_target = info.previous_en_passant_target;
    }
}
