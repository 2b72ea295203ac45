//! Accumulators, update records and the per-ply accumulator history.

use std::fmt;

use super::network::{NnueNetwork, HIDDEN_SIZE};
use crate::board::{Color, Piece, Square};

/// Hidden-layer pre-activations for one perspective.
#[derive(Clone, PartialEq, Eq)]
#[repr(C, align(64))]
pub struct Accumulator(pub [i16; HIDDEN_SIZE]);

impl Default for Accumulator {
    fn default() -> Self {
        Accumulator([0; HIDDEN_SIZE])
    }
}

impl fmt::Debug for Accumulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Accumulator({:?}..)", &self.0[..8])
    }
}

/// A piece of a color on a square.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PieceSquare {
    pub color: Color,
    pub piece: Piece,
    pub square: Square,
}

impl PieceSquare {
    const PLACEHOLDER: PieceSquare = PieceSquare {
        color: Color::White,
        piece: Piece::Pawn,
        square: Square(0, 0),
    };
}

/// Feature changes caused by one move, independent of perspective.
///
/// At most two pieces leave and two arrive (castling, captures). A record
/// with no removals marks a null move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UpdateRecord {
    removals: [PieceSquare; 2],
    additions: [PieceSquare; 2],
    n_removals: u8,
    n_additions: u8,
}

impl Default for UpdateRecord {
    fn default() -> Self {
        Self::new()
    }
}

impl UpdateRecord {
    #[must_use]
    pub const fn new() -> Self {
        UpdateRecord {
            removals: [PieceSquare::PLACEHOLDER; 2],
            additions: [PieceSquare::PLACEHOLDER; 2],
            n_removals: 0,
            n_additions: 0,
        }
    }

    /// Record `piece` of `color` leaving `square`.
    pub fn remove(&mut self, color: Color, piece: Piece, square: Square) {
        debug_assert!(self.n_removals < 2, "more than two removals in one move");
        self.removals[usize::from(self.n_removals)] = PieceSquare {
            color,
            piece,
            square,
        };
        self.n_removals += 1;
    }

    /// Record `piece` of `color` arriving on `square`.
    pub fn add(&mut self, color: Color, piece: Piece, square: Square) {
        debug_assert!(self.n_additions < 2, "more than two additions in one move");
        self.additions[usize::from(self.n_additions)] = PieceSquare {
            color,
            piece,
            square,
        };
        self.n_additions += 1;
    }

    #[must_use]
    pub fn removals(&self) -> &[PieceSquare] {
        &self.removals[..usize::from(self.n_removals)]
    }

    #[must_use]
    pub fn additions(&self) -> &[PieceSquare] {
        &self.additions[..usize::from(self.n_additions)]
    }
}

#[derive(Clone, Default)]
struct HistorySlot {
    perspectives: [Accumulator; 2],
    computed: [bool; 2],
}

/// Accumulators indexed by search ply.
///
/// Making a move fills the slot one above the current ply; unmaking only
/// steps the ply back, so the older slot is reused untouched.
#[derive(Clone)]
pub struct AccumulatorHistory {
    slots: Vec<HistorySlot>,
}

impl Default for AccumulatorHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl AccumulatorHistory {
    #[must_use]
    pub fn new() -> Self {
        AccumulatorHistory {
            slots: vec![HistorySlot::default()],
        }
    }

    /// Mark every slot stale, e.g. after switching networks.
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            slot.computed = [false; 2];
        }
    }

    /// Make slot `ply` exist and mark it stale.
    pub(crate) fn begin_ply(&mut self, ply: usize) {
        self.ensure_slot(ply);
        self.slots[ply].computed = [false; 2];
    }

    #[must_use]
    pub fn is_computed(&self, ply: usize, perspective: Color) -> bool {
        self.slots
            .get(ply)
            .is_some_and(|slot| slot.computed[perspective.index()])
    }

    /// Accumulator for `perspective` at `ply`, if it is up to date.
    #[must_use]
    pub fn get(&self, ply: usize, perspective: Color) -> Option<&Accumulator> {
        let slot = self.slots.get(ply)?;
        slot.computed[perspective.index()].then(|| &slot.perspectives[perspective.index()])
    }

    pub(crate) fn store(&mut self, ply: usize, perspective: Color, acc: Accumulator) {
        self.ensure_slot(ply);
        let slot = &mut self.slots[ply];
        slot.perspectives[perspective.index()] = acc;
        slot.computed[perspective.index()] = true;
    }

    fn ensure_slot(&mut self, ply: usize) {
        if self.slots.len() <= ply {
            self.slots.resize_with(ply + 1, HistorySlot::default);
        }
    }

    /// Fill `ply` from `ply - 1` by applying `record`.
    ///
    /// Returns false, leaving the slot stale, when the previous slot is not
    /// up to date for this perspective.
    pub(crate) fn advance(
        &mut self,
        ply: usize,
        perspective: Color,
        network: &NnueNetwork,
        record: &UpdateRecord,
        king: Square,
    ) -> bool {
        let p = perspective.index();
        if ply == 0 || ply >= self.slots.len() || !self.slots[ply - 1].computed[p] {
            return false;
        }
        let (before, after) = self.slots.split_at_mut(ply);
        let prev = &before[ply - 1].perspectives[p];
        let slot = &mut after[0];
        network.apply_update(prev, &mut slot.perspectives[p], record, perspective, king);
        slot.computed[p] = true;
        true
    }

    /// Both accumulators at `ply` as (side to move, other side).
    ///
    /// Slots that are not up to date hold stale values; callers refresh first.
    pub(crate) fn pair(&self, ply: usize, stm: Color) -> (&Accumulator, &Accumulator) {
        let slot = &self.slots[ply];
        (
            &slot.perspectives[stm.index()],
            &slot.perspectives[stm.opponent().index()],
        )
    }
}

impl fmt::Debug for AccumulatorHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccumulatorHistory")
            .field("slots", &self.slots.len())
            .finish()
    }
}
