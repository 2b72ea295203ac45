//! Material signature dispatch for recognized endings.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::board::{Color, MaterialSignature, Piece};

/// A recognized ending and, where it matters, the side with the extra material.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EndgameKind {
    /// Neither side can force mate; scored as 0.
    InsufficientMaterial,
    /// King and one pawn against a bare king.
    PawnEnding { strong: Color },
    /// One or two rooks/queens against a bare king.
    MajorPieces { strong: Color },
    /// King, bishop and knight against a bare king.
    BishopKnight { strong: Color },
}

#[derive(Clone, Copy)]
enum Ending {
    Pawn,
    Major,
    BishopKnight,
}

impl Ending {
    const fn kind(self, strong: Color) -> EndgameKind {
        match self {
            Ending::Pawn => EndgameKind::PawnEnding { strong },
            Ending::Major => EndgameKind::MajorPieces { strong },
            Ending::BishopKnight => EndgameKind::BishopKnight { strong },
        }
    }
}

/// Minor-piece combinations (one side, other side) that cannot force mate.
const DRAWN_MATERIAL: &[(&[Piece], &[Piece])] = &[
    (&[], &[]),
    (&[Piece::Knight], &[]),
    (&[Piece::Bishop], &[]),
    (&[Piece::Knight, Piece::Knight], &[]),
    (&[Piece::Knight], &[Piece::Knight]),
    (&[Piece::Knight], &[Piece::Bishop]),
    (&[Piece::Bishop], &[Piece::Bishop]),
];

/// Winning material for one side against a bare king.
const WON_MATERIAL: &[(&[Piece], Ending)] = &[
    (&[Piece::Pawn], Ending::Pawn),
    (&[Piece::Rook], Ending::Major),
    (&[Piece::Queen], Ending::Major),
    (&[Piece::Rook, Piece::Rook], Ending::Major),
    (&[Piece::Queen, Piece::Rook], Ending::Major),
    (&[Piece::Queen, Piece::Queen], Ending::Major),
    (&[Piece::Bishop, Piece::Knight], Ending::BishopKnight),
];

static KNOWN_ENDINGS: Lazy<HashMap<MaterialSignature, EndgameKind>> = Lazy::new(build_table);

fn insert(table: &mut HashMap<MaterialSignature, EndgameKind>, sig: MaterialSignature, kind: EndgameKind) {
    let previous = table.insert(sig, kind);
    debug_assert!(
        previous.map_or(true, |p| p == kind),
        "conflicting endings for {sig}"
    );
}

fn build_table() -> HashMap<MaterialSignature, EndgameKind> {
    let mut table = HashMap::new();
    for &(one, other) in DRAWN_MATERIAL {
        let sig = MaterialSignature::from_pieces(one, other);
        insert(&mut table, sig, EndgameKind::InsufficientMaterial);
        insert(&mut table, sig.mirrored(), EndgameKind::InsufficientMaterial);
    }
    for &(pieces, ending) in WON_MATERIAL {
        let sig = MaterialSignature::from_pieces(pieces, &[]);
        insert(&mut table, sig, ending.kind(Color::White));
        insert(&mut table, sig.mirrored(), ending.kind(Color::Black));
    }
    table
}

/// Look up the ending a material signature belongs to.
#[must_use]
pub fn classify(sig: MaterialSignature) -> Option<EndgameKind> {
    KNOWN_ENDINGS.get(&sig).copied()
}

/// Every recognized signature, in no particular order.
pub fn known_signatures() -> impl Iterator<Item = (MaterialSignature, EndgameKind)> {
    KNOWN_ENDINGS.iter().map(|(&sig, &kind)| (sig, kind))
}
