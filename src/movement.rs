use std::fmt::{self, Display, Formatter};

use crate::{
    coord::Position,
    piece::{PieceId, PieceKind},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveKind {
    Forbidden,
    ToEmpty,
    Kill,
    Special,
    /// The move would capture the enemy king. Only the check detector looks
    /// at these.
    OverCheck,
    LeadingToSelfCheck,
}
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecialKind {
    Castling,
    EnPassant,
    PromotionPending,
}
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub kind: MoveKind,
    pub piece: PieceId,
    /// Meaningless when `kind` is `Forbidden`.
    pub target: Position,
    pub special: Option<SpecialKind>,
}
impl Move {
    pub(crate) fn forbidden(piece: PieceId, sentinel: Position) -> Self {
        Move {
            kind: MoveKind::Forbidden,
            piece,
            target: sentinel,
            special: None,
        }
    }
    pub fn is_allowed(self) -> bool {
        !matches!(self.kind, MoveKind::Forbidden | MoveKind::LeadingToSelfCheck)
    }
    pub fn is_playable(self) -> bool {
        self.is_allowed() && self.kind != MoveKind::OverCheck
    }
}
impl Display for Move {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.piece, self.target)?;
        match self.special {
            Some(SpecialKind::Castling) => write!(f, " (castling)")?,
            Some(SpecialKind::EnPassant) => write!(f, " (en passant)")?,
            Some(SpecialKind::PromotionPending) => write!(f, " (promotion)")?,
            None => {}
        }
        Ok(())
    }
}

/// One executed move as kept in the board's history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HistoryEntry {
    pub start: Position,
    pub movement: Move,
    pub piece: PieceId,
    /// Kind of the piece when it moved, promoted pawns are still pawns here.
    pub kind: PieceKind,
    pub had_moved_before: bool,
}
impl HistoryEntry {
    pub fn is_double_step(self) -> bool {
        self.kind == PieceKind::Pawn
            && self.start.file() == self.movement.target.file()
            && self.start.rank().abs_diff(self.movement.target.rank()) == 2
    }
}
