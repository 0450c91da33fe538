use std::{
    error::Error,
    fmt::{self, Display, Formatter},
};

use crate::{
    color::Color,
    coord::Position,
    outcome::Outcome,
    piece::{PieceId, PieceKind},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvalidBoard {
    NoKing(Color),
    ExceededKings(Color),
    SquareTaken(Position),
    NonPlayerInCheck,
}
impl Display for InvalidBoard {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            InvalidBoard::NoKing(color) => write!(f, "no {color} king found")?,
            InvalidBoard::ExceededKings(color) => write!(f, "found more than 1 {color} king")?,
            InvalidBoard::SquareTaken(position) => {
                write!(f, "found more than 1 piece on {position}")?;
            }
            InvalidBoard::NonPlayerInCheck => write!(f, "non-player in check")?,
        }
        Ok(())
    }
}
impl Error for InvalidBoard {}

/// A move the board refused. The board is left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveError {
    GameOver(Outcome),
    UnknownPiece(PieceId),
    NotYourTurn { piece: PieceId, turn: Color },
    IllegalTarget { piece: PieceId, target: Position },
}
impl Display for MoveError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            MoveError::GameOver(outcome) => write!(f, "the game is over: {outcome}")?,
            MoveError::UnknownPiece(piece) => write!(f, "piece {piece} is not on the board")?,
            MoveError::NotYourTurn { piece, turn } => {
                write!(f, "piece {piece} cannot move, it is {turn}'s turn")?;
            }
            MoveError::IllegalTarget { piece, target } => {
                write!(f, "piece {piece} cannot move to {target}")?;
            }
        }
        Ok(())
    }
}
impl Error for MoveError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromotionError {
    UnknownPiece(PieceId),
    NotAPawn(PieceId),
    InvalidChoice(PieceKind),
}
impl Display for PromotionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            PromotionError::UnknownPiece(piece) => write!(f, "piece {piece} is not on the board")?,
            PromotionError::NotAPawn(piece) => write!(f, "piece {piece} is not a pawn")?,
            PromotionError::InvalidChoice(kind) => write!(
                f,
                "a pawn cannot promote to a {kind}, expected a queen, rook, bishop, or knight"
            )?,
        }
        Ok(())
    }
}
impl Error for PromotionError {}

/// A pawn promoted without a choice and became a queen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PromotionWarning;
impl Display for PromotionWarning {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "no promotion choice was given, promoting to queen")?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DriverError {
    NoController,
    MissingPolicy(Color),
    PolicyStalled(Color),
    NotHumanTurn(Color),
    Move(MoveError),
}
impl From<MoveError> for DriverError {
    fn from(value: MoveError) -> Self {
        DriverError::Move(value)
    }
}
impl Display for DriverError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            DriverError::NoController => {
                write!(f, "no color is played by a human and no policy was given")?;
            }
            DriverError::MissingPolicy(color) => {
                write!(f, "{color} is not played by a human but no policy was given")?;
            }
            DriverError::PolicyStalled(color) => {
                write!(f, "the policy playing {color} returned without moving")?;
            }
            DriverError::NotHumanTurn(color) => {
                write!(f, "{color} is played by the policy, not by a human")?;
            }
            DriverError::Move(err) => write!(f, "{err}")?,
        }
        Ok(())
    }
}
impl Error for DriverError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            DriverError::Move(err) => Some(err),
            _ => None,
        }
    }
}
