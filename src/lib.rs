#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]

pub mod board;
pub mod board_display;
pub mod color;
pub mod coord;
pub mod driver;
pub mod error;
pub mod fuzz;
pub mod movement;
pub mod outcome;
pub mod piece;

pub use crate::{
    board::{Board, Executed},
    color::Color,
    coord::Position,
    driver::{Game, GameConfig, Policy, RandomPolicy, TurnReport, Verbosity},
    error::{DriverError, InvalidBoard, MoveError, PromotionError, PromotionWarning},
    movement::{HistoryEntry, Move, MoveKind, SpecialKind},
    outcome::Outcome,
    piece::{Piece, PieceId, PieceKind, PieceRef, resolve_promotion},
};
