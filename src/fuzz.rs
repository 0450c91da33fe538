use std::{
    error::Error,
    fmt::{self, Display, Formatter, Write},
};

use rand::{SeedableRng, rngs::SmallRng, seq::IndexedRandom};
use rustc_hash::FxHashSet;

use crate::{
    board::Board,
    color::Color,
    coord::Position,
    error::{MoveError, PromotionError},
    movement::SpecialKind,
    outcome::Outcome,
    piece::PieceKind,
};

/// A disagreement between this crate and the `chess` crate.
#[derive(Debug)]
pub enum FuzzError {
    InvalidFen { fen: String, error: chess::Error },
    Extra { fen: String, origin: Position, destination: Position },
    Missing { fen: String, origin: Position, destination: Position },
    OutcomeDiffers { fen: String, ours: Outcome },
    Rejected { fen: String, error: MoveError },
    Promotion { fen: String, error: PromotionError },
}
impl Display for FuzzError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            FuzzError::InvalidFen { fen, error } => {
                write!(f, "the chess crate refused `{fen}`: {error}")?;
            }
            FuzzError::Extra {
                fen,
                origin,
                destination,
            } => write!(f, "found {origin} {destination} but it's not a legal move in `{fen}`")?,
            FuzzError::Missing {
                fen,
                origin,
                destination,
            } => write!(f, "{origin} {destination} not found in `{fen}`")?,
            FuzzError::OutcomeDiffers { fen, ours } => {
                write!(f, "the outcome of `{fen}` was reported as {ours}")?;
            }
            FuzzError::Rejected { fen, error } => {
                write!(f, "a generated move was refused in `{fen}`: {error}")?;
            }
            FuzzError::Promotion { fen, error } => {
                write!(f, "a promotion choice was refused in `{fen}`: {error}")?;
            }
        }
        Ok(())
    }
}
impl Error for FuzzError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FuzzSummary {
    pub games: usize,
    pub plies: usize,
    pub finished: usize,
}

fn position(square: chess::Square) -> Position {
    Position::new(
        square.get_file().to_index().try_into().unwrap(),
        square.get_rank().to_index().try_into().unwrap(),
    )
}
fn to_fen(board: &Board) -> String {
    let mut fen = String::new();
    for rank in (0..8).rev() {
        let mut empty = 0;
        for file in 0..8 {
            match board.piece_at(Position::new(file, rank)) {
                Some(piece) => {
                    if empty > 0 {
                        write!(fen, "{empty}").unwrap();
                        empty = 0;
                    }
                    fen.push(match piece.color() {
                        Color::White => piece.kind().uppercase(),
                        Color::Black => piece.kind().lowercase(),
                    });
                }
                None => empty += 1,
            }
        }
        if empty > 0 {
            write!(fen, "{empty}").unwrap();
        }
        if rank > 0 {
            fen.push('/');
        }
    }
    write!(fen, " {} ", board.turn().lowercase()).unwrap();

    let mut castling = String::new();
    for color in Color::ALL {
        let king = board.king(color);
        if king.has_moved() {
            continue;
        }
        for (file, symbol) in [(7, PieceKind::King), (0, PieceKind::Queen)] {
            let rook = board.piece_at(Position::new(file, color.home_rank()));
            if rook.is_some_and(|rook| {
                rook.kind() == PieceKind::Rook && rook.color() == color && !rook.has_moved()
            }) {
                castling.push(match color {
                    Color::White => symbol.uppercase(),
                    Color::Black => symbol.lowercase(),
                });
            }
        }
    }
    if castling.is_empty() {
        castling.push('-');
    }
    fen.push_str(&castling);

    match board.history().last().filter(|entry| entry.is_double_step()) {
        Some(entry) => {
            let skipped = Position::new(
                entry.start.file(),
                (entry.start.rank() + entry.movement.target.rank()) / 2,
            );
            write!(fen, " {skipped}").unwrap();
        }
        None => fen.push_str(" -"),
    }
    fen.push_str(" 0 1");
    fen
}

/// Plays `games` random games of at most `max_plies` moves each and checks
/// every position against the `chess` crate's legal move generator.
pub fn fuzz(games: usize, max_plies: usize, rng: &mut SmallRng) -> Result<FuzzSummary, FuzzError> {
    let mut summary = FuzzSummary::default();
    for _ in 0..games {
        let mut board = Board::new();
        summary.games += 1;
        for _ in 0..max_plies {
            let fen = to_fen(&board);
            let reference: chess::Board = match fen.parse() {
                Ok(reference) => reference,
                Err(error) => return Err(FuzzError::InvalidFen { fen, error }),
            };
            let moves = board.all_legal_moves();
            let ours: FxHashSet<_> = moves
                .iter()
                .filter_map(|movement| {
                    board
                        .piece(movement.piece)
                        .map(|piece| (piece.position(), movement.target))
                })
                .collect();
            let theirs: FxHashSet<_> = chess::MoveGen::new_legal(&reference)
                .map(|movement| (position(movement.get_source()), position(movement.get_dest())))
                .collect();
            if let Some((origin, destination)) = ours.difference(&theirs).next().copied() {
                return Err(FuzzError::Extra {
                    fen,
                    origin,
                    destination,
                });
            }
            if let Some((origin, destination)) = theirs.difference(&ours).next().copied() {
                return Err(FuzzError::Missing {
                    fen,
                    origin,
                    destination,
                });
            }
            let expected = match reference.status() {
                chess::BoardStatus::Ongoing => Outcome::InProgress,
                chess::BoardStatus::Stalemate => Outcome::Stalemate,
                chess::BoardStatus::Checkmate => Outcome::Checkmate(!board.turn()),
            };
            if board.outcome() != expected {
                return Err(FuzzError::OutcomeDiffers {
                    fen,
                    ours: board.outcome(),
                });
            }
            let Some(movement) = moves.choose(rng).copied() else {
                summary.finished += 1;
                break;
            };
            if movement.special == Some(SpecialKind::PromotionPending) {
                let kind = PieceKind::PROMOTION_CHOICES
                    .choose(rng)
                    .copied()
                    .unwrap_or(PieceKind::Queen);
                if let Err(error) = board.set_promotion_choice(movement.piece, kind) {
                    return Err(FuzzError::Promotion { fen, error });
                }
            }
            if let Err(error) = board.play(movement) {
                return Err(FuzzError::Rejected { fen, error });
            }
            summary.plies += 1;
        }
    }
    Ok(summary)
}
pub fn fuzz_seeded(games: usize, max_plies: usize, seed: u64) -> Result<FuzzSummary, FuzzError> {
    fuzz(games, max_plies, &mut SmallRng::seed_from_u64(seed))
}
#[cfg(test)]
mod test {
    use crate::{
        board::Board,
        error::PromotionError,
        fuzz::{FuzzError, fuzz_seeded, to_fen},
        piece::PieceKind,
    };

    #[test]
    fn starting_fen() {
        assert_eq!(
            to_fen(&Board::new()),
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"
        );
    }
    #[test]
    fn double_step_sets_en_passant_square() {
        let mut board = Board::new();
        let pawn = board.piece_at("e2".parse().unwrap()).unwrap().id();
        board.execute_move(pawn, "e4".parse().unwrap()).unwrap();
        assert_eq!(
            to_fen(&board),
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1"
        );
    }
    #[test]
    fn agrees_with_chess_crate() {
        let summary = fuzz_seeded(3, 80, 0x5eed).unwrap();
        assert_eq!(summary.games, 3);
        assert!(summary.plies > 0);
    }
    #[test]
    fn refused_promotion_choice_is_reported() {
        let mut board = Board::new();
        let rook = board.piece_at("a1".parse().unwrap()).unwrap().id();
        let error = board
            .set_promotion_choice(rook, PieceKind::Queen)
            .unwrap_err();
        assert_eq!(error, PromotionError::NotAPawn(rook));
        let report = FuzzError::Promotion {
            fen: to_fen(&board),
            error,
        }
        .to_string();
        assert!(report.contains("promotion choice was refused"));
        assert!(report.contains("is not a pawn"));
    }
}
