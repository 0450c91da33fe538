use std::{
    error::Error,
    fmt::{self, Display, Formatter},
    str::FromStr,
};

use crate::{
    board::Board, color::Color, coord::Position, error::PromotionWarning, movement::Move,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}
impl PieceKind {
    pub const PROMOTION_CHOICES: [Self; 4] = [
        PieceKind::Queen,
        PieceKind::Rook,
        PieceKind::Bishop,
        PieceKind::Knight,
    ];
    pub const STARTING_CONFIGURATION: [Self; 8] = [
        PieceKind::Rook,
        PieceKind::Knight,
        PieceKind::Bishop,
        PieceKind::Queen,
        PieceKind::King,
        PieceKind::Bishop,
        PieceKind::Knight,
        PieceKind::Rook,
    ];
    pub fn is_promotion_choice(self) -> bool {
        PieceKind::PROMOTION_CHOICES.contains(&self)
    }
    pub fn uppercase(self) -> char {
        self.lowercase().to_ascii_uppercase()
    }
    pub fn lowercase(self) -> char {
        match self {
            PieceKind::Pawn => 'p',
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Rook => 'r',
            PieceKind::Queen => 'q',
            PieceKind::King => 'k',
        }
    }
}
impl Display for PieceKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            PieceKind::Pawn => write!(f, "pawn")?,
            PieceKind::Knight => write!(f, "knight")?,
            PieceKind::Bishop => write!(f, "bishop")?,
            PieceKind::Rook => write!(f, "rook")?,
            PieceKind::Queen => write!(f, "queen")?,
            PieceKind::King => write!(f, "king")?,
        }
        Ok(())
    }
}
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsePieceKindError {
    Empty,
    UnknownSymbol(char),
    UnexpectedSymbol(char),
}
impl Display for ParsePieceKindError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ParsePieceKindError::Empty => write!(f, "expected one character, found none instead")?,
            ParsePieceKindError::UnknownSymbol(c) => {
                write!(f, "`{c}` is not a piece letter, expected one of `pnbrqk` in any case")?;
            }
            ParsePieceKindError::UnexpectedSymbol(c) => {
                write!(f, "unexpected `{c}`, only one character is expected")?;
            }
        }
        Ok(())
    }
}
impl Error for ParsePieceKindError {}

impl FromStr for PieceKind {
    type Err = ParsePieceKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut characters = s.chars();
        let piece = characters
            .next()
            .ok_or(ParsePieceKindError::Empty)?
            .try_into()?;

        if let Some(c) = characters.next() {
            return Err(ParsePieceKindError::UnexpectedSymbol(c));
        }
        Ok(piece)
    }
}
impl TryFrom<char> for PieceKind {
    type Error = ParsePieceKindError;

    fn try_from(value: char) -> Result<Self, Self::Error> {
        let piece = match value {
            'p' | 'P' => PieceKind::Pawn,
            'n' | 'N' => PieceKind::Knight,
            'b' | 'B' => PieceKind::Bishop,
            'r' | 'R' => PieceKind::Rook,
            'q' | 'Q' => PieceKind::Queen,
            'k' | 'K' => PieceKind::King,
            c => return Err(ParsePieceKindError::UnknownSymbol(c)),
        };
        Ok(piece)
    }
}

/// Picks the piece a pawn turns into. A missing choice is not an error: it
/// falls back to a queen and hands back a warning for the caller to surface.
pub fn resolve_promotion(choice: Option<PieceKind>) -> (PieceKind, Option<PromotionWarning>) {
    match choice {
        Some(kind) => (kind, None),
        None => (PieceKind::Queen, Some(PromotionWarning)),
    }
}

/// Handle of a piece inside the arena of the [`Board`] that owns it. Ids of
/// captured or promoted pieces are never handed out again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PieceId(u16);
impl PieceId {
    pub(crate) fn from_index(index: usize) -> Self {
        PieceId(index.try_into().expect("piece arena exceeded u16 range"))
    }
    pub(crate) fn index(self) -> usize {
        self.0.into()
    }
}
impl Display for PieceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub kind: PieceKind,
    pub color: Color,
    pub position: Position,
    pub has_moved: bool,
    /// Consulted only when a pawn reaches its last rank.
    pub promotion_choice: Option<PieceKind>,
}
impl Piece {
    pub fn new(color: Color, kind: PieceKind, position: Position) -> Self {
        Piece {
            kind,
            color,
            position,
            has_moved: false,
            promotion_choice: None,
        }
    }
    pub fn moved(self) -> Self {
        Piece {
            has_moved: true,
            ..self
        }
    }
    pub fn is_royal(self) -> bool {
        self.kind == PieceKind::King
    }
    pub fn figurine(self) -> char {
        match (self.color, self.kind) {
            (Color::White, PieceKind::Pawn) => '♙',
            (Color::White, PieceKind::Knight) => '♘',
            (Color::White, PieceKind::Bishop) => '♗',
            (Color::White, PieceKind::Rook) => '♖',
            (Color::White, PieceKind::Queen) => '♕',
            (Color::White, PieceKind::King) => '♔',
            (Color::Black, PieceKind::Pawn) => '♟',
            (Color::Black, PieceKind::Knight) => '♞',
            (Color::Black, PieceKind::Bishop) => '♝',
            (Color::Black, PieceKind::Rook) => '♜',
            (Color::Black, PieceKind::Queen) => '♛',
            (Color::Black, PieceKind::King) => '♚',
        }
    }
}
impl Display for Piece {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} on {}", self.color, self.kind, self.position)?;
        Ok(())
    }
}

/// A live piece together with the board it sits on.
#[derive(Debug, Clone, Copy)]
pub struct PieceRef<'a> {
    board: &'a Board,
    id: PieceId,
    piece: Piece,
}
impl<'a> PieceRef<'a> {
    pub(crate) fn new(board: &'a Board, id: PieceId, piece: Piece) -> Self {
        PieceRef { board, id, piece }
    }
    pub fn id(self) -> PieceId {
        self.id
    }
    pub fn piece(self) -> Piece {
        self.piece
    }
    pub fn kind(self) -> PieceKind {
        self.piece.kind
    }
    pub fn color(self) -> Color {
        self.piece.color
    }
    pub fn position(self) -> Position {
        self.piece.position
    }
    pub fn has_moved(self) -> bool {
        self.piece.has_moved
    }
    pub fn is_royal(self) -> bool {
        self.piece.is_royal()
    }
    /// Moves this piece may play right now, computed fresh on every call.
    pub fn legal_moves(self) -> Vec<Move> {
        self.board.legal_moves(self.id)
    }
}
impl Display for PieceRef<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.piece)?;
        Ok(())
    }
}
#[cfg(test)]
mod test {
    use crate::{
        error::PromotionWarning,
        piece::{PieceKind, resolve_promotion},
    };

    #[test]
    fn missing_choice_defaults_to_queen() {
        assert_eq!(
            resolve_promotion(None),
            (PieceKind::Queen, Some(PromotionWarning))
        );
        assert_eq!(
            resolve_promotion(Some(PieceKind::Knight)),
            (PieceKind::Knight, None)
        );
    }
    #[test]
    fn parse_piece_kind() {
        assert_eq!("n".parse::<PieceKind>(), Ok(PieceKind::Knight));
        assert_eq!("Q".parse::<PieceKind>(), Ok(PieceKind::Queen));
        assert!("x".parse::<PieceKind>().is_err());
        assert!("qq".parse::<PieceKind>().is_err());
        assert!(!PieceKind::King.is_promotion_choice());
        assert!(PieceKind::Rook.is_promotion_choice());
    }
}
