use std::fmt::{self, Display, Formatter};

use crate::{board::Board, color::Color, coord::Position, piece::PieceRef};

const WHITE: &str = "\x1b[30;107m";
const BLACK: &str = "\x1b[30;47m";
const HIGHLIGHTED: &str = "\x1b[30;103m";
const RESET: &str = "\x1b[0m";

/// Terminal view of a board, with optional text printed beside it.
pub struct BoardDisplay<'a, 'b, 'c> {
    pub board: &'a Board,
    pub view: Color,
    pub highlighted: &'b [Position],
    pub info: &'c str,
}
impl<'a> BoardDisplay<'a, '_, '_> {
    pub fn new(board: &'a Board) -> Self {
        BoardDisplay {
            board,
            view: Color::White,
            highlighted: &[],
            info: "",
        }
    }
}
impl Display for BoardDisplay<'_, '_, '_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut lines = self.info.lines().fuse();
        for row in 0..8 {
            let rank = match self.view {
                Color::White => 7 - row,
                Color::Black => row,
            };
            for column in 0..8 {
                let file = match self.view {
                    Color::White => column,
                    Color::Black => 7 - column,
                };
                let position = Position::new(file, rank);
                let color = if self.highlighted.contains(&position) {
                    HIGHLIGHTED
                } else {
                    match position.color() {
                        Color::White => WHITE,
                        Color::Black => BLACK,
                    }
                };
                let figurine = self
                    .board
                    .piece_at(position)
                    .map(|piece: PieceRef<'_>| piece.piece().figurine())
                    .unwrap_or(' ');
                write!(f, "{color}{figurine} {RESET}")?;
            }
            write!(f, "{}", rank + 1)?;
            if let Some(line) = lines.next() {
                write!(f, " {line}")?;
            }
            writeln!(f)?;
        }
        match self.view {
            Color::White => write!(f, "a b c d e f g h")?,
            Color::Black => write!(f, "h g f e d c b a")?,
        }
        if let Some(line) = lines.next() {
            write!(f, "   {line}")?;
        }
        writeln!(f)?;
        for line in lines {
            writeln!(f, "                  {line}")?;
        }
        Ok(())
    }
}
#[cfg(test)]
mod test {
    use crate::{board::Board, board_display::BoardDisplay, color::Color};

    #[test]
    fn white_view_starts_with_black_pieces() {
        let board = Board::new();
        let text = BoardDisplay::new(&board).to_string();
        let first = text.lines().next().unwrap();
        assert!(first.contains('♜'));
        assert!(first.ends_with('8'));
        assert!(text.contains("a b c d e f g h"));
    }
    #[test]
    fn black_view_is_flipped() {
        let board = Board::new();
        let text = BoardDisplay {
            view: Color::Black,
            info: "black plays",
            ..BoardDisplay::new(&board)
        }
        .to_string();
        let first = text.lines().next().unwrap();
        assert!(first.contains('♖'));
        assert!(first.ends_with("1 black plays"));
        assert!(text.contains("h g f e d c b a"));
    }
}
