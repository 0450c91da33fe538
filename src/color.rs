use std::{
    error::Error,
    fmt::{self, Display, Formatter},
    ops::Not,
    str::FromStr,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParseColorError;
impl Display for ParseColorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "expected `white` or `black` (or `w`/`b`)")?;
        Ok(())
    }
}
impl Error for ParseColorError {}

/// A side. Ranks below are counted from white's home rank, which is 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    White,
    Black,
}
impl Color {
    pub const ALL: [Self; 2] = [Color::White, Color::Black];

    /// Slot of this color in per-color arrays.
    pub fn index(self) -> usize {
        match self {
            Color::White => 0,
            Color::Black => 1,
        }
    }
    pub fn lowercase(self) -> char {
        match self {
            Color::White => 'w',
            Color::Black => 'b',
        }
    }
    pub fn home_rank(self) -> u8 {
        match self {
            Color::White => 0,
            Color::Black => 7,
        }
    }
    pub fn pawn_home_rank(self) -> u8 {
        match self {
            Color::White => 1,
            Color::Black => 6,
        }
    }
    pub fn promotion_rank(self) -> u8 {
        (!self).home_rank()
    }
    /// Rank a pawn must stand on to take en passant: where an enemy double
    /// step lands.
    pub fn en_passant_rank(self) -> u8 {
        match self {
            Color::White => 4,
            Color::Black => 3,
        }
    }
    /// Rank step of this color's pawns.
    pub fn forward(self) -> i8 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }
}
impl Display for Color {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => write!(f, "white")?,
            Color::Black => write!(f, "black")?,
        }
        Ok(())
    }
}
impl FromStr for Color {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "w" | "white" => Ok(Color::White),
            "b" | "black" => Ok(Color::Black),
            _ => Err(ParseColorError),
        }
    }
}
impl Not for Color {
    type Output = Self;

    fn not(self) -> Self::Output {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }
}
#[cfg(test)]
mod test {
    use crate::color::Color;

    #[test]
    fn parse_and_flip() {
        assert_eq!("White".parse::<Color>(), Ok(Color::White));
        assert_eq!("b".parse::<Color>(), Ok(Color::Black));
        assert!("red".parse::<Color>().is_err());
        assert_eq!(!Color::White, Color::Black);
        assert_eq!(Color::Black.index(), 1);
    }
    #[test]
    fn ranks_mirror_each_other() {
        for color in Color::ALL {
            assert_eq!(color.promotion_rank(), 7 - color.home_rank());
            assert_eq!(color.pawn_home_rank(), 7 - (!color).pawn_home_rank());
            assert_eq!(color.en_passant_rank(), 7 - (!color).en_passant_rank());
        }
        assert_eq!(Color::White.forward(), 1);
    }
}
