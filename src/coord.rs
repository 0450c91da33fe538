use std::{
    error::Error,
    fmt::{self, Display, Formatter},
    num::NonZero,
    ops::{Mul, Sub},
    str::FromStr,
};

use crate::color::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseCoordError {
    InvalidFile(char),
    InvalidRank(char),
    NotEnoughCharacter(u8),
    Unexpected(char),
}
impl Display for ParseCoordError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ParseCoordError::InvalidFile(file) => write!(
                f,
                "found `{file}`, characters from `a` to `h` were expected instead"
            )?,
            ParseCoordError::InvalidRank(rank) => write!(
                f,
                "found `{rank}`, characters from `1` to `8` were expected instead"
            )?,
            ParseCoordError::NotEnoughCharacter(len) => write!(
                f,
                "provided string have length of {len} characters, 2 were expected"
            )?,
            ParseCoordError::Unexpected(c) => write!(f, "unexpected `{c}`")?,
        }
        Ok(())
    }
}
impl Error for ParseCoordError {}

/// A square of the board. File 0 is the a-file and rank 0 is white's home
/// rank.
// Bit structure: 10FFFRRR
// first two bits is always `10` for `NonZero` size optimizations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position(NonZero<u8>);

impl Position {
    pub fn new(file: u8, rank: u8) -> Self {
        debug_assert!(file < 8);
        debug_assert!(rank < 8);
        let byte = 0b1000_0000 | (file << 3) | rank;
        Position(NonZero::new(byte).unwrap())
    }
    pub fn new_checked(file: u8, rank: u8) -> Option<Self> {
        if file >= 8 || rank >= 8 {
            None
        } else {
            Some(Self::new(file, rank))
        }
    }
    pub fn from_chars(file: char, rank: char) -> Result<Self, ParseCoordError> {
        let file = match file {
            'a'..='h' => file as u8 - b'a',
            _ => return Err(ParseCoordError::InvalidFile(file)),
        };
        let rank = match rank {
            '1'..='8' => rank as u8 - b'1',
            _ => return Err(ParseCoordError::InvalidRank(rank)),
        };
        Ok(Position::new(file, rank))
    }
    pub fn file(self) -> u8 {
        (self.0.get() >> 3) & 0b_111
    }
    pub fn rank(self) -> u8 {
        self.0.get() & 0b_111
    }
    pub fn move_by(self, movement: Vector) -> Option<Self> {
        Self::new_checked(
            self.file().checked_add_signed(movement.x)?,
            self.rank().checked_add_signed(movement.y)?,
        )
    }
    pub fn distance(self, other: Self) -> f64 {
        let difference = other - self;
        f64::from(difference.x).hypot(f64::from(difference.y))
    }
    pub fn color(self) -> Color {
        match (self.file() + self.rank()) % 2 {
            0 => Color::Black,
            1 => Color::White,
            _ => unreachable!(),
        }
    }
}
impl Display for Position {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let file = (self.file() + b'a') as char;
        let rank = self.rank() + 1;
        write!(f, "{file}{rank}")?;
        Ok(())
    }
}
impl FromStr for Position {
    type Err = ParseCoordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let Some(file) = chars.next() else {
            return Err(ParseCoordError::NotEnoughCharacter(0));
        };
        let Some(rank) = chars.next() else {
            return Err(ParseCoordError::NotEnoughCharacter(1));
        };
        if let Some(c) = chars.next() {
            return Err(ParseCoordError::Unexpected(c));
        }
        Position::from_chars(file, rank)
    }
}
impl Sub<Self> for Position {
    type Output = Vector;

    fn sub(self, rhs: Self) -> Self::Output {
        // both operands are below 8, the casts are lossless
        Vector {
            x: self.file() as i8 - rhs.file() as i8,
            y: self.rank() as i8 - rhs.rank() as i8,
        }
    }
}
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Vector {
    pub x: i8,
    pub y: i8,
}
impl Vector {
    pub const KNIGHT_MOVES: [Self; 8] = [
        Vector { x: 1, y: -2 },
        Vector { x: 2, y: -1 },
        Vector { x: 2, y: 1 },
        Vector { x: 1, y: 2 },
        Vector { x: -1, y: 2 },
        Vector { x: -2, y: 1 },
        Vector { x: -2, y: -1 },
        Vector { x: -1, y: -2 },
    ];
    pub const KING_MOVES: [Self; 8] = [
        Vector { x: -1, y: -1 },
        Vector { x: 0, y: -1 },
        Vector { x: 1, y: -1 },
        Vector { x: -1, y: 0 },
        Vector { x: 1, y: 0 },
        Vector { x: -1, y: 1 },
        Vector { x: 0, y: 1 },
        Vector { x: 1, y: 1 },
    ];
    pub const ROOK_DIRECTIONS: [Self; 4] = [
        Vector { x: 0, y: -1 },
        Vector { x: 0, y: 1 },
        Vector { x: -1, y: 0 },
        Vector { x: 1, y: 0 },
    ];
    pub const BISHOP_DIRECTIONS: [Self; 4] = [
        Vector { x: -1, y: -1 },
        Vector { x: 1, y: -1 },
        Vector { x: -1, y: 1 },
        Vector { x: 1, y: 1 },
    ];

    pub fn horizontal(x: i8) -> Self {
        Vector { x, y: 0 }
    }
    pub fn pawn_single_move(color: Color) -> Self {
        Vector {
            x: 0,
            y: color.forward(),
        }
    }
    pub fn pawn_attacks(color: Color) -> [Self; 2] {
        [-1, 1].map(|x| Vector {
            x,
            y: color.forward(),
        })
    }
}
impl Mul<i8> for Vector {
    type Output = Vector;

    fn mul(self, rhs: i8) -> Self::Output {
        Vector {
            x: self.x * rhs,
            y: self.y * rhs,
        }
    }
}
#[cfg(test)]
mod test {
    use crate::{
        color::Color,
        coord::{Position, Vector},
    };

    #[test]
    fn parse_and_display() {
        let position: Position = "e4".parse().unwrap();
        assert_eq!(position.file(), 4);
        assert_eq!(position.rank(), 3);
        assert_eq!(position.to_string(), "e4");
        assert!("i1".parse::<Position>().is_err());
        assert!("a9".parse::<Position>().is_err());
        assert!("a1x".parse::<Position>().is_err());
    }
    #[test]
    fn move_by_stays_on_board() {
        let corner = Position::new(0, 0);
        assert_eq!(corner.move_by(Vector { x: -1, y: 0 }), None);
        assert_eq!(corner.move_by(Vector { x: 1, y: 2 }), Some(Position::new(1, 2)));
        assert_eq!(Position::new(7, 7).move_by(Vector { x: 0, y: 1 }), None);
    }
    #[test]
    fn square_colors() {
        assert_eq!(Position::new(0, 0).color(), Color::Black);
        assert_eq!(Position::new(7, 0).color(), Color::White);
    }
    #[test]
    fn adjacent_squares_are_closer_than_two() {
        let e4 = Position::new(4, 3);
        assert!(e4.distance(Position::new(5, 4)) < 2.0);
        assert!(e4.distance(Position::new(4, 5)) >= 2.0);
    }
}
