use std::fmt::{self, Display, Formatter};

use crate::color::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Outcome {
    #[default]
    InProgress,
    Checkmate(Color),
    Stalemate,
}
impl Outcome {
    pub fn is_over(self) -> bool {
        self != Outcome::InProgress
    }
}
impl Display for Outcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::InProgress => write!(f, "in progress")?,
            Outcome::Checkmate(color) => write!(f, "checkmate, {color} wins")?,
            Outcome::Stalemate => write!(f, "stalemate")?,
        }
        Ok(())
    }
}
