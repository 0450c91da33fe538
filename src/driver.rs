use std::{
    error::Error,
    fmt::{self, Display, Formatter},
    str::FromStr,
};

use rand::{SeedableRng, rngs::SmallRng, seq::IndexedRandom};

use crate::{
    board::{Board, Executed},
    color::Color,
    coord::Position,
    error::{DriverError, PromotionError},
    movement::{HistoryEntry, SpecialKind},
    outcome::Outcome,
    piece::{PieceId, PieceKind},
};

/// How much the terminal front end prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Verbosity {
    Quiet,
    #[default]
    Turns,
    Timing,
}
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseVerbosityError(String);
impl Display for ParseVerbosityError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "found `{}`, `0`, `1`, or `2` were expected instead", self.0)?;
        Ok(())
    }
}
impl Error for ParseVerbosityError {}

impl FromStr for Verbosity {
    type Err = ParseVerbosityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let verbosity = match s {
            "0" => Verbosity::Quiet,
            "1" => Verbosity::Turns,
            "2" => Verbosity::Timing,
            _ => return Err(ParseVerbosityError(s.to_owned())),
        };
        Ok(verbosity)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    pub human_colors: Vec<Color>,
    pub verbosity: Verbosity,
}
impl GameConfig {
    pub fn is_human(&self, color: Color) -> bool {
        self.human_colors.contains(&color)
    }
}
impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            human_colors: Color::ALL.to_vec(),
            verbosity: Verbosity::default(),
        }
    }
}

/// Something that plays for the side to move.
pub trait Policy {
    /// Plays exactly one move through [`Board::execute_move`] or leaves the
    /// board alone when it can't.
    fn play(&mut self, board: &mut Board);
}

/// Picks a random piece that can move, then one of its moves.
#[derive(Debug, Clone)]
pub struct RandomPolicy {
    rng: SmallRng,
}
impl RandomPolicy {
    pub fn new(seed: u64) -> Self {
        RandomPolicy {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}
impl Policy for RandomPolicy {
    fn play(&mut self, board: &mut Board) {
        let movable: Vec<_> = board
            .pieces(board.turn())
            .map(|piece| piece.legal_moves())
            .filter(|moves| !moves.is_empty())
            .collect();
        let Some(movement) = movable
            .choose(&mut self.rng)
            .and_then(|moves| moves.choose(&mut self.rng))
            .copied()
        else {
            return;
        };
        if movement.special == Some(SpecialKind::PromotionPending) {
            let kind = PieceKind::PROMOTION_CHOICES
                .choose(&mut self.rng)
                .copied()
                .unwrap_or(PieceKind::Queen);
            if board.set_promotion_choice(movement.piece, kind).is_err() {
                return;
            }
        }
        let _ = board.play(movement);
    }
}

/// What one call to [`Game::step`] amounted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TurnReport {
    Played {
        color: Color,
        entry: HistoryEntry,
        outcome: Outcome,
    },
    AwaitingHuman(Color),
    Over(Outcome),
}

/// Alternates turns between humans and a policy over one board.
#[derive(Debug, Clone)]
pub struct Game<P> {
    board: Board,
    config: GameConfig,
    policy: Option<P>,
}
impl<P> Game<P>
where
    P: Policy,
{
    pub fn new(board: Board, config: GameConfig, policy: Option<P>) -> Result<Self, DriverError> {
        if policy.is_none() {
            if config.human_colors.is_empty() {
                return Err(DriverError::NoController);
            }
            if let Some(color) = Color::ALL.into_iter().find(|color| !config.is_human(*color)) {
                return Err(DriverError::MissingPolicy(color));
            }
        }
        Ok(Game {
            board,
            config,
            policy,
        })
    }
    pub fn board(&self) -> &Board {
        &self.board
    }
    pub fn config(&self) -> &GameConfig {
        &self.config
    }
    pub fn reset(&mut self) {
        self.board = Board::new();
    }
    pub fn set_promotion_choice(
        &mut self,
        piece: PieceId,
        kind: PieceKind,
    ) -> Result<(), PromotionError> {
        self.board.set_promotion_choice(piece, kind)
    }
    pub fn human_move(
        &mut self,
        piece: PieceId,
        target: Position,
    ) -> Result<Executed, DriverError> {
        let turn = self.board.turn();
        if !self.config.is_human(turn) {
            return Err(DriverError::NotHumanTurn(turn));
        }
        Ok(self.board.execute_move(piece, target)?)
    }
    pub fn step(&mut self) -> Result<TurnReport, DriverError> {
        let outcome = self.board.outcome();
        if outcome.is_over() {
            return Ok(TurnReport::Over(outcome));
        }
        let turn = self.board.turn();
        if self.config.is_human(turn) {
            return Ok(TurnReport::AwaitingHuman(turn));
        }
        let policy = self
            .policy
            .as_mut()
            .ok_or(DriverError::MissingPolicy(turn))?;
        policy.play(&mut self.board);
        if self.board.turn() == turn && self.board.outcome() == outcome {
            return Err(DriverError::PolicyStalled(turn));
        }
        let entry = self
            .board
            .history()
            .last()
            .copied()
            .ok_or(DriverError::PolicyStalled(turn))?;
        Ok(TurnReport::Played {
            color: turn,
            entry,
            outcome: self.board.outcome(),
        })
    }
    /// Steps until the game ends, a human has to move, or `max_plies` moves
    /// were played.
    pub fn run(&mut self, max_plies: usize) -> Result<Vec<TurnReport>, DriverError> {
        let mut reports = Vec::new();
        for _ in 0..max_plies {
            let report = self.step()?;
            reports.push(report);
            if !matches!(report, TurnReport::Played { .. }) {
                break;
            }
        }
        Ok(reports)
    }
}
#[cfg(test)]
mod test {
    use crate::{
        board::Board,
        color::Color,
        driver::{Game, GameConfig, Policy, RandomPolicy, TurnReport, Verbosity},
        error::DriverError,
    };

    struct Idle;
    impl Policy for Idle {
        fn play(&mut self, _: &mut Board) {}
    }

    fn config(human_colors: &[Color]) -> GameConfig {
        GameConfig {
            human_colors: human_colors.to_vec(),
            verbosity: Verbosity::Quiet,
        }
    }
    #[test]
    fn needs_someone_to_play() {
        let nobody = Game::<RandomPolicy>::new(Board::new(), config(&[]), None);
        assert_eq!(nobody.err(), Some(DriverError::NoController));
        let half = Game::<RandomPolicy>::new(Board::new(), config(&[Color::White]), None);
        assert_eq!(half.err(), Some(DriverError::MissingPolicy(Color::Black)));
        let humans = Game::<RandomPolicy>::new(Board::new(), GameConfig::default(), None);
        assert!(humans.is_ok());
    }
    #[test]
    fn human_and_policy_alternate() {
        let mut game = Game::new(
            Board::new(),
            config(&[Color::White]),
            Some(RandomPolicy::new(7)),
        )
        .unwrap();
        assert_eq!(game.step(), Ok(TurnReport::AwaitingHuman(Color::White)));
        let pawn = game.board().piece_at("e2".parse().unwrap()).unwrap().id();
        game.human_move(pawn, "e4".parse().unwrap()).unwrap();
        let Ok(TurnReport::Played { color, .. }) = game.step() else {
            panic!("the policy should have played");
        };
        assert_eq!(color, Color::Black);
        assert_eq!(game.board().history().len(), 2);
        assert_eq!(game.step(), Ok(TurnReport::AwaitingHuman(Color::White)));
    }
    #[test]
    fn humans_cannot_move_for_the_policy() {
        let mut game = Game::new(
            Board::new(),
            config(&[Color::Black]),
            Some(RandomPolicy::new(7)),
        )
        .unwrap();
        let pawn = game.board().piece_at("e2".parse().unwrap()).unwrap().id();
        assert_eq!(
            game.human_move(pawn, "e4".parse().unwrap()),
            Err(DriverError::NotHumanTurn(Color::White))
        );
    }
    #[test]
    fn idle_policy_is_reported() {
        let mut game = Game::new(Board::new(), config(&[]), Some(Idle)).unwrap();
        assert_eq!(game.step(), Err(DriverError::PolicyStalled(Color::White)));
    }
    #[test]
    fn random_games_follow_the_rules() {
        for seed in 0..3 {
            let mut game =
                Game::new(Board::new(), config(&[]), Some(RandomPolicy::new(seed))).unwrap();
            let reports = game.run(120).unwrap();
            let played = reports
                .iter()
                .filter(|report| matches!(report, TurnReport::Played { .. }))
                .count();
            assert_eq!(played, game.board().history().len());
            let mut expected = Color::White;
            for report in &reports {
                if let TurnReport::Played { color, .. } = report {
                    assert_eq!(*color, expected);
                    expected = !expected;
                }
            }
            let board = game.board();
            assert!(!board.is_king_attacked(!board.turn()));
            if board.outcome().is_over() {
                assert!(board.all_legal_moves().is_empty());
            }
        }
    }
}
