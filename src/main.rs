#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]

use std::{
    error::Error,
    fmt::{self, Display, Formatter, Write},
    io::{stdin, stdout},
    process::exit,
    time::Instant,
};

use chessy::{
    Board, Color, Game, GameConfig, PieceKind, Position, RandomPolicy, TurnReport, Verbosity,
    board_display::BoardDisplay, fuzz::fuzz_seeded,
};

const USAGE: &str = "usage: chessy [--human white|black|both|none] [--seed N] [--verbose 0|1|2]
       chessy fuzz [games] [--seed N]";
const AUTOPLAY_PLIES: usize = 1000;
const FUZZ_PLIES: usize = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Play,
    Fuzz { games: usize },
}
#[derive(Debug, Clone, PartialEq, Eq)]
struct Options {
    command: Command,
    config: GameConfig,
    seed: Option<u64>,
}
#[derive(Debug, Clone, PartialEq, Eq)]
enum ArgsError {
    MissingValue(&'static str),
    InvalidValue { flag: &'static str, value: String },
    Unexpected(String),
}
impl Display for ArgsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue(flag) => write!(f, "`{flag}` expects a value")?,
            ArgsError::InvalidValue { flag, value } => {
                write!(f, "`{value}` is not a valid value for `{flag}`")?;
            }
            ArgsError::Unexpected(arg) => write!(f, "unexpected argument `{arg}`")?,
        }
        Ok(())
    }
}
impl Error for ArgsError {}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Options, ArgsError> {
    fn value<T: std::str::FromStr>(
        flag: &'static str,
        args: &mut impl Iterator<Item = String>,
    ) -> Result<T, ArgsError> {
        let value = args.next().ok_or(ArgsError::MissingValue(flag))?;
        value
            .parse()
            .map_err(|_| ArgsError::InvalidValue { flag, value })
    }
    let mut options = Options {
        command: Command::Play,
        config: GameConfig::default(),
        seed: None,
    };
    let mut args = args.into_iter().peekable();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--human" => {
                let humans = args.next().ok_or(ArgsError::MissingValue("--human"))?;
                options.config.human_colors = match humans.as_str() {
                    "both" => Color::ALL.to_vec(),
                    "none" => Vec::new(),
                    color => vec![color.parse().map_err(|_| ArgsError::InvalidValue {
                        flag: "--human",
                        value: humans.clone(),
                    })?],
                };
            }
            "--seed" => options.seed = Some(value("--seed", &mut args)?),
            "--verbose" => options.config.verbosity = value("--verbose", &mut args)?,
            "fuzz" if options.command == Command::Play => {
                let games = if args.peek().is_some_and(|next| !next.starts_with("--")) {
                    value("fuzz", &mut args)?
                } else {
                    10
                };
                options.command = Command::Fuzz { games };
            }
            _ => return Err(ArgsError::Unexpected(arg)),
        }
    }
    Ok(options)
}
fn main() {
    let options = match parse_args(std::env::args().skip(1)) {
        Ok(options) => options,
        Err(err) => {
            eprintln!("Error: {err}");
            eprintln!("{USAGE}");
            exit(2);
        }
    };
    let seed = options.seed.unwrap_or_else(rand::random);
    match options.command {
        Command::Play => play(options.config, RandomPolicy::new(seed)),
        Command::Fuzz { games } => {
            let start = Instant::now();
            match fuzz_seeded(games, FUZZ_PLIES, seed) {
                Ok(summary) => {
                    if options.config.verbosity >= Verbosity::Turns {
                        println!(
                            "{} games, {} plies, {} finished, seed {seed}",
                            summary.games, summary.plies, summary.finished
                        );
                    }
                    if options.config.verbosity >= Verbosity::Timing {
                        println!("took {:?}", start.elapsed());
                    }
                }
                Err(err) => {
                    eprintln!("Error: {err} (seed {seed})");
                    exit(1);
                }
            }
        }
    }
}
fn print_help() {
    println!("flip       - flip the board");
    println!("reset      - reset to starting position");
    println!("exit       - exit the game");
    println!("e2         - view valid moves");
    println!("e2 e4      - play the move");
    println!("e7 e8 n    - move and promote");
    println!("e1 g1      - perform castling");
}
fn autoplay(game: &mut Game<RandomPolicy>, verbosity: Verbosity) {
    match game.run(AUTOPLAY_PLIES) {
        Ok(reports) => {
            if verbosity >= Verbosity::Turns {
                for report in &reports {
                    if let TurnReport::Played { color, entry, .. } = report {
                        println!("{color} played {} {}", entry.start, entry.movement.target);
                    }
                }
            }
            let outcome = game.board().outcome();
            let info = if outcome.is_over() {
                outcome.to_string()
            } else {
                format!("stopped after {AUTOPLAY_PLIES} plies")
            };
            print!(
                "{}",
                BoardDisplay {
                    info: &info,
                    ..BoardDisplay::new(game.board())
                }
            );
        }
        Err(err) => eprintln!("Error: {err}"),
    }
}
#[allow(
    clippy::too_many_lines,
    reason = "one loop owns the whole session state"
)]
fn play(config: GameConfig, policy: RandomPolicy) {
    let verbosity = config.verbosity;
    let mut view = config.human_colors.first().copied().unwrap_or(Color::White);
    let mut game = match Game::new(Board::new(), config, Some(policy)) {
        Ok(game) => game,
        Err(err) => {
            eprintln!("Error: {err}");
            exit(2);
        }
    };
    if game.config().human_colors.is_empty() {
        autoplay(&mut game, verbosity);
        return;
    }
    let mut highlighted = Vec::new();
    let mut update = true;
    let mut first_time = true;
    let mut info = String::new();
    loop {
        if update {
            info.clear();
            loop {
                match game.step() {
                    Ok(TurnReport::Played { color, entry, .. }) => {
                        if verbosity >= Verbosity::Turns {
                            println!("{color} played {} {}", entry.start, entry.movement.target);
                        }
                        highlighted.clear();
                        highlighted.push(entry.start);
                        highlighted.push(entry.movement.target);
                    }
                    Ok(TurnReport::AwaitingHuman(color)) => {
                        writeln!(&mut info, "{color} plays").unwrap();
                        if game.board().in_check() {
                            writeln!(&mut info, "check").unwrap();
                        }
                        break;
                    }
                    Ok(TurnReport::Over(outcome)) => {
                        writeln!(&mut info, "{outcome}").unwrap();
                        break;
                    }
                    Err(err) => {
                        eprintln!("Error: {err}");
                        return;
                    }
                }
            }
        }
        if first_time {
            writeln!(&mut info, "type `help` for instructions").unwrap();
            first_time = false;
        }
        update = false;
        print!(
            "{}",
            BoardDisplay {
                board: game.board(),
                view,
                highlighted: &highlighted,
                info: &info,
            },
        );
        loop {
            print!("> ");
            {
                use std::io::Write;
                if stdout().flush().is_err() {
                    return;
                }
            }
            let mut input = String::new();
            match stdin().read_line(&mut input) {
                Ok(0) => return,
                Ok(_) => {}
                Err(err) => {
                    eprintln!("Error: {err}");
                    return;
                }
            }
            let input = input.trim();
            let words: Vec<_> = input.split_whitespace().collect();
            match words.as_slice() {
                ["help"] => print_help(),
                ["reset"] => {
                    game.reset();
                    update = true;
                    highlighted.clear();
                }
                ["exit"] => return,
                ["flip"] => view = !view,
                [square] => {
                    let position: Position = match square.parse() {
                        Ok(position) => position,
                        Err(err) => {
                            eprintln!("Error: {err}");
                            continue;
                        }
                    };
                    let Some(piece) = game.board().piece_at(position) else {
                        eprintln!("Error: there is no piece on {position}");
                        continue;
                    };
                    let start = Instant::now();
                    let moves = piece.legal_moves();
                    if verbosity >= Verbosity::Timing {
                        println!("{} moves in {:?}", moves.len(), start.elapsed());
                    }
                    highlighted.clear();
                    highlighted.extend(moves.into_iter().map(|movement| movement.target));
                }
                [origin, destination, rest @ ..] if rest.len() <= 1 => {
                    let (origin, destination): (Position, Position) =
                        match (origin.parse::<Position>(), destination.parse::<Position>()) {
                            (Ok(origin), Ok(destination)) => (origin, destination),
                            (Err(err), _) | (_, Err(err)) => {
                                eprintln!("Error: {err}");
                                continue;
                            }
                        };
                    let Some(piece) = game.board().piece_at(origin).map(|piece| piece.id())
                    else {
                        eprintln!("Error: there is no piece on {origin}");
                        continue;
                    };
                    if let [promotion] = rest {
                        let kind: PieceKind = match promotion.parse() {
                            Ok(kind) => kind,
                            Err(err) => {
                                eprintln!("Error: {err}");
                                continue;
                            }
                        };
                        if let Err(err) = game.set_promotion_choice(piece, kind) {
                            eprintln!("Error: {err}");
                            continue;
                        }
                    }
                    match game.human_move(piece, destination) {
                        Ok(executed) => {
                            let warning = executed
                                .warning
                                .filter(|_| verbosity >= Verbosity::Turns);
                            if let Some(warning) = warning {
                                println!("Warning: {warning}");
                            }
                        }
                        Err(err) => {
                            eprintln!("Error: {err}");
                            continue;
                        }
                    }
                    highlighted.clear();
                    highlighted.push(origin);
                    highlighted.push(destination);
                    update = true;
                }
                _ => {
                    eprintln!("Error: {input} is not a command, type `help` for instructions");
                    continue;
                }
            }
            break;
        }
    }
}
