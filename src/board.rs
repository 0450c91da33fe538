use rustc_hash::FxHashMap;

use crate::{
    color::Color,
    coord::{Position, Vector},
    error::{InvalidBoard, MoveError, PromotionError, PromotionWarning},
    movement::{HistoryEntry, Move, MoveKind, SpecialKind},
    outcome::Outcome,
    piece::{Piece, PieceId, PieceKind, PieceRef, resolve_promotion},
};

/// What [`Board::execute_move`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Executed {
    pub target: Position,
    pub warning: Option<PromotionWarning>,
}

/// Owner of every piece and of the game state.
///
/// Legality is decided by forking: to know whether a move leaves the mover's
/// king attacked, the board is cloned, the move is replayed on the clone and
/// the clone is asked. Clones are marked hypothetical and never write back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    pieces: Vec<Option<Piece>>,
    occupancy: FxHashMap<Position, PieceId>,
    by_color: [Vec<PieceId>; 2],
    kings: [PieceId; 2],
    turn: Color,
    in_check: bool,
    outcome: Outcome,
    history: Vec<HistoryEntry>,
    hypothetical: bool,
}
impl Board {
    pub fn new() -> Self {
        let pieces = Color::ALL.into_iter().flat_map(|color| {
            (0..).zip(PieceKind::STARTING_CONFIGURATION).flat_map(move |(file, kind)| {
                [
                    Piece::new(color, kind, Position::new(file, color.home_rank())),
                    Piece::new(
                        color,
                        PieceKind::Pawn,
                        Position::new(file, color.pawn_home_rank()),
                    ),
                ]
            })
        });
        Board::with_pieces(Color::White, pieces).expect("starting position should be valid")
    }
    pub fn with_pieces(
        turn: Color,
        pieces: impl IntoIterator<Item = Piece>,
    ) -> Result<Self, InvalidBoard> {
        let mut arena = Vec::new();
        let mut occupancy = FxHashMap::default();
        let mut by_color = [Vec::new(), Vec::new()];
        let mut kings = [None; 2];
        for piece in pieces {
            let id = PieceId::from_index(arena.len());
            if occupancy.insert(piece.position, id).is_some() {
                return Err(InvalidBoard::SquareTaken(piece.position));
            }
            if piece.is_royal() && kings[piece.color.index()].replace(id).is_some() {
                return Err(InvalidBoard::ExceededKings(piece.color));
            }
            by_color[piece.color.index()].push(id);
            arena.push(Some(piece));
        }
        let kings = match kings {
            [Some(white), Some(black)] => [white, black],
            [None, _] => return Err(InvalidBoard::NoKing(Color::White)),
            [_, None] => return Err(InvalidBoard::NoKing(Color::Black)),
        };
        let mut board = Board {
            pieces: arena,
            occupancy,
            by_color,
            kings,
            turn,
            in_check: false,
            outcome: Outcome::InProgress,
            history: Vec::new(),
            hypothetical: false,
        };
        if board.is_king_attacked(!turn) {
            return Err(InvalidBoard::NonPlayerInCheck);
        }
        board.in_check = board.is_king_attacked(turn);
        Ok(board)
    }
    pub fn turn(&self) -> Color {
        self.turn
    }
    pub fn in_check(&self) -> bool {
        self.in_check
    }
    pub fn outcome(&self) -> Outcome {
        self.outcome
    }
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }
    pub fn is_hypothetical(&self) -> bool {
        self.hypothetical
    }
    pub fn piece(&self, id: PieceId) -> Option<PieceRef<'_>> {
        self.get(id).map(|piece| PieceRef::new(self, id, piece))
    }
    pub fn piece_at(&self, position: Position) -> Option<PieceRef<'_>> {
        self.occupancy
            .get(&position)
            .and_then(|id| self.piece(*id))
    }
    pub fn pieces(&self, color: Color) -> impl Iterator<Item = PieceRef<'_>> {
        self.by_color[color.index()]
            .iter()
            .map(|id| PieceRef::new(self, *id, self.live(*id)))
    }
    pub fn king(&self, color: Color) -> PieceRef<'_> {
        let id = self.kings[color.index()];
        PieceRef::new(self, id, self.live(id))
    }
    fn get(&self, id: PieceId) -> Option<Piece> {
        self.pieces.get(id.index()).copied().flatten()
    }
    fn live(&self, id: PieceId) -> Piece {
        self.get(id).expect("piece ids held by the board should be live")
    }
    fn occupant(&self, position: Position) -> Option<Piece> {
        self.occupancy.get(&position).map(|id| self.live(*id))
    }

    /// Classifies a single candidate square for `piece`. `None` stands for a
    /// square off the board.
    ///
    /// Unless `skip_self_check` is set, any move that would otherwise be
    /// offered is replayed on a fork and turned into
    /// [`MoveKind::LeadingToSelfCheck`] when it exposes the mover's king.
    pub(crate) fn evaluate_square(
        &self,
        piece: PieceId,
        target: Option<Position>,
        can_capture: bool,
        skip_self_check: bool,
    ) -> Move {
        let mover = self.live(piece);
        let Some(target) = target else {
            return Move::forbidden(piece, mover.position);
        };
        let kind = match self.occupant(target) {
            Some(other) if other.color == mover.color => {
                return Move::forbidden(piece, mover.position);
            }
            Some(_) if !can_capture => return Move::forbidden(piece, mover.position),
            Some(other) if other.is_royal() => MoveKind::OverCheck,
            Some(_) => MoveKind::Kill,
            None => MoveKind::ToEmpty,
        };
        let special = (mover.kind == PieceKind::Pawn
            && kind != MoveKind::OverCheck
            && target.rank() == mover.color.promotion_rank())
        .then_some(SpecialKind::PromotionPending);
        self.screen(
            Move {
                kind,
                piece,
                target,
                special,
            },
            skip_self_check,
        )
    }
    fn screen(&self, movement: Move, skip_self_check: bool) -> Move {
        if skip_self_check
            || !matches!(
                movement.kind,
                MoveKind::ToEmpty | MoveKind::Kill | MoveKind::Special
            )
            || !self.leads_to_self_check(movement)
        {
            movement
        } else {
            Move {
                kind: MoveKind::LeadingToSelfCheck,
                ..movement
            }
        }
    }
    fn leads_to_self_check(&self, movement: Move) -> bool {
        let color = self.live(movement.piece).color;
        self.fork(Some(movement)).is_king_attacked(color)
    }

    /// Every classified move of `id` except forbidden ones. The check
    /// detector calls this with `skip_self_check` set, in that mode castling
    /// is never generated so a detection can never start another one.
    pub(crate) fn moves(&self, id: PieceId, skip_self_check: bool) -> Vec<Move> {
        let piece = self.live(id);
        let moves: Box<dyn Iterator<Item = Move> + '_> = match piece.kind {
            PieceKind::Pawn => Box::new(self.pawn_moves(id, piece, skip_self_check).into_iter()),
            PieceKind::Knight => Box::new(self.step_moves(
                id,
                piece,
                &Vector::KNIGHT_MOVES,
                skip_self_check,
            )),
            PieceKind::Bishop => Box::new(self.all_directional_moves(
                id,
                piece,
                &Vector::BISHOP_DIRECTIONS,
                skip_self_check,
            )),
            PieceKind::Rook => Box::new(self.all_directional_moves(
                id,
                piece,
                &Vector::ROOK_DIRECTIONS,
                skip_self_check,
            )),
            // adjacent squares come out twice, nothing relies on uniqueness
            PieceKind::Queen => Box::new(
                self.step_moves(id, piece, &Vector::KING_MOVES, skip_self_check)
                    .chain(self.all_directional_moves(
                        id,
                        piece,
                        &Vector::BISHOP_DIRECTIONS,
                        skip_self_check,
                    ))
                    .chain(self.all_directional_moves(
                        id,
                        piece,
                        &Vector::ROOK_DIRECTIONS,
                        skip_self_check,
                    )),
            ),
            PieceKind::King => {
                let castling = if skip_self_check {
                    Vec::new()
                } else {
                    self.castling_moves(id, piece)
                };
                Box::new(
                    self.step_moves(id, piece, &Vector::KING_MOVES, skip_self_check)
                        .chain(castling),
                )
            }
        };
        moves
            .filter(|movement| movement.kind != MoveKind::Forbidden)
            .collect()
    }
    pub(crate) fn legal_moves(&self, id: PieceId) -> Vec<Move> {
        if self.get(id).is_none() {
            return Vec::new();
        }
        self.moves(id, false)
            .into_iter()
            .filter(|movement| movement.is_playable())
            .collect()
    }
    /// Every move the side to move may play.
    pub fn all_legal_moves(&self) -> Vec<Move> {
        self.by_color[self.turn.index()]
            .iter()
            .flat_map(|id| self.legal_moves(*id))
            .collect()
    }
    fn has_any_legal_move(&self, color: Color) -> bool {
        self.by_color[color.index()].iter().any(|id| {
            self.moves(*id, false)
                .into_iter()
                .any(|movement| movement.is_playable())
        })
    }
    fn step_moves<'a>(
        &'a self,
        id: PieceId,
        piece: Piece,
        offsets: &'a [Vector],
        skip_self_check: bool,
    ) -> impl Iterator<Item = Move> + 'a {
        offsets.iter().map(move |offset| {
            self.evaluate_square(id, piece.position.move_by(*offset), true, skip_self_check)
        })
    }
    fn directional_moves(
        &self,
        id: PieceId,
        piece: Piece,
        direction: Vector,
        skip_self_check: bool,
    ) -> impl Iterator<Item = Move> + '_ {
        let mut resume = true;
        (1..).map_while(move |distance| {
            if !resume {
                return None;
            }
            let movement = self.evaluate_square(
                id,
                piece.position.move_by(direction * distance),
                true,
                skip_self_check,
            );
            if movement.kind == MoveKind::Forbidden {
                return None;
            }
            resume = !self.occupancy.contains_key(&movement.target);
            Some(movement)
        })
    }
    fn all_directional_moves<'a>(
        &'a self,
        id: PieceId,
        piece: Piece,
        directions: &'a [Vector],
        skip_self_check: bool,
    ) -> impl Iterator<Item = Move> + 'a {
        directions.iter().flat_map(move |direction| {
            self.directional_moves(id, piece, *direction, skip_self_check)
        })
    }
    fn pawn_moves(&self, id: PieceId, piece: Piece, skip_self_check: bool) -> Vec<Move> {
        let forward = Vector::pawn_single_move(piece.color);
        let mut moves = Vec::new();

        let single = self.evaluate_square(
            id,
            piece.position.move_by(forward),
            false,
            skip_self_check,
        );
        if single.kind != MoveKind::Forbidden {
            moves.push(single);
            if !piece.has_moved {
                moves.push(self.evaluate_square(
                    id,
                    piece.position.move_by(forward * 2),
                    false,
                    skip_self_check,
                ));
            }
        }
        moves.extend(
            Vector::pawn_attacks(piece.color)
                .into_iter()
                .filter_map(|attack| piece.position.move_by(attack))
                .filter(|target| self.occupancy.contains_key(target))
                .map(|target| self.evaluate_square(id, Some(target), true, skip_self_check)),
        );
        moves.extend(self.en_passant_move(id, piece, skip_self_check));
        moves
    }
    fn en_passant_move(&self, id: PieceId, piece: Piece, skip_self_check: bool) -> Option<Move> {
        if piece.position.rank() != piece.color.en_passant_rank() {
            return None;
        }
        let last = self.history.last()?;
        let landed = last.movement.target;
        let victim = self.get(last.piece)?;
        if !last.is_double_step()
            || last.had_moved_before
            || victim.color == piece.color
            || victim.position != landed
            || landed.rank() != piece.position.rank()
            || landed.file().abs_diff(piece.position.file()) != 1
        {
            return None;
        }
        let target = landed.move_by(Vector::pawn_single_move(piece.color))?;
        if self.occupancy.contains_key(&target) {
            return None;
        }
        Some(self.screen(
            Move {
                kind: MoveKind::Special,
                piece: id,
                target,
                special: Some(SpecialKind::EnPassant),
            },
            skip_self_check,
        ))
    }
    fn castling_moves(&self, id: PieceId, king: Piece) -> Vec<Move> {
        if king.has_moved || self.is_king_attacked(king.color) {
            return Vec::new();
        }
        // (direction, distance from the king to its rook)
        [(1, 3), (-1, 4)]
            .into_iter()
            .filter_map(|(direction, rook_distance)| {
                let corner = king
                    .position
                    .move_by(Vector::horizontal(direction * rook_distance))?;
                let rook = self.occupant(corner)?;
                if rook.kind != PieceKind::Rook || rook.color != king.color || rook.has_moved {
                    return None;
                }
                let path_is_clear = (1..rook_distance).all(|step| {
                    king.position
                        .move_by(Vector::horizontal(direction * step))
                        .is_some_and(|position| !self.occupancy.contains_key(&position))
                });
                if !path_is_clear {
                    return None;
                }
                let passes_safely = (1..=2).all(|step| {
                    king.position
                        .move_by(Vector::horizontal(direction * step))
                        .is_some_and(|position| {
                            let step = Move {
                                kind: MoveKind::ToEmpty,
                                piece: id,
                                target: position,
                                special: None,
                            };
                            !self.fork(Some(step)).is_king_attacked(king.color)
                        })
                });
                if !passes_safely {
                    return None;
                }
                let target = king.position.move_by(Vector::horizontal(direction * 2))?;
                Some(self.screen(
                    Move {
                        kind: MoveKind::Special,
                        piece: id,
                        target,
                        special: Some(SpecialKind::Castling),
                    },
                    false,
                ))
            })
            .collect()
    }

    /// Whether the king of `color` is attacked on this board, real or
    /// hypothetical. Enemy moves are generated without the self-check test.
    pub fn is_king_attacked(&self, color: Color) -> bool {
        let king = self.live(self.kings[color.index()]);
        self.by_color[(!color).index()].iter().any(|id| {
            let enemy = self.live(*id);
            // unreachable in real play, a hypothesis can still put kings side by side
            if enemy.is_royal() && enemy.position.distance(king.position) < 2.0 {
                return true;
            }
            self.moves(*id, true)
                .into_iter()
                .any(|movement| movement.kind == MoveKind::OverCheck)
        })
    }

    /// An independent hypothetical copy of the board, optionally with one
    /// move already replayed on it. The turn is not advanced on the copy.
    ///
    /// `relocation` must come from this board's own move generation.
    pub(crate) fn fork(&self, relocation: Option<Move>) -> Board {
        let mut hypothesis = self.clone();
        hypothesis.hypothetical = true;
        if let Some(movement) = relocation {
            hypothesis.execute_unchecked(movement, false);
        }
        hypothesis
    }

    /// The board as it would be after `piece` moved to `target`, without the
    /// turn passing. `None` when that move is not legal right now.
    pub fn fork_with(&self, piece: PieceId, target: Position) -> Option<Board> {
        let movement = self.is_legal(piece, target)?;
        Some(self.fork(Some(movement)))
    }
    pub fn is_legal(&self, piece: PieceId, target: Position) -> Option<Move> {
        self.legal_moves(piece)
            .into_iter()
            .find(|movement| movement.target == target)
    }
    pub fn set_promotion_choice(
        &mut self,
        piece: PieceId,
        kind: PieceKind,
    ) -> Result<(), PromotionError> {
        let slot = self
            .pieces
            .get_mut(piece.index())
            .and_then(Option::as_mut)
            .ok_or(PromotionError::UnknownPiece(piece))?;
        if slot.kind != PieceKind::Pawn {
            return Err(PromotionError::NotAPawn(piece));
        }
        if !kind.is_promotion_choice() {
            return Err(PromotionError::InvalidChoice(kind));
        }
        slot.promotion_choice = Some(kind);
        Ok(())
    }
    /// The only way the game moves forward. A rejected move leaves the board
    /// untouched.
    pub fn execute_move(
        &mut self,
        piece: PieceId,
        target: Position,
    ) -> Result<Executed, MoveError> {
        if self.outcome.is_over() {
            return Err(MoveError::GameOver(self.outcome));
        }
        let mover = self.get(piece).ok_or(MoveError::UnknownPiece(piece))?;
        if mover.color != self.turn {
            return Err(MoveError::NotYourTurn {
                piece,
                turn: self.turn,
            });
        }
        let movement = self
            .is_legal(piece, target)
            .ok_or(MoveError::IllegalTarget { piece, target })?;
        let warning = self.execute_unchecked(movement, true);
        Ok(Executed { target, warning })
    }
    pub fn play(&mut self, movement: Move) -> Result<Executed, MoveError> {
        self.execute_move(movement.piece, movement.target)
    }
    fn execute_unchecked(
        &mut self,
        movement: Move,
        advance_turn: bool,
    ) -> Option<PromotionWarning> {
        let id = movement.piece;
        let target = movement.target;
        let mut piece = self.live(id);
        let start = piece.position;
        self.history.push(HistoryEntry {
            start,
            movement,
            piece: id,
            kind: piece.kind,
            had_moved_before: piece.has_moved,
        });
        self.occupancy.remove(&start);
        piece.position = target;
        piece.has_moved = true;

        match movement.special {
            Some(SpecialKind::Castling) => {
                let (rook_origin, rook_destination) = if target.file() > start.file() {
                    (
                        start.move_by(Vector::horizontal(3)),
                        target.move_by(Vector::horizontal(-1)),
                    )
                } else {
                    (
                        start.move_by(Vector::horizontal(-4)),
                        target.move_by(Vector::horizontal(1)),
                    )
                };
                if let (Some(origin), Some(destination)) = (rook_origin, rook_destination) {
                    if let Some(rook_id) = self.occupancy.remove(&origin) {
                        if let Some(rook) = self.pieces[rook_id.index()].as_mut() {
                            rook.position = destination;
                            rook.has_moved = true;
                        }
                        self.occupancy.insert(destination, rook_id);
                    }
                }
            }
            Some(SpecialKind::EnPassant) => {
                let captured = Position::new(target.file(), start.rank());
                if let Some(victim) = self.occupancy.get(&captured).copied() {
                    self.remove(victim);
                }
            }
            Some(SpecialKind::PromotionPending) | None => {}
        }
        if let Some(victim) = self.occupancy.get(&target).copied() {
            debug_assert!(!self.live(victim).is_royal(), "a king was captured");
            self.remove(victim);
        }
        self.pieces[id.index()] = Some(piece);
        self.occupancy.insert(target, id);

        if !advance_turn {
            return None;
        }
        let mut warning = None;
        if piece.kind == PieceKind::Pawn && target.rank() == piece.color.promotion_rank() {
            let (kind, promotion_warning) = resolve_promotion(piece.promotion_choice);
            warning = promotion_warning;
            self.promote(id, kind);
        }
        self.turn = !self.turn;
        self.in_check = self.is_king_attacked(self.turn);
        if !self.has_any_legal_move(self.turn) {
            self.outcome = if self.in_check {
                Outcome::Checkmate(!self.turn)
            } else {
                Outcome::Stalemate
            };
        }
        warning
    }
    fn remove(&mut self, id: PieceId) {
        if let Some(piece) = self.pieces[id.index()].take() {
            self.occupancy.remove(&piece.position);
            self.by_color[piece.color.index()].retain(|other| *other != id);
        }
    }
    fn promote(&mut self, pawn: PieceId, kind: PieceKind) {
        let old = self.live(pawn);
        self.remove(pawn);
        let id = PieceId::from_index(self.pieces.len());
        self.pieces
            .push(Some(Piece::new(old.color, kind, old.position).moved()));
        self.occupancy.insert(old.position, id);
        self.by_color[old.color.index()].push(id);
    }
}
impl Default for Board {
    fn default() -> Self {
        Board::new()
    }
}
