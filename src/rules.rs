/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use crate::{
    pseudo_legal_moves, Bestiary, Color, GameResult, Move, PieceKind, Position, Square, State,
    StateHash,
};

/// What the rules need to know about a ply that came before the one being evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlyRecord {
    pub hash: StateHash,
    pub irreversible: bool,
    pub repetitions: u32,
}

/// Everything the rules decide about a committed state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub moves: Vec<Move>,
    pub checks: Vec<Square>,
    pub hash: StateHash,
    pub repetitions: u32,
    pub dead_position: bool,
    pub result: GameResult,
}

impl Evaluation {
    #[inline(always)]
    pub fn is_check(&self) -> bool {
        !self.checks.is_empty()
    }
}

/// The rules of a game: which moves are legal and when the game ends.
///
/// Every method has a default following orthodox chess, so a variant only overrides what it
/// changes.
pub trait RuleEngine: fmt::Debug {
    /// Legal moves of the side to move: piece moves and castles, minus those leaving the mover in
    /// check.
    fn moves(&self, state: &State, bestiary: &Bestiary) -> Vec<Move> {
        let promotes = bestiary.promotes();
        let mut moves = Vec::with_capacity(64);
        pseudo_legal_moves(state, &promotes, &mut moves);
        state.castling().moves(state, &mut moves);

        let position = state.position();
        moves.retain(|mv| !mv.is_check(position));
        moves
    }

    /// Squares of the side to move's royal pieces that are under attack.
    fn check_squares(&self, state: &State) -> Vec<Square> {
        state.position().checks(state.color())
    }

    /// How many times the position of `current` has occurred, counting back through `history`
    /// (most recent ply first) until an irreversible ply.
    fn repetition_count(
        &self,
        current: PlyRecord,
        history: &mut dyn Iterator<Item = PlyRecord>,
    ) -> u32 {
        if current.irreversible {
            return 1;
        }
        for ply in history {
            if ply.hash == current.hash {
                return ply.repetitions + 1;
            }
            if ply.irreversible {
                break;
            }
        }
        1
    }

    /// Whether neither side has the material to deliver mate.
    fn is_dead_position(&self, position: &Position) -> bool {
        !can_deliver_mate(position, Color::White) && !can_deliver_mate(position, Color::Black)
    }

    /// Whether `color` still has the material to deliver mate.
    fn can_deliver_mate(&self, position: &Position, color: Color) -> bool {
        can_deliver_mate(position, color)
    }

    /// The result of a state, given what has been evaluated about it so far.
    ///
    /// In order: no legal moves ends the game in checkmate or stalemate, then a dead position,
    /// then the 75-move rule, then fivefold repetition. Otherwise `prior` stands.
    fn result(&self, state: &State, evaluation: &Evaluation, prior: GameResult) -> GameResult {
        if evaluation.moves.is_empty() {
            if evaluation.is_check() {
                return GameResult::Checkmate(state.color().opponent());
            }
            return GameResult::Stalemate;
        }
        if evaluation.dead_position {
            return GameResult::DeadPosition;
        }
        if state.halfmove() >= 150 {
            return GameResult::SeventyFiveMoves;
        }
        if evaluation.repetitions >= 5 {
            return GameResult::FivefoldRepetition;
        }
        prior
    }

    /// Runs every rule over `state`.
    fn evaluate(
        &self,
        state: &State,
        bestiary: &Bestiary,
        irreversible: bool,
        history: &mut dyn Iterator<Item = PlyRecord>,
        prior: GameResult,
    ) -> Evaluation {
        let hash = state.hash();
        let current = PlyRecord {
            hash,
            irreversible,
            repetitions: 1,
        };

        let mut evaluation = Evaluation {
            moves: self.moves(state, bestiary),
            checks: self.check_squares(state),
            hash,
            repetitions: self.repetition_count(current, history),
            dead_position: self.is_dead_position(state.position()),
            result: GameResult::NoResult,
        };
        evaluation.result = self.result(state, &evaluation, prior);
        evaluation
    }
}

/// Orthodox chess rules.
#[derive(Debug, Default, Clone, Copy)]
pub struct ChessRules;

impl RuleEngine for ChessRules {}

/// Tracks the minor pieces of one side while scanning a position.
///
/// A second knight, a bishop next to a knight, or bishops on both square colors are enough to
/// mate.
#[derive(Debug, Default)]
struct MaterialAnalyzer {
    knights: u32,
    bishop_color: Option<Color>,
}

impl MaterialAnalyzer {
    fn on_knight(&mut self) -> bool {
        if self.knights > 0 || self.bishop_color.is_some() {
            return true;
        }
        self.knights += 1;
        false
    }

    fn on_bishop(&mut self, square_color: Color) -> bool {
        if self.knights > 0 {
            return true;
        }
        if self.bishop_color.is_some_and(|c| c != square_color) {
            return true;
        }
        self.bishop_color = Some(square_color);
        false
    }

    fn can_mate(&mut self, square: Square, kind: PieceKind) -> bool {
        match kind {
            PieceKind::Knight => self.on_knight(),
            PieceKind::Bishop => self.on_bishop(square.color()),
            kind => kind.is_mating(),
        }
    }
}

/// Whether the pieces of `color` in `position` could ever deliver mate.
///
/// # Example
/// ```
/// # use xchess::{can_deliver_mate, Color, Game};
/// let game = Game::from_fen("8/8/4k3/8/8/2NK4/8/8 w - - 0 1").unwrap();
/// let position = game.position();
/// assert!(!can_deliver_mate(&position, Color::White));
/// assert!(!can_deliver_mate(&position, Color::Black));
/// ```
pub fn can_deliver_mate(position: &Position, color: Color) -> bool {
    let mut analyzer = MaterialAnalyzer::default();
    position
        .pieces(color)
        .any(|(square, piece)| analyzer.can_mate(square, piece.kind()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Board, Castling, Piece};

    fn position(pieces: &[(&str, Piece)]) -> Position {
        let board = Board::default();
        let mut position = Position::new(board);
        for &(name, piece) in pieces {
            position.put(board.parse_square(name).unwrap(), piece);
        }
        position
    }

    fn kings() -> Vec<(&'static str, Piece)> {
        vec![("e1", Piece::WHITE_KING), ("e8", Piece::BLACK_KING)]
    }

    #[test]
    fn test_dead_positions() {
        let rules = ChessRules;

        assert!(rules.is_dead_position(&position(&kings())));

        let mut pieces = kings();
        pieces.push(("c3", Piece::WHITE_KNIGHT));
        pieces.push(("c6", Piece::BLACK_BISHOP));
        assert!(rules.is_dead_position(&position(&pieces)));

        // Two knights
        pieces.push(("d3", Piece::WHITE_KNIGHT));
        assert!(!rules.is_dead_position(&position(&pieces)));

        // Same-colored bishops
        let mut pieces = kings();
        pieces.push(("c1", Piece::WHITE_BISHOP));
        pieces.push(("e3", Piece::WHITE_BISHOP));
        assert!(rules.is_dead_position(&position(&pieces)));

        // Opposite-colored bishops
        pieces.push(("f1", Piece::WHITE_BISHOP));
        assert!(!rules.is_dead_position(&position(&pieces)));

        // Knight and bishop
        let mut pieces = kings();
        pieces.push(("c1", Piece::WHITE_BISHOP));
        pieces.push(("b1", Piece::WHITE_KNIGHT));
        assert!(!rules.is_dead_position(&position(&pieces)));

        // A lone pawn can still promote
        let mut pieces = kings();
        pieces.push(("a2", Piece::WHITE_PAWN));
        assert!(!rules.is_dead_position(&position(&pieces)));
    }

    #[test]
    fn test_can_deliver_mate() {
        let mut pieces = kings();
        pieces.push(("a1", Piece::WHITE_ROOK));
        let position = position(&pieces);
        assert!(ChessRules.can_deliver_mate(&position, Color::White));
        assert!(!ChessRules.can_deliver_mate(&position, Color::Black));
    }

    #[test]
    fn test_repetition_count() {
        let hash = |n| StateHash::from_parts(&Position::default(), Color::White, n, None);
        let record = |n, irreversible, repetitions| PlyRecord {
            hash: hash(n),
            irreversible,
            repetitions,
        };

        let current = record(0, false, 1);
        let history = [record(1, false, 1), record(0, false, 2), record(0, true, 1)];
        assert_eq!(
            ChessRules.repetition_count(current, &mut history.into_iter()),
            3
        );

        // An irreversible ply in between hides older repetitions
        let history = [record(1, true, 1), record(0, false, 1)];
        assert_eq!(
            ChessRules.repetition_count(current, &mut history.into_iter()),
            1
        );

        let irreversible = record(0, true, 1);
        let history = [record(0, false, 4)];
        assert_eq!(
            ChessRules.repetition_count(irreversible, &mut history.into_iter()),
            1
        );
    }

    #[test]
    fn test_stalemate_and_checkmate_results() {
        let bestiary = Bestiary::chess();
        let stalemate = position(&[
            ("a8", Piece::BLACK_KING),
            ("b6", Piece::WHITE_QUEEN),
            ("c6", Piece::WHITE_KING),
        ]);
        let state = State::new(stalemate, Color::Black, Castling::default(), None, 0, 1);
        let evaluation = ChessRules.evaluate(
            &state,
            &bestiary,
            true,
            &mut std::iter::empty(),
            GameResult::NoResult,
        );
        assert!(evaluation.moves.is_empty());
        assert_eq!(evaluation.result, GameResult::Stalemate);

        let mate = position(&[
            ("a8", Piece::BLACK_KING),
            ("b7", Piece::WHITE_QUEEN),
            ("c6", Piece::WHITE_KING),
        ]);
        let state = State::new(mate, Color::Black, Castling::default(), None, 0, 1);
        let evaluation = ChessRules.evaluate(
            &state,
            &bestiary,
            true,
            &mut std::iter::empty(),
            GameResult::NoResult,
        );
        assert!(evaluation.is_check());
        assert_eq!(evaluation.result, GameResult::Checkmate(Color::White));
    }
}
