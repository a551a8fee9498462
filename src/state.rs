/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{fmt, rc::Rc};

use crate::{
    fen::fields_to_fen, state_to_fen, Board, Castling, ChessError, ChessResult, Color,
    FrozenPosition, Move, Position, SetupCastling, SetupPosition, Square, StateHash,
};

/// Everything needed to continue a game from some point: where the pieces stand, who moves,
/// which castles remain, the en passant square, and the move counters.
///
/// A committed state never changes. Moves produce new states through [`State::play`], which works
/// on a copy of the position and freezes it.
#[derive(Clone, PartialEq, Eq)]
pub struct State {
    position: FrozenPosition,
    color: Color,
    castling: Castling,
    en_passant: Option<Square>,
    halfmove: u32,
    fullmove: u32,
}

impl State {
    pub fn new(
        position: impl Into<FrozenPosition>,
        color: Color,
        castling: Castling,
        en_passant: Option<Square>,
        halfmove: u32,
        fullmove: u32,
    ) -> Self {
        Self {
            position: position.into(),
            color,
            castling,
            en_passant,
            halfmove,
            fullmove,
        }
    }

    #[inline(always)]
    pub fn position(&self) -> &FrozenPosition {
        &self.position
    }

    #[inline(always)]
    pub fn board(&self) -> Board {
        self.position.board()
    }

    /// The side to move.
    #[inline(always)]
    pub const fn color(&self) -> Color {
        self.color
    }

    #[inline(always)]
    pub const fn castling(&self) -> &Castling {
        &self.castling
    }

    #[inline(always)]
    pub const fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    /// Plies since the last capture or pawn move.
    #[inline(always)]
    pub const fn halfmove(&self) -> u32 {
        self.halfmove
    }

    #[inline(always)]
    pub const fn fullmove(&self) -> u32 {
        self.fullmove
    }

    /// A copy of the position with `mv` applied, frozen.
    pub fn project(&self, mv: &Move) -> FrozenPosition {
        let mut position = Position::clone(&self.position);
        mv.mutate(&mut position);
        Rc::new(position)
    }

    /// The state reached by playing `mv`.
    ///
    /// The turn passes to the opponent, castles touched by the move are dropped, and the counters
    /// advance: the fullmove number after Black moves, the halfmove clock unless the move is
    /// irreversible.
    ///
    /// # Example
    /// ```
    /// # use xchess::{Color, Game};
    /// let mut game = Game::default();
    /// game.play().unwrap();
    /// let e4 = game.moves().resolve("e4").unwrap();
    /// let next = game.state().unwrap().play(&e4);
    /// assert_eq!(next.color(), Color::Black);
    /// assert_eq!(next.en_passant().unwrap().name(), "e3");
    /// assert_eq!(next.halfmove(), 0);
    /// assert_eq!(next.fullmove(), 1);
    /// ```
    pub fn play(&self, mv: &Move) -> Self {
        Self {
            position: self.project(mv),
            color: self.color.opponent(),
            castling: self.castling.apply(mv),
            en_passant: mv.en_passant(),
            halfmove: if mv.is_irreversible() {
                0
            } else {
                self.halfmove + 1
            },
            fullmove: self.fullmove + mv.color().bits() as u32,
        }
    }

    /// This state with `mv` applied to the position only. Used while a promotion is pending.
    pub fn stage(&self, mv: &Move) -> Self {
        Self {
            position: self.project(mv),
            ..self.clone()
        }
    }

    /// FEN string of this state.
    pub fn fen(&self) -> String {
        state_to_fen(self)
    }

    /// Repetition fingerprint of this state.
    pub fn hash(&self) -> StateHash {
        StateHash::new(self)
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.fen())
    }
}

impl fmt::Debug for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "State({})\n{:?}", self.fen(), self.position)
    }
}

/// The editable state a game starts from.
///
/// Nothing here is checked for legality until [`SetupState::freeze`] turns it into a [`State`]:
/// castling flags are resolved against the position then, and an en passant square without a
/// pawn that could have just passed it is dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupState {
    position: SetupPosition,
    color: Color,
    castling: SetupCastling,
    en_passant: Option<Square>,
    halfmove: u32,
    fullmove: u32,
}

impl SetupState {
    /// An empty board, White to move, all castling flags set.
    pub fn new(board: Board) -> Self {
        Self {
            position: SetupPosition::new(Position::new(board)),
            color: Color::White,
            castling: SetupCastling::all(),
            en_passant: None,
            halfmove: 0,
            fullmove: 1,
        }
    }

    pub fn from_parts(
        position: SetupPosition,
        color: Color,
        castling: SetupCastling,
        en_passant: Option<Square>,
        halfmove: u32,
        fullmove: u32,
    ) -> ChessResult<Self> {
        if fullmove < 1 {
            return Err(ChessError::InvalidFullmoveNumber);
        }
        Ok(Self {
            position,
            color,
            castling,
            en_passant,
            halfmove,
            fullmove,
        })
    }

    #[inline(always)]
    pub fn board(&self) -> Board {
        self.position.board()
    }

    #[inline(always)]
    pub const fn position(&self) -> &SetupPosition {
        &self.position
    }

    #[inline(always)]
    pub fn position_mut(&mut self) -> &mut SetupPosition {
        &mut self.position
    }

    #[inline(always)]
    pub const fn color(&self) -> Color {
        self.color
    }

    #[inline(always)]
    pub const fn castling(&self) -> &SetupCastling {
        &self.castling
    }

    #[inline(always)]
    pub fn castling_mut(&mut self) -> &mut SetupCastling {
        &mut self.castling
    }

    #[inline(always)]
    pub const fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    #[inline(always)]
    pub const fn halfmove(&self) -> u32 {
        self.halfmove
    }

    #[inline(always)]
    pub const fn fullmove(&self) -> u32 {
        self.fullmove
    }

    /// Returns `true` if the color changed.
    pub fn set_color(&mut self, color: Color) -> bool {
        let changed = self.color != color;
        self.color = color;
        changed
    }

    pub fn set_castling(&mut self, castling: SetupCastling) -> bool {
        let changed = self.castling != castling;
        self.castling = castling;
        changed
    }

    pub fn set_en_passant(&mut self, en_passant: Option<Square>) -> bool {
        let changed = self.en_passant != en_passant;
        self.en_passant = en_passant;
        changed
    }

    pub fn set_halfmove(&mut self, halfmove: u32) -> bool {
        let changed = self.halfmove != halfmove;
        self.halfmove = halfmove;
        changed
    }

    pub fn set_fullmove(&mut self, fullmove: u32) -> ChessResult<bool> {
        if fullmove < 1 {
            return Err(ChessError::InvalidFullmoveNumber);
        }
        let changed = self.fullmove != fullmove;
        self.fullmove = fullmove;
        Ok(changed)
    }

    /// Castles available from this setup.
    pub fn prepare_castling(&self) -> Castling {
        self.castling.prepare(&self.position)
    }

    /// The en passant square, if a pawn of the side that just moved stands right past it.
    pub fn prepare_en_passant(&self) -> Option<Square> {
        let square = self.en_passant?;
        if self.position.has(square) {
            return None;
        }

        let pawn_color = self.color.opponent();
        let pawn = self.position.get(square.dy(pawn_color.move_dir())?)?;
        (pawn.kind().is_pawn() && pawn.color() == pawn_color).then_some(square)
    }

    /// The committed state this setup starts a game from.
    pub fn freeze(&self) -> State {
        State::new(
            self.position.freeze(),
            self.color,
            self.prepare_castling(),
            self.prepare_en_passant(),
            self.halfmove,
            self.fullmove,
        )
    }

    /// FEN of the setup as entered, castling flags included whether or not they resolve.
    pub fn fen(&self) -> String {
        fields_to_fen(
            &self.position,
            self.color,
            &self.castling.fen(),
            self.en_passant,
            self.halfmove,
            self.fullmove,
        )
    }
}

impl From<&State> for SetupState {
    fn from(state: &State) -> Self {
        Self {
            position: SetupPosition::new(Position::clone(state.position())),
            color: state.color(),
            castling: SetupCastling::from(state.castling()),
            en_passant: state.en_passant(),
            halfmove: state.halfmove(),
            fullmove: state.fullmove(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parse_fen, Bestiary};

    fn setup(fen: &str) -> SetupState {
        parse_fen(fen, Board::default(), &Bestiary::chess()).unwrap()
    }

    #[test]
    fn test_prepare_en_passant() {
        let board = Board::default();
        let d6 = board.parse_square("d6").unwrap();

        assert_eq!(
            setup("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1").prepare_en_passant(),
            Some(d6)
        );
        // No black pawn on d5
        assert_eq!(
            setup("4k3/8/8/4P3/8/8/8/4K3 w - d6 0 1").prepare_en_passant(),
            None
        );
        // Wrong side to move
        assert_eq!(
            setup("4k3/8/8/3pP3/8/8/8/4K3 b - d6 0 1").prepare_en_passant(),
            None
        );
    }

    #[test]
    fn test_freeze_resolves_castling() {
        let state = setup("4k3/8/8/8/8/8/8/R3K3 w KQkq - 0 1").freeze();
        assert_eq!(state.castling().fen(), "Q");
        assert_eq!(state.fen(), "4k3/8/8/8/8/8/8/R3K3 w Q - 0 1");
    }

    #[test]
    fn test_play_counters() {
        let state = setup("4k3/8/8/8/8/8/4P3/4K3 b - - 7 10").freeze();
        let board = state.board();
        let sq = |name| board.parse_square(name).unwrap();

        let king = Move::quiet(crate::Piece::BLACK_KING, sq("e8"), sq("d8"));
        let next = state.play(&king);
        assert_eq!(next.halfmove(), 8);
        assert_eq!(next.fullmove(), 11);
        assert_eq!(next.color(), Color::White);

        let push = Move::quiet(crate::Piece::WHITE_PAWN, sq("e2"), sq("e3"));
        let after = next.play(&push);
        assert_eq!(after.halfmove(), 0);
        assert_eq!(after.fullmove(), 11);
    }
}
