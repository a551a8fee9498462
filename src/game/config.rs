/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::rc::Rc;

use crate::{
    setup, Bestiary, Board, ChessError, ChessResult, ChessRules, Color, Position, RuleEngine,
    SetupCastling, SetupPosition, SetupState, Square, TagMap,
};

/// Everything a [`crate::Game`] is built from.
///
/// The default is an empty 8x8 board with the chess bestiary and rules, White to move, and every
/// castling flag set.
///
/// # Example
/// ```
/// # use xchess::{Board, Color, Game, GameConfig};
/// let config = GameConfig::default()
///     .with_board(Board::new(10, 8).unwrap())
///     .with_color(Color::Black)
///     .with_fullmove(12);
/// let game = Game::new(config).unwrap();
/// assert_eq!(game.fen(), "10/10/10/10/10/10/10/10 b KQkq - 0 12");
/// ```
#[derive(Debug, Clone)]
pub struct GameConfig {
    pub board: Board,
    pub bestiary: Bestiary,
    pub rules: Rc<dyn RuleEngine>,
    pub tags: TagMap,
    /// Starting placement. `None` is an empty board.
    pub position: Option<Position>,
    pub color: Color,
    pub castling: SetupCastling,
    pub en_passant: Option<Square>,
    pub fullmove: u32,
    pub halfmove: u32,
}

impl GameConfig {
    /// The standard chess starting setup.
    pub fn standard() -> Self {
        Self::default().with_position(setup::standard_position())
    }

    pub fn with_board(mut self, board: Board) -> Self {
        self.board = board;
        self
    }

    pub fn with_bestiary(mut self, bestiary: Bestiary) -> Self {
        self.bestiary = bestiary;
        self
    }

    pub fn with_rules(mut self, rules: impl RuleEngine + 'static) -> Self {
        self.rules = Rc::new(rules);
        self
    }

    pub fn with_tags(mut self, tags: TagMap) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_castling(mut self, castling: SetupCastling) -> Self {
        self.castling = castling;
        self
    }

    pub fn with_en_passant(mut self, en_passant: Option<Square>) -> Self {
        self.en_passant = en_passant;
        self
    }

    pub fn with_fullmove(mut self, fullmove: u32) -> Self {
        self.fullmove = fullmove;
        self
    }

    pub fn with_halfmove(mut self, halfmove: u32) -> Self {
        self.halfmove = halfmove;
        self
    }

    /// Checks the configuration for consistency and builds the setup state from it.
    pub(crate) fn setup_state(&self) -> ChessResult<SetupState> {
        let position = match &self.position {
            Some(position) if position.board() != self.board => {
                return Err(ChessError::IncompatibleBoardSize)
            }
            Some(position) => position.clone(),
            None => Position::new(self.board),
        };
        for (_, piece) in position.iter() {
            self.bestiary.check(piece, None)?;
        }
        if let Some(square) = self.en_passant {
            if square.board() != self.board {
                return Err(ChessError::InvalidSquare(square.name()));
            }
        }

        SetupState::from_parts(
            SetupPosition::new(position),
            self.color,
            self.castling.clone(),
            self.en_passant,
            self.halfmove,
            self.fullmove,
        )
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            board: Board::default(),
            bestiary: Bestiary::chess(),
            rules: Rc::new(ChessRules),
            tags: TagMap::default(),
            position: None,
            color: Color::White,
            castling: SetupCastling::all(),
            en_passant: None,
            fullmove: 1,
            halfmove: 0,
        }
    }
}
