/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use thiserror::Error;

use crate::Color;

/// Every error the rules engine can raise.
///
/// Validation errors are raised while parsing or constructing values, phase errors are raised by
/// [`crate::Game`] mutators called in the wrong state, and resolution errors are raised when a move
/// query cannot be mapped onto exactly one legal move.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChessError {
    #[error("Invalid board size {width}x{height}: dimensions must be between 1 and {max}")]
    InvalidBoardSize { width: usize, height: usize, max: usize },

    #[error("Invalid square value '{0}'")]
    InvalidSquare(String),

    #[error("Invalid file value '{0}'")]
    InvalidFile(String),

    #[error("Invalid rank value '{0}'")]
    InvalidRank(String),

    #[error("Invalid color value '{0}'")]
    InvalidColor(String),

    #[error("Duplicate piece type id '{0}'")]
    DuplicatePieceTypeId(String),

    #[error("The ID \"{0}\" does not correspond to any known piece or bestiary entry")]
    UnknownPieceTypeId(String),

    #[error("Invalid piece type id '{0}'")]
    InvalidPieceTypeId(String),

    #[error("Unsupported piece type '{0}'")]
    UnsupportedPieceType(String),

    #[error("Required {} piece", .0.name())]
    InvalidPieceColor(Color),

    #[error("invalid meta tag '{0}'")]
    InvalidMetaTag(String),

    #[error("invalid meta value '{0}'")]
    InvalidMetaValue(String),

    #[error("Invalid fullmoveNumber: must be an integer greater than or equal to 1")]
    InvalidFullmoveNumber,

    #[error("Invalid halfmoveClock: must be an integer greater than or equal to 0")]
    InvalidHalfmoveClock,

    #[error("Invalid move notation '{0}'")]
    InvalidMoveNotation(String),

    #[error("Editing is not allowed outside of setup state")]
    EditLocked,

    #[error("Cannot generate PGN while the game is in setup state")]
    PgnLocked,

    #[error("Playing moves is not permitted in the setup state")]
    PlayLocked,

    #[error("Cannot make a move in the current game state")]
    MoveLocked,

    #[error("Cannot promote a piece outside of a promotion state")]
    PromoteLocked,

    #[error("Meta-event is not allowed in the current state")]
    MetaLocked,

    #[error("Action not allowed: the game is over")]
    GameOver,

    #[error("No piece found at square '{0}'")]
    EmptySquare(String),

    #[error("The specified move is not legal in the current state")]
    MoveNotFound,

    #[error("Ambiguous move: multiple legal candidates found")]
    AmbiguousMove,

    #[error("The selected piece is not a valid promotion choice")]
    InvalidPromotionChoice,

    #[error("Invalid NAG value '{0}'")]
    InvalidNag(String),

    #[error("A comment cannot contain '}}'")]
    InvalidComment,

    #[error("Castling squares must be aligned on a single rank or file")]
    InvalidCastlingAlignment,

    #[error("A castling configuration has overlapping squares")]
    InvalidCastlingSquares,

    #[error("Cannot generate setup: incompatible board size")]
    IncompatibleBoardSize,

    #[error("Too many squares to pack: maximum allowed is {0}")]
    BoardPackOverflow(usize),

    #[error("Invalid board pack string '{0}'")]
    InvalidBoardPackString(String),

    #[error("Invalid FEN: {message}")]
    Fen { message: String },

    #[error("{message} (line: {line}, column: {column})")]
    PgnSyntax {
        message: String,
        line: usize,
        column: usize,
    },

    #[error("Invalid PGN output: {0}")]
    PgnWriter(String),
}

impl ChessError {
    /// Shorthand for constructing a [`ChessError::Fen`].
    pub(crate) fn fen(message: impl Into<String>) -> Self {
        Self::Fen {
            message: message.into(),
        }
    }
}

/// Result alias used throughout the library.
pub type ChessResult<T> = Result<T, ChessError>;
