/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// Boards, pieces, positions, and move generation.
mod board;

/// Command-line arguments and shell commands.
mod cli;

/// Listener registry for game signals.
mod emitter;

/// Errors returned throughout the library.
mod error;

/// Reading and writing FEN strings.
mod fen;

/// The event-sourced game state machine.
mod game;

/// Numeric annotation glyphs.
mod nags;

/// Portable Game Notation.
mod pgn;

/// Game termination.
mod result;

/// The rules that turn a state into legal moves and outcomes.
mod rules;

/// Parsing moves written by hand.
mod san;

/// Starting placements.
pub mod setup;

/// The interactive command shell.
mod shell;

/// Committed game states.
mod state;

/// PGN tag pairs.
mod tags;

/// Misc utility functions, constants, and types.
mod utils;

pub use board::*;
pub use cli::*;
pub use emitter::*;
pub use error::*;
pub use fen::*;
pub use game::*;
pub use nags::*;
pub use pgn::*;
pub use result::*;
pub use rules::*;
pub use san::*;
pub use shell::*;
pub use state::*;
pub use tags::*;
pub use utils::*;
