/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// Piece definitions shared by a game, and the stock chess set.
mod bestiary;

/// Castling rules on boards of any width.
mod castling;

/// The two sides.
mod color;

/// Position fingerprints for repetition detection.
mod hash;

/// Pseudo-legal move generation from piece movement rules.
mod movegen;

/// Moves and move lists.
mod moves;

/// Performance testing of the move generator.
mod perft;

/// Pieces and their movement rules.
mod piece;

/// Piece placements on a board.
mod position;

/// Pseudo-random number generation.
mod prng;

/// Board dimensions, squares, files, and ranks.
mod square;

pub use bestiary::*;
pub use castling::*;
pub use color::*;
pub use hash::*;
pub use movegen::*;
pub use moves::*;
pub use perft::*;
pub use piece::*;
pub use position::*;
pub use prng::*;
pub use square::*;
