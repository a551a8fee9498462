/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use crate::{Color, Position, Square, State};

/// Longest run of empty squares folded as a single value.
const MAX_GAP: u64 = 16;

/// Multiplier of the folding step (the 64-bit FNV prime).
const PRIME: u64 = 0x0000_0100_0000_01B3;

/// A fingerprint of a [`State`], used to detect repeated positions.
///
/// It is built by folding, in order, the side to move, the number of castling options left, the
/// en passant square, and a run-length encoding of the board where runs of empty squares and piece
/// codes are told apart by range. Two states with equal fingerprints are treated as the same
/// position.
#[derive(Default, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
pub struct StateHash(u64);

impl StateHash {
    /// Fingerprints `state`.
    ///
    /// # Example
    /// ```
    /// # use xchess::Game;
    /// let mut game = Game::default();
    /// game.play().unwrap();
    /// let start = game.state().unwrap().hash();
    /// for mv in ["Nf3", "Nf6", "Ng1", "Ng8"] {
    ///     game.make_move(mv).unwrap();
    /// }
    /// assert_eq!(game.state().unwrap().hash(), start);
    /// ```
    pub fn new(state: &State) -> Self {
        Self::from_parts(
            state.position(),
            state.color(),
            state.castling().len(),
            state.en_passant(),
        )
    }

    /// Fingerprints the individual components of a state.
    pub fn from_parts(
        position: &Position,
        color: Color,
        castles: usize,
        en_passant: Option<Square>,
    ) -> Self {
        let mut hash = Self(0xCBF2_9CE4_8422_2325);

        hash.fold(color.bits() as u64 + 1);
        hash.fold(castles as u64 + 1);
        hash.fold(en_passant.map_or(1, |sq| sq.id() as u64 + 2));

        let mut gap = 0;
        for square in position.board().squares() {
            match position.get(square) {
                Some(piece) => {
                    if gap > 0 {
                        hash.fold(gap);
                        gap = 0;
                    }
                    hash.fold(MAX_GAP + piece.code() as u64);
                }
                None if gap == MAX_GAP => {
                    hash.fold(MAX_GAP);
                    gap = 1;
                }
                None => gap += 1,
            }
        }
        if gap > 0 {
            hash.fold(gap);
        }

        hash
    }

    #[inline(always)]
    fn fold(&mut self, value: u64) {
        self.0 = (self.0 ^ value).wrapping_mul(PRIME).rotate_left(23);
    }

    /// Return the inner `u64` of this fingerprint.
    #[inline(always)]
    pub const fn inner(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for StateHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl fmt::Debug for StateHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StateHash({self})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Board, Piece};

    #[test]
    fn test_hash_components() {
        let board = Board::default();
        let mut position = Position::new(board);
        position.put(board.parse_square("e1").unwrap(), Piece::WHITE_KING);
        position.put(board.parse_square("e8").unwrap(), Piece::BLACK_KING);

        let base = StateHash::from_parts(&position, Color::White, 0, None);
        assert_eq!(base, StateHash::from_parts(&position, Color::White, 0, None));
        assert_ne!(base, StateHash::from_parts(&position, Color::Black, 0, None));
        assert_ne!(base, StateHash::from_parts(&position, Color::White, 1, None));

        let e3 = board.parse_square("e3").unwrap();
        assert_ne!(
            base,
            StateHash::from_parts(&position, Color::White, 0, Some(e3))
        );

        // Moving a piece changes the run lengths around it
        let mut moved = position.clone();
        moved
            .transfer(
                board.parse_square("e1").unwrap(),
                board.parse_square("d1").unwrap(),
            )
            .unwrap();
        assert_ne!(base, StateHash::from_parts(&moved, Color::White, 0, None));
    }
}
