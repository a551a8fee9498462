/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use crate::{Color, Signal};

/// The outcome of a game, or [`GameResult::NoResult`] while it is still running.
///
/// Winning results carry the winner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum GameResult {
    #[default]
    NoResult,
    Checkmate(Color),
    Forfeit(Color),
    Resignation(Color),
    WinOnTime(Color),
    Stalemate,
    DeadPosition,
    ThreefoldRepetition,
    FivefoldRepetition,
    FiftyMoves,
    SeventyFiveMoves,
    DrawByAgreement,
    DrawByResignation,
    DrawOnTime,
}

impl GameResult {
    #[inline(always)]
    pub const fn is_game_over(&self) -> bool {
        !matches!(self, Self::NoResult)
    }

    #[inline(always)]
    pub const fn is_win(&self) -> bool {
        self.winner().is_some()
    }

    #[inline(always)]
    pub const fn is_draw(&self) -> bool {
        self.is_game_over() && !self.is_win()
    }

    #[inline(always)]
    pub const fn is_checkmate(&self) -> bool {
        matches!(self, Self::Checkmate(_))
    }

    #[inline(always)]
    pub const fn is_stalemate(&self) -> bool {
        matches!(self, Self::Stalemate)
    }

    pub const fn winner(&self) -> Option<Color> {
        match self {
            Self::Checkmate(c) | Self::Forfeit(c) | Self::Resignation(c) | Self::WinOnTime(c) => {
                Some(*c)
            }
            _ => None,
        }
    }

    pub const fn loser(&self) -> Option<Color> {
        match self.winner() {
            Some(c) => Some(c.opponent()),
            None => None,
        }
    }

    /// Human-readable reason.
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::NoResult => "no result",
            Self::Checkmate(_) => "checkmate",
            Self::Forfeit(_) => "forfeit",
            Self::Resignation(_) => "resignation",
            Self::WinOnTime(_) => "win on time",
            Self::Stalemate => "stalemate",
            Self::DeadPosition => "dead position",
            Self::ThreefoldRepetition => "3-repetition",
            Self::FivefoldRepetition => "5-repetition",
            Self::FiftyMoves => "50 moves",
            Self::SeventyFiveMoves => "75 moves",
            Self::DrawByAgreement => "draw by agreement",
            Self::DrawByResignation => "draw by resignation",
            Self::DrawOnTime => "draw on time",
        }
    }

    /// PGN result token.
    ///
    /// # Example
    /// ```
    /// # use xchess::{Color, GameResult};
    /// assert_eq!(GameResult::Checkmate(Color::Black).pgn(), "0-1");
    /// assert_eq!(GameResult::Stalemate.pgn(), "1/2-1/2");
    /// assert_eq!(GameResult::NoResult.pgn(), "*");
    /// ```
    pub const fn pgn(&self) -> &'static str {
        match self.winner() {
            Some(Color::White) => "1-0",
            Some(Color::Black) => "0-1",
            None if self.is_game_over() => "1/2-1/2",
            None => "*",
        }
    }

    /// Kind of the signal specific to this result, if any.
    pub const fn signal_kind(&self) -> Option<&'static str> {
        Some(match self {
            Self::NoResult => return None,
            Self::Checkmate(_) => "checkmate",
            Self::Forfeit(_) => "forfeit",
            Self::Resignation(_) => "resignation",
            Self::WinOnTime(_) => "win-on-time",
            Self::Stalemate => "stalemate",
            Self::DeadPosition => "dead-position",
            Self::ThreefoldRepetition => "draw-by-3-repetition",
            Self::FivefoldRepetition => "draw-by-5-repetition",
            Self::FiftyMoves => "draw-by-50-moves",
            Self::SeventyFiveMoves => "draw-by-75-moves",
            Self::DrawByAgreement => "draw-by-agreement",
            Self::DrawByResignation => "draw-by-resignation",
            Self::DrawOnTime => "draw-on-time",
        })
    }

    /// Signals announcing this result: `gameover`, then `win` or `draw`, then the specific one.
    pub fn signals(&self) -> Vec<Signal> {
        if !self.is_game_over() {
            return Vec::new();
        }

        let outcome = if self.is_win() {
            Signal::Win(*self)
        } else {
            Signal::Draw(*self)
        };
        vec![Signal::GameOver(*self), outcome, Signal::Outcome(*self)]
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.winner() {
            Some(winner) => write!(f, "{} ({winner} wins)", self.reason()),
            None => write!(f, "{}", self.reason()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_catalog() {
        let resign = GameResult::Resignation(Color::White);
        assert!(resign.is_win() && resign.is_game_over() && !resign.is_draw());
        assert_eq!(resign.loser(), Some(Color::Black));
        assert_eq!(resign.pgn(), "1-0");
        assert_eq!(resign.to_string(), "resignation (white wins)");

        let draw = GameResult::DrawOnTime;
        assert!(draw.is_draw() && draw.winner().is_none());
        assert_eq!(draw.signal_kind(), Some("draw-on-time"));

        assert!(!GameResult::NoResult.is_draw());
        assert!(GameResult::NoResult.signals().is_empty());
    }

    #[test]
    fn test_result_signals() {
        let kinds: Vec<_> = GameResult::Checkmate(Color::Black)
            .signals()
            .iter()
            .map(Signal::kind)
            .collect();
        assert_eq!(kinds, ["gameover", "win", "checkmate"]);

        let kinds: Vec<_> = GameResult::FiftyMoves
            .signals()
            .iter()
            .map(Signal::kind)
            .collect();
        assert_eq!(kinds, ["gameover", "draw", "draw-by-50-moves"]);
    }
}
