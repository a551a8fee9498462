/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{rc::Rc, str::FromStr};

use clap::Parser;

use crate::{
    setup, Bestiary, Board, ChessResult, ChessRules, Color, Game, GameConfig, Position,
    SetupPosition, XoShiRo,
};

/// Command-line arguments of the shell.
#[derive(Debug, Clone, Parser)]
#[command(version, about)]
pub struct Cli {
    /// Start from this FEN instead of the standard setup.
    #[arg(short, long, conflicts_with = "chess960")]
    pub fen: Option<String>,

    /// Board dimensions, as `WxH`.
    #[arg(short, long, default_value = "8x8")]
    pub board: Board,

    /// Comma-separated builtin bestiaries and piece ids, such as `chess,amazon`.
    #[arg(long, default_value = "chess")]
    pub bestiary: String,

    /// Start from the Chess960 setup generated from this seed.
    #[arg(long)]
    pub chess960: Option<u64>,

    /// Log filter, such as `debug` or `xchess=trace`. Overrides `RUST_LOG`.
    #[arg(long)]
    pub log: Option<String>,
}

impl Cli {
    /// Builds the game these arguments describe, ready for moves.
    ///
    /// Without a FEN or a Chess960 seed, 8x8 boards take the standard setup and other sizes
    /// start empty.
    pub fn game(&self) -> ChessResult<Game> {
        let bestiary = Bestiary::compose(self.bestiary.split(',').map(str::trim))?;
        let mut setup = SetupPosition::new(Position::new(self.board));
        if let Some(seed) = self.chess960 {
            setup::chess960(&mut setup, &mut XoShiRo::from_seed(seed))?;
        } else if self.board == Board::STANDARD {
            setup::standard(&mut setup)?;
        }

        let config = GameConfig {
            board: self.board,
            bestiary,
            rules: Rc::new(ChessRules),
            position: Some(Position::clone(&setup)),
            ..Default::default()
        };
        let mut game = Game::new(config)?;
        if let Some(fen) = &self.fen {
            game.set_fen(fen)?;
        }
        game.play()?;
        Ok(game)
    }
}

/// A command to be sent to the shell.
#[derive(Debug, Clone, Parser)]
#[command(
    multicall = true,
    about,
    rename_all = "lower",
    override_usage("<SHELL COMMAND>")
)]
pub enum ShellCommand {
    /// Print a visual representation of the current position.
    #[command(alias = "d")]
    Display,

    /// Print the FEN string of the current position.
    Fen,

    /// Show all legal moves in the current position, optionally only those from `square`.
    Moves { square: Option<String> },

    /// Play a move, written in SAN, long SAN, ICCF, or as a castling.
    #[command(alias = "m")]
    Move { mv: String },

    /// Choose the piece a pending promotion becomes.
    Promote { piece: String },

    /// Step back one ply.
    #[command(alias = "u")]
    Undo,

    /// Step forward one ply along the last played line.
    #[command(alias = "r")]
    Redo,

    /// Jump to the ply with the given id.
    Goto { ply: usize },

    /// Offer a draw on behalf of `color`, or accept the opponent's offer.
    Draw { color: Color },

    /// Resign on behalf of `color`.
    Resign { color: Color },

    /// Forfeit the game on behalf of `color`.
    Forfeit { color: Color },

    /// The side to move runs out of time.
    Flag,

    /// Annotate the current event with a NAG, such as `$2` or `!?`.
    Nag { value: String },

    /// Annotate the current event with a comment.
    Comment { text: Vec<String> },

    /// Print the game as PGN.
    Pgn,

    /// Performs a perft on the current position at the supplied depth, printing total node count.
    Perft { depth: usize },

    /// Performs a split perft on the current position at the supplied depth.
    #[command(alias = "sperft")]
    Splitperft { depth: usize },

    /// Show how many moves the piece on `square` needs to reach every square.
    Trace {
        square: String,

        /// Highest distance to print.
        #[arg(short, long, default_value = "9")]
        limit: u32,
    },

    /// Print a snapshot of the current state.
    Stats,

    /// Quit the shell.
    #[command(aliases = ["quit", "q"])]
    Exit,
}

impl FromStr for ShellCommand {
    type Err = clap::Error;
    /// Attempt to parse a [`ShellCommand`] from a string.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_parse_from(s.split_ascii_whitespace())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_shell_commands() {
        assert!(matches!("d".parse::<ShellCommand>(), Ok(ShellCommand::Display)));
        assert!(matches!(
            "move e4".parse::<ShellCommand>(),
            Ok(ShellCommand::Move { mv }) if mv == "e4"
        ));
        assert!(matches!(
            "resign black".parse::<ShellCommand>(),
            Ok(ShellCommand::Resign { color: Color::Black })
        ));
        assert!(matches!(
            "comment a quiet move".parse::<ShellCommand>(),
            Ok(ShellCommand::Comment { text }) if text.join(" ") == "a quiet move"
        ));
        assert!(matches!("quit".parse::<ShellCommand>(), Ok(ShellCommand::Exit)));
        assert!("castle".parse::<ShellCommand>().is_err());
        assert!("perft deep".parse::<ShellCommand>().is_err());
    }

    #[test]
    fn test_cli_builds_games() {
        let cli = Cli::try_parse_from(["xchess"]).unwrap();
        assert_eq!(cli.game().unwrap().moves().len(), 20);

        let fen = "4k3/8/8/8/8/8/8/4K2R w K - 0 1";
        let cli = Cli::try_parse_from(["xchess", "--fen", fen]).unwrap();
        assert_eq!(cli.game().unwrap().fen(), fen);

        let cli = Cli::try_parse_from(["xchess", "--chess960", "7"]).unwrap();
        let game = cli.game().unwrap();
        assert_eq!(game.position().len(), 32);

        let cli = Cli::try_parse_from(["xchess", "--board", "10x8", "--bestiary", "chess,amazon"])
            .unwrap();
        let game = cli.game().unwrap();
        assert_eq!(game.board(), Board::new(10, 8).unwrap());
        assert_eq!(game.bestiary().len(), 7);

        assert!(Cli::try_parse_from(["xchess", "--board", "0x8"]).is_err());
        assert!(Cli::try_parse_from(["xchess", "--fen", "8/8", "--chess960", "1"]).is_err());
    }
}
