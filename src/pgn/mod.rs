/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use tracing::debug;

use crate::{ChessError, ChessResult, EventData, Game, Nag, TagMap, FEN_STARTPOS};

/// Recursive-descent PGN parser.
mod parser;

/// Push-down PGN writer.
mod writer;

pub use parser::*;
pub use writer::*;

/// Game termination markers accepted in movetext.
pub const RESULTS: [&str; 10] = [
    "1-0", "0-1", "1/2-1/2", "1/2-0", "0-1/2", "0-0", "+/-", "-/+", "-/-", "*",
];

/// A game as read from PGN text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PgnGame {
    /// Tag pairs in the order they were read.
    pub tags: Vec<(String, String)>,
    /// Comments before the tag pairs.
    pub comments: Vec<String>,
    pub movetext: Vec<PgnItem>,
    /// The termination marker, if the game had one.
    pub result: Option<String>,
}

impl PgnGame {
    /// Value of the tag `name`, ignoring case.
    pub fn tag(&self, name: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Moves of the main line.
    pub fn moves(&self) -> impl Iterator<Item = &PgnMove> {
        self.movetext.iter().filter_map(|item| match item {
            PgnItem::Move(mv) => Some(mv),
            _ => None,
        })
    }
}

/// One element of movetext.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PgnItem {
    /// A move number indication: `12.`, or `12...` before a move by Black.
    Number { number: u32, ellipsis: bool },
    Move(PgnMove),
    /// A comment not following any move.
    Comment(String),
}

/// A move with everything annotating it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PgnMove {
    /// The move as written, check markers included.
    pub san: String,
    /// Trailing `!`/`?` annotation, such as `!?`.
    pub suffix: Option<String>,
    pub nags: Vec<Nag>,
    pub comments: Vec<String>,
    /// Alternatives to this move, each a sequence of items of its own.
    pub ravs: Vec<Vec<PgnItem>>,
}

impl Game {
    /// Writes the game as PGN: tags, then every move, NAG and comment from the start along the
    /// line last played, then the result of the last event.
    ///
    /// A game not starting from the standard position also gets `SetUp` and `FEN` tags.
    ///
    /// # Example
    /// ```
    /// # use xchess::{ChessError, Game};
    /// let mut game = Game::default();
    /// assert_eq!(game.to_pgn(), Err(ChessError::PgnLocked));
    ///
    /// game.tags_mut().set("White", "Anderssen").unwrap();
    /// game.play().unwrap();
    /// game.make_move("e4").unwrap();
    /// game.comment("open game").unwrap();
    /// game.make_move("e5").unwrap();
    /// assert_eq!(
    ///     game.to_pgn().unwrap(),
    ///     "[White \"Anderssen\"]\n\n1. e4 {open game} 1... e5 *"
    /// );
    /// ```
    pub fn to_pgn(&self) -> ChessResult<String> {
        let (Some(first), Some(last)) = (self.first(), self.last()) else {
            return Err(ChessError::PgnLocked);
        };
        let Some(start) = first.state() else {
            return Err(ChessError::PgnLocked);
        };

        let mut writer = PgnWriter::default();
        for (name, value) in self.tags().iter() {
            writer.tag(name, value)?;
        }
        let fen = start.fen();
        if fen != FEN_STARTPOS && !self.tags().has("FEN") {
            writer.tag("SetUp", "1")?;
            writer.tag("FEN", &fen)?;
        }
        writer.set_color(start.color())?;
        writer.set_number(start.fullmove())?;

        for event in self.events() {
            match event.data() {
                EventData::Move(_) => {
                    if let Some(san) = self.san(event.index()) {
                        writer.write_move(&san)?;
                    }
                }
                EventData::Nag(nag) => writer.nag(*nag)?,
                EventData::Comment(text) => writer.comment(text)?,
                _ => {}
            }
        }

        writer.result(last.result().pgn())?;
        Ok(writer.release())
    }

    /// Replays the main line of a parsed PGN game, from its `FEN` tag if it has one.
    ///
    /// Comments, NAGs and move suffixes become events of their own; variations are skipped. The
    /// game keeps the tags of `pgn`.
    ///
    /// # Example
    /// ```
    /// # use xchess::{parse_pgn, Game, GameResult, Color};
    /// let games = parse_pgn("1. f3 e5 2. g4?? Qh4# 0-1").unwrap();
    /// let game = Game::from_pgn(&games[0]).unwrap();
    /// assert_eq!(game.result(), GameResult::Checkmate(Color::Black));
    /// assert_eq!(game.ply_id(), Some(4));
    /// ```
    pub fn from_pgn(pgn: &PgnGame) -> ChessResult<Self> {
        let tags = TagMap::from_pairs(pgn.tags.iter().map(|(name, value)| (name, value)))?;
        let mut game = match tags.get("FEN") {
            Some(fen) => Self::from_fen(fen)?,
            None => Self::default(),
        };
        *game.tags_mut() = tags;

        game.play()?;
        for comment in &pgn.comments {
            game.comment(comment.as_str())?;
        }
        game.replay(&pgn.movetext)?;
        debug!("pgn: replayed {} plies", game.ply_id().unwrap_or(0));
        Ok(game)
    }

    fn replay(&mut self, items: &[PgnItem]) -> ChessResult<()> {
        for item in items {
            match item {
                PgnItem::Number { .. } => {}
                PgnItem::Comment(text) => self.comment(text.as_str())?,
                PgnItem::Move(mv) => {
                    self.make_move(mv.san.as_str())?;
                    let suffix = mv.suffix.as_deref().and_then(Nag::from_suffix);
                    for nag in suffix.into_iter().chain(mv.nags.iter().copied()) {
                        self.nag(nag)?;
                    }
                    for comment in &mv.comments {
                        self.comment(comment.as_str())?;
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Color;

    #[test]
    fn test_to_pgn_from_setup_position() {
        let mut game = Game::from_fen("4k3/8/8/8/8/8/8/R3K3 b Q - 0 30").unwrap();
        game.play().unwrap();
        game.make_move("Kd7").unwrap();
        game.nag(Nag::new(2).unwrap()).unwrap();
        game.make_move("O-O-O+").unwrap();
        game.resign(Color::Black).unwrap();

        assert_eq!(
            game.to_pgn().unwrap(),
            "[SetUp \"1\"]\n[FEN \"4k3/8/8/8/8/8/8/R3K3 b Q - 0 30\"]\n\n\
             30... Kd7 $2 31. O-O-O+ 1-0"
        );
    }

    #[test]
    fn test_to_pgn_follows_the_last_line() {
        let mut game = Game::default();
        game.play().unwrap();
        game.make_move("e4").unwrap();
        game.make_move("e5").unwrap();
        game.undo();
        game.make_move("c5").unwrap();
        assert_eq!(game.to_pgn().unwrap(), "1. e4 c5 *");
    }

    #[test]
    fn test_round_trip_through_game() {
        let source = "[Event \"Club\"]\n\n1. d4 $1 {solid} 1... d5 2. c4 *";
        let games = parse_pgn(source).unwrap();
        let game = Game::from_pgn(&games[0]).unwrap();
        assert_eq!(game.tags().get("Event"), Some("Club"));
        assert_eq!(game.to_pgn().unwrap(), source);
    }

    #[test]
    fn test_comments_spanning_lines() {
        let source = "1. e4 e5 {This opening is called\nthe open game} 2. Nf3 *";
        let games = parse_pgn(source).unwrap();
        let game = Game::from_pgn(&games[0]).unwrap();
        assert_eq!(game.to_pgn().unwrap(), source);
    }

    #[test]
    fn test_from_pgn_rejects_illegal_moves() {
        let games = parse_pgn("1. e4 e5 2. Ke3 *").unwrap();
        assert_eq!(Game::from_pgn(&games[0]).unwrap_err(), ChessError::MoveNotFound);
    }
}
