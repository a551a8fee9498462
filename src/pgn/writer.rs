/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use super::{PgnGame, PgnItem, RESULTS};
use crate::{ChessError, ChessResult, Color, Nag};

const MOVE_BLOCK_OPEN: &str = "Move block is not completed. The game result is missing";

fn writer_error(message: impl Into<String>) -> ChessError {
    ChessError::PgnWriter(message.into())
}

fn check_tag(name: &str, value: &str) -> ChessResult<()> {
    if let Some(c) = name.chars().find(|&c| !(c.is_ascii_alphanumeric() || c == '_')) {
        return Err(writer_error(format!("Invalid character '{c}' in tag name")));
    }
    if name.is_empty() {
        return Err(writer_error("Empty tag name"));
    }
    if value.contains('"') {
        return Err(writer_error("Invalid character '\"' in tag value"));
    }
    Ok(())
}

fn check_comment(text: &str) -> ChessResult<()> {
    if text.contains('}') {
        return Err(writer_error("Invalid character '}' in comment"));
    }
    Ok(())
}

fn check_result(result: &str) -> ChessResult<()> {
    if RESULTS.contains(&result) {
        Ok(())
    } else {
        Err(writer_error(format!("Invalid result '{result}'")))
    }
}

/// Whose move comes next in a move block, and how to number it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Turn {
    number: u32,
    color: Color,
    /// Black's move needs its own `n...` number, at the start of a block or after an interruption.
    resume: bool,
}

impl Turn {
    const fn new(number: u32, color: Color) -> Self {
        Self {
            number,
            color,
            resume: true,
        }
    }

    fn label(&self, san: &str) -> String {
        match self.color {
            Color::White => format!("{}. {san}", self.number),
            Color::Black if self.resume => format!("{}... {san}", self.number),
            Color::Black => san.to_string(),
        }
    }

    const fn next(self) -> Self {
        match self.color {
            Color::White => Self {
                number: self.number,
                color: Color::Black,
                resume: false,
            },
            Color::Black => Self::new(self.number + 1, Color::White),
        }
    }

    /// The turn a variation on the move just written starts at.
    const fn variation(self) -> Self {
        match self.color {
            Color::White => Self::new(self.number.saturating_sub(1), Color::Black),
            Color::Black => Self::new(self.number, Color::White),
        }
    }
}

/// One level of the writer's stack.
#[derive(Debug)]
enum Frame {
    /// Tag pairs and header comments, then the finished movetext.
    Header {
        lines: Vec<String>,
        color: Color,
        number: u32,
        movetext: Option<String>,
    },

    /// The main line, or a variation nested in the frame below.
    Moves {
        items: Vec<String>,
        turn: Turn,
        variation: bool,
    },
}

/// Writes PGN through a stack of blocks: global, header, movetext, and nested variations.
///
/// Each call is accepted only where the grammar allows it; a result token closes every open block
/// and completes the game.
///
/// # Example
/// ```
/// # use xchess::PgnWriter;
/// let mut writer = PgnWriter::default();
/// writer.tag("White", "Morphy").unwrap();
/// writer.write_move("e4").unwrap();
/// writer.write_move("e5").unwrap();
/// writer.open_variation().unwrap();
/// writer.write_move("c5").unwrap();
/// writer.close_variation().unwrap();
/// writer.write_move("Nf3").unwrap();
/// assert!(writer.tag("Black", "Duke").is_err());
/// writer.result("1-0").unwrap();
///
/// assert_eq!(writer.release(), "[White \"Morphy\"]\n\n1. e4 e5 (1... c5) 2. Nf3 1-0");
/// ```
#[derive(Debug, Default)]
pub struct PgnWriter {
    stack: Vec<Frame>,
    output: Vec<String>,
}

impl PgnWriter {
    /// Opens a header block if nothing is open yet.
    fn header(&mut self) {
        if self.stack.is_empty() {
            self.stack.push(Frame::Header {
                lines: Vec::new(),
                color: Color::White,
                number: 1,
                movetext: None,
            });
        }
    }

    /// Opens the movetext block if the header is still open.
    fn movetext(&mut self) {
        self.header();
        if let Some(Frame::Header { color, number, .. }) = self.stack.last() {
            let turn = Turn::new(*number, *color);
            self.stack.push(Frame::Moves {
                items: Vec::new(),
                turn,
                variation: false,
            });
        }
    }

    /// The innermost move block, opening one if needed.
    fn moves(&mut self) -> ChessResult<(&mut Vec<String>, &mut Turn)> {
        self.movetext();
        match self.stack.last_mut() {
            Some(Frame::Moves { items, turn, .. }) => Ok((items, turn)),
            _ => Err(writer_error("No move block is open")),
        }
    }

    /// Closes the block on top of the stack and hands its text to the one below.
    fn pop(&mut self) {
        let Some(frame) = self.stack.pop() else {
            return;
        };

        match (frame, self.stack.last_mut()) {
            (Frame::Header { lines, movetext, .. }, _) => {
                if !lines.is_empty() {
                    self.output.push(lines.join("\n"));
                }
                self.output.extend(movetext);
            }
            (
                Frame::Moves {
                    items,
                    variation: true,
                    ..
                },
                Some(Frame::Moves {
                    items: parent,
                    turn,
                    ..
                }),
            ) => {
                if !items.is_empty() {
                    parent.push(format!("({})", items.join(" ")));
                    turn.resume = true;
                }
            }
            (Frame::Moves { items, .. }, Some(Frame::Header { movetext, .. })) => {
                *movetext = Some(items.join(" "));
            }
            (Frame::Moves { .. }, _) => {}
        }
    }

    /// Closes every open block.
    fn end(&mut self) {
        while !self.stack.is_empty() {
            self.pop();
        }
    }

    fn is_variation(&self) -> bool {
        matches!(
            self.stack.last(),
            Some(Frame::Moves {
                variation: true,
                ..
            })
        )
    }

    fn header_mut(&mut self) -> ChessResult<(&mut Vec<String>, &mut Color, &mut u32)> {
        self.header();
        match self.stack.last_mut() {
            Some(Frame::Header {
                lines,
                color,
                number,
                ..
            }) => Ok((lines, color, number)),
            _ => Err(writer_error(format!("Cannot set PGN header: {MOVE_BLOCK_OPEN}"))),
        }
    }

    /// Writes a tag pair. Only allowed before the first move of a game.
    pub fn tag(&mut self, name: &str, value: &str) -> ChessResult<()> {
        check_tag(name, value)?;
        let (lines, _, _) = self.header_mut()?;
        lines.push(format!("[{name} \"{value}\"]"));
        Ok(())
    }

    /// Sets the color of the first move. Only allowed before the first move of a game.
    pub fn set_color(&mut self, color: Color) -> ChessResult<()> {
        let (_, slot, _) = self
            .header_mut()
            .map_err(|_| writer_error(format!("Cannot set color: {MOVE_BLOCK_OPEN}")))?;
        *slot = color;
        Ok(())
    }

    /// Sets the number of the first move. Only allowed before the first move of a game.
    pub fn set_number(&mut self, number: u32) -> ChessResult<()> {
        if number < 1 {
            return Err(writer_error("Move number must be a positive integer"));
        }
        let (_, _, slot) = self
            .header_mut()
            .map_err(|_| writer_error(format!("Cannot set number: {MOVE_BLOCK_OPEN}")))?;
        *slot = number;
        Ok(())
    }

    /// Writes a `{...}` comment, in the header before the first move and in movetext after it.
    pub fn comment(&mut self, text: &str) -> ChessResult<()> {
        check_comment(text)?;
        self.header();
        match self.stack.last_mut() {
            Some(Frame::Header { lines, .. }) => lines.push(format!("{{{text}}}")),
            Some(Frame::Moves { items, turn, .. }) => {
                items.push(format!("{{{text}}}"));
                turn.resume = true;
            }
            None => {}
        }
        Ok(())
    }

    /// Writes a NAG after the last move.
    pub fn nag(&mut self, nag: Nag) -> ChessResult<()> {
        let (items, _) = self.moves()?;
        items.push(nag.to_string());
        Ok(())
    }

    /// Writes a move in SAN, numbered as needed.
    pub fn write_move(&mut self, san: &str) -> ChessResult<()> {
        if san.is_empty() || san.contains(char::is_whitespace) {
            return Err(writer_error(format!("Invalid move '{san}'")));
        }
        let (items, turn) = self.moves()?;
        items.push(turn.label(san));
        *turn = turn.next();
        Ok(())
    }

    /// Opens a variation on the last move written.
    pub fn open_variation(&mut self) -> ChessResult<()> {
        let (_, turn) = self.moves()?;
        let turn = turn.variation();
        self.stack.push(Frame::Moves {
            items: Vec::new(),
            turn,
            variation: true,
        });
        Ok(())
    }

    /// Closes the innermost variation.
    pub fn close_variation(&mut self) -> ChessResult<()> {
        if !self.is_variation() {
            return Err(writer_error(
                "Attempted to close a variation when none was open",
            ));
        }
        self.pop();
        Ok(())
    }

    /// Writes the game termination marker, closing the game.
    pub fn result(&mut self, result: &str) -> ChessResult<()> {
        check_result(result)?;
        while self.is_variation() {
            self.pop();
        }

        match self.stack.last_mut() {
            None => self.output.push(result.to_string()),
            Some(Frame::Header { lines, .. }) => {
                lines.push(String::new());
                lines.push(result.to_string());
            }
            Some(Frame::Moves { items, .. }) => items.push(result.to_string()),
        }
        self.end();
        Ok(())
    }

    /// Writes a whole parsed game.
    pub fn game(&mut self, game: &PgnGame) -> ChessResult<()> {
        for (name, value) in &game.tags {
            self.tag(name, value)?;
        }
        for comment in &game.comments {
            self.comment(comment)?;
        }
        if let Some(PgnItem::Number { number, ellipsis }) = game.movetext.first() {
            self.set_number(*number)?;
            if *ellipsis {
                self.set_color(Color::Black)?;
            }
        }
        self.items(&game.movetext)?;
        self.result(game.result.as_deref().unwrap_or("*"))
    }

    fn items(&mut self, items: &[PgnItem]) -> ChessResult<()> {
        for item in items {
            match item {
                // Numbers are recomputed
                PgnItem::Number { .. } => {}
                PgnItem::Comment(text) => self.comment(text)?,
                PgnItem::Move(mv) => {
                    self.write_move(&format!("{}{}", mv.san, mv.suffix.as_deref().unwrap_or("")))?;
                    for nag in &mv.nags {
                        self.nag(*nag)?;
                    }
                    for comment in &mv.comments {
                        self.comment(comment)?;
                    }
                    for variation in &mv.ravs {
                        self.open_variation()?;
                        self.items(variation)?;
                        self.close_variation()?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Closes anything still open and returns the games written so far, separated by blank lines.
    pub fn release(&mut self) -> String {
        self.end();
        let pgn = self.output.join("\n\n");
        self.output.clear();
        pgn
    }
}

/// Writes `games` as one PGN text.
pub fn write_pgn(games: &[PgnGame]) -> ChessResult<String> {
    let mut writer = PgnWriter::default();
    for game in games {
        writer.game(game)?;
    }
    Ok(writer.release())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_pgn;

    #[test]
    fn test_numbering() {
        let mut writer = PgnWriter::default();
        writer.set_color(Color::Black).unwrap();
        writer.set_number(12).unwrap();
        for san in ["Nf6", "e5", "Nd5"] {
            writer.write_move(san).unwrap();
        }
        writer.comment("centralized").unwrap();
        writer.write_move("Nxd5").unwrap();
        writer.result("*").unwrap();
        assert_eq!(
            writer.release(),
            "12... Nf6 13. e5 Nd5 {centralized} 14. Nxd5 *"
        );
    }

    #[test]
    fn test_comment_interrupts_black() {
        let mut writer = PgnWriter::default();
        writer.write_move("e4").unwrap();
        writer.comment("best by test").unwrap();
        writer.write_move("e5").unwrap();
        writer.nag(Nag::new(1).unwrap()).unwrap();
        writer.write_move("Nf3").unwrap();
        writer.result("*").unwrap();
        assert_eq!(writer.release(), "1. e4 {best by test} 1... e5 $1 2. Nf3 *");
    }

    #[test]
    fn test_comment_over_two_lines() {
        let mut writer = PgnWriter::default();
        writer.write_move("e4").unwrap();
        writer.comment("two\nlines").unwrap();
        writer.result("*").unwrap();
        assert_eq!(writer.release(), "1. e4 {two\nlines} *");
    }

    #[test]
    fn test_nested_variations() {
        let mut writer = PgnWriter::default();
        writer.write_move("e4").unwrap();
        writer.open_variation().unwrap();
        writer.write_move("d4").unwrap();
        writer.open_variation().unwrap();
        writer.write_move("c4").unwrap();
        writer.write_move("e5").unwrap();
        // The result closes both variations
        writer.result("1/2-1/2").unwrap();
        assert_eq!(writer.release(), "1. e4 (1. d4 (1. c4 e5)) 1/2-1/2");
    }

    #[test]
    fn test_grammar_errors() {
        let mut writer = PgnWriter::default();
        assert!(writer.close_variation().is_err());
        assert!(writer.tag("Bad Name", "x").is_err());
        assert!(writer.tag("Event", "a \"quote\"").is_err());
        assert!(writer.comment("a } brace").is_err());
        assert!(writer.result("2-0").is_err());
        assert!(writer.set_number(0).is_err());

        writer.write_move("e4").unwrap();
        assert!(writer.set_color(Color::Black).is_err());
        assert!(writer.set_number(3).is_err());
    }

    #[test]
    fn test_header_only_and_multiple_games() {
        let mut writer = PgnWriter::default();
        writer.tag("Event", "A").unwrap();
        writer.result("*").unwrap();
        writer.write_move("d4").unwrap();
        writer.result("0-1").unwrap();
        writer.result("*").unwrap();
        assert_eq!(writer.release(), "[Event \"A\"]\n\n*\n\n1. d4 0-1\n\n*");
    }

    #[test]
    fn test_parse_write_round_trip() {
        let source = "[Event \"Casual\"]\n[Site \"?\"]\n\n\
                      1. e4 $1 {main} (1. d4 d5 (1... Nf6)) 1... e5!? 2. Nf3 *";
        let games = parse_pgn(source).unwrap();
        assert_eq!(write_pgn(&games).unwrap(), source);
    }
}
