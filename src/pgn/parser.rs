/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use super::{PgnGame, PgnItem, PgnMove, RESULTS};
use crate::{ChessError, ChessResult, Nag};

/// Parses every game in `source`.
///
/// # Example
/// ```
/// # use xchess::{parse_pgn, PgnItem};
/// let games = parse_pgn(
///     r#"[Event "Casual"]
/// 1. e4 {king's pawn} e5 $1 (1... c5 2. Nf3) 2. Nf3 *"#,
/// )
/// .unwrap();
/// assert_eq!(games.len(), 1);
/// assert_eq!(games[0].tag("event"), Some("Casual"));
///
/// let sans: Vec<&str> = games[0].moves().map(|mv| mv.san.as_str()).collect();
/// assert_eq!(sans, ["e4", "e5", "Nf3"]);
/// assert_eq!(games[0].result.as_deref(), Some("*"));
///
/// let err = parse_pgn("1. e4 $x").unwrap_err();
/// assert_eq!(err.to_string(), "Expected a decimal digit, found 'x' (line: 1, column: 8)");
/// ```
pub fn parse_pgn(source: &str) -> ChessResult<Vec<PgnGame>> {
    PgnParser::new(source).parse()
}

/// Cursor over PGN text, one production per method.
struct PgnParser<'a> {
    source: &'a str,
    offset: usize,
}

impl<'a> PgnParser<'a> {
    fn new(source: &'a str) -> Self {
        Self { source, offset: 0 }
    }

    /*----------------------------------------------------------------*/
    /* Cursor */

    #[inline(always)]
    fn rest(&self) -> &'a str {
        &self.source[self.offset..]
    }

    #[inline(always)]
    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    #[inline(always)]
    fn has_next(&self) -> bool {
        self.offset < self.source.len()
    }

    #[inline(always)]
    fn eq(&self, c: char) -> bool {
        self.peek() == Some(c)
    }

    #[inline(always)]
    fn is(&self, predicate: impl Fn(char) -> bool) -> bool {
        self.peek().is_some_and(predicate)
    }

    fn next(&mut self) {
        if let Some(c) = self.peek() {
            self.offset += c.len_utf8();
        }
    }

    /// Consumes `token` if the input continues with it.
    fn eat(&mut self, token: &str) -> bool {
        if self.rest().starts_with(token) {
            self.offset += token.len();
            true
        } else {
            false
        }
    }

    fn req(&mut self, c: char) -> ChessResult<()> {
        if self.eq(c) {
            self.next();
            Ok(())
        } else {
            Err(self.error(format!("Expected '{c}'")))
        }
    }

    /// Consumes characters while `predicate` holds and returns them.
    fn take_while(&mut self, predicate: impl Fn(char) -> bool) -> &'a str {
        let start = self.offset;
        while self.is(&predicate) {
            self.next();
        }
        &self.source[start..self.offset]
    }

    fn trim(&mut self) {
        self.take_while(char::is_whitespace);
    }

    /// A syntax error at the cursor.
    fn error(&self, message: impl Into<String>) -> ChessError {
        let (mut line, mut column) = (1, 1);
        let mut chars = self.source[..self.offset].chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '\n' => (line, column) = (line + 1, 1),
                '\r' => {
                    chars.next_if_eq(&'\n');
                    (line, column) = (line + 1, 1);
                }
                _ => column += 1,
            }
        }
        ChessError::PgnSyntax {
            message: message.into(),
            line,
            column,
        }
    }

    /*----------------------------------------------------------------*/
    /* Productions */

    fn parse(mut self) -> ChessResult<Vec<PgnGame>> {
        let mut games = Vec::new();
        while self.has_next() {
            self.trim();
            match self.game()? {
                Some(game) => games.push(game),
                None => break,
            }
        }

        if let Some(c) = self.peek() {
            return Err(self.error(format!("Unexpected token '{c}'")));
        }
        Ok(games)
    }

    fn game(&mut self) -> ChessResult<Option<PgnGame>> {
        self.trim();
        let comments = self.comments()?;
        let tags = self.tags()?;
        self.trim();

        let (movetext, result) = self.movetext()?;
        if tags.is_empty() && movetext.is_empty() && result.is_none() {
            return Ok(None);
        }
        Ok(Some(PgnGame {
            tags,
            comments,
            movetext,
            result: result.map(str::to_string),
        }))
    }

    fn comments(&mut self) -> ChessResult<Vec<String>> {
        let mut comments = Vec::new();
        while let Some(comment) = self.comment()? {
            comments.push(comment);
            self.trim();
        }
        Ok(comments)
    }

    /// A `{...}` or `;...` comment.
    fn comment(&mut self) -> ChessResult<Option<String>> {
        if self.eq('{') {
            self.next();
            let text = self.take_while(|c| c != '}');
            self.req('}')?;
            return Ok(Some(text.to_string()));
        }
        if self.eq(';') {
            self.next();
            let text = self.take_while(|c| c != '\n' && c != '\r');
            return Ok(Some(text.to_string()));
        }
        Ok(None)
    }

    fn tags(&mut self) -> ChessResult<Vec<(String, String)>> {
        let mut tags = Vec::new();
        while self.eq('[') {
            self.next();
            self.trim();
            let name = self.take_while(|c| c.is_ascii_alphanumeric() || c == '_');
            if name.is_empty() {
                return Err(self.error("Expected a tag name"));
            }
            self.trim();
            self.req('"')?;
            let value = self.take_while(|c| c != '"');
            self.req('"')?;
            self.trim();
            self.req(']')?;
            self.trim();
            tags.push((name.to_string(), value.to_string()));
        }
        Ok(tags)
    }

    /// A game termination marker, standing alone.
    fn result(&mut self) -> Option<&'static str> {
        let rest = self.rest();
        // `0-1` is also the start of `0-1/2`
        let token = RESULTS
            .iter()
            .filter(|token| {
                rest.strip_prefix(**token).is_some_and(|after| {
                    // `0-0` is also the start of `0-0-0`
                    !after.starts_with(|c: char| c.is_alphanumeric() || c == '-')
                })
            })
            .max_by_key(|token| token.len())?;
        self.offset += token.len();
        Some(*token)
    }

    fn movetext(&mut self) -> ChessResult<(Vec<PgnItem>, Option<&'static str>)> {
        let mut movetext = Vec::new();
        loop {
            if let Some(result) = self.result() {
                return Ok((movetext, Some(result)));
            }
            match self.item()? {
                Some(item) => {
                    movetext.push(item);
                    self.trim();
                }
                None => return Ok((movetext, None)),
            }
        }
    }

    fn item(&mut self) -> ChessResult<Option<PgnItem>> {
        if let Some(comment) = self.comment()? {
            return Ok(Some(PgnItem::Comment(comment)));
        }
        if let Some(number) = self.number()? {
            return Ok(Some(number));
        }
        Ok(self.move_item()?.map(PgnItem::Move))
    }

    /// A move number indication, `12.` or `12...`.
    fn number(&mut self) -> ChessResult<Option<PgnItem>> {
        if !self.is(|c| matches!(c, '1'..='9')) {
            return Ok(None);
        }

        let digits = self.take_while(|c| c.is_ascii_digit());
        let number = digits
            .parse()
            .map_err(|_| self.error(format!("Move number {digits} is too large")))?;

        let ellipsis = self.eat("...") || self.eat("…");
        if !ellipsis {
            self.req('.')?;
        }
        Ok(Some(PgnItem::Number { number, ellipsis }))
    }

    /// The move token itself: castling, or SAN built from letters, digits and `x = / -`.
    fn move_token(&mut self) -> Option<&'a str> {
        let start = self.offset;
        for castle in ["O-O-O", "0-0-0", "O-O", "0-0"] {
            if self.eat(castle) {
                return Some(&self.source[start..self.offset]);
            }
        }

        if !self.is(|c| c.is_ascii_alphabetic()) {
            return None;
        }
        self.take_while(|c| c.is_ascii_alphanumeric() || matches!(c, '=' | '/' | '-'));
        Some(&self.source[start..self.offset])
    }

    fn move_item(&mut self) -> ChessResult<Option<PgnMove>> {
        let start = self.offset;
        if self.move_token().is_none() {
            return Ok(None);
        }
        if !self.eat("+") {
            self.eat("#");
        }
        let san = self.source[start..self.offset].to_string();

        let suffix = self.take_while(|c| c == '!' || c == '?');
        if suffix.len() > 2 {
            return Err(self.error(format!("Invalid move suffix '{suffix}'")));
        }
        let suffix = (!suffix.is_empty()).then(|| suffix.to_string());

        self.trim();
        let mut mv = PgnMove {
            san,
            suffix,
            ..PgnMove::default()
        };
        self.move_args(&mut mv)?;
        Ok(Some(mv))
    }

    /// Comments, NAGs and variations following a move.
    fn move_args(&mut self, mv: &mut PgnMove) -> ChessResult<()> {
        mv.comments.extend(self.comments()?);
        self.nags(&mut mv.nags)?;
        mv.comments.extend(self.comments()?);
        self.ravs(&mut mv.ravs)?;
        mv.comments.extend(self.comments()?);
        Ok(())
    }

    fn nags(&mut self, nags: &mut Vec<Nag>) -> ChessResult<()> {
        while self.eq('$') {
            self.next();
            let digits = self.take_while(|c| c.is_ascii_digit());
            if digits.is_empty() {
                let found = self.peek().map_or(String::from("end of input"), String::from);
                return Err(self.error(format!("Expected a decimal digit, found '{found}'")));
            }
            let nag = digits
                .parse()
                .ok()
                .and_then(Nag::new)
                .ok_or_else(|| self.error(format!("Invalid NAG ${digits}")))?;
            nags.push(nag);
            self.trim();
        }
        Ok(())
    }

    /// Recursive annotation variations, each a parenthesized list of items.
    fn ravs(&mut self, ravs: &mut Vec<Vec<PgnItem>>) -> ChessResult<()> {
        while self.eq('(') {
            self.next();
            self.trim();
            let mut items = Vec::new();
            while let Some(item) = self.item()? {
                items.push(item);
                self.trim();
            }
            self.req(')')?;
            if !items.is_empty() {
                ravs.push(items);
            }
            self.trim();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GAME: &str = r#"[Event "F/S Return Match"]
[Site "Belgrade, Serbia JUG"]
[Date "1992.11.04"]
[Round "29"]
[White "Fischer, Robert J."]
[Black "Spassky, Boris V."]
[Result "1/2-1/2"]

1. e4 e5 2. Nf3 Nc6 3. Bb5 a6 {This opening is called the Ruy Lopez.}
4. Ba4 Nf6 5. O-O Be7 6. Re1 b5 7. Bb3 d6 8. c3 O-O 9. h3 Nb8 10. d4 Nbd7
11. c4 c6 12. cxb5 axb5 13. Nc3 Bb7 14. Bg5 b4 15. Nb1 h6 16. Bh4 c5 17. dxe5
Nxe4 18. Bxe7 Qxe7 19. exd6 Qf6 20. Nbd2 Nxd6 21. Nc4 Nxc4 22. Bxc4 Nb6
23. Ne5 Rae8 24. Bxf7+ Rxf7 25. Nxf7 Rxe1+ 26. Qxe1 Kxf7 27. Qe3 Qg5 28. Qxg5
hxg5 29. b3 Ke6 30. a3 Kd6 31. axb4 cxb4 32. Ra5 Nd5 33. f3 Bc8 34. Kf2 Bf5
35. Ra7 g6 36. Ra6+ Kc5 37. Ke1 Nf4 38. g3 Nxh3 39. Kd2 Kb5 40. Rd6 Kc5 41. Ra6
Nf2 42. g4 Bd3 43. Re6 1/2-1/2
"#;

    #[test]
    fn test_full_game() {
        let games = parse_pgn(GAME).unwrap();
        assert_eq!(games.len(), 1);

        let game = &games[0];
        assert_eq!(game.tags.len(), 7);
        assert_eq!(game.tag("White"), Some("Fischer, Robert J."));
        assert_eq!(game.result.as_deref(), Some("1/2-1/2"));
        assert_eq!(game.moves().count(), 85);

        let bb5a6 = game.moves().nth(5).unwrap();
        assert_eq!(bb5a6.san, "a6");
        assert_eq!(bb5a6.comments, ["This opening is called the Ruy Lopez."]);
    }

    #[test]
    fn test_annotations() {
        let games = parse_pgn("1. e4!? $14 {good} ; rest of line\n1... e5?? (1... c5! (1... e6)) *")
            .unwrap();
        let moves: Vec<&PgnMove> = games[0].moves().collect();

        assert_eq!(moves[0].san, "e4");
        assert_eq!(moves[0].suffix.as_deref(), Some("!?"));
        assert_eq!(moves[0].nags, [Nag::new(14).unwrap()]);
        assert_eq!(moves[0].comments, ["good", " rest of line"]);

        assert_eq!(moves[1].suffix.as_deref(), Some("??"));
        assert_eq!(moves[1].ravs.len(), 1);
        let PgnItem::Move(c5) = &moves[1].ravs[0][1] else {
            panic!("expected a move");
        };
        assert_eq!(c5.san, "c5");
        assert_eq!(c5.ravs.len(), 1);
    }

    #[test]
    fn test_multiple_games() {
        let games =
            parse_pgn("[White \"A\"]\n\n1. d4 1-0\n\n[White \"B\"]\n\n1. c4 0-1\n*").unwrap();
        assert_eq!(games.len(), 3);
        assert_eq!(games[1].tag("White"), Some("B"));
        assert_eq!(games[1].result.as_deref(), Some("0-1"));
        assert!(games[2].movetext.is_empty());
    }

    #[test]
    fn test_castling_is_not_a_result() {
        let games = parse_pgn("1. e4 e5 2. 0-0-0 0-0").unwrap();
        let sans: Vec<&str> = games[0].moves().map(|mv| mv.san.as_str()).collect();
        assert_eq!(sans, ["e4", "e5", "0-0-0"]);
        assert_eq!(games[0].result.as_deref(), Some("0-0"));
    }

    #[test]
    fn test_every_result_token() {
        for token in RESULTS {
            let games = parse_pgn(&format!("1. e4 e5 {token}")).unwrap();
            assert_eq!(games.len(), 1, "{token}");
            assert_eq!(games[0].result.as_deref(), Some(token));
            assert_eq!(games[0].moves().count(), 2, "{token}");
        }
    }

    #[test]
    fn test_errors() {
        let err = parse_pgn("[Event \"x\"\n1. e4").unwrap_err();
        assert_eq!(
            err,
            ChessError::PgnSyntax {
                message: String::from("Expected ']'"),
                line: 2,
                column: 1
            }
        );

        assert!(parse_pgn("1. e4 {unterminated").is_err());
        assert!(parse_pgn("1. e4 (e5").is_err());
        assert!(parse_pgn("1 e4").is_err());
        assert!(parse_pgn("1. e4 $300").is_err());
        assert!(parse_pgn("1. e4 )").is_err());
    }

    #[test]
    fn test_line_and_column() {
        let err = parse_pgn("1. e4\r\n2. d4 $").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Expected a decimal digit, found 'end of input' (line: 2, column: 8)"
        );
    }
}
