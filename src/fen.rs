/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::{
    Bestiary, Board, Castle, CastleFlag, ChessError, ChessResult, Color, Piece, Position,
    SetupCastling, SetupPosition, SetupState, Square, State,
};

/// Placement field of a FEN string.
///
/// Ranks are written top to bottom and separated by `/`; runs of empty squares are written as
/// their length.
pub fn position_to_fen(position: &Position) -> String {
    let ranks: Vec<String> = position
        .board()
        .ranks()
        .map(|rank| {
            let mut fen = String::new();
            let mut gap = 0;
            for square in rank.squares() {
                match position.get(square) {
                    Some(piece) => {
                        if gap > 0 {
                            fen += &gap.to_string();
                            gap = 0;
                        }
                        fen.push(piece.fen());
                    }
                    None => gap += 1,
                }
            }
            if gap > 0 {
                fen += &gap.to_string();
            }
            fen
        })
        .collect();
    ranks.join("/")
}

fn en_passant_to_fen(square: Option<Square>) -> String {
    square.map_or_else(|| String::from("-"), |sq| sq.name())
}

/// Joins the six FEN fields.
pub(crate) fn fields_to_fen(
    position: &Position,
    color: Color,
    castling: &str,
    en_passant: Option<Square>,
    halfmove: u32,
    fullmove: u32,
) -> String {
    format!(
        "{} {} {castling} {} {halfmove} {fullmove}",
        position_to_fen(position),
        color.to_char(),
        en_passant_to_fen(en_passant),
    )
}

/// FEN string of a committed state.
///
/// # Example
/// ```
/// # use xchess::{state_to_fen, Game, FEN_STARTPOS};
/// let mut game = Game::default();
/// game.play().unwrap();
/// assert_eq!(state_to_fen(game.state().unwrap()), FEN_STARTPOS);
/// ```
pub fn state_to_fen(state: &State) -> String {
    fields_to_fen(
        state.position(),
        state.color(),
        &state.castling().fen(),
        state.en_passant(),
        state.halfmove(),
        state.fullmove(),
    )
}

/// Parses a full, six-field FEN string into an editable state.
///
/// Besides single letters, pieces may be written in brackets by id, e.g. `[Nightrider]`, where the
/// case of the first letter gives the color. The castling field accepts the usual `KQkq` flags as
/// well as explicit castles written as four squares in brackets: actor from and to, partner from
/// and to.
///
/// # Example
/// ```
/// # use xchess::{parse_fen, Bestiary, Board, Color};
/// let fen = "4k3/8/8/8/8/8/8/[Knight]3K2R b [e1g1h1f1] - 3 40";
/// let setup = parse_fen(fen, Board::default(), &Bestiary::chess()).unwrap();
/// assert_eq!(setup.color(), Color::Black);
/// assert_eq!(setup.position().len(), 4);
/// assert_eq!(setup.castling().castles().len(), 1);
/// assert_eq!(setup.fen(), "4k3/8/8/8/8/8/8/N3K2R b [e1g1h1f1] - 3 40");
/// ```
pub fn parse_fen(fen: &str, board: Board, bestiary: &Bestiary) -> ChessResult<SetupState> {
    let mut parser = FenParser::new(fen, board, bestiary);
    let state = parser.state()?;
    parser.end()?;
    Ok(state)
}

/// Parses the placement field of a FEN string on its own.
pub fn parse_fen_position(fen: &str, board: Board, bestiary: &Bestiary) -> ChessResult<Position> {
    let mut parser = FenParser::new(fen, board, bestiary);
    let position = parser.position()?;
    parser.end()?;
    Ok(position)
}

/// Parses the castling field of a FEN string on its own.
pub fn parse_fen_castling(fen: &str, board: Board) -> ChessResult<SetupCastling> {
    let bestiary = Bestiary::new("castling");
    let mut parser = FenParser::new(fen, board, &bestiary);
    let castling = parser.castling()?;
    parser.end()?;
    Ok(castling)
}

/// Single-pass cursor over a FEN string.
struct FenParser<'a> {
    chars: Vec<char>,
    offset: usize,
    x: i32,
    y: i32,
    board: Board,
    bestiary: &'a Bestiary,
}

impl<'a> FenParser<'a> {
    fn new(fen: &str, board: Board, bestiary: &'a Bestiary) -> Self {
        Self {
            chars: fen.chars().collect(),
            offset: 0,
            x: 0,
            y: 0,
            board,
            bestiary,
        }
    }

    #[inline(always)]
    fn peek(&self) -> Option<char> {
        self.chars.get(self.offset).copied()
    }

    #[inline(always)]
    fn is(&self, predicate: impl Fn(char) -> bool) -> bool {
        self.peek().is_some_and(predicate)
    }

    #[inline(always)]
    fn next(&mut self) {
        self.offset += 1;
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.next();
            return true;
        }
        false
    }

    fn trim(&mut self) {
        while self.is(char::is_whitespace) {
            self.next();
        }
    }

    fn end(&self) -> ChessResult<()> {
        match self.peek() {
            None => Ok(()),
            Some(_) => Err(ChessError::fen("Unknown character in FEN string")),
        }
    }

    fn end_tag(&mut self) -> ChessResult<()> {
        if self.eat(']') {
            Ok(())
        } else {
            Err(ChessError::fen("Missing closing ]"))
        }
    }

    /// Reads a decimal number starting with a non-zero digit.
    fn int(&mut self) -> Option<u32> {
        if !self.is(|c| ('1'..='9').contains(&c)) {
            return None;
        }
        let mut value = 0u32;
        while let Some(digit) = self.peek().and_then(|c| c.to_digit(10)) {
            value = value.saturating_mul(10).saturating_add(digit);
            self.next();
        }
        Some(value)
    }

    fn at(&self) -> ChessResult<Square> {
        self.board
            .at(self.x, self.y)
            .ok_or_else(|| ChessError::fen("Piece placed outside the board"))
    }

    fn place(&mut self, position: &mut Position, piece: Piece) -> ChessResult<()> {
        let square = self.at()?;
        position.put(square, piece);
        self.x += 1;
        Ok(())
    }

    fn long_piece(&mut self) -> ChessResult<Piece> {
        self.next();
        let mut name = String::new();
        while let Some(c) = self.peek().filter(|&c| c != ']') {
            name.push(c);
            self.next();
        }
        self.end_tag()?;

        let color = match name.chars().next() {
            Some(c) => Color::from_case(c),
            None => return Err(ChessError::fen("Empty piece name")),
        };
        self.bestiary.piece(&name, Some(color))
    }

    fn position(&mut self) -> ChessResult<Position> {
        let mut position = Position::new(self.board);
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                break;
            }
            if c == '/' {
                self.x = 0;
                self.y += 1;
                self.next();
            } else if let Some(gap) = self.int() {
                self.x = self.x.saturating_add(i32::try_from(gap).unwrap_or(i32::MAX));
            } else if c == '[' {
                let piece = self.long_piece()?;
                self.place(&mut position, piece)?;
            } else {
                let piece = self.bestiary.piece(&c.to_string(), None)?;
                self.place(&mut position, piece)?;
                self.next();
            }
        }
        Ok(position)
    }

    fn color(&mut self) -> ChessResult<Color> {
        if self.eat('w') {
            Ok(Color::White)
        } else if self.eat('b') {
            Ok(Color::Black)
        } else {
            Err(ChessError::fen("missing color"))
        }
    }

    fn square(&mut self) -> ChessResult<Option<Square>> {
        let start = self.offset;
        while self.is(|c| c.is_ascii_lowercase() && c != 'x') {
            self.next();
        }
        if self.offset == start {
            return Ok(None);
        }
        if self.int().is_none() {
            return Ok(None);
        }
        let name: String = self.chars[start..self.offset].iter().collect();
        self.board.parse_square(&name).map(Some)
    }

    fn required_square(&mut self) -> ChessResult<Square> {
        self.square()?
            .ok_or_else(|| ChessError::fen("missing square"))
    }

    fn castling(&mut self) -> ChessResult<SetupCastling> {
        let mut castling = SetupCastling::none();
        if self.eat('-') {
            return Ok(castling);
        }

        let mut found = false;
        loop {
            if let Some(flag) = self.peek().and_then(CastleFlag::from_char) {
                self.next();
                castling.set_flag(flag, true);
            } else if self.eat('[') {
                let king_from = self.required_square()?;
                let king_to = self.required_square()?;
                let rook_from = self.required_square()?;
                let rook_to = self.required_square()?;
                self.end_tag()?;
                castling.add(Castle::new(king_from, king_to, rook_from, rook_to)?);
            } else {
                break;
            }
            found = true;
        }

        if found {
            Ok(castling)
        } else {
            Err(ChessError::fen("missing castling"))
        }
    }

    fn en_passant(&mut self) -> ChessResult<Option<Square>> {
        if self.eat('-') {
            return Ok(None);
        }
        match self.square()? {
            Some(square) => Ok(Some(square)),
            None => Err(ChessError::fen("missing en passant square")),
        }
    }

    fn halfmove(&mut self) -> ChessResult<u32> {
        if self.eat('0') {
            return Ok(0);
        }
        self.int()
            .ok_or_else(|| ChessError::fen("missing halfmove clock"))
    }

    fn fullmove(&mut self) -> ChessResult<u32> {
        self.int()
            .ok_or_else(|| ChessError::fen("missing fullmove number"))
    }

    fn state(&mut self) -> ChessResult<SetupState> {
        let position = self.position()?;
        self.trim();
        let color = self.color()?;
        self.trim();
        let castling = self.castling()?;
        self.trim();
        let en_passant = self.en_passant()?;
        self.trim();
        let halfmove = self.halfmove()?;
        self.trim();
        let fullmove = self.fullmove()?;
        self.trim();

        SetupState::from_parts(
            SetupPosition::new(position),
            color,
            castling,
            en_passant,
            halfmove,
            fullmove,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FEN_KIWIPETE, FEN_STARTPOS};

    fn parse(fen: &str) -> ChessResult<SetupState> {
        parse_fen(fen, Board::default(), &Bestiary::chess())
    }

    #[test]
    fn test_round_trip() {
        for fen in [
            FEN_STARTPOS,
            FEN_KIWIPETE,
            "8/8/8/8/8/8/8/8 w - - 0 1",
            "rnbqkbnr/pp1ppppp/8/2p5/4P3/8/PPPP1PPP/RNBQKBNR w KQkq c6 0 2",
            "4k3/8/8/8/8/8/8/4K2R w K - 12 99",
        ] {
            assert_eq!(parse(fen).unwrap().fen(), fen);
        }
    }

    #[test]
    fn test_fields() {
        let setup = parse("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 12").unwrap();
        let board = Board::default();
        assert_eq!(setup.en_passant(), Some(board.parse_square("d6").unwrap()));
        assert_eq!(setup.fullmove(), 12);
        assert_eq!(setup.halfmove(), 0);
        assert!(setup.castling().is_empty());
    }

    #[test]
    fn test_errors() {
        for (fen, message) in [
            ("8k/8/8/8/8/8/8/8 w - - 0 1", "Piece placed outside the board"),
            ("8/8/8/8/8/8/8/8/k7 w - - 0 1", "Piece placed outside the board"),
            ("[king w - - 0 1", "Missing closing ]"),
            ("8/8/8/8/8/8/8/8 x - - 0 1", "missing color"),
            ("8/8/8/8/8/8/8/8 w X - 0 1", "missing castling"),
            ("8/8/8/8/8/8/8/8 w - 5 0 1", "missing en passant square"),
            ("8/8/8/8/8/8/8/8 w - - x 1", "missing halfmove clock"),
            ("8/8/8/8/8/8/8/8 w - - 0 0", "missing fullmove number"),
            ("8/8/8/8/8/8/8/8 w - - 0 1 x", "Unknown character in FEN string"),
        ] {
            assert_eq!(parse(fen), Err(ChessError::fen(message)), "{fen}");
        }
        assert!(matches!(
            parse("8/8/8/8/8/8/8/7A w - - 0 1"),
            Err(ChessError::InvalidPieceTypeId(_))
        ));
    }

    #[test]
    fn test_castling_field() {
        let board = Board::default();
        let castling = parse_fen_castling("Kq[e8c8a8d8]", board).unwrap();
        assert!(castling.wk() && castling.bq() && !castling.wq() && !castling.bk());
        assert_eq!(castling.castles().len(), 1);
        assert_eq!(castling.fen(), "Kq[e8c8a8d8]");

        assert!(parse_fen_castling("[e1g1h1]", board).is_err());
    }

    #[test]
    fn test_position_field() {
        let fen = "8/8/8/8/8/8/8/[Rook]3[king]3";
        let position = parse_fen_position(fen, Board::default(), &Bestiary::chess()).unwrap();
        assert_eq!(position_to_fen(&position), "8/8/8/8/8/8/8/R3k3");
    }
}
