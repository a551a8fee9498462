/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use crate::{Board, ChessError, ChessResult, Color, Move, Position, Square, State};

/// One of the four castling rights that can be written with a single FEN letter.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CastleFlag {
    WhiteKing,
    WhiteQueen,
    BlackKing,
    BlackQueen,
}

impl CastleFlag {
    /// All flags, in FEN order.
    pub const ALL: [Self; 4] = [
        Self::WhiteKing,
        Self::WhiteQueen,
        Self::BlackKing,
        Self::BlackQueen,
    ];

    #[inline(always)]
    pub const fn new(color: Color, king_side: bool) -> Self {
        match (color, king_side) {
            (Color::White, true) => Self::WhiteKing,
            (Color::White, false) => Self::WhiteQueen,
            (Color::Black, true) => Self::BlackKing,
            (Color::Black, false) => Self::BlackQueen,
        }
    }

    #[inline(always)]
    pub const fn color(&self) -> Color {
        match self {
            Self::WhiteKing | Self::WhiteQueen => Color::White,
            Self::BlackKing | Self::BlackQueen => Color::Black,
        }
    }

    #[inline(always)]
    pub const fn is_king_side(&self) -> bool {
        matches!(self, Self::WhiteKing | Self::BlackKing)
    }

    #[inline(always)]
    pub const fn index(&self) -> usize {
        *self as usize
    }

    /// FEN letter of this flag: one of `KQkq`.
    #[inline(always)]
    pub const fn to_char(&self) -> char {
        match self {
            Self::WhiteKing => 'K',
            Self::WhiteQueen => 'Q',
            Self::BlackKing => 'k',
            Self::BlackQueen => 'q',
        }
    }

    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'K' => Some(Self::WhiteKing),
            'Q' => Some(Self::WhiteQueen),
            'k' => Some(Self::BlackKing),
            'q' => Some(Self::BlackQueen),
            _ => None,
        }
    }
}

impl fmt::Debug for CastleFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

/// A castling option: where the castling actor and its partner start and finish.
///
/// All four squares lie on one rank or on one file. The actor never starts on the partner's
/// square, and the two never finish on the same square.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Castle {
    king_from: Square,
    king_to: Square,
    rook_from: Square,
    rook_to: Square,
    flag: Option<CastleFlag>,
}

impl Castle {
    /// Creates an explicit castle from its four squares.
    ///
    /// # Example
    /// ```
    /// # use xchess::{Board, Castle, ChessError};
    /// let board = Board::default();
    /// let sq = |name| board.parse_square(name).unwrap();
    /// let castle = Castle::new(sq("e1"), sq("g1"), sq("h1"), sq("f1")).unwrap();
    /// assert_eq!(castle.fen(), "[e1g1h1f1]");
    ///
    /// let err = Castle::new(sq("e1"), sq("g2"), sq("h1"), sq("f1"));
    /// assert_eq!(err, Err(ChessError::InvalidCastlingAlignment));
    /// ```
    pub fn new(
        king_from: Square,
        king_to: Square,
        rook_from: Square,
        rook_to: Square,
    ) -> ChessResult<Self> {
        if king_from == rook_from || king_to == rook_to {
            return Err(ChessError::InvalidCastlingSquares);
        }

        let squares = [king_to, rook_from, rook_to];
        let same_rank = squares.iter().all(|sq| sq.y() == king_from.y());
        let same_file = squares.iter().all(|sq| sq.x() == king_from.x());
        if !same_rank && !same_file {
            return Err(ChessError::InvalidCastlingAlignment);
        }

        Ok(Self {
            king_from,
            king_to,
            rook_from,
            rook_to,
            flag: None,
        })
    }

    #[inline(always)]
    const fn flagged(
        flag: CastleFlag,
        king_from: Square,
        king_to: Square,
        rook_from: Square,
        rook_to: Square,
    ) -> Self {
        Self {
            king_from,
            king_to,
            rook_from,
            rook_to,
            flag: Some(flag),
        }
    }

    #[inline(always)]
    pub const fn king_from(&self) -> Square {
        self.king_from
    }

    #[inline(always)]
    pub const fn king_to(&self) -> Square {
        self.king_to
    }

    #[inline(always)]
    pub const fn rook_from(&self) -> Square {
        self.rook_from
    }

    #[inline(always)]
    pub const fn rook_to(&self) -> Square {
        self.rook_to
    }

    /// The FEN flag this castle was inferred from, if any.
    #[inline(always)]
    pub const fn flag(&self) -> Option<CastleFlag> {
        self.flag
    }

    #[inline(always)]
    pub const fn squares(&self) -> [Square; 4] {
        [self.king_from, self.king_to, self.rook_from, self.rook_to]
    }

    /// FEN form: the flag letter, or the four squares in brackets.
    pub fn fen(&self) -> String {
        match self.flag {
            Some(flag) => flag.to_char().to_string(),
            None => format!(
                "[{}{}{}{}]",
                self.king_from, self.king_to, self.rook_from, self.rook_to
            ),
        }
    }

    /// Squares between `from` and `to`, excluding `from`.
    fn path(from: Square, to: Square) -> impl Iterator<Item = Square> {
        let dx = to.x() as i32 - from.x() as i32;
        let dy = to.y() as i32 - from.y() as i32;
        let len = dx.abs().max(dy.abs()) as usize;
        from.ray(dx.signum(), dy.signum()).take(len)
    }

    pub fn king_path(&self) -> impl Iterator<Item = Square> {
        Self::path(self.king_from, self.king_to)
    }

    pub fn rook_path(&self) -> impl Iterator<Item = Square> {
        Self::path(self.rook_from, self.rook_to)
    }

    /// Whether the actor and partner both stand on their starting squares in `position`.
    pub fn valid(&self, position: &Position) -> bool {
        match (position.get(self.king_from), position.get(self.rook_from)) {
            (Some(king), Some(rook)) => king.color() == rook.color(),
            _ => false,
        }
    }

    /// Whether `mv` moves or captures the actor or the partner.
    pub fn involves(&self, mv: &Move) -> bool {
        let touched = [Some(mv.from()), mv.captured_at()];
        touched
            .into_iter()
            .flatten()
            .any(|sq| sq == self.king_from || sq == self.rook_from)
    }

    /// Whether castling is possible right now: the paths are clear and the actor does not start
    /// on, cross, or land on an attacked square.
    pub fn available(&self, state: &State) -> bool {
        let position = state.position();
        let Some(king) = position.get(self.king_from) else {
            return false;
        };
        if king.color() != state.color() || !position.has(self.rook_from) {
            return false;
        }

        let rook_blocked = self
            .rook_path()
            .any(|sq| sq != self.king_from && position.has(sq));
        let king_blocked = self
            .king_path()
            .any(|sq| sq != self.rook_from && position.has(sq));
        if rook_blocked || king_blocked {
            return false;
        }

        !position.attacks(self.king_from, king)
            && !self.king_path().any(|sq| position.attacks(sq, king))
    }

    /// The move performing this castle in `position`.
    pub fn to_move(&self, position: &Position) -> Option<Move> {
        let king = position.get(self.king_from)?;
        let rook = position.get(self.rook_from)?;
        Some(Move::castling(king, *self, rook))
    }

    /// Infers the castle named by `flag` from `position`.
    ///
    /// The home rank is searched from the side's own edge inwards. On each rank, the first
    /// castling actor followed by a castling partner, scanning towards the flag's side, makes the
    /// castle.
    pub fn find(position: &Position, flag: CastleFlag) -> Option<Self> {
        let board = position.board();
        let color = flag.color();
        let ranks: Vec<_> = match color {
            Color::White => board.ranks().rev().collect(),
            Color::Black => board.ranks().collect(),
        };

        ranks.into_iter().find_map(|rank| {
            let squares: Vec<_> = if flag.is_king_side() {
                rank.squares().collect()
            } else {
                rank.squares().rev().collect()
            };
            Self::find_on_rank(position, &squares, color)
        })
    }

    fn find_on_rank(position: &Position, squares: &[Square], color: Color) -> Option<Self> {
        let mut king_from = None;
        for &square in squares {
            let Some(piece) = position.get(square) else {
                continue;
            };
            if piece.color() != color {
                continue;
            }
            if let Some(king_from) = king_from {
                if piece.kind().is_castling_partner() {
                    return Self::generate(position.board(), color, king_from, square);
                }
            }
            if piece.kind().is_castling_actor() {
                king_from = Some(square);
            }
        }
        None
    }

    /// Builds the castle for an actor on `king_from` and a partner on `rook_from`.
    ///
    /// On eight files the destinations are the Chess960 ones. On other widths the actor moves two
    /// squares towards the partner (one if the board is too narrow) and the partner lands on the
    /// other side of it.
    fn generate(board: Board, color: Color, king_from: Square, rook_from: Square) -> Option<Self> {
        let king_side = king_from.x() < rook_from.x();
        let flag = CastleFlag::new(color, king_side);

        if board.width() == 8 {
            let (king_x, rook_x) = if king_side { (6, 5) } else { (2, 3) };
            let king_to = board.at(king_x, king_from.y() as i32)?;
            let rook_to = board.at(rook_x, rook_from.y() as i32)?;
            return Some(Self::flagged(flag, king_from, king_to, rook_from, rook_to));
        }

        let dir = if king_side { 1 } else { -1 };
        let king_to = king_from.dx(dir * 2).or_else(|| king_from.dx(dir))?;
        let rook_to = king_to.dx(-dir)?;
        Some(Self::flagged(flag, king_from, king_to, rook_from, rook_to))
    }
}

impl fmt::Display for Castle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.fen())
    }
}

impl fmt::Debug for Castle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Castle({}{}{}{}{})",
            self.king_from,
            self.king_to,
            self.rook_from,
            self.rook_to,
            self.flag.map(|f| format!(", {f:?}")).unwrap_or_default()
        )
    }
}

/// The castling options of a committed state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Castling {
    castles: Vec<Castle>,
}

impl Castling {
    pub fn new(castles: impl IntoIterator<Item = Castle>) -> Self {
        Self {
            castles: castles.into_iter().collect(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Castle> {
        self.castles.iter()
    }

    pub fn len(&self) -> usize {
        self.castles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.castles.is_empty()
    }

    /// Whether the option named by `flag` remains.
    pub fn has(&self, flag: CastleFlag) -> bool {
        self.castles.iter().any(|c| c.flag() == Some(flag))
    }

    pub fn wk(&self) -> bool {
        self.has(CastleFlag::WhiteKing)
    }

    pub fn wq(&self) -> bool {
        self.has(CastleFlag::WhiteQueen)
    }

    pub fn bk(&self) -> bool {
        self.has(CastleFlag::BlackKing)
    }

    pub fn bq(&self) -> bool {
        self.has(CastleFlag::BlackQueen)
    }

    /// The options left after `mv` is played.
    pub fn apply(&self, mv: &Move) -> Self {
        Self {
            castles: self
                .castles
                .iter()
                .filter(|castle| !castle.involves(mv))
                .copied()
                .collect(),
        }
    }

    /// Appends every castling move available in `state` to `moves`.
    pub fn moves(&self, state: &State, moves: &mut Vec<Move>) {
        moves.extend(
            self.castles
                .iter()
                .filter(|castle| castle.available(state))
                .filter_map(|castle| castle.to_move(state.position())),
        );
    }

    /// FEN field, `-` when there are no options left.
    pub fn fen(&self) -> String {
        if self.castles.is_empty() {
            return String::from("-");
        }
        self.castles.iter().map(Castle::fen).collect()
    }
}

impl fmt::Display for Castling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.fen())
    }
}

/// Castling rights while a game is being set up.
///
/// Flags are kept apart from explicit castles, since a flag only becomes a concrete [`Castle`]
/// once the position is known.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SetupCastling {
    flags: [bool; 4],
    castles: Vec<Castle>,
}

impl SetupCastling {
    /// No castling rights at all.
    pub const fn none() -> Self {
        Self {
            flags: [false; 4],
            castles: Vec::new(),
        }
    }

    /// All four flags set, as in the standard starting position.
    pub const fn all() -> Self {
        Self {
            flags: [true; 4],
            castles: Vec::new(),
        }
    }

    pub fn flag(&self, flag: CastleFlag) -> bool {
        self.flags[flag.index()]
    }

    /// Sets `flag`, returning `true` if it changed.
    pub fn set_flag(&mut self, flag: CastleFlag, value: bool) -> bool {
        let changed = self.flags[flag.index()] != value;
        self.flags[flag.index()] = value;
        changed
    }

    pub fn wk(&self) -> bool {
        self.flag(CastleFlag::WhiteKing)
    }

    pub fn wq(&self) -> bool {
        self.flag(CastleFlag::WhiteQueen)
    }

    pub fn bk(&self) -> bool {
        self.flag(CastleFlag::BlackKing)
    }

    pub fn bq(&self) -> bool {
        self.flag(CastleFlag::BlackQueen)
    }

    /// Explicit castles.
    pub fn castles(&self) -> &[Castle] {
        &self.castles
    }

    /// Adds an explicit castle, returning `true` if it was not there yet.
    pub fn add(&mut self, castle: Castle) -> bool {
        if self.castles.contains(&castle) {
            return false;
        }
        self.castles.push(castle);
        true
    }

    /// Removes an explicit castle, returning `true` if it was there.
    pub fn delete(&mut self, castle: &Castle) -> bool {
        let len = self.castles.len();
        self.castles.retain(|c| c != castle);
        self.castles.len() != len
    }

    /// Removes every explicit castle, returning `true` if there were any.
    pub fn clear(&mut self) -> bool {
        let changed = !self.castles.is_empty();
        self.castles.clear();
        changed
    }

    pub fn has(&self, castle: &Castle) -> bool {
        self.castles.contains(castle)
    }

    /// Number of explicit castles.
    pub fn len(&self) -> usize {
        self.castles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.castles.is_empty()
    }

    /// Resolves the flags against `position` and keeps the explicit castles whose pieces are in
    /// place.
    pub fn prepare(&self, position: &Position) -> Castling {
        let found = CastleFlag::ALL
            .into_iter()
            .filter(|&flag| self.flag(flag))
            .filter_map(|flag| Castle::find(position, flag));
        let explicit = self
            .castles
            .iter()
            .filter(|castle| castle.valid(position))
            .copied();
        Castling::new(found.chain(explicit))
    }

    /// FEN field: flags first, then the explicit castles, or `-`.
    pub fn fen(&self) -> String {
        let flags: String = CastleFlag::ALL
            .into_iter()
            .filter(|&flag| self.flag(flag))
            .map(|flag| flag.to_char())
            .collect();
        let castles: String = self.castles.iter().map(Castle::fen).collect();

        match flags + &castles {
            fen if fen.is_empty() => String::from("-"),
            fen => fen,
        }
    }
}

impl Default for SetupCastling {
    fn default() -> Self {
        Self::all()
    }
}

impl From<&Castling> for SetupCastling {
    fn from(castling: &Castling) -> Self {
        let mut setup = Self::none();
        for castle in castling.iter() {
            match castle.flag() {
                Some(flag) => {
                    setup.set_flag(flag, true);
                }
                None => {
                    setup.add(*castle);
                }
            }
        }
        setup
    }
}

impl fmt::Display for SetupCastling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.fen())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Piece, PieceKind};

    fn sq(board: Board, name: &str) -> Square {
        board.parse_square(name).unwrap()
    }

    fn home_position() -> Position {
        let board = Board::default();
        let mut position = Position::new(board);
        for (name, piece) in [
            ("a1", Piece::WHITE_ROOK),
            ("e1", Piece::WHITE_KING),
            ("h1", Piece::WHITE_ROOK),
            ("a8", Piece::BLACK_ROOK),
            ("e8", Piece::BLACK_KING),
            ("h8", Piece::BLACK_ROOK),
        ] {
            position.put(sq(board, name), piece);
        }
        position
    }

    #[test]
    fn test_castle_squares_are_validated() {
        let board = Board::default();
        assert_eq!(
            Castle::new(
                sq(board, "e1"),
                sq(board, "g1"),
                sq(board, "e1"),
                sq(board, "f1")
            ),
            Err(ChessError::InvalidCastlingSquares)
        );
        assert_eq!(
            Castle::new(
                sq(board, "e1"),
                sq(board, "g1"),
                sq(board, "h1"),
                sq(board, "g1")
            ),
            Err(ChessError::InvalidCastlingSquares)
        );

        // Castling along a file is allowed
        let castle = Castle::new(
            sq(board, "a1"),
            sq(board, "a3"),
            sq(board, "a5"),
            sq(board, "a2"),
        )
        .unwrap();
        assert_eq!(castle.king_path().count(), 2);
        assert_eq!(castle.rook_path().count(), 3);
    }

    #[test]
    fn test_find_standard_castles() {
        let position = home_position();
        let board = position.board();

        let wk = Castle::find(&position, CastleFlag::WhiteKing).unwrap();
        assert_eq!(wk.king_to(), sq(board, "g1"));
        assert_eq!(wk.rook_from(), sq(board, "h1"));
        assert_eq!(wk.rook_to(), sq(board, "f1"));

        let bq = Castle::find(&position, CastleFlag::BlackQueen).unwrap();
        assert_eq!(bq.king_from(), sq(board, "e8"));
        assert_eq!(bq.king_to(), sq(board, "c8"));
        assert_eq!(bq.rook_from(), sq(board, "a8"));
        assert_eq!(bq.rook_to(), sq(board, "d8"));
    }

    #[test]
    fn test_find_chess960_castles() {
        let board = Board::default();
        let mut position = Position::new(board);
        position.put(sq(board, "b1"), Piece::WHITE_KING);
        position.put(sq(board, "a1"), Piece::WHITE_ROOK);
        position.put(sq(board, "c1"), Piece::WHITE_ROOK);

        let wk = Castle::find(&position, CastleFlag::WhiteKing).unwrap();
        assert_eq!(wk.king_to(), sq(board, "g1"));
        assert_eq!(wk.rook_from(), sq(board, "c1"));
        assert_eq!(wk.rook_to(), sq(board, "f1"));

        let wq = Castle::find(&position, CastleFlag::WhiteQueen).unwrap();
        assert_eq!(wq.king_to(), sq(board, "c1"));
        assert_eq!(wq.rook_from(), sq(board, "a1"));
        assert_eq!(wq.rook_to(), sq(board, "d1"));
    }

    #[test]
    fn test_find_castles_on_narrow_board() {
        let board: Board = "5x5".parse().unwrap();
        let mut position = Position::new(board);
        position.put(sq(board, "a1"), Piece::WHITE_ROOK);
        position.put(sq(board, "c1"), Piece::WHITE_KING);
        position.put(sq(board, "e1"), Piece::WHITE_ROOK);

        let wk = Castle::find(&position, CastleFlag::WhiteKing).unwrap();
        assert_eq!(wk.king_to(), sq(board, "e1"));
        assert_eq!(wk.rook_to(), sq(board, "d1"));

        let wq = Castle::find(&position, CastleFlag::WhiteQueen).unwrap();
        assert_eq!(wq.king_to(), sq(board, "a1"));
        assert_eq!(wq.rook_to(), sq(board, "b1"));

        assert!(Castle::find(&position, CastleFlag::BlackKing).is_none());
    }

    #[test]
    fn test_setup_castling() {
        let position = home_position();
        let mut setup = SetupCastling::all();
        assert_eq!(setup.fen(), "KQkq");

        setup.set_flag(CastleFlag::BlackQueen, false);
        assert!(!setup.set_flag(CastleFlag::BlackQueen, false));
        let castling = setup.prepare(&position);
        assert_eq!(castling.fen(), "KQk");
        assert!(castling.wk() && castling.wq() && castling.bk() && !castling.bq());

        // A flag without pieces to back it is dropped
        let mut empty = position.clone();
        empty.take(sq(position.board(), "h8"));
        assert_eq!(setup.prepare(&empty).fen(), "KQ");

        assert_eq!(SetupCastling::none().fen(), "-");
        assert_eq!(SetupCastling::from(&castling), setup);
    }

    #[test]
    fn test_explicit_castles() {
        let position = home_position();
        let board = position.board();
        let mut setup = SetupCastling::none();
        let castle = Castle::new(
            sq(board, "e1"),
            sq(board, "c1"),
            sq(board, "a1"),
            sq(board, "d1"),
        )
        .unwrap();
        assert!(setup.add(castle));
        assert!(!setup.add(castle));
        assert_eq!(setup.fen(), "[e1c1a1d1]");

        let castling = setup.prepare(&position);
        assert_eq!(castling.len(), 1);
        assert!(!castling.wq());

        // Pieces of different colors do not make a valid castle
        let mut mixed = position.clone();
        mixed.put(sq(board, "a1"), Piece::new(PieceKind::Rook, Color::Black));
        assert!(setup.prepare(&mixed).is_empty());

        assert!(setup.delete(&castle));
        assert!(!setup.clear());
    }
}
