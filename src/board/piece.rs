/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{fmt, str::FromStr};

use crate::{ChessError, Color};

/// Geometry of a single family of offsets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shape {
    /// The four orthogonal offsets of length `r`: `(0, ±r)` and `(±r, 0)`.
    Orthogonal(i32),

    /// The four diagonal offsets of length `r`: `(±r, ±r)`.
    Diagonal(i32),

    /// The eight reflections of `(a, b)`, as in a knight's `(1, 2)`.
    Oblique(i32, i32),
}

impl Shape {
    /// All offsets described by this shape.
    ///
    /// # Example
    /// ```
    /// # use xchess::Shape;
    /// assert_eq!(Shape::Orthogonal(1).offsets().count(), 4);
    /// assert_eq!(Shape::Oblique(1, 2).offsets().count(), 8);
    /// ```
    pub fn offsets(self) -> impl Iterator<Item = (i32, i32)> {
        let (offsets, len) = match self {
            Self::Orthogonal(r) => (
                [(0, -r), (r, 0), (0, r), (-r, 0), (0, 0), (0, 0), (0, 0), (0, 0)],
                4,
            ),
            Self::Diagonal(r) => (
                [(r, -r), (r, r), (-r, r), (-r, -r), (0, 0), (0, 0), (0, 0), (0, 0)],
                4,
            ),
            Self::Oblique(a, b) => (
                [(a, -b), (b, -a), (b, a), (a, b), (-a, b), (-b, a), (-b, -a), (-a, -b)],
                8,
            ),
        };
        offsets.into_iter().take(len)
    }
}

/// How a piece travels along the offsets of a [`Shape`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Jumps straight to `from + offset`.
    Leap,

    /// Repeats the offset until blocked.
    Ride,

    /// Slides along the offset, jumps over the first piece met, and lands just behind it.
    Hop,
}

/// One movement component of a piece kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Step {
    pub shape: Shape,
    pub mode: Mode,
}

impl Step {
    pub const fn leap(shape: Shape) -> Self {
        Self {
            shape,
            mode: Mode::Leap,
        }
    }

    pub const fn ride(shape: Shape) -> Self {
        Self {
            shape,
            mode: Mode::Ride,
        }
    }

    pub const fn hop(shape: Shape) -> Self {
        Self {
            shape,
            mode: Mode::Hop,
        }
    }
}

/// Movement of a piece kind, looked up per kind by the move generator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Movement {
    /// The piece never moves.
    None,

    /// Pawn pushes, double steps, diagonal captures, en passant and promotion.
    Pawn,

    /// A union of leaping, riding, or hopping components.
    Steps(&'static [Step]),
}

use Shape::*;

const W: Shape = Orthogonal(1);
const F: Shape = Diagonal(1);
const N: Shape = Oblique(1, 2);

const KING_STEPS: &[Step] = &[Step::leap(W), Step::leap(F)];
const QUEEN_STEPS: &[Step] = &[Step::ride(W), Step::ride(F)];
const ROOK_STEPS: &[Step] = &[Step::ride(W)];
const BISHOP_STEPS: &[Step] = &[Step::ride(F)];
const KNIGHT_STEPS: &[Step] = &[Step::leap(N)];
const WAZIR_STEPS: &[Step] = &[Step::leap(W)];
const FERZ_STEPS: &[Step] = &[Step::leap(F)];
const DABBABA_STEPS: &[Step] = &[Step::leap(Orthogonal(2))];
const ALFIL_STEPS: &[Step] = &[Step::leap(Diagonal(2))];
const THREELEAPER_STEPS: &[Step] = &[Step::leap(Orthogonal(3))];
const CAMEL_STEPS: &[Step] = &[Step::leap(Oblique(1, 3))];
const ZEBRA_STEPS: &[Step] = &[Step::leap(Oblique(2, 3))];
const TRIPPER_STEPS: &[Step] = &[Step::leap(Diagonal(3))];
const GIRAFFE_STEPS: &[Step] = &[Step::leap(Oblique(1, 4))];
const NIGHTRIDER_STEPS: &[Step] = &[Step::ride(N)];
const EMPRESS_STEPS: &[Step] = &[Step::leap(N), Step::ride(W)];
const PRINCESS_STEPS: &[Step] = &[Step::leap(N), Step::ride(F)];
const AMAZON_STEPS: &[Step] = &[Step::leap(N), Step::ride(W), Step::ride(F)];
const GRASSHOPPER_STEPS: &[Step] = &[Step::hop(W), Step::hop(F)];

/// Every piece kind the engine knows about.
///
/// The set is closed: per-kind behavior (movement, trait flags, notation) is a table lookup on
/// this enum. Which kinds are available in a particular game is decided by its
/// [`crate::Bestiary`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum PieceKind {
    King = 1,
    Queen = 2,
    Rook = 3,
    Bishop = 4,
    Knight = 5,
    Pawn = 6,
    Wazir = 10,
    Ferz = 11,
    Mann = 12,
    Dabbaba = 13,
    Alfil = 14,
    Threeleaper = 15,
    Camel = 16,
    Zebra = 17,
    Tripper = 18,
    Giraffe = 19,
    Nightrider = 20,
    Empress = 21,
    Princess = 22,
    Amazon = 23,
    Grasshopper = 24,
    Wall = 25,
    Stone = 26,
}

use PieceKind::*;

impl PieceKind {
    /// Number of piece kinds.
    pub const COUNT: usize = 23;

    /// The orthodox chess kinds.
    pub const CHESS: [Self; 6] = [King, Queen, Rook, Bishop, Knight, Pawn];

    /// The fairy kinds.
    pub const FAIRY: [Self; 17] = [
        Wazir,
        Ferz,
        Mann,
        Dabbaba,
        Alfil,
        Threeleaper,
        Camel,
        Zebra,
        Tripper,
        Giraffe,
        Nightrider,
        Empress,
        Princess,
        Amazon,
        Grasshopper,
        Wall,
        Stone,
    ];

    /// Every kind, chess first.
    pub fn all() -> impl Iterator<Item = Self> {
        Self::CHESS.into_iter().chain(Self::FAIRY)
    }

    /// Lowercase name of this kind, used as its id.
    pub const fn id(&self) -> &'static str {
        match self {
            King => "king",
            Queen => "queen",
            Rook => "rook",
            Bishop => "bishop",
            Knight => "knight",
            Pawn => "pawn",
            Wazir => "wazir",
            Ferz => "ferz",
            Mann => "mann",
            Dabbaba => "dabbaba",
            Alfil => "alfil",
            Threeleaper => "threeleaper",
            Camel => "camel",
            Zebra => "zebra",
            Tripper => "tripper",
            Giraffe => "giraffe",
            Nightrider => "nightrider",
            Empress => "empress",
            Princess => "princess",
            Amazon => "amazon",
            Grasshopper => "grasshopper",
            Wall => "wall",
            Stone => "stone",
        }
    }

    /// Numeric code of this kind.
    #[inline(always)]
    pub const fn code(&self) -> u8 {
        *self as u8
    }

    /// Uppercase FEN letter; black pieces use the lowercase form.
    pub const fn fen_char(&self) -> char {
        match self {
            King => 'K',
            Queen => 'Q',
            Rook => 'R',
            Bishop => 'B',
            Knight => 'N',
            Pawn => 'P',
            Wazir => 'W',
            Ferz => 'V',
            Mann => 'M',
            Dabbaba => 'D',
            Alfil => 'F',
            Threeleaper => 'L',
            Camel => 'C',
            Zebra => 'Z',
            Tripper => 'T',
            Giraffe => 'J',
            Nightrider => 'H',
            Empress => 'E',
            Princess => 'S',
            Amazon => 'A',
            Grasshopper => 'G',
            Wall => 'X',
            Stone => 'O',
        }
    }

    /// Letter used in move notation. Pawns have none.
    pub const fn move_letter(&self) -> &'static str {
        match self {
            Pawn => "",
            King => "K",
            Queen => "Q",
            Rook => "R",
            Bishop => "B",
            Knight => "N",
            Wazir => "W",
            Ferz => "V",
            Mann => "M",
            Dabbaba => "D",
            Alfil => "F",
            Threeleaper => "L",
            Camel => "C",
            Zebra => "Z",
            Tripper => "T",
            Giraffe => "J",
            Nightrider => "H",
            Empress => "E",
            Princess => "S",
            Amazon => "A",
            Grasshopper => "G",
            Wall => "X",
            Stone => "O",
        }
    }

    /// Unicode signs for the white and black piece of this kind.
    pub const fn signs(&self) -> (char, char) {
        match self {
            King => ('♔', '♚'),
            Queen => ('♕', '♛'),
            Rook => ('♖', '♜'),
            Bishop => ('♗', '♝'),
            Knight => ('♘', '♞'),
            Pawn => ('♙', '♟'),
            Wazir => ('▢', '▣'),
            Ferz => ('◇', '◆'),
            Mann => ('◻', '◼'),
            Dabbaba => ('▯', '▮'),
            Alfil => ('✧', '✦'),
            Threeleaper => ('▨', '▩'),
            Camel => ('◁', '◀'),
            Zebra => ('▷', '▶'),
            Tripper => ('⧇', '⧆'),
            Giraffe => ('▱', '▰'),
            Nightrider => ('⬡', '⬢'),
            Empress => ('▿', '▾'),
            Princess => ('⧊', '⧋'),
            Amazon => ('☆', '★'),
            Grasshopper => ('⦾', '⦿'),
            Wall => ('#', '%'),
            Stone => ('@', '*'),
        }
    }

    /// Material weight, in pawns.
    pub const fn weight(&self) -> i32 {
        match self {
            King | Wall | Stone => 0,
            Queen => 9,
            Rook => 5,
            Bishop | Knight => 3,
            Pawn | Wazir | Ferz | Alfil | Tripper => 1,
            Dabbaba | Threeleaper | Grasshopper => 2,
            Mann | Camel | Zebra | Giraffe => 3,
            Nightrider => 5,
            Princess => 6,
            Empress => 8,
            Amazon => 12,
        }
    }

    pub const fn movement(&self) -> Movement {
        match self {
            King => Movement::Steps(KING_STEPS),
            Queen => Movement::Steps(QUEEN_STEPS),
            Rook => Movement::Steps(ROOK_STEPS),
            Bishop => Movement::Steps(BISHOP_STEPS),
            Knight => Movement::Steps(KNIGHT_STEPS),
            Pawn => Movement::Pawn,
            Wazir => Movement::Steps(WAZIR_STEPS),
            Ferz => Movement::Steps(FERZ_STEPS),
            Mann => Movement::Steps(KING_STEPS),
            Dabbaba => Movement::Steps(DABBABA_STEPS),
            Alfil => Movement::Steps(ALFIL_STEPS),
            Threeleaper => Movement::Steps(THREELEAPER_STEPS),
            Camel => Movement::Steps(CAMEL_STEPS),
            Zebra => Movement::Steps(ZEBRA_STEPS),
            Tripper => Movement::Steps(TRIPPER_STEPS),
            Giraffe => Movement::Steps(GIRAFFE_STEPS),
            Nightrider => Movement::Steps(NIGHTRIDER_STEPS),
            Empress => Movement::Steps(EMPRESS_STEPS),
            Princess => Movement::Steps(PRINCESS_STEPS),
            Amazon => Movement::Steps(AMAZON_STEPS),
            Grasshopper => Movement::Steps(GRASSHOPPER_STEPS),
            Wall | Stone => Movement::None,
        }
    }

    /// Royal pieces are the ones that can be checked and mated.
    #[inline(always)]
    pub const fn is_royal(&self) -> bool {
        matches!(self, King)
    }

    #[inline(always)]
    pub const fn is_pawn(&self) -> bool {
        matches!(self, Pawn)
    }

    /// Moves by this kind can never be undone by a later move.
    #[inline(always)]
    pub const fn is_irreversible(&self) -> bool {
        matches!(self, Pawn)
    }

    /// A lone piece of this kind, next to its king, is enough to force mate.
    #[inline(always)]
    pub const fn is_mating(&self) -> bool {
        !matches!(self, King | Bishop | Knight | Wall | Stone)
    }

    /// The piece that travels two squares when castling.
    #[inline(always)]
    pub const fn is_castling_actor(&self) -> bool {
        matches!(self, King)
    }

    /// The piece that jumps over the castling actor.
    #[inline(always)]
    pub const fn is_castling_partner(&self) -> bool {
        matches!(self, Rook)
    }

    /// Pawns may promote into this kind.
    #[inline(always)]
    pub const fn is_promotable(&self) -> bool {
        !matches!(self, King | Pawn | Wall | Stone)
    }

    /// Locked pieces never move.
    #[inline(always)]
    pub const fn is_locked(&self) -> bool {
        matches!(self, Wall | Stone)
    }

    /// Whether anything can ever capture this kind.
    #[inline(always)]
    pub const fn is_capturable(&self) -> bool {
        !matches!(self, Wall)
    }
}

impl FromStr for PieceKind {
    type Err = ChessError;
    /// Parses a kind from its id (`knight`) or its move letter (`N`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .find(|kind| {
                kind.id() == s.to_ascii_lowercase() || (!s.is_empty() && kind.move_letter() == s)
            })
            .ok_or_else(|| ChessError::InvalidPieceTypeId(s.to_string()))
    }
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl fmt::Debug for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// A piece: a [`PieceKind`] of a [`Color`].
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    kind: PieceKind,
    color: Color,
}

impl Piece {
    pub const WHITE_KING: Self = Self::new(King, Color::White);
    pub const WHITE_QUEEN: Self = Self::new(Queen, Color::White);
    pub const WHITE_ROOK: Self = Self::new(Rook, Color::White);
    pub const WHITE_BISHOP: Self = Self::new(Bishop, Color::White);
    pub const WHITE_KNIGHT: Self = Self::new(Knight, Color::White);
    pub const WHITE_PAWN: Self = Self::new(Pawn, Color::White);
    pub const BLACK_KING: Self = Self::new(King, Color::Black);
    pub const BLACK_QUEEN: Self = Self::new(Queen, Color::Black);
    pub const BLACK_ROOK: Self = Self::new(Rook, Color::Black);
    pub const BLACK_BISHOP: Self = Self::new(Bishop, Color::Black);
    pub const BLACK_KNIGHT: Self = Self::new(Knight, Color::Black);
    pub const BLACK_PAWN: Self = Self::new(Pawn, Color::Black);

    #[inline(always)]
    pub const fn new(kind: PieceKind, color: Color) -> Self {
        Self { kind, color }
    }

    #[inline(always)]
    pub const fn kind(&self) -> PieceKind {
        self.kind
    }

    #[inline(always)]
    pub const fn color(&self) -> Color {
        self.color
    }

    /// Unique code of this piece: the kind's code with the color in the lowest bit.
    ///
    /// # Example
    /// ```
    /// # use xchess::Piece;
    /// assert_eq!(Piece::WHITE_KING.code(), 2);
    /// assert_eq!(Piece::BLACK_KING.code(), 3);
    /// ```
    #[inline(always)]
    pub const fn code(&self) -> u8 {
        (self.kind.code() << 1) | self.color.bits()
    }

    /// FEN character of this piece, uppercase for White.
    #[inline(always)]
    pub const fn fen(&self) -> char {
        let c = self.kind.fen_char();
        if self.color.is_white() {
            c
        } else {
            c.to_ascii_lowercase()
        }
    }

    /// Unicode sign of this piece.
    #[inline(always)]
    pub const fn sign(&self) -> char {
        let (white, black) = self.kind.signs();
        if self.color.is_white() {
            white
        } else {
            black
        }
    }

    #[inline(always)]
    pub const fn move_letter(&self) -> &'static str {
        self.kind.move_letter()
    }

    #[inline(always)]
    pub const fn weight(&self) -> i32 {
        self.kind.weight()
    }

    /// Weight of this piece counted from the perspective of `color`.
    #[inline(always)]
    pub const fn advantage(&self, color: Color) -> i32 {
        if self.color.bits() == color.bits() {
            self.weight()
        } else {
            -self.weight()
        }
    }

    /// Whether `by` may capture this piece.
    #[inline(always)]
    pub const fn is_capturable(&self, by: Piece) -> bool {
        self.color.bits() != by.color.bits() && self.kind.is_capturable()
    }

    /// Whether a riding `by` may continue through this piece. No builtin kind is passable.
    #[inline(always)]
    pub const fn is_passable(&self, _by: Piece) -> bool {
        false
    }

    /// Returns this piece's kind in the opposite color.
    #[inline(always)]
    pub const fn opponent(&self) -> Self {
        Self::new(self.kind, self.color.opponent())
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.fen())
    }
}

impl fmt::Debug for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\" ({} {})", self.fen(), self.color, self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_tables_are_distinct() {
        let kinds: Vec<PieceKind> = PieceKind::all().collect();
        assert_eq!(kinds.len(), PieceKind::COUNT);

        for (i, a) in kinds.iter().enumerate() {
            for b in &kinds[i + 1..] {
                assert_ne!(a.code(), b.code());
                assert_ne!(a.fen_char(), b.fen_char(), "{a} and {b} share a FEN letter");
                assert_ne!(a.move_letter(), b.move_letter());
                assert_ne!(a.id(), b.id());
            }
        }
    }

    #[test]
    fn test_piece_codes() {
        for kind in PieceKind::all() {
            let white = Piece::new(kind, Color::White);
            let black = Piece::new(kind, Color::Black);
            assert_eq!(white.code() + 1, black.code());
            assert_eq!(white.fen().to_ascii_lowercase(), black.fen());
            assert_eq!(white.opponent(), black);
        }
    }

    #[test]
    fn test_traits() {
        assert!(King.is_royal() && King.is_castling_actor());
        assert!(!King.is_promotable() && !Pawn.is_promotable());
        assert!(Queen.is_promotable() && Amazon.is_promotable());
        assert!(Rook.is_castling_partner());
        assert!(Pawn.is_irreversible() && Pawn.is_mating());
        assert!(!Bishop.is_mating() && !Knight.is_mating());
        assert!(Wall.is_locked() && Stone.is_locked());
        assert_eq!(Wall.movement(), Movement::None);

        // Walls are never captured, stones are
        let wall = Piece::new(Wall, Color::Black);
        let stone = Piece::new(Stone, Color::Black);
        assert!(!wall.is_capturable(Piece::WHITE_QUEEN));
        assert!(stone.is_capturable(Piece::WHITE_QUEEN));
        assert!(!Piece::WHITE_PAWN.is_capturable(Piece::WHITE_QUEEN));
    }

    #[test]
    fn test_advantage() {
        assert_eq!(Piece::WHITE_QUEEN.advantage(Color::White), 9);
        assert_eq!(Piece::WHITE_QUEEN.advantage(Color::Black), -9);
        assert_eq!(Piece::BLACK_KING.advantage(Color::White), 0);
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!("knight".parse::<PieceKind>().unwrap(), Knight);
        assert_eq!("N".parse::<PieceKind>().unwrap(), Knight);
        assert_eq!("Amazon".parse::<PieceKind>().unwrap(), Amazon);
        assert!("".parse::<PieceKind>().is_err());
        assert!("unicorn".parse::<PieceKind>().is_err());
    }
}
