/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{fmt, str::FromStr};

use crate::{ChessError, ChessResult, Color};

/// Letters used to name files. `x` is skipped so it can never be confused with a capture marker.
const FILE_ALPHABET: &[u8; 25] = b"abcdefghijklmnopqrstuvwyz";

/// Largest width or height a [`Board`] may have.
pub const MAX_BOARD_DIMENSION: usize = u8::MAX as usize;

/// Number of decimal digits needed to print `n`.
#[inline(always)]
const fn decimal_digits(mut n: usize) -> usize {
    let mut digits = 1;
    while n >= 10 {
        n /= 10;
        digits += 1;
    }
    digits
}

/// Bijective base-25 name of the file at `x`, so `y` is followed by `z`, then `aa`.
fn file_name(x: usize) -> String {
    let mut letters = Vec::with_capacity(2);
    let mut v = x;
    loop {
        letters.push(FILE_ALPHABET[v % 25]);
        if v < 25 {
            break;
        }
        v = v / 25 - 1;
    }
    letters.reverse();
    letters.into_iter().map(char::from).collect()
}

/// Inverse of [`file_name`]. Input is expected to be lowercase.
fn file_index(name: &str) -> Option<usize> {
    if name.is_empty() {
        return None;
    }

    let mut value = 0usize;
    for byte in name.bytes() {
        let digit = FILE_ALPHABET.iter().position(|&c| c == byte)?;
        value = value.checked_mul(25)?.checked_add(digit + 1)?;
    }
    Some(value - 1)
}

/// Pads `cell` into a 3-character box-drawing cell.
fn trim_cell(cell: Option<&str>) -> String {
    let Some(cell) = cell else {
        return String::from("   ");
    };

    match cell.chars().count() {
        0 => String::from("   "),
        1 => format!(" {cell} "),
        2 => format!("{cell} "),
        _ => cell.chars().take(3).collect(),
    }
}

/// A rectangular grid of squares.
///
/// Squares are numbered row by row starting from the *top* row, so on an `8x8` board `a8` has id
/// `0` and `h1` has id `63`. Rows grow downwards in `y`, columns grow rightwards in `x`.
///
/// A board is a tiny `Copy` value; every [`Square`], [`File`] and [`Rank`] carries its board with
/// it so it can name itself and step around without a lookup table.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Board {
    width: u8,
    height: u8,
}

impl Board {
    /// The standard `8x8` chess board.
    pub const STANDARD: Self = Self {
        width: 8,
        height: 8,
    };

    /// Creates a new board of `width` files and `height` ranks.
    ///
    /// # Example
    /// ```
    /// # use xchess::Board;
    /// let board = Board::new(10, 8).unwrap();
    /// assert_eq!(board.size(), 80);
    /// assert!(Board::new(0, 8).is_err());
    /// ```
    pub fn new(width: usize, height: usize) -> ChessResult<Self> {
        if !(1..=MAX_BOARD_DIMENSION).contains(&width)
            || !(1..=MAX_BOARD_DIMENSION).contains(&height)
        {
            return Err(ChessError::InvalidBoardSize {
                width,
                height,
                max: MAX_BOARD_DIMENSION,
            });
        }

        Ok(Self {
            width: width as u8,
            height: height as u8,
        })
    }

    /// Number of files.
    #[inline(always)]
    pub const fn width(&self) -> usize {
        self.width as usize
    }

    /// Number of ranks.
    #[inline(always)]
    pub const fn height(&self) -> usize {
        self.height as usize
    }

    /// Number of squares.
    #[inline(always)]
    pub const fn size(&self) -> usize {
        self.width() * self.height()
    }

    /// Fetches the square at `(x, y)`, if it lies on this board.
    #[inline(always)]
    pub const fn at(&self, x: i32, y: i32) -> Option<Square> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }

        Some(Square {
            x: x as u8,
            y: y as u8,
            board: *self,
        })
    }

    /// Fetches the square with the provided id.
    #[inline(always)]
    pub const fn square(&self, id: usize) -> Option<Square> {
        if id >= self.size() {
            return None;
        }
        self.at((id % self.width()) as i32, (id / self.width()) as i32)
    }

    /// All squares in id order.
    pub fn squares(&self) -> impl DoubleEndedIterator<Item = Square> {
        let board = *self;
        (0..self.size()).filter_map(move |id| board.square(id))
    }

    /// All files, left to right.
    pub fn files(&self) -> impl DoubleEndedIterator<Item = File> {
        let board = *self;
        (0..self.width).map(move |x| File { x, board })
    }

    /// All ranks, top to bottom.
    pub fn ranks(&self) -> impl DoubleEndedIterator<Item = Rank> {
        let board = *self;
        (0..self.height).map(move |y| Rank { y, board })
    }

    /// Fetches the file at `x`.
    #[inline(always)]
    pub const fn file(&self, x: usize) -> Option<File> {
        if x >= self.width() {
            return None;
        }
        Some(File {
            x: x as u8,
            board: *self,
        })
    }

    /// Fetches the rank at `y`, counting from the top.
    #[inline(always)]
    pub const fn rank(&self, y: usize) -> Option<Rank> {
        if y >= self.height() {
            return None;
        }
        Some(Rank {
            y: y as u8,
            board: *self,
        })
    }

    /// Parses a file from its name, in either case.
    ///
    /// # Example
    /// ```
    /// # use xchess::Board;
    /// let board = Board::default();
    /// assert_eq!(board.parse_file("C").unwrap().x(), 2);
    /// assert!(board.parse_file("i").is_err());
    /// ```
    pub fn parse_file(&self, name: &str) -> ChessResult<File> {
        file_index(&name.to_ascii_lowercase())
            .and_then(|x| self.file(x))
            .ok_or_else(|| ChessError::InvalidFile(name.to_string()))
    }

    /// Parses a rank from its name.
    pub fn parse_rank(&self, name: &str) -> ChessResult<Rank> {
        name.parse::<usize>()
            .ok()
            .filter(|n| (1..=self.height()).contains(n))
            .and_then(|n| self.rank(self.height() - n))
            .ok_or_else(|| ChessError::InvalidRank(name.to_string()))
    }

    /// Parses a square from its name (`e4`, `E4`) or its ICCF numeric form (`54`).
    ///
    /// # Example
    /// ```
    /// # use xchess::Board;
    /// let board = Board::default();
    /// let e4 = board.parse_square("e4").unwrap();
    /// assert_eq!(board.parse_square("E4").unwrap(), e4);
    /// assert_eq!(board.parse_square("54").unwrap(), e4);
    /// assert!(board.parse_square("e9").is_err());
    /// ```
    pub fn parse_square(&self, s: &str) -> ChessResult<Square> {
        let err = || ChessError::InvalidSquare(s.to_string());

        if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
            let file_digits = decimal_digits(self.width());
            if s.len() != file_digits + decimal_digits(self.height()) {
                return Err(err());
            }
            let (file, rank) = s.split_at(file_digits);
            let file: usize = file.parse().map_err(|_| err())?;
            let rank = self.parse_rank(rank.trim_start_matches('0')).map_err(|_| err())?;
            return file
                .checked_sub(1)
                .and_then(|x| self.at(x as i32, rank.y() as i32))
                .ok_or_else(err);
        }

        let split = s
            .find(|c: char| c.is_ascii_digit())
            .filter(|&i| i > 0)
            .ok_or_else(err)?;
        let (file, rank) = s.split_at(split);
        let file = self.parse_file(file).map_err(|_| err())?;
        let rank = self.parse_rank(rank).map_err(|_| err())?;

        Ok(file.square(rank))
    }

    /// Length of the longest file name on this board.
    #[inline(always)]
    pub fn max_file_len(&self) -> usize {
        file_name(self.width() - 1).len()
    }

    /// Maximum number of squares that [`Board::pack`] can fold into a single `u64`.
    pub fn max_pack_len(&self) -> usize {
        let size = self.size() as u128;
        if size < 2 {
            return usize::MAX;
        }

        let limit = u64::MAX as u128 + 1;
        let mut power = 1u128;
        let mut len = 0;
        while power * size <= limit {
            power *= size;
            len += 1;
        }
        len
    }

    /// Folds a tuple of squares into a single integer key.
    ///
    /// # Example
    /// ```
    /// # use xchess::Board;
    /// let board = Board::default();
    /// let squares = board.unpack_string("e2e4").unwrap();
    /// let key = board.pack(&squares).unwrap();
    /// assert_eq!(board.unpack(key, 2).unwrap(), squares);
    /// ```
    pub fn pack(&self, squares: &[Square]) -> ChessResult<u64> {
        let max = self.max_pack_len();
        if squares.len() > max {
            return Err(ChessError::BoardPackOverflow(max));
        }

        let size = self.size() as u64;
        Ok(squares
            .iter()
            .fold(0, |value, square| value * size + square.id() as u64))
    }

    /// Inverse of [`Board::pack`] for a tuple of `len` squares.
    pub fn unpack(&self, mut value: u64, len: usize) -> ChessResult<Vec<Square>> {
        let max = self.max_pack_len();
        if len > max {
            return Err(ChessError::BoardPackOverflow(max));
        }

        let size = self.size() as u64;
        let mut squares = Vec::with_capacity(len);
        for _ in 0..len {
            let id = (value % size) as usize;
            // `id < size` always holds, so the lookup cannot fail
            if let Some(square) = self.square(id) {
                squares.push(square);
            }
            value /= size;
        }
        squares.reverse();

        Ok(squares)
    }

    /// Concatenates square names, as in `e2e4`.
    pub fn pack_string(&self, squares: &[Square]) -> String {
        squares.iter().map(Square::name).collect()
    }

    /// Splits a string of concatenated square names back into squares.
    pub fn unpack_string(&self, value: &str) -> ChessResult<Vec<Square>> {
        let err = || ChessError::InvalidBoardPackString(value.to_string());
        let bytes = value.as_bytes();
        let is_letter = |b: u8| FILE_ALPHABET.contains(&b.to_ascii_lowercase());

        let mut squares = Vec::new();
        let mut i = 0;
        while i < bytes.len() {
            let start = i;
            while i < bytes.len() && is_letter(bytes[i]) {
                i += 1;
            }
            if i == start || i >= bytes.len() || !matches!(bytes[i], b'1'..=b'9') {
                return Err(err());
            }
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
            let square = self.parse_square(&value[start..i]).map_err(|_| err())?;
            squares.push(square);
        }

        Ok(squares)
    }

    /// Renders this board as a box-drawn grid, with `cell` supplying the content of each square.
    ///
    /// Cells hold at most three characters; longer content is cut.
    pub fn text<F>(&self, mut cell: F) -> String
    where
        F: FnMut(Square) -> Option<String>,
    {
        let width = self.width();
        let line = |left: &str, mid: &str, right: &str| {
            format!("   {left}{}───{right}", format!("───{mid}").repeat(width - 1))
        };

        let file_rule = format!(
            "    {} ",
            self.files()
                .map(|file| trim_cell(Some(&file.name())))
                .collect::<Vec<_>>()
                .join(" ")
        );

        let mut lines = vec![file_rule.clone(), line("┌", "┬", "┐")];
        for rank in self.ranks() {
            let rank_cell = trim_cell(Some(&rank.name()));
            let mut row = format!("{rank_cell}│");
            for file in self.files() {
                let content = cell(file.square(rank));
                row.push_str(&trim_cell(content.as_deref()));
                row.push('│');
            }
            row.push_str(&rank_cell);
            lines.push(row);

            if rank.y() + 1 < self.height() {
                lines.push(line("├", "┼", "┤"));
            }
        }
        lines.push(line("└", "┴", "┘"));
        lines.push(file_rule);

        lines.join("\n")
    }
}

impl Default for Board {
    #[inline(always)]
    fn default() -> Self {
        Self::STANDARD
    }
}

impl FromStr for Board {
    type Err = ChessError;
    /// Parses `WxH`, or a single number for a square board.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ChessError::InvalidBoardSize {
            width: 0,
            height: 0,
            max: MAX_BOARD_DIMENSION,
        };
        let parse = |n: &str| n.trim().parse::<usize>().map_err(|_| err());

        match s.split_once(['x', 'X']) {
            Some((w, h)) => Self::new(parse(w)?, parse(h)?),
            None => {
                let n = parse(s)?;
                Self::new(n, n)
            }
        }
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Board({self})")
    }
}

/// A column of a [`Board`].
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct File {
    x: u8,
    board: Board,
}

impl File {
    #[inline(always)]
    pub const fn x(&self) -> usize {
        self.x as usize
    }

    #[inline(always)]
    pub const fn board(&self) -> Board {
        self.board
    }

    /// Letter name, as in `e` or, on very wide boards, `ab`.
    pub fn name(&self) -> String {
        file_name(self.x())
    }

    /// One-based column number, zero-padded to the digit width of the board.
    pub fn iccf(&self) -> String {
        format!(
            "{:0width$}",
            self.x() + 1,
            width = decimal_digits(self.board.width())
        )
    }

    /// The square where this file crosses `rank`.
    #[inline(always)]
    pub const fn square(&self, rank: Rank) -> Square {
        Square {
            x: self.x,
            y: rank.y,
            board: self.board,
        }
    }

    /// Squares of this file, top to bottom.
    pub fn squares(&self) -> impl DoubleEndedIterator<Item = Square> {
        let file = *self;
        self.board.ranks().map(move |rank| file.square(rank))
    }
}

impl fmt::Display for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl fmt::Debug for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "File({})", self.name())
    }
}

/// A row of a [`Board`].
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rank {
    y: u8,
    board: Board,
}

impl Rank {
    /// Row index counting from the top.
    #[inline(always)]
    pub const fn y(&self) -> usize {
        self.y as usize
    }

    #[inline(always)]
    pub const fn board(&self) -> Board {
        self.board
    }

    /// One-based number of this rank counting from the bottom.
    #[inline(always)]
    pub const fn number(&self) -> usize {
        self.board.height() - self.y()
    }

    pub fn name(&self) -> String {
        self.number().to_string()
    }

    pub fn iccf(&self) -> String {
        format!(
            "{:0width$}",
            self.number(),
            width = decimal_digits(self.board.height())
        )
    }

    /// Squares of this rank, left to right.
    pub fn squares(&self) -> impl DoubleEndedIterator<Item = Square> {
        let rank = *self;
        self.board.files().map(move |file| file.square(rank))
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl fmt::Debug for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rank({})", self.name())
    }
}

/// A single square of a [`Board`].
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Square {
    x: u8,
    y: u8,
    board: Board,
}

impl Square {
    #[inline(always)]
    pub const fn x(&self) -> usize {
        self.x as usize
    }

    #[inline(always)]
    pub const fn y(&self) -> usize {
        self.y as usize
    }

    #[inline(always)]
    pub const fn board(&self) -> Board {
        self.board
    }

    /// Index of this square in [`Board::squares`].
    #[inline(always)]
    pub const fn id(&self) -> usize {
        self.y() * self.board.width() + self.x()
    }

    #[inline(always)]
    pub const fn file(&self) -> File {
        File {
            x: self.x,
            board: self.board,
        }
    }

    #[inline(always)]
    pub const fn rank(&self) -> Rank {
        Rank {
            y: self.y,
            board: self.board,
        }
    }

    /// Algebraic name, as in `e4`.
    ///
    /// # Example
    /// ```
    /// # use xchess::Board;
    /// let board = Board::default();
    /// assert_eq!(board.at(4, 4).unwrap().name(), "e4");
    /// ```
    pub fn name(&self) -> String {
        format!("{}{}", self.file().name(), self.rank().name())
    }

    /// ICCF numeric form: the file number followed by the rank number.
    pub fn iccf(&self) -> String {
        format!("{}{}", self.file().iccf(), self.rank().iccf())
    }

    /// Color of this square; the top-left square is light.
    #[inline(always)]
    pub const fn color(&self) -> Color {
        Color::from_bool((self.x as u16 + self.y as u16) % 2 == 1)
    }

    /// Index of the anti-diagonal this square lies on.
    #[inline(always)]
    pub const fn a(&self) -> i32 {
        self.x as i32 + self.y as i32
    }

    /// Index of the diagonal this square lies on.
    #[inline(always)]
    pub const fn b(&self) -> i32 {
        self.x as i32 - self.y as i32
    }

    /// The square `(dx, dy)` away from this one, if it is on the board.
    #[inline(always)]
    pub const fn to(&self, dx: i32, dy: i32) -> Option<Self> {
        self.board.at(self.x as i32 + dx, self.y as i32 + dy)
    }

    #[inline(always)]
    pub const fn dx(&self, dx: i32) -> Option<Self> {
        self.to(dx, 0)
    }

    #[inline(always)]
    pub const fn dy(&self, dy: i32) -> Option<Self> {
        self.to(0, dy)
    }

    /// All on-board squares reachable by one of `offsets`.
    pub fn walk<'a>(&'a self, offsets: &'a [(i32, i32)]) -> impl Iterator<Item = Square> + 'a {
        offsets.iter().filter_map(|&(dx, dy)| self.to(dx, dy))
    }

    /// Squares stepping away from this one by `(dx, dy)` until the edge of the board.
    #[inline(always)]
    pub const fn ray(&self, dx: i32, dy: i32) -> Ray {
        Ray {
            from: *self,
            dx,
            dy,
        }
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl fmt::Debug for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.id())
    }
}

/// Iterator returned by [`Square::ray`]. Does not include the starting square.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    from: Square,
    dx: i32,
    dy: i32,
}

impl Iterator for Ray {
    type Item = Square;
    fn next(&mut self) -> Option<Self::Item> {
        if self.dx == 0 && self.dy == 0 {
            return None;
        }
        let next = self.from.to(self.dx, self.dy)?;
        self.from = next;
        Some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_names() {
        assert_eq!(file_name(0), "a");
        assert_eq!(file_name(7), "h");
        assert_eq!(file_name(22), "w");
        assert_eq!(file_name(23), "y");
        assert_eq!(file_name(24), "z");
        assert_eq!(file_name(25), "aa");
        assert_eq!(file_name(49), "az");
        assert_eq!(file_name(50), "ba");

        for x in 0..MAX_BOARD_DIMENSION {
            assert_eq!(file_index(&file_name(x)), Some(x));
        }
        assert_eq!(file_index("x"), None);
    }

    #[test]
    fn test_squares() {
        let board = Board::default();
        let a8 = board.square(0).unwrap();
        assert_eq!(a8.name(), "a8");
        let h1 = board.square(63).unwrap();
        assert_eq!(h1.name(), "h1");
        assert!(board.square(64).is_none());

        // Light and dark squares
        assert_eq!(a8.color(), Color::White);
        assert_eq!(h1.color(), Color::White);
        assert_eq!(board.parse_square("a1").unwrap().color(), Color::Black);

        assert_eq!(board.squares().count(), 64);
        assert_eq!(board.squares().next(), Some(a8));
    }

    #[test]
    fn test_parsing() {
        let board = Board::default();
        let e2 = board.parse_square("e2").unwrap();
        assert_eq!((e2.x(), e2.y()), (4, 6));
        assert_eq!(e2.iccf(), "52");
        assert_eq!(board.parse_square("52").unwrap(), e2);

        assert!(board.parse_square("").is_err());
        assert!(board.parse_square("e").is_err());
        assert!(board.parse_square("2").is_err());
        assert!(board.parse_square("e0").is_err());
        assert!(board.parse_square("i1").is_err());
        assert!(board.parse_square("99").is_err());

        let wide = Board::new(12, 10).unwrap();
        let l10 = wide.parse_square("l10").unwrap();
        assert_eq!((l10.x(), l10.y()), (11, 0));
        assert_eq!(l10.iccf(), "1210");
        let a1 = wide.parse_square("a1").unwrap();
        assert_eq!(a1.iccf(), "0101");
        assert_eq!(wide.parse_square("0101").unwrap(), a1);
    }

    #[test]
    fn test_math() {
        let board = Board::default();
        let d4 = board.parse_square("d4").unwrap();
        assert_eq!(d4.to(1, -1).unwrap().name(), "e5");
        assert_eq!(d4.dx(-3).unwrap().name(), "a4");
        assert!(d4.dx(-4).is_none());
        assert!(d4.dy(5).is_none());

        let ray: Vec<String> = d4.ray(1, 1).map(|sq| sq.name()).collect();
        assert_eq!(ray, ["e3", "f2", "g1"]);
        assert_eq!(d4.ray(0, 0).count(), 0);

        let knight = [(1, 2), (-1, 2), (2, 1), (-2, 1)];
        assert_eq!(board.parse_square("a1").unwrap().walk(&knight).count(), 0);
        assert_eq!(board.parse_square("a8").unwrap().walk(&knight).count(), 2);
    }

    #[test]
    fn test_board_sizes() {
        assert!(Board::new(0, 1).is_err());
        assert!(Board::new(1, 256).is_err());
        assert_eq!("10x8".parse::<Board>().unwrap(), Board::new(10, 8).unwrap());
        assert_eq!("6".parse::<Board>().unwrap(), Board::new(6, 6).unwrap());
        assert!("axb".parse::<Board>().is_err());

        assert_eq!(Board::default().max_file_len(), 1);
        assert_eq!(Board::new(30, 4).unwrap().max_file_len(), 2);
    }

    #[test]
    fn test_packing() {
        let board = Board::default();
        assert_eq!(board.max_pack_len(), 10);

        let squares = board.unpack_string("a8h1e4").unwrap();
        let key = board.pack(&squares).unwrap();
        assert_eq!(key, 63 * 64 + 36);
        assert_eq!(board.unpack(key, 3).unwrap(), squares);
        assert_eq!(board.pack_string(&squares), "a8h1e4");

        let too_many: Vec<Square> = board.squares().take(11).collect();
        assert_eq!(
            board.pack(&too_many),
            Err(ChessError::BoardPackOverflow(10))
        );

        assert!(board.unpack_string("e2e").is_err());
        assert!(board.unpack_string("e2-e4").is_err());
        assert!(board.unpack_string("e0").is_err());
        assert_eq!(board.unpack_string("E2e4").unwrap().len(), 2);
    }

    #[test]
    fn test_text() {
        let board = Board::new(2, 2).unwrap();
        let text = board.text(|square| Some(square.name()));
        let expected = [
            "     a   b  ",
            "   ┌───┬───┐",
            " 2 │a2 │b2 │ 2 ",
            "   ├───┼───┤",
            " 1 │a1 │b1 │ 1 ",
            "   └───┴───┘",
            "     a   b  ",
        ]
        .join("\n");
        assert_eq!(text, expected);
    }
}
