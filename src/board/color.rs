/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{fmt, ops::Neg, str::FromStr};

use crate::{ChessError, ChessResult};

/// Represents the color of a player, piece, or square.
///
/// White traditionally moves first, and therefore [`Color`] defaults to [`Color::White`].
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Color {
    #[default]
    White,
    Black,
}

impl Color {
    /// Number of color variants.
    pub const COUNT: usize = 2;

    /// An array of both colors, starting with White.
    #[inline(always)]
    pub const fn all() -> [Self; Self::COUNT] {
        [Self::White, Self::Black]
    }

    /// Creates a new [`Color`] from a set of bits.
    ///
    /// # Example
    /// ```
    /// # use xchess::Color;
    /// assert_eq!(Color::from_bits(1), Some(Color::Black));
    /// assert_eq!(Color::from_bits(42), None);
    /// ```
    #[inline(always)]
    pub const fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            0 => Some(Self::White),
            1 => Some(Self::Black),
            _ => None,
        }
    }

    /// Creates a new [`Color`] from a `bool`, where `false = White`.
    #[inline(always)]
    pub const fn from_bool(color: bool) -> Self {
        if color {
            Self::Black
        } else {
            Self::White
        }
    }

    #[inline(always)]
    pub const fn is_white(&self) -> bool {
        matches!(self, Self::White)
    }

    #[inline(always)]
    pub const fn is_black(&self) -> bool {
        matches!(self, Self::Black)
    }

    /// Returns a multiplier for negating numbers relative to this color.
    ///
    /// # Example
    /// ```
    /// # use xchess::Color;
    /// assert_eq!(Color::White.negation_multiplier(), 1);
    /// assert_eq!(Color::Black.negation_multiplier(), -1);
    /// ```
    #[inline(always)]
    pub const fn negation_multiplier(&self) -> i32 {
        match self {
            Self::White => 1,
            Self::Black => -1,
        }
    }

    /// Returns this [`Color`]'s opposite.
    #[inline(always)]
    pub const fn opponent(&self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }

    /// Returns this [`Color`] as a `usize`, `0` for White and `1` for Black.
    #[inline(always)]
    pub const fn index(&self) -> usize {
        *self as usize
    }

    #[inline(always)]
    pub const fn bits(&self) -> u8 {
        *self as u8
    }

    /// Direction pawns of this color advance in, along `y`.
    ///
    /// Rows are counted from the top, so White moves towards `y = 0`.
    #[inline(always)]
    pub const fn move_dir(&self) -> i32 {
        match self {
            Self::White => -1,
            Self::Black => 1,
        }
    }

    /// Creates a [`Color`] from its FEN character, `w` or `b`.
    pub fn from_char(color: char) -> ChessResult<Self> {
        match color {
            'w' | 'W' => Ok(Self::White),
            'b' | 'B' => Ok(Self::Black),
            _ => Err(ChessError::InvalidColor(color.to_string())),
        }
    }

    /// Creates a [`Color`] based on the case of `c`: uppercase is White.
    #[inline(always)]
    pub const fn from_case(c: char) -> Self {
        Self::from_bool(c.is_ascii_lowercase())
    }

    /// FEN character of this color.
    #[inline(always)]
    pub const fn to_char(&self) -> char {
        match self {
            Self::White => 'w',
            Self::Black => 'b',
        }
    }

    /// Lowercase name of this color.
    #[inline(always)]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::White => "white",
            Self::Black => "black",
        }
    }
}

impl FromStr for Color {
    type Err = ChessError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "w" | "white" => Ok(Self::White),
            "b" | "black" => Ok(Self::Black),
            _ => Err(ChessError::InvalidColor(s.to_string())),
        }
    }
}

impl Neg for Color {
    type Output = Self;
    fn neg(self) -> Self::Output {
        self.opponent()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl fmt::Debug for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A subset of the two colors, stored as a 2-bit mask.
///
/// Used wherever "which side(s)" is the answer, such as pending draw offers.
///
/// # Example
/// ```
/// # use xchess::{Color, ColorSet};
/// let mut offers = ColorSet::EMPTY;
/// offers.add(Color::White);
/// assert!(offers.has(Color::White));
/// assert!(!offers.has(Color::Black));
/// offers.toggle(Color::Black);
/// assert_eq!(offers, ColorSet::BOTH);
/// ```
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ColorSet(u8);

impl ColorSet {
    pub const EMPTY: Self = Self(0b00);
    pub const WHITE: Self = Self(0b01);
    pub const BLACK: Self = Self(0b10);
    pub const BOTH: Self = Self(0b11);

    #[inline(always)]
    const fn mask(color: Color) -> u8 {
        1 << color.bits()
    }

    /// A set holding only `color`.
    #[inline(always)]
    pub const fn of(color: Color) -> Self {
        Self(Self::mask(color))
    }

    #[inline(always)]
    pub const fn has(&self, color: Color) -> bool {
        self.0 & Self::mask(color) != 0
    }

    /// Returns `true` if the set holds the opponent of `color`.
    #[inline(always)]
    pub const fn has_opponent_of(&self, color: Color) -> bool {
        self.has(color.opponent())
    }

    #[inline(always)]
    pub fn add(&mut self, color: Color) {
        self.0 |= Self::mask(color);
    }

    #[inline(always)]
    pub fn delete(&mut self, color: Color) {
        self.0 &= !Self::mask(color);
    }

    #[inline(always)]
    pub fn toggle(&mut self, color: Color) {
        self.0 ^= Self::mask(color);
    }

    /// Returns a copy of this set with `color` added.
    #[inline(always)]
    pub const fn with(self, color: Color) -> Self {
        Self(self.0 | Self::mask(color))
    }

    #[inline(always)]
    pub const fn size(&self) -> usize {
        self.0.count_ones() as usize
    }

    #[inline(always)]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Colors in this set, White first.
    pub fn iter(&self) -> impl Iterator<Item = Color> {
        let set = *self;
        Color::all().into_iter().filter(move |&c| set.has(c))
    }
}

impl From<Color> for ColorSet {
    fn from(color: Color) -> Self {
        Self::of(color)
    }
}

impl fmt::Debug for ColorSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_parsing() {
        assert_eq!("w".parse::<Color>().unwrap(), Color::White);
        assert_eq!("Black".parse::<Color>().unwrap(), Color::Black);
        assert!("x".parse::<Color>().is_err());
        assert_eq!(Color::from_char('b').unwrap(), Color::Black);
        assert_eq!(Color::from_case('Q'), Color::White);
        assert_eq!(Color::from_case('q'), Color::Black);
        assert_eq!(-Color::White, Color::Black);
    }

    #[test]
    fn test_color_set() {
        let mut set = ColorSet::default();
        assert!(set.is_empty());
        set.add(Color::Black);
        assert_eq!(set, ColorSet::BLACK);
        assert!(set.has_opponent_of(Color::White));
        assert_eq!(set.size(), 1);

        set.add(Color::White);
        assert_eq!(set.size(), 2);
        assert_eq!(set.iter().collect::<Vec<_>>(), Color::all());

        set.delete(Color::White);
        set.toggle(Color::Black);
        assert_eq!(set, ColorSet::EMPTY);
        assert_eq!(ColorSet::EMPTY.with(Color::White), ColorSet::WHITE);
    }
}
