/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{fmt, str::FromStr};

use crate::{ChessError, ChessResult};

/// Descriptions of the standard Numeric Annotation Glyphs, indexed by code.
const DESCRIPTIONS: [&str; Nag::COUNT] = [
    "null annotation",
    "good move",
    "poor move",
    "very good move",
    "very poor move",
    "speculative move",
    "questionable move",
    "forced move (all others lose quickly)",
    "singular move (no reasonable alternatives)",
    "worst move",
    "drawish position",
    "equal chances, quiet position",
    "equal chances, active position",
    "unclear position",
    "White has a slight advantage",
    "Black has a slight advantage",
    "White has a moderate advantage",
    "Black has a moderate advantage",
    "White has a decisive advantage",
    "Black has a decisive advantage",
    "White has a crushing advantage (Black should resign)",
    "Black has a crushing advantage (White should resign)",
    "White is in zugzwang",
    "Black is in zugzwang",
    "White has a slight space advantage",
    "Black has a slight space advantage",
    "White has a moderate space advantage",
    "Black has a moderate space advantage",
    "White has a decisive space advantage",
    "Black has a decisive space advantage",
    "White has a slight time (development) advantage",
    "Black has a slight time (development) advantage",
    "White has a moderate time (development) advantage",
    "Black has a moderate time (development) advantage",
    "White has a decisive time (development) advantage",
    "Black has a decisive time (development) advantage",
    "White has the initiative",
    "Black has the initiative",
    "White has a lasting initiative",
    "Black has a lasting initiative",
    "White has the attack",
    "Black has the attack",
    "White has insufficient compensation for material deficit",
    "Black has insufficient compensation for material deficit",
    "White has sufficient compensation for material deficit",
    "Black has sufficient compensation for material deficit",
    "White has more than adequate compensation for material deficit",
    "Black has more than adequate compensation for material deficit",
    "White has a slight center control advantage",
    "Black has a slight center control advantage",
    "White has a moderate center control advantage",
    "Black has a moderate center control advantage",
    "White has a decisive center control advantage",
    "Black has a decisive center control advantage",
    "White has a slight kingside control advantage",
    "Black has a slight kingside control advantage",
    "White has a moderate kingside control advantage",
    "Black has a moderate kingside control advantage",
    "White has a decisive kingside control advantage",
    "Black has a decisive kingside control advantage",
    "White has a slight queenside control advantage",
    "Black has a slight queenside control advantage",
    "White has a moderate queenside control advantage",
    "Black has a moderate queenside control advantage",
    "White has a decisive queenside control advantage",
    "Black has a decisive queenside control advantage",
    "White has a vulnerable first rank",
    "Black has a vulnerable first rank",
    "White has a well protected first rank",
    "Black has a well protected first rank",
    "White has a poorly protected king",
    "Black has a poorly protected king",
    "White has a well protected king",
    "Black has a well protected king",
    "White has a poorly placed king",
    "Black has a poorly placed king",
    "White has a well placed king",
    "Black has a well placed king",
    "White has a very weak pawn structure",
    "Black has a very weak pawn structure",
    "White has a moderately weak pawn structure",
    "Black has a moderately weak pawn structure",
    "White has a moderately strong pawn structure",
    "Black has a moderately strong pawn structure",
    "White has a very strong pawn structure",
    "Black has a very strong pawn structure",
    "White has poor knight placement",
    "Black has poor knight placement",
    "White has good knight placement",
    "Black has good knight placement",
    "White has poor bishop placement",
    "Black has poor bishop placement",
    "White has good bishop placement",
    "Black has good bishop placement",
    "White has poor rook placement",
    "Black has poor rook placement",
    "White has good rook placement",
    "Black has good rook placement",
    "White has poor queen placement",
    "Black has poor queen placement",
    "White has good queen placement",
    "Black has good queen placement",
    "White has poor piece coordination",
    "Black has poor piece coordination",
    "White has good piece coordination",
    "Black has good piece coordination",
    "White has played the opening very poorly",
    "Black has played the opening very poorly",
    "White has played the opening poorly",
    "Black has played the opening poorly",
    "White has played the opening well",
    "Black has played the opening well",
    "White has played the opening very well",
    "Black has played the opening very well",
    "White has played the middlegame very poorly",
    "Black has played the middlegame very poorly",
    "White has played the middlegame poorly",
    "Black has played the middlegame poorly",
    "White has played the middlegame well",
    "Black has played the middlegame well",
    "White has played the middlegame very well",
    "Black has played the middlegame very well",
    "White has played the ending very poorly",
    "Black has played the ending very poorly",
    "White has played the ending poorly",
    "Black has played the ending poorly",
    "White has played the ending well",
    "Black has played the ending well",
    "White has played the ending very well",
    "Black has played the ending very well",
    "White has slight counterplay",
    "Black has slight counterplay",
    "White has moderate counterplay",
    "Black has moderate counterplay",
    "White has decisive counterplay",
    "Black has decisive counterplay",
    "White has moderate time control pressure",
    "Black has moderate time control pressure",
    "White has severe time control pressure",
    "Black has severe time control pressure",
];

/// Move suffixes that stand for the first six NAGs.
const SUFFIXES: [&str; 6] = ["!", "?", "!!", "??", "!?", "?!"];

/// A Numeric Annotation Glyph, as attached to moves in PGN.
///
/// # Example
/// ```
/// # use xchess::Nag;
/// let nag: Nag = "?!".parse().unwrap();
/// assert_eq!(nag.code(), 6);
/// assert_eq!(nag.description(), "questionable move");
/// assert_eq!(nag.to_string(), "$6");
///
/// assert_eq!("$14".parse::<Nag>().unwrap().suffix(), None);
/// assert!("$140".parse::<Nag>().is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Nag(u8);

impl Nag {
    /// Number of standard NAGs.
    pub const COUNT: usize = 140;

    /// The NAG with the given code, if it is a standard one.
    pub const fn new(code: u8) -> Option<Self> {
        if (code as usize) < Self::COUNT {
            Some(Self(code))
        } else {
            None
        }
    }

    /// The NAG abbreviated by a move suffix such as `!?`.
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        SUFFIXES
            .iter()
            .position(|&s| s == suffix)
            .map(|i| Self(i as u8 + 1))
    }

    /// Every standard NAG, in code order.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..Self::COUNT as u8).map(Self)
    }

    #[inline(always)]
    pub const fn code(&self) -> u8 {
        self.0
    }

    #[inline(always)]
    pub const fn description(&self) -> &'static str {
        DESCRIPTIONS[self.0 as usize]
    }

    /// The move suffix abbreviating this NAG, for codes 1 to 6.
    pub const fn suffix(&self) -> Option<&'static str> {
        match self.0 {
            1..=6 => Some(SUFFIXES[self.0 as usize - 1]),
            _ => None,
        }
    }
}

impl FromStr for Nag {
    type Err = ChessError;

    /// Accepts `$n`, a bare code, or a move suffix.
    fn from_str(s: &str) -> ChessResult<Self> {
        let invalid = || ChessError::InvalidNag(s.to_string());
        if let Some(nag) = Self::from_suffix(s) {
            return Ok(nag);
        }
        let digits = s.strip_prefix('$').unwrap_or(s);
        let code = digits.parse::<u8>().map_err(|_| invalid())?;
        Self::new(code).ok_or_else(invalid)
    }
}

impl TryFrom<u8> for Nag {
    type Error = ChessError;
    fn try_from(code: u8) -> ChessResult<Self> {
        Self::new(code).ok_or_else(|| ChessError::InvalidNag(code.to_string()))
    }
}

impl fmt::Display for Nag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.0)
    }
}

impl fmt::Debug for Nag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${} ({})", self.0, self.description())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suffixes() {
        for (i, suffix) in SUFFIXES.iter().enumerate() {
            let nag = Nag::from_suffix(suffix).unwrap();
            assert_eq!(nag.code() as usize, i + 1);
            assert_eq!(nag.suffix(), Some(*suffix));
        }
        assert_eq!(Nag::new(0).unwrap().suffix(), None);
        assert_eq!(Nag::from_suffix("!!!"), None);
    }

    #[test]
    fn test_table() {
        assert_eq!(Nag::all().count(), Nag::COUNT);
        assert_eq!(Nag::new(139).unwrap().description(), "Black has severe time control pressure");
        assert_eq!(Nag::new(140), None);
        assert_eq!(Nag::try_from(255), Err(ChessError::InvalidNag("255".into())));
        assert!("$x".parse::<Nag>().is_err());
        assert_eq!("13".parse::<Nag>().unwrap().description(), "unclear position");
    }
}
