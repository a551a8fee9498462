/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{collections::HashMap, fmt};

use crate::{ChessError, ChessResult, Color, Piece, PieceKind, XoShiRo};

/// The set of piece kinds available in a game, and the keys they can be looked up by.
///
/// Every registered kind is reachable through its id (`knight`), its numeric code (`5`), and its
/// move letter (`N`), and each colored piece through its FEN letter (`N`, `n`). Two distinct kinds
/// may never claim the same key.
#[derive(Clone, PartialEq, Eq)]
pub struct Bestiary {
    name: String,
    kinds: Vec<PieceKind>,
    aliases: HashMap<String, PieceKind>,
    fen: HashMap<String, Piece>,
}

impl Bestiary {
    /// An empty bestiary.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kinds: Vec::new(),
            aliases: HashMap::new(),
            fen: HashMap::new(),
        }
    }

    /// A bestiary holding `kinds`.
    pub fn with_kinds(
        name: impl Into<String>,
        kinds: impl IntoIterator<Item = PieceKind>,
    ) -> ChessResult<Self> {
        let mut bestiary = Self::new(name);
        for kind in kinds {
            bestiary.add(kind)?;
        }
        Ok(bestiary)
    }

    /// The six orthodox chess kinds.
    pub fn chess() -> Self {
        let mut bestiary = Self::new("chess");
        for kind in PieceKind::CHESS {
            bestiary.insert(kind);
        }
        bestiary
    }

    /// The fairy kinds, without the orthodox ones.
    pub fn fairy() -> Self {
        let mut bestiary = Self::new("fairy");
        for kind in PieceKind::FAIRY {
            bestiary.insert(kind);
        }
        bestiary
    }

    /// Looks up a builtin bestiary (`chess`, `fairy`) or a single kind by id.
    ///
    /// # Example
    /// ```
    /// # use xchess::Bestiary;
    /// assert_eq!(Bestiary::builtin("chess").unwrap().len(), 6);
    /// assert_eq!(Bestiary::builtin("amazon").unwrap().len(), 1);
    /// assert!(Bestiary::builtin("unicorn").is_err());
    /// ```
    pub fn builtin(id: &str) -> ChessResult<Self> {
        match id {
            "chess" => Ok(Self::chess()),
            "fairy" => Ok(Self::fairy()),
            _ => PieceKind::all()
                .find(|kind| kind.id() == id)
                .map(|kind| {
                    let mut bestiary = Self::new(id);
                    bestiary.insert(kind);
                    bestiary
                })
                .ok_or_else(|| ChessError::UnknownPieceTypeId(id.to_string())),
        }
    }

    /// Composes a bestiary from builtin names and kind ids, as in `["chess", "amazon"]`.
    pub fn compose<'a>(ids: impl IntoIterator<Item = &'a str>) -> ChessResult<Self> {
        let mut names = Vec::new();
        let mut bestiary = Self::new("");
        for id in ids {
            for kind in Self::builtin(id)?.kinds {
                bestiary.add(kind)?;
            }
            names.push(id);
        }
        bestiary.name = names.join("+");
        Ok(bestiary)
    }

    /// Registers `kind` under its id, code, move letter and FEN letters.
    pub fn add(&mut self, kind: PieceKind) -> ChessResult<()> {
        let white = Piece::new(kind, Color::White);
        let black = Piece::new(kind, Color::Black);

        let keys = [
            kind.id().to_string(),
            kind.code().to_string(),
            kind.move_letter().to_string(),
        ];
        for key in keys.iter().filter(|key| !key.is_empty()) {
            self.check_alias(key, kind)?;
        }
        for piece in [white, black] {
            self.check_fen(&piece.fen().to_string(), piece)?;
        }

        self.insert(kind);
        Ok(())
    }

    /// Registers an extra lookup key for `kind`, which is added if it is not present yet.
    ///
    /// # Example
    /// ```
    /// # use xchess::{Bestiary, PieceKind};
    /// let mut bestiary = Bestiary::chess();
    /// bestiary.alias("horse", PieceKind::Knight).unwrap();
    /// assert!(bestiary.alias("horse", PieceKind::Bishop).is_err());
    /// ```
    pub fn alias(&mut self, key: &str, kind: PieceKind) -> ChessResult<()> {
        self.check_alias(key, kind)?;
        if !self.has(kind) {
            self.add(kind)?;
        }
        self.aliases.insert(key.to_string(), kind);
        Ok(())
    }

    fn check_alias(&self, key: &str, kind: PieceKind) -> ChessResult<()> {
        match self.aliases.get(key) {
            Some(&prev) if prev != kind => Err(ChessError::DuplicatePieceTypeId(key.to_string())),
            _ => Ok(()),
        }
    }

    fn check_fen(&self, key: &str, piece: Piece) -> ChessResult<()> {
        match self.fen.get(key) {
            Some(&prev) if prev != piece => Err(ChessError::DuplicatePieceTypeId(key.to_string())),
            _ => Ok(()),
        }
    }

    /// Unchecked registration, for builtin sets whose keys are known to be distinct.
    fn insert(&mut self, kind: PieceKind) {
        if self.has(kind) {
            return;
        }

        for key in [kind.id().to_string(), kind.code().to_string()] {
            self.aliases.insert(key, kind);
        }
        if !kind.move_letter().is_empty() {
            self.aliases.insert(kind.move_letter().to_string(), kind);
        }
        for color in Color::all() {
            let piece = Piece::new(kind, color);
            self.fen.insert(piece.fen().to_string(), piece);
        }
        self.kinds.push(kind);
    }

    #[inline(always)]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registered kinds, in registration order.
    #[inline(always)]
    pub fn kinds(&self) -> &[PieceKind] {
        &self.kinds
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    #[inline(always)]
    pub fn has(&self, kind: PieceKind) -> bool {
        self.kinds.contains(&kind)
    }

    /// Kinds a pawn may promote into.
    pub fn promotes(&self) -> Vec<PieceKind> {
        self.kinds
            .iter()
            .copied()
            .filter(PieceKind::is_promotable)
            .collect()
    }

    /// Resolves loose input into a piece.
    ///
    /// With a `color`, `value` is looked up as an id, code or move letter first and falls back to a
    /// FEN letter, which must then be of that color. Without one, `value` must be a FEN letter.
    ///
    /// # Example
    /// ```
    /// # use xchess::{Bestiary, Color, Piece};
    /// let chess = Bestiary::chess();
    /// assert_eq!(chess.piece("n", None).unwrap(), Piece::BLACK_KNIGHT);
    /// assert_eq!(chess.piece("queen", Some(Color::White)).unwrap(), Piece::WHITE_QUEEN);
    /// assert_eq!(chess.piece("Q", Some(Color::Black)).unwrap(), Piece::BLACK_QUEEN);
    /// assert!(chess.piece("q", Some(Color::White)).is_err());
    /// assert!(chess.piece("A", None).is_err());
    /// ```
    pub fn piece(&self, value: &str, color: Option<Color>) -> ChessResult<Piece> {
        if let Some(color) = color {
            let kind = self
                .aliases
                .get(value)
                .or_else(|| self.aliases.get(&value.to_ascii_lowercase()));
            if let Some(&kind) = kind {
                return Ok(Piece::new(kind, color));
            }
            if let Some(&piece) = self.fen.get(value) {
                if piece.color() != color {
                    return Err(ChessError::InvalidPieceColor(color));
                }
                return Ok(piece);
            }
            return Err(ChessError::InvalidPieceTypeId(value.to_string()));
        }

        self.fen
            .get(value)
            .copied()
            .ok_or_else(|| ChessError::InvalidPieceTypeId(value.to_string()))
    }

    /// Validates that `piece` belongs to this bestiary and, if given, to `color`.
    pub fn check(&self, piece: Piece, color: Option<Color>) -> ChessResult<Piece> {
        if !self.has(piece.kind()) {
            return Err(ChessError::UnsupportedPieceType(piece.kind().id().to_string()));
        }
        match color {
            Some(color) if piece.color() != color => Err(ChessError::InvalidPieceColor(color)),
            _ => Ok(piece),
        }
    }

    /// A random piece of `color`, or `None` if the bestiary is empty.
    pub fn rand(&self, prng: &mut XoShiRo, color: Color) -> Option<Piece> {
        if self.kinds.is_empty() {
            return None;
        }
        let kind = self.kinds[prng.below(self.kinds.len())];
        Some(Piece::new(kind, color))
    }
}

impl Default for Bestiary {
    fn default() -> Self {
        Self::chess()
    }
}

impl fmt::Debug for Bestiary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bestiary")
            .field("name", &self.name)
            .field("kinds", &self.kinds)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chess_promotes() {
        let promotes = Bestiary::chess().promotes();
        assert_eq!(
            promotes,
            [
                PieceKind::Queen,
                PieceKind::Rook,
                PieceKind::Bishop,
                PieceKind::Knight
            ]
        );
    }

    #[test]
    fn test_lookup_keys() {
        let chess = Bestiary::chess();
        let white = Some(Color::White);
        assert_eq!(chess.piece("5", white).unwrap(), Piece::WHITE_KNIGHT);
        assert_eq!(chess.piece("Knight", white).unwrap(), Piece::WHITE_KNIGHT);
        assert_eq!(chess.piece("N", None).unwrap(), Piece::WHITE_KNIGHT);
        assert_eq!(
            chess.piece("n", white),
            Err(ChessError::InvalidPieceColor(Color::White))
        );
        assert!(matches!(
            chess.piece("W", None),
            Err(ChessError::InvalidPieceTypeId(_))
        ));
    }

    #[test]
    fn test_check() {
        let chess = Bestiary::chess();
        let amazon = Piece::new(PieceKind::Amazon, Color::White);
        assert!(matches!(
            chess.check(amazon, None),
            Err(ChessError::UnsupportedPieceType(_))
        ));
        assert!(chess.check(Piece::BLACK_ROOK, Some(Color::Black)).is_ok());
        assert!(chess.check(Piece::BLACK_ROOK, Some(Color::White)).is_err());
    }

    #[test]
    fn test_composition() {
        let bestiary = Bestiary::compose(["chess", "amazon", "grasshopper"]).unwrap();
        assert_eq!(bestiary.len(), 8);
        assert_eq!(bestiary.name(), "chess+amazon+grasshopper");
        assert_eq!(
            bestiary.piece("a", None).unwrap(),
            Piece::new(PieceKind::Amazon, Color::Black)
        );

        // Adding the same kind twice is harmless
        let again = Bestiary::compose(["chess", "chess"]).unwrap();
        assert_eq!(again.len(), 6);

        assert!(matches!(
            Bestiary::compose(["chess", "dragon"]),
            Err(ChessError::UnknownPieceTypeId(_))
        ));
    }

    #[test]
    fn test_duplicate_keys() {
        let mut bestiary = Bestiary::chess();
        // "Q" already names the queen
        assert_eq!(
            bestiary.alias("Q", PieceKind::Amazon),
            Err(ChessError::DuplicatePieceTypeId("Q".to_string()))
        );
        bestiary.alias("Q", PieceKind::Queen).unwrap();
        bestiary.alias("empress", PieceKind::Empress).unwrap();
        assert!(bestiary.has(PieceKind::Empress));
    }

    #[test]
    fn test_rand() {
        let mut prng = XoShiRo::from_seed(7);
        let fairy = Bestiary::fairy();
        for _ in 0..20 {
            let piece = fairy.rand(&mut prng, Color::Black).unwrap();
            assert!(fairy.has(piece.kind()));
            assert_eq!(piece.color(), Color::Black);
        }
        assert!(Bestiary::new("empty").rand(&mut prng, Color::White).is_none());
    }
}
