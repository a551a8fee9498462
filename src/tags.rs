/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use crate::{ChessError, ChessResult};

/// The Seven Tag Roster, in the order PGN requires it.
pub const SEVEN_TAG_ROSTER: [&str; 7] =
    ["Event", "Site", "Date", "Round", "White", "Black", "Result"];

fn check_name(name: &str) -> ChessResult<()> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(ChessError::InvalidMetaTag(name.to_string()))
    }
}

fn check_value(value: &str) -> ChessResult<()> {
    if value.contains('"') {
        return Err(ChessError::InvalidMetaValue(value.to_string()));
    }
    Ok(())
}

/// PGN tag pairs of a game.
///
/// Names are made of letters, digits and underscores and are looked up regardless of case. Values
/// may hold anything but a double quote.
///
/// # Example
/// ```
/// # use xchess::TagMap;
/// let mut tags = TagMap::default();
/// tags.set("Opening", "Ruy Lopez").unwrap();
/// tags.set("White", "Kasparov").unwrap();
/// assert_eq!(tags.get("white"), Some("Kasparov"));
/// assert!(tags.set("Bad Name", "x").is_err());
/// assert!(tags.set("Annotator", "\"quoted\"").is_err());
/// assert_eq!(tags.to_pgn(), "[White \"Kasparov\"]\n[Opening \"Ruy Lopez\"]\n");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagMap {
    tags: Vec<(String, String)>,
}

impl TagMap {
    /// Builds a map from name/value pairs, failing on the first invalid one.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> ChessResult<Self>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut tags = Self::default();
        for (name, value) in pairs {
            tags.set(name.as_ref(), value.as_ref())?;
        }
        Ok(tags)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.tags
            .iter()
            .position(|(key, _)| key.eq_ignore_ascii_case(name))
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name).map(|i| self.tags[i].1.as_str())
    }

    pub fn has(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Sets `name` to `value`, replacing any previous value under the same name.
    pub fn set(&mut self, name: &str, value: &str) -> ChessResult<()> {
        check_name(name)?;
        check_value(value)?;
        match self.position(name) {
            Some(i) => self.tags[i].1 = value.to_string(),
            None => self.tags.push((name.to_string(), value.to_string())),
        }
        Ok(())
    }

    /// Removes `name`. Returns the old value, if there was one.
    pub fn delete(&mut self, name: &str) -> Option<String> {
        self.position(name).map(|i| self.tags.remove(i).1)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Tags in output order: the Seven Tag Roster first, then everything else as inserted.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        let roster = SEVEN_TAG_ROSTER
            .iter()
            .filter_map(|name| self.position(name))
            .map(|i| &self.tags[i]);
        let rest = self.tags.iter().filter(|(key, _)| {
            !SEVEN_TAG_ROSTER
                .iter()
                .any(|name| key.eq_ignore_ascii_case(name))
        });
        roster
            .chain(rest)
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// The tag pair section of a PGN game.
    pub fn to_pgn(&self) -> String {
        self.iter()
            .map(|(name, value)| format!("[{name} \"{value}\"]\n"))
            .collect()
    }
}

impl fmt::Display for TagMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_pgn())
    }
}
