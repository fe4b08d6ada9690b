// Copyright (C) 2026 The sboard authors
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::fmt;
use std::str::FromStr;

/// Function keys are encoded above the Unicode range so they can never
/// collide with character keys.
const FUNCTION_KEY_BASE: u32 = 0x0100_0000;

/// A logical trigger key with a stable integer encoding, which is what state
/// files persist. Character keys are stored as their lowercased Unicode
/// scalar value, so matching ignores the Shift state; modifiers are never
/// part of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Key(u32);

impl Key {
    /// The key for a character, normalized to lowercase.
    pub fn from_char(c: char) -> Key {
        let c = c.to_lowercase().next().unwrap_or(c);
        Key(c as u32)
    }

    /// The key for function key F`n`.
    pub fn function(n: u8) -> Key {
        Key(FUNCTION_KEY_BASE + u32::from(n))
    }

    /// The persisted integer code for this key.
    pub fn code(&self) -> u32 {
        self.0
    }

    /// Reconstructs a key from a persisted integer code. Unknown codes are
    /// kept verbatim; they simply never match a real key press.
    pub fn from_code(code: u32) -> Key {
        Key(code)
    }

    fn as_char(&self) -> Option<char> {
        if self.0 < FUNCTION_KEY_BASE {
            char::from_u32(self.0)
        } else {
            None
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_char() {
            Some(' ') => write!(f, "space"),
            Some(c) => write!(f, "{}", c),
            None if self.0 > FUNCTION_KEY_BASE && self.0 <= FUNCTION_KEY_BASE + 24 => {
                write!(f, "f{}", self.0 - FUNCTION_KEY_BASE)
            }
            None => write!(f, "key#{}", self.0),
        }
    }
}

/// Error parsing a key name.
#[derive(Debug, thiserror::Error)]
#[error("unrecognized key name {0:?} (expected a character, \"space\", or \"f1\"..\"f24\")")]
pub struct KeyParseError(String);

impl FromStr for Key {
    type Err = KeyParseError;

    /// Parses a key name as entered in the configuration dialog: a single
    /// character, "space", or a function key such as "f5".
    fn from_str(s: &str) -> Result<Key, KeyParseError> {
        let s = s.trim();

        if s.eq_ignore_ascii_case("space") {
            return Ok(Key::from_char(' '));
        }

        let mut chars = s.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return Ok(Key::from_char(c));
        }

        if let Some(n) = s
            .strip_prefix('f')
            .or_else(|| s.strip_prefix('F'))
            .and_then(|n| n.parse::<u8>().ok())
        {
            if (1..=24).contains(&n) {
                return Ok(Key::function(n));
            }
        }

        Err(KeyParseError(s.to_string()))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_char_keys_ignore_case() {
        assert_eq!(Key::from_char('a'), Key::from_char('A'));
        assert_ne!(Key::from_char('a'), Key::from_char('b'));
    }

    #[test]
    fn test_function_keys_never_collide_with_chars() {
        assert_ne!(Key::function(1), Key::from_char('1'));
        assert_eq!(Key::function(5), Key::function(5));
    }

    #[test]
    fn test_code_round_trip() {
        for key in [Key::from_char('q'), Key::from_char(' '), Key::function(12)] {
            assert_eq!(key, Key::from_code(key.code()));
        }
    }

    #[test]
    fn test_parse() {
        assert_eq!("a".parse::<Key>().unwrap(), Key::from_char('a'));
        assert_eq!("A".parse::<Key>().unwrap(), Key::from_char('a'));
        assert_eq!("space".parse::<Key>().unwrap(), Key::from_char(' '));
        assert_eq!("f5".parse::<Key>().unwrap(), Key::function(5));
        assert_eq!("F12".parse::<Key>().unwrap(), Key::function(12));
        assert!("".parse::<Key>().is_err());
        assert!("f99".parse::<Key>().is_err());
        assert!("ctrl".parse::<Key>().is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Key::from_char('a').to_string(), "a");
        assert_eq!(Key::from_char(' ').to_string(), "space");
        assert_eq!(Key::function(5).to_string(), "f5");
    }
}
