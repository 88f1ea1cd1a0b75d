//! Symbol keys
//!
//! Key layout: top 8 bits = ASCII character, low 56 bits = index.
//! `x12` and `l3` become distinct keys that still sort by character first.

use super::Key;
use std::fmt;

const CHR_BITS: u32 = 8;
const INDEX_BITS: u32 = Key::BITS - CHR_BITS;
const INDEX_MASK: Key = (1 << INDEX_BITS) - 1;

/// Character-tagged variable name packed into a [`Key`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize))]
pub struct Symbol {
    chr: u8,
    index: u64,
}

impl Symbol {
    /// Largest index representable next to the character byte
    pub const MAX_INDEX: u64 = INDEX_MASK;

    /// Create a symbol, returning `None` if `chr` is not an ASCII letter
    /// or `index` exceeds [`Symbol::MAX_INDEX`]
    pub fn new(chr: char, index: u64) -> Option<Self> {
        if !chr.is_ascii_alphabetic() || index > Self::MAX_INDEX {
            return None;
        }
        Some(Self {
            chr: chr as u8,
            index,
        })
    }

    /// Decode a key; keys without an alphabetic tag are not symbols
    pub fn from_key(key: Key) -> Option<Self> {
        let chr = (key >> INDEX_BITS) as u8;
        if !chr.is_ascii_alphabetic() {
            return None;
        }
        Some(Self {
            chr,
            index: key & INDEX_MASK,
        })
    }

    /// Tag character
    pub fn chr(&self) -> char {
        self.chr as char
    }

    /// Index within the tag
    pub fn index(&self) -> u64 {
        self.index
    }

    /// Packed key
    pub fn key(&self) -> Key {
        ((self.chr as Key) << INDEX_BITS) | self.index
    }
}

impl From<Symbol> for Key {
    fn from(symbol: Symbol) -> Self {
        symbol.key()
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.chr(), self.index)
    }
}

/// Render keys as plain integers
pub fn default_formatter(key: Key) -> String {
    key.to_string()
}

/// Render symbol keys as `x12`, falling back to integers
pub fn symbol_formatter(key: Key) -> String {
    match Symbol::from_key(key) {
        Some(symbol) => symbol.to_string(),
        None => key.to_string(),
    }
}
