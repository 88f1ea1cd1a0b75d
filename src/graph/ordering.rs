//! Elimination ordering

use super::{Key, VariableIndex};
use std::ops::Index;

/// Sequence of variables in the order they are to be eliminated
///
/// May name only a subset of the graph's variables (partial elimination).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ordering {
    keys: Vec<Key>,
}

impl Ordering {
    /// Wrap an explicit key sequence
    pub fn new(keys: Vec<Key>) -> Self {
        Self { keys }
    }

    /// Ascending key order over every variable in `index`
    ///
    /// Convenience only: no attempt is made to reduce fill.
    pub fn natural(index: &VariableIndex) -> Self {
        Self {
            keys: index.keys().collect(),
        }
    }

    /// Append a key
    pub fn push(&mut self, key: Key) {
        self.keys.push(key);
    }

    /// Number of ordered variables
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether nothing is to be eliminated
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Keys in elimination order
    pub fn iter(&self) -> impl Iterator<Item = &Key> {
        self.keys.iter()
    }

    /// Keys as a slice
    pub fn as_slice(&self) -> &[Key] {
        &self.keys
    }
}

impl Index<usize> for Ordering {
    type Output = Key;

    fn index(&self, position: usize) -> &Key {
        &self.keys[position]
    }
}

impl FromIterator<Key> for Ordering {
    fn from_iter<I: IntoIterator<Item = Key>>(iter: I) -> Self {
        Self {
            keys: iter.into_iter().collect(),
        }
    }
}

impl From<Vec<Key>> for Ordering {
    fn from(keys: Vec<Key>) -> Self {
        Self { keys }
    }
}
