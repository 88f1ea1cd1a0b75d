//! Ordered sequence of conditionals

use std::ops::Index;

/// Conditionals in elimination order
///
/// Earliest-eliminated variables come first, so the product of the
/// conditionals evaluated back to front is the chain-rule factorization.
#[derive(Debug, Clone, PartialEq)]
pub struct BayesNet<C> {
    conditionals: Vec<C>,
}

impl<C> BayesNet<C> {
    /// Create an empty Bayes net
    pub fn new() -> Self {
        Self {
            conditionals: Vec::new(),
        }
    }

    /// Create an empty Bayes net with room for `capacity` conditionals
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            conditionals: Vec::with_capacity(capacity),
        }
    }

    /// Append a conditional
    pub fn push(&mut self, conditional: C) {
        self.conditionals.push(conditional);
    }

    /// Number of conditionals
    pub fn len(&self) -> usize {
        self.conditionals.len()
    }

    /// Whether no variable was eliminated
    pub fn is_empty(&self) -> bool {
        self.conditionals.is_empty()
    }

    /// Conditional at `position`
    pub fn get(&self, position: usize) -> Option<&C> {
        self.conditionals.get(position)
    }

    /// Conditionals in elimination order
    pub fn iter(&self) -> std::slice::Iter<'_, C> {
        self.conditionals.iter()
    }

    /// Conditionals as a slice
    pub fn as_slice(&self) -> &[C] {
        &self.conditionals
    }

    /// Take ownership of the conditionals
    pub fn into_vec(self) -> Vec<C> {
        self.conditionals
    }
}

impl<C> Default for BayesNet<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Index<usize> for BayesNet<C> {
    type Output = C;

    fn index(&self, position: usize) -> &C {
        &self.conditionals[position]
    }
}

impl<C> FromIterator<C> for BayesNet<C> {
    fn from_iter<I: IntoIterator<Item = C>>(iter: I) -> Self {
        Self {
            conditionals: iter.into_iter().collect(),
        }
    }
}

impl<C> IntoIterator for BayesNet<C> {
    type Item = C;
    type IntoIter = std::vec::IntoIter<C>;

    fn into_iter(self) -> Self::IntoIter {
        self.conditionals.into_iter()
    }
}

impl<'a, C> IntoIterator for &'a BayesNet<C> {
    type Item = &'a C;
    type IntoIter = std::slice::Iter<'a, C>;

    fn into_iter(self) -> Self::IntoIter {
        self.conditionals.iter()
    }
}
