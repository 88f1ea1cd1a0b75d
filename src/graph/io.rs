//! Plain-text factor graph format
//!
//! One factor per line, whitespace-separated keys. A key is either an
//! unsigned integer (`17`) or a symbol (`x3`). `#` starts a comment.

use super::{FactorGraph, Key, Ordering, Symbol};
use crate::symbolic::SymbolicFactor;
use thiserror::Error;

/// Errors raised while reading graph or ordering text
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Token is neither an integer nor a symbol
    #[error("invalid key '{token}' on line {line}")]
    InvalidKey {
        /// 1-indexed line number
        line: usize,
        /// Offending token
        token: String,
    },
}

/// Parse a single key token
pub fn parse_key(token: &str) -> Option<Key> {
    if let Ok(key) = token.parse::<Key>() {
        return Some(key);
    }
    let mut chars = token.chars();
    let chr = chars.next().filter(char::is_ascii_alphabetic)?;
    let index = chars.as_str().parse::<u64>().ok()?;
    Symbol::new(chr, index).map(Key::from)
}

/// Parse a symbolic factor graph, one factor per non-empty line
pub fn parse_factor_graph(text: &str) -> Result<FactorGraph<SymbolicFactor>, ParseError> {
    let mut graph = FactorGraph::new();
    for (line_no, line) in text.lines().enumerate() {
        let keys = parse_line(line, line_no + 1)?;
        if !keys.is_empty() {
            graph.push(SymbolicFactor::new(keys));
        }
    }
    Ok(graph)
}

/// Parse an ordering; keys may be separated by commas or whitespace
pub fn parse_ordering(text: &str) -> Result<Ordering, ParseError> {
    let mut ordering = Ordering::default();
    for (line_no, line) in text.lines().enumerate() {
        for key in parse_line(&line.replace(',', " "), line_no + 1)? {
            ordering.push(key);
        }
    }
    Ok(ordering)
}

fn parse_line(line: &str, line_no: usize) -> Result<Vec<Key>, ParseError> {
    let content = line.split('#').next().unwrap_or_default();
    content
        .split_whitespace()
        .map(|token| {
            parse_key(token).ok_or_else(|| ParseError::InvalidKey {
                line: line_no,
                token: token.to_string(),
            })
        })
        .collect()
}
