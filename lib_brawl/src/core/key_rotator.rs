//! Round-robin credential pool.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use thiserror::Error;

/// Raised when a pool is built without any token.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("credential pool needs at least one token")]
pub struct EmptyPool;

/// Cycles through API tokens, one per call.
///
/// The cursor advances on every read regardless of how the call that used the
/// token turned out.
#[derive(Debug)]
pub struct KeyRotator {
    tokens: Arc<[String]>,
    cursor: AtomicUsize,
}

impl KeyRotator {
    /// Builds a pool from a non-empty token list.
    pub fn new(tokens: Vec<String>) -> Result<Self, EmptyPool> {
        if tokens.is_empty() {
            return Err(EmptyPool);
        }
        Ok(Self {
            tokens: tokens.into(),
            cursor: AtomicUsize::new(0),
        })
    }

    /// Returns the token at the cursor and moves the cursor forward, wrapping.
    pub fn next_token(&self) -> &str {
        let len = self.tokens.len();
        let index = self
            .cursor
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |i| Some((i + 1) % len))
            .unwrap_or_else(|current| current);
        &self.tokens[index]
    }

    /// Number of tokens in the pool.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycles_and_wraps() {
        let pool = KeyRotator::new(vec!["a".into(), "b".into(), "c".into()]).unwrap();
        let seen: Vec<&str> = (0..7).map(|_| pool.next_token()).collect();
        assert_eq!(seen, ["a", "b", "c", "a", "b", "c", "a"]);
    }

    #[test]
    fn single_token_is_always_returned() {
        let pool = KeyRotator::new(vec!["only".into()]).unwrap();
        assert_eq!(pool.next_token(), "only");
        assert_eq!(pool.next_token(), "only");
    }

    #[test]
    fn empty_pool_is_rejected() {
        assert_eq!(KeyRotator::new(Vec::new()).unwrap_err(), EmptyPool);
    }
}
