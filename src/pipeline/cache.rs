//! Content-addressed memoization for the two expensive steps.
//!
//! Keys are SHA-256 digests of the exact input (file bytes for extraction,
//! extracted text for analysis), so two uploads with identical content share
//! one entry regardless of file name.
//!
//! There is no eviction: entries live for the process lifetime. A session
//! analyses a handful of reports, each entry is one text or one small JSON
//! value.

use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

/// SHA-256 digest identifying a piece of content.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentKey([u8; 32]);

impl ContentKey {
    /// Digest arbitrary bytes.
    pub fn of(bytes: impl AsRef<[u8]>) -> Self {
        Self(Sha256::digest(bytes.as_ref()).into())
    }

    /// Short hex prefix for log lines.
    pub fn short(&self) -> String {
        hex::encode(&self.0[..6])
    }
}

impl fmt::Display for ContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for ContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentKey({})", self.short())
    }
}

/// An unbounded key → value table with hit/miss counters.
#[derive(Debug)]
pub struct ContentCache<V> {
    label: &'static str,
    entries: HashMap<ContentKey, V>,
    hits: u64,
    misses: u64,
}

impl<V: Clone> ContentCache<V> {
    /// `label` names the cache in log output.
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            entries: HashMap::new(),
            hits: 0,
            misses: 0,
        }
    }

    /// Look up a value, counting the hit or miss.
    pub fn get(&mut self, key: &ContentKey) -> Option<V> {
        match self.entries.get(key) {
            Some(v) => {
                self.hits += 1;
                debug!("{} cache hit {}", self.label, key.short());
                Some(v.clone())
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    pub fn insert(&mut self, key: ContentKey, value: V) {
        self.entries.insert(key, value);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }
}
