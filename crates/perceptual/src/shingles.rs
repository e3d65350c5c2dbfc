//! Word n-gram shingling.
//!
//! A shingle is a contiguous window of `n` tokens joined by a single space.
//! Shingles are collected into a set, so a phrase repeated throughout a post
//! counts once. Input is expected to be normalized already (see the
//! `canonical` crate); this module only splits on whitespace.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Set of word shingles for one text.
///
/// Backed by an ordered set so serialized fingerprints are byte-stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TextShingleSet(BTreeSet<String>);

impl TextShingleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, shingle: &str) -> bool {
        self.0.contains(shingle)
    }

    pub fn insert(&mut self, shingle: impl Into<String>) -> bool {
        self.0.insert(shingle.into())
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// True when the set holds at least `min` shingles.
    pub fn has_signal(&self, min: usize) -> bool {
        self.0.len() >= min
    }

    /// Size of the intersection with `other`.
    pub fn intersection_len(&self, other: &TextShingleSet) -> usize {
        // Walk the smaller set and probe the larger one.
        let (small, large) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        small.0.iter().filter(|s| large.0.contains(*s)).count()
    }
}

impl<S: Into<String>> FromIterator<S> for TextShingleSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Shingle whitespace-delimited normalized text into `n`-token windows.
///
/// Texts with fewer than `n` tokens (or `n == 0`) yield an empty set; exactly
/// `n` tokens yield a single shingle.
///
/// ```rust
/// use perceptual::shingle;
///
/// let set = shingle("a b c d", 3);
/// assert_eq!(set.len(), 2);
/// assert!(set.contains("a b c"));
/// assert!(set.contains("b c d"));
/// ```
pub fn shingle(normalized_text: &str, n: usize) -> TextShingleSet {
    let tokens: Vec<&str> = normalized_text.split_whitespace().collect();
    shingle_tokens(&tokens, n)
}

/// Shingle an already tokenized canonical token stream.
pub fn shingle_tokens<S: AsRef<str>>(tokens: &[S], n: usize) -> TextShingleSet {
    if n == 0 || tokens.len() < n {
        return TextShingleSet::new();
    }

    let mut set = BTreeSet::new();
    for window in tokens.windows(n) {
        let len = window.iter().map(|t| t.as_ref().len() + 1).sum::<usize>();
        let mut joined = String::with_capacity(len);
        for (i, token) in window.iter().enumerate() {
            if i > 0 {
                joined.push(' ');
            }
            joined.push_str(token.as_ref());
        }
        set.insert(joined);
    }
    TextShingleSet(set)
}
