use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// Insertion-ordered set of every keyword currently in the trie.
///
/// Serves "list everything" without walking the trie. It is only ever
/// mutated next to the matching trie mutation, on the dispatcher thread.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WordRegistry {
    words: IndexSet<String>,
}

impl WordRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `word` unless it is already present.
    pub fn add(&mut self, word: &str) -> bool {
        if self.words.contains(word) {
            return false;
        }
        self.words.insert(word.to_string())
    }

    /// Removes `word`, keeping the order of the remaining keywords.
    pub fn remove(&mut self, word: &str) -> bool {
        self.words.shift_remove(word)
    }

    pub fn clear(&mut self) {
        self.words.clear();
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Current contents in insertion order.
    pub fn list_all(&self) -> impl ExactSizeIterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }
}

impl FromIterator<String> for WordRegistry {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            words: iter.into_iter().collect(),
        }
    }
}
