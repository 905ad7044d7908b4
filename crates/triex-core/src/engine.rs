use crate::registry::WordRegistry;
use crate::request::{Reply, Request};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use triex_dsa::KeywordTrie;

/// A point-in-time copy of the whole data model.
///
/// Persisted as two blobs: the trie and the word list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub trie: KeywordTrie,
    pub words: WordRegistry,
}

/// The keyword index: the trie plus the registry that mirrors it.
///
/// Every method that mutates keeps both structures in step. Nothing here is
/// synchronised; the dispatcher owns the index and is its only caller.
#[derive(Debug, Default)]
pub struct KeywordIndex {
    trie: KeywordTrie,
    registry: WordRegistry,
}

impl KeywordIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds an index from a stored snapshot.
    ///
    /// The trie is authoritative: a word list that disagrees with it is
    /// rebuilt from the trie.
    pub fn restore(snapshot: Snapshot) -> Self {
        let Snapshot { trie, words } = snapshot;
        let consistent =
            words.len() == trie.len() && words.list_all().all(|word| trie.search(word));

        let registry = if consistent {
            words
        } else {
            tracing::warn!(
                "KeywordIndex: word list ({} entries) disagrees with trie ({} keywords); rebuilding from trie",
                words.len(),
                trie.len()
            );
            trie.dump_all().into_iter().collect()
        };

        Self { trie, registry }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            trie: self.trie.clone(),
            words: self.registry.clone(),
        }
    }

    pub fn trie(&self) -> &KeywordTrie {
        &self.trie
    }

    pub fn registry(&self) -> &WordRegistry {
        &self.registry
    }

    pub fn len(&self) -> usize {
        self.trie.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trie.is_empty()
    }

    /// Returns `false` if the keyword was already present.
    pub fn insert(&mut self, word: &str) -> bool {
        self.registry.add(word);
        self.trie.insert(word)
    }

    /// The registry answers a miss without touching the trie; on a hit the
    /// trie's structural result decides.
    pub fn delete(&mut self, word: &str) -> bool {
        if !self.registry.remove(word) {
            return false;
        }
        let found = self.trie.delete(word);
        if !found {
            tracing::warn!("KeywordIndex: '{}' was registered but missing from the trie", word);
        }
        found
    }

    pub fn delete_all(&mut self) {
        self.registry.clear();
        self.trie.clear();
    }

    pub fn search(&self, word: &str) -> bool {
        self.trie.search(word)
    }

    pub fn autocomplete(&self, prefix: &str) -> Option<Vec<String>> {
        self.trie.autocomplete(prefix)
    }

    pub fn list_fast(&self) -> Vec<String> {
        self.registry.list_all().map(str::to_string).collect()
    }

    pub fn list_full(&self) -> Vec<String> {
        self.trie.dump_all()
    }

    /// Runs one request to completion.
    pub fn execute(&mut self, request: &Request) -> Reply {
        let reply = match request {
            Request::Insert(word) => {
                self.insert(word);
                Reply::Added(word.clone())
            }
            Request::Delete(word) => {
                if self.delete(word) {
                    Reply::Deleted(word.clone())
                } else {
                    Reply::NotDeleted(word.clone())
                }
            }
            Request::DeleteAll => {
                self.delete_all();
                Reply::Cleared
            }
            Request::Search(word) => {
                if self.search(word) {
                    Reply::Exists(word.clone())
                } else {
                    Reply::Missing(word.clone())
                }
            }
            Request::Autocomplete(prefix) => match self.autocomplete(prefix) {
                Some(words) if !words.is_empty() => Reply::Completions {
                    prefix: prefix.clone(),
                    words,
                },
                _ => Reply::NoCompletions(prefix.clone()),
            },
            Request::ListFast => Reply::Words(self.list_fast()),
            Request::ListFull => Reply::Words(self.list_full()),
        };

        tracing::debug!(
            operation = %request.operation(),
            keywords = self.trie.len(),
            "request executed"
        );
        reply
    }

    /// True when the registry and the trie hold exactly the same keywords.
    pub fn is_consistent(&self) -> bool {
        let listed: HashSet<&str> = self.registry.list_all().collect();
        let dumped = self.trie.dump_all();
        listed.len() == self.registry.len()
            && dumped.len() == listed.len()
            && dumped.iter().all(|word| listed.contains(word.as_str()))
    }
}
