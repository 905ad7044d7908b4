#![no_std]
extern crate alloc;

pub mod trie;

pub use trie::{DeleteOutcome, KeywordTrie, TrieNode};
