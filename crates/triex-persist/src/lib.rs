//! # triex-persist: Durability
//!
//! Snapshots of the keyword index are stored as two blobs, the trie and the
//! word list, and rewritten together on every autosave tick.

pub mod autosave;
pub mod snapshot;

pub use autosave::Autosaver;
pub use snapshot::{SnapshotStore, TRIE_BLOB, WORDS_BLOB};
