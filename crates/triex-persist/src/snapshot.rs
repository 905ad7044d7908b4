use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use triex_core::{Result, Snapshot, TrieXError, WordRegistry};
use triex_dsa::KeywordTrie;

pub const TRIE_BLOB: &str = "trie.bin";
pub const WORDS_BLOB: &str = "words.bin";

/// On-disk home of the snapshot blobs.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    /// Opens the store, creating `dir` if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn trie_path(&self) -> PathBuf {
        self.dir.join(TRIE_BLOB)
    }

    pub fn words_path(&self) -> PathBuf {
        self.dir.join(WORDS_BLOB)
    }

    /// Loads the last snapshot.
    ///
    /// `None` on first run. Finding only one of the two blobs is an error:
    /// the pair is only meaningful together.
    pub fn load(&self) -> Result<Option<Snapshot>> {
        let trie_path = self.trie_path();
        let words_path = self.words_path();

        match (trie_path.exists(), words_path.exists()) {
            (false, false) => return Ok(None),
            (true, true) => {}
            (has_trie, _) => {
                let missing = if has_trie { WORDS_BLOB } else { TRIE_BLOB };
                return Err(TrieXError::Snapshot(format!(
                    "incomplete snapshot in {}: {} is missing",
                    self.dir.display(),
                    missing
                )));
            }
        }

        let trie: KeywordTrie = bincode::deserialize(&fs::read(&trie_path)?)?;
        let words: WordRegistry = bincode::deserialize(&fs::read(&words_path)?)?;
        tracing::info!(
            "SnapshotStore: loaded {} keywords ({} listed) from {}",
            trie.len(),
            words.len(),
            self.dir.display()
        );
        Ok(Some(Snapshot { trie, words }))
    }

    /// Writes both blobs, each replacing its predecessor atomically.
    pub fn save(&self, snapshot: &Snapshot) -> Result<()> {
        let trie = bincode::serialize(&snapshot.trie)?;
        let words = bincode::serialize(&snapshot.words)?;
        self.replace(&self.trie_path(), &trie)?;
        self.replace(&self.words_path(), &words)?;
        tracing::debug!(
            "SnapshotStore: wrote {} keywords ({} + {} bytes)",
            snapshot.trie.len(),
            trie.len(),
            words.len()
        );
        Ok(())
    }

    fn replace(&self, path: &Path, data: &[u8]) -> Result<()> {
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(data)?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| TrieXError::from(e.error))?;
        Ok(())
    }
}
