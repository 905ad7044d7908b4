use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use serde::{Deserialize, Serialize};

/// A node in the keyword trie.
///
/// Each child is owned by exactly one parent; there are no back references.
/// A node with no children that does not terminate a keyword is dead and is
/// never left reachable from the root.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrieNode {
    /// Character transitions, kept ordered so enumeration is lexicographic.
    children: BTreeMap<char, TrieNode>,
    /// True if the path leading here spells an inserted keyword.
    is_word_end: bool,
}

impl TrieNode {
    /// Number of character children.
    #[inline]
    pub fn size(&self) -> usize {
        self.children.len()
    }

    #[inline]
    pub fn is_word_end(&self) -> bool {
        self.is_word_end
    }

    pub fn child(&self, c: char) -> Option<&TrieNode> {
        self.children.get(&c)
    }

    pub fn children(&self) -> impl Iterator<Item = (char, &TrieNode)> {
        self.children.iter().map(|(c, node)| (*c, node))
    }

    #[inline]
    fn is_dead(&self) -> bool {
        self.children.is_empty() && !self.is_word_end
    }

    /// Drops dead subtrees and returns the number of keywords below this node.
    fn prune_and_count(&mut self) -> usize {
        let mut words = usize::from(self.is_word_end);
        self.children.retain(|_, child| {
            words += child.prune_and_count();
            !child.is_dead()
        });
        words
    }
}

/// What one level of the recursive delete reports to its caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeleteOutcome {
    /// The node just visited is now dead and must be detached by its parent.
    pub prune_parent: bool,
    /// The keyword terminated at the end of the path.
    pub found: bool,
}

impl DeleteOutcome {
    const MISS: Self = Self {
        prune_parent: false,
        found: false,
    };
}

/// In-memory prefix tree of keywords.
///
/// Carries no synchronisation of its own: callers must serialise every
/// mutation (the dispatcher thread is the only writer in the server).
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TrieNode", into = "TrieNode")]
pub struct KeywordTrie {
    root: TrieNode,
    len: usize,
}

static_assertions::assert_impl_all!(KeywordTrie: Send, Sync, Clone);

impl fmt::Debug for KeywordTrie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeywordTrie")
            .field("keywords", &self.len)
            .field("root_size", &self.root.size())
            .finish()
    }
}

impl From<TrieNode> for KeywordTrie {
    /// Adopts a decoded tree, discarding any dead branches it carries.
    fn from(mut root: TrieNode) -> Self {
        let len = root.prune_and_count();
        Self { root, len }
    }
}

impl From<KeywordTrie> for TrieNode {
    fn from(trie: KeywordTrie) -> Self {
        trie.root
    }
}

impl KeywordTrie {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keywords currently stored.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn root(&self) -> &TrieNode {
        &self.root
    }

    /// Inserts `word`, creating one node per missing character.
    ///
    /// Returns `false` if the keyword was already present, in which case the
    /// tree is left untouched. The empty keyword marks the root itself.
    pub fn insert(&mut self, word: &str) -> bool {
        let mut node = &mut self.root;
        for c in word.chars() {
            node = node.children.entry(c).or_default();
        }
        if node.is_word_end {
            return false;
        }
        node.is_word_end = true;
        self.len += 1;
        true
    }

    /// Removes `word` and prunes every ancestor left without purpose.
    ///
    /// Returns `false` without mutating anything if the path does not exist
    /// or does not end at a terminus. The root is never detached.
    pub fn delete(&mut self, word: &str) -> bool {
        let outcome = Self::delete_at(&mut self.root, word.chars());
        if outcome.found {
            self.len -= 1;
        }
        outcome.found
    }

    fn delete_at(node: &mut TrieNode, mut rest: core::str::Chars<'_>) -> DeleteOutcome {
        let Some(c) = rest.next() else {
            if !node.is_word_end {
                return DeleteOutcome::MISS;
            }
            node.is_word_end = false;
            return DeleteOutcome {
                prune_parent: node.children.is_empty(),
                found: true,
            };
        };

        let Some(child) = node.children.get_mut(&c) else {
            return DeleteOutcome::MISS;
        };
        let below = Self::delete_at(child, rest);
        if below.prune_parent {
            node.children.remove(&c);
        }
        // A terminus or a node that still has children stops the unwinding.
        DeleteOutcome {
            prune_parent: below.prune_parent && node.is_dead(),
            found: below.found,
        }
    }

    /// Exact-match membership test.
    pub fn search(&self, word: &str) -> bool {
        self.node_at(word).is_some_and(TrieNode::is_word_end)
    }

    /// Every keyword that starts with `prefix`, the prefix included if it is
    /// itself a keyword. `None` means no path for the prefix exists.
    pub fn autocomplete(&self, prefix: &str) -> Option<Vec<String>> {
        let start = self.node_at(prefix)?;
        let mut out = Vec::new();
        Self::collect(start, String::from(prefix), &mut out);
        Some(out)
    }

    /// Full enumeration from the root.
    pub fn dump_all(&self) -> Vec<String> {
        let mut out = Vec::with_capacity(self.len);
        Self::collect(&self.root, String::new(), &mut out);
        out
    }

    /// Replaces the tree with a fresh, empty root.
    pub fn clear(&mut self) {
        self.root = TrieNode::default();
        self.len = 0;
    }

    /// Number of nodes reachable from the root, root included.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut stack = alloc::vec![&self.root];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.values());
        }
        count
    }

    /// Returns the node at the end of `path`, if the path exists.
    pub fn node_at(&self, path: &str) -> Option<&TrieNode> {
        let mut node = &self.root;
        for c in path.chars() {
            node = node.children.get(&c)?;
        }
        Some(node)
    }

    // Explicit stack instead of recursion: depth is bounded only by keyword length.
    fn collect(start: &TrieNode, prefix: String, out: &mut Vec<String>) {
        let mut stack = alloc::vec![(start, prefix)];
        while let Some((node, word)) = stack.pop() {
            if node.is_word_end {
                out.push(word.clone());
            }
            for (c, child) in node.children.iter().rev() {
                let mut next = word.clone();
                next.push(*c);
                stack.push((child, next));
            }
        }
    }
}
