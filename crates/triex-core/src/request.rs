use crate::error::{Result, TrieXError};
use std::fmt;

/// Longest keyword or prefix accepted off the wire, in characters.
pub const MAX_KEYWORD_CHARS: usize = 1024;

/// The operations a client can ask for, keyed by their wire names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Insert,
    Delete,
    DeleteAll,
    Search,
    Autocomplete,
    ListFast,
    ListFull,
}

impl Operation {
    pub const ALL: [Operation; 7] = [
        Operation::Insert,
        Operation::Delete,
        Operation::DeleteAll,
        Operation::Search,
        Operation::Autocomplete,
        Operation::ListFast,
        Operation::ListFull,
    ];

    /// Maps a wire name to an operation. Unrecognised names fall back to the
    /// full dump, which is what legacy clients rely on to display the trie.
    pub fn from_name(name: &str) -> Self {
        match name {
            "Add keyword" => Operation::Insert,
            "Delete keyword" => Operation::Delete,
            "Delete all" => Operation::DeleteAll,
            "Search for keyword" => Operation::Search,
            "Autocomplete by prefix" => Operation::Autocomplete,
            "Display trie fast" => Operation::ListFast,
            _ => Operation::ListFull,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Operation::Insert => "Add keyword",
            Operation::Delete => "Delete keyword",
            Operation::DeleteAll => "Delete all",
            Operation::Search => "Search for keyword",
            Operation::Autocomplete => "Autocomplete by prefix",
            Operation::ListFast => "Display trie fast",
            Operation::ListFull => "Display trie",
        }
    }

    pub fn takes_argument(self) -> bool {
        matches!(
            self,
            Operation::Insert | Operation::Delete | Operation::Search | Operation::Autocomplete
        )
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A decoded client request. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Insert(String),
    Delete(String),
    DeleteAll,
    Search(String),
    Autocomplete(String),
    ListFast,
    ListFull,
}

impl Request {
    /// Builds a request from its wire tuple.
    ///
    /// Operations that need a keyword reject a missing or oversized one.
    /// An argument sent with an argument-less operation is ignored.
    pub fn new(op: Operation, argument: Option<String>) -> Result<Self> {
        if !op.takes_argument() {
            return Ok(match op {
                Operation::DeleteAll => Request::DeleteAll,
                Operation::ListFast => Request::ListFast,
                _ => Request::ListFull,
            });
        }

        let word = argument.ok_or_else(|| {
            TrieXError::MalformedRequest(format!("'{}' requires a keyword argument", op))
        })?;
        if word.chars().count() > MAX_KEYWORD_CHARS {
            return Err(TrieXError::MalformedRequest(format!(
                "keyword exceeds {} characters",
                MAX_KEYWORD_CHARS
            )));
        }

        Ok(match op {
            Operation::Insert => Request::Insert(word),
            Operation::Delete => Request::Delete(word),
            Operation::Search => Request::Search(word),
            _ => Request::Autocomplete(word),
        })
    }

    pub fn operation(&self) -> Operation {
        match self {
            Request::Insert(_) => Operation::Insert,
            Request::Delete(_) => Operation::Delete,
            Request::DeleteAll => Operation::DeleteAll,
            Request::Search(_) => Operation::Search,
            Request::Autocomplete(_) => Operation::Autocomplete,
            Request::ListFast => Operation::ListFast,
            Request::ListFull => Operation::ListFull,
        }
    }

    pub fn argument(&self) -> Option<&str> {
        match self {
            Request::Insert(w)
            | Request::Delete(w)
            | Request::Search(w)
            | Request::Autocomplete(w) => Some(w),
            Request::DeleteAll | Request::ListFast | Request::ListFull => None,
        }
    }
}

/// The outcome of one request.
///
/// `Display` produces the human-readable text clients receive; the wording is
/// part of the wire contract and must not drift.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Added(String),
    Deleted(String),
    NotDeleted(String),
    Cleared,
    Exists(String),
    Missing(String),
    Completions { prefix: String, words: Vec<String> },
    NoCompletions(String),
    Words(Vec<String>),
    Malformed(String),
    Failed(String),
}

impl Reply {
    pub fn is_failure(&self) -> bool {
        matches!(self, Reply::Malformed(_) | Reply::Failed(_))
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Added(w) => write!(f, "Successfully added {}", w),
            Reply::Deleted(w) => write!(f, "Successfully deleted {}", w),
            Reply::NotDeleted(w) => {
                write!(f, "Could not delete {} because it does not exist", w)
            }
            Reply::Cleared => f.write_str("Successfully deleted all keywords"),
            Reply::Exists(w) => write!(f, "The keyword {} exists", w),
            Reply::Missing(w) => write!(f, "The keyword {} does not exist", w),
            Reply::Completions { prefix, words } => {
                write!(f, "Words that complete the prefix {} include ", prefix)?;
                write_list(f, words)
            }
            Reply::NoCompletions(p) => write!(f, "The prefix {} does not exist", p),
            Reply::Words(words) => write_list(f, words),
            Reply::Malformed(reason) => write!(f, "Malformed request: {}", reason),
            Reply::Failed(reason) => write!(f, "Operation failed: {}", reason),
        }
    }
}

/// Renders `['a', 'b']`, quoting each word the way legacy clients print it.
fn write_list(f: &mut fmt::Formatter<'_>, words: &[String]) -> fmt::Result {
    f.write_str("[")?;
    for (i, word) in words.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write_quoted(f, word)?;
    }
    f.write_str("]")
}

/// Single quotes unless the word holds a `'` and no `"`.
fn write_quoted(f: &mut fmt::Formatter<'_>, word: &str) -> fmt::Result {
    let quote = if word.contains('\'') && !word.contains('"') {
        '"'
    } else {
        '\''
    };
    write!(f, "{}", quote)?;
    for c in word.chars() {
        match c {
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\t' => f.write_str("\\t")?,
            '\r' => f.write_str("\\r")?,
            c if c == quote => write!(f, "\\{}", c)?,
            c if c.is_control() => write!(f, "\\x{:02x}", c as u32)?,
            c => write!(f, "{}", c)?,
        }
    }
    write!(f, "{}", quote)
}
