//! # Core Layer Tests: WordRegistry, KeywordIndex, Request model, ServerConfig
//!
//! Validates registry/trie consistency, the dispatch table and its reply
//! wording, operation-name fallback and configuration loading.

use std::path::PathBuf;
use std::time::Instant;
use triex_core::{
    KeywordIndex, Operation, Reply, Request, ServerConfig, Snapshot, TrieXError, WordRegistry,
    MAX_KEYWORD_CHARS,
};

fn run(index: &mut KeywordIndex, request: Request) -> String {
    index.execute(&request).to_string()
}

#[test]
fn test_registry_rejects_duplicates_and_keeps_order() {
    let mut registry = WordRegistry::new();
    assert!(registry.add("b"));
    assert!(registry.add("a"));
    assert!(!registry.add("b"));
    assert!(registry.add("c"));
    assert_eq!(registry.len(), 3);

    assert!(registry.remove("a"));
    assert!(!registry.remove("a"));
    assert_eq!(registry.list_all().collect::<Vec<_>>(), vec!["b", "c"]);

    registry.clear();
    assert!(registry.is_empty());
}

#[test]
fn test_dispatch_table_wording() {
    let t = Instant::now();

    let mut index = KeywordIndex::new();
    assert_eq!(run(&mut index, Request::Insert("car".into())), "Successfully added car");
    assert_eq!(run(&mut index, Request::Insert("carpet".into())), "Successfully added carpet");
    assert_eq!(run(&mut index, Request::Search("car".into())), "The keyword car exists");
    assert_eq!(run(&mut index, Request::Search("ca".into())), "The keyword ca does not exist");
    assert_eq!(
        run(&mut index, Request::Autocomplete("car".into())),
        "Words that complete the prefix car include ['car', 'carpet']"
    );
    assert_eq!(
        run(&mut index, Request::Autocomplete("dog".into())),
        "The prefix dog does not exist"
    );
    assert_eq!(run(&mut index, Request::Delete("car".into())), "Successfully deleted car");
    assert_eq!(
        run(&mut index, Request::Delete("car".into())),
        "Could not delete car because it does not exist"
    );
    assert_eq!(run(&mut index, Request::ListFast), "['carpet']");
    assert_eq!(run(&mut index, Request::ListFull), "['carpet']");
    assert_eq!(run(&mut index, Request::DeleteAll), "Successfully deleted all keywords");
    assert_eq!(run(&mut index, Request::ListFast), "[]");
    assert_eq!(run(&mut index, Request::ListFull), "[]");

    let overhead = t.elapsed();
    println!("test_dispatch_table_wording: Testing Overhead = {:?}", overhead);
}

#[test]
fn test_empty_trie_has_no_completions() {
    let mut index = KeywordIndex::new();
    assert_eq!(
        index.execute(&Request::Autocomplete(String::new())),
        Reply::NoCompletions(String::new())
    );
}

#[test]
fn test_fast_list_keeps_insertion_order() {
    let mut index = KeywordIndex::new();
    for word in ["pear", "apple", "fig"] {
        index.insert(word);
    }
    assert_eq!(index.list_fast(), vec!["pear", "apple", "fig"]);
    assert_eq!(index.list_full(), vec!["apple", "fig", "pear"]);
}

#[test]
fn test_idempotent_insert_keeps_single_entry() {
    let mut index = KeywordIndex::new();
    assert!(index.insert("car"));
    let nodes = index.trie().node_count();
    assert!(!index.insert("car"));

    assert_eq!(index.registry().len(), 1);
    assert_eq!(index.list_fast(), vec!["car"]);
    assert_eq!(index.trie().node_count(), nodes);
    assert!(index.is_consistent());
}

#[test]
fn test_delete_all_clears_both_structures() {
    let mut index = KeywordIndex::new();
    for word in ["a", "ab", "abc", "b"] {
        index.insert(word);
    }
    index.delete_all();
    assert!(index.list_full().is_empty());
    assert!(index.list_fast().is_empty());
    assert_eq!(index.trie().node_count(), 1);
    assert!(index.is_consistent());
}

#[test]
fn test_restore_rebuilds_disagreeing_registry() {
    let mut index = KeywordIndex::new();
    index.insert("car");
    index.insert("cat");
    let mut snapshot = index.snapshot();
    snapshot.words = ["car", "ghost"].into_iter().map(String::from).collect();

    let restored = KeywordIndex::restore(snapshot);
    assert!(restored.is_consistent());
    assert_eq!(restored.list_full(), vec!["car", "cat"]);
    assert_eq!(restored.registry().len(), 2);
    assert!(!restored.registry().contains("ghost"));
}

#[test]
fn test_restore_keeps_consistent_registry_order() {
    let mut index = KeywordIndex::new();
    for word in ["zulu", "alpha", "mike"] {
        index.insert(word);
    }
    let restored = KeywordIndex::restore(index.snapshot());
    assert_eq!(restored.list_fast(), vec!["zulu", "alpha", "mike"]);
    assert_eq!(Snapshot::default(), KeywordIndex::new().snapshot());
}

#[test]
fn test_operation_names_and_fallback() {
    for op in Operation::ALL {
        assert_eq!(Operation::from_name(op.name()), op);
    }
    // Unknown names are a full dump, not an error.
    assert_eq!(Operation::from_name("Dance"), Operation::ListFull);
    assert_eq!(Operation::from_name(""), Operation::ListFull);
    assert_eq!(Operation::from_name("add keyword"), Operation::ListFull);
}

#[test]
fn test_request_construction() {
    assert_eq!(
        Request::new(Operation::Insert, Some("car".into())).unwrap(),
        Request::Insert("car".into())
    );
    assert_eq!(
        Request::new(Operation::DeleteAll, Some("ignored".into())).unwrap(),
        Request::DeleteAll
    );
    assert_eq!(Request::new(Operation::ListFull, None).unwrap(), Request::ListFull);

    assert!(matches!(
        Request::new(Operation::Search, None),
        Err(TrieXError::MalformedRequest(_))
    ));

    let long = "x".repeat(MAX_KEYWORD_CHARS + 1);
    assert!(matches!(
        Request::new(Operation::Insert, Some(long)),
        Err(TrieXError::MalformedRequest(_))
    ));
    let limit = "x".repeat(MAX_KEYWORD_CHARS);
    assert!(Request::new(Operation::Insert, Some(limit)).is_ok());
}

#[test]
fn test_reply_list_quoting() {
    let reply = Reply::Words(vec!["it's".into(), "back\\slash".into()]);
    assert_eq!(reply.to_string(), r#"["it's", 'back\\slash']"#);

    let both = Reply::Words(vec![r#"say "it's""#.into()]);
    assert_eq!(both.to_string(), r#"['say "it\'s"']"#);

    let controls = Reply::Words(vec![
        "two\nlines".into(),
        "tab\there".into(),
        "cr\r".into(),
        "bell\u{7}".into(),
    ]);
    assert_eq!(controls.to_string(), r"['two\nlines', 'tab\there', 'cr\r', 'bell\x07']");

    let completions = Reply::Completions {
        prefix: "it".into(),
        words: vec!["it".into(), "it's".into()],
    };
    assert_eq!(
        completions.to_string(),
        r#"Words that complete the prefix it include ['it', "it's"]"#
    );

    assert!(Reply::Failed("x".into()).is_failure());
    assert!(!Reply::Cleared.is_failure());
}

#[test]
fn test_server_config_defaults() {
    let config = ServerConfig::default();
    assert_eq!(config.port, 61135);
    assert_eq!(config.autosave_interval_secs, 60);
    assert_eq!(config.data_dir, PathBuf::from("./data"));
    assert_eq!(config.bind_addr(), "127.0.0.1:61135");
    assert_eq!(config.max_frame_len, 16 * 1024 * 1024);
}

#[test]
fn test_server_config_from_toml() {
    let config = ServerConfig::from_toml_str(
        r#"
        port = 7000
        data_dir = "/var/lib/triex"
        autosave_interval_secs = 5
        "#,
    )
    .unwrap();

    assert_eq!(config.port, 7000);
    assert_eq!(config.data_dir, PathBuf::from("/var/lib/triex"));
    assert_eq!(config.autosave_interval().as_secs(), 5);
    assert_eq!(config.host, "127.0.0.1", "unset keys keep their defaults");

    assert!(matches!(
        ServerConfig::from_toml_str("port = \"not a number\""),
        Err(TrieXError::Config(_))
    ));
}
