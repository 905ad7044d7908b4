//! # Trie Engine Tests
//!
//! Validates insert/search/delete round-trips, prefix enumeration against a
//! brute-force filter, pruning after deletes and idempotent inserts.

use std::collections::BTreeSet;
use std::time::Instant;
use triex_dsa::KeywordTrie;

const WORDS: &[&str] = &[
    "a", "an", "and", "ant", "anthem", "car", "card", "care", "carpet", "cart", "cat", "dog",
    "dot", "zebra", "été", "éclair",
];

fn populated() -> KeywordTrie {
    let mut trie = KeywordTrie::new();
    for word in WORDS {
        trie.insert(word);
    }
    trie
}

fn as_set(words: Vec<String>) -> BTreeSet<String> {
    words.into_iter().collect()
}

#[test]
fn test_insert_then_search() {
    let trie = populated();
    for word in WORDS {
        assert!(trie.search(word), "{} should be found", word);
    }
    assert_eq!(trie.len(), WORDS.len());
    assert!(!trie.search("ca"));
    assert!(!trie.search("carpets"));
    assert!(!trie.search("zzz"));
}

#[test]
fn test_delete_then_search() {
    let t = Instant::now();

    let mut trie = populated();
    for word in WORDS {
        assert!(trie.delete(word), "first delete of {} should succeed", word);
        assert!(!trie.search(word));
        assert!(!trie.delete(word), "second delete of {} should miss", word);
    }
    assert!(trie.is_empty());

    let overhead = t.elapsed();
    println!("test_delete_then_search: Testing Overhead = {:?}", overhead);
}

#[test]
fn test_autocomplete_matches_filter() {
    let trie = populated();
    let prefixes = ["", "a", "an", "ant", "car", "cart", "ca", "d", "é", "z", "zebra"];

    for prefix in prefixes {
        let expected: BTreeSet<String> = WORDS
            .iter()
            .filter(|w| w.starts_with(prefix))
            .map(|w| w.to_string())
            .collect();
        let got = trie.autocomplete(prefix).expect("prefix path should exist");
        assert_eq!(got.len(), expected.len(), "duplicates for prefix {:?}", prefix);
        assert_eq!(as_set(got), expected, "prefix {:?}", prefix);
    }
}

#[test]
fn test_autocomplete_missing_prefix() {
    let trie = populated();
    assert_eq!(trie.autocomplete("x"), None);
    assert_eq!(trie.autocomplete("carts"), None);
    assert_eq!(KeywordTrie::new().autocomplete("a"), None);
    assert_eq!(KeywordTrie::new().autocomplete(""), Some(vec![]));
}

#[test]
fn test_dump_all_equals_empty_prefix() {
    let trie = populated();
    assert_eq!(Some(trie.dump_all()), trie.autocomplete(""));
    assert_eq!(as_set(trie.dump_all()), WORDS.iter().map(|w| w.to_string()).collect());
}

#[test]
fn test_shared_prefix_survival() {
    let mut trie = KeywordTrie::new();
    trie.insert("car");
    trie.insert("carpet");

    assert!(trie.delete("car"));
    assert!(trie.search("carpet"));
    assert!(!trie.search("car"));
    assert_eq!(trie.dump_all(), vec!["carpet".to_string()]);
}

#[test]
fn test_deleting_a_branch_prunes_it() {
    let mut trie = KeywordTrie::new();
    trie.insert("dog");
    let baseline = trie.node_count();

    for word in ["car", "card", "care", "carpet", "cart"] {
        trie.insert(word);
    }
    for word in ["carpet", "card", "car", "cart", "care"] {
        assert!(trie.delete(word));
    }

    assert_eq!(trie.node_count(), baseline, "no node of the car* branch may survive");
    assert!(trie.root().child('c').is_none());
    assert!(trie.search("dog"));
}

#[test]
fn test_idempotent_insert() {
    let mut trie = populated();
    let before = trie.clone();
    let nodes = trie.node_count();

    assert!(!trie.insert("carpet"));
    assert_eq!(trie, before);
    assert_eq!(trie.node_count(), nodes);
    assert_eq!(trie.len(), WORDS.len());
}

#[test]
fn test_clear_resets_root() {
    let mut trie = populated();
    trie.clear();
    assert!(trie.is_empty());
    assert_eq!(trie.node_count(), 1);
    assert!(trie.dump_all().is_empty());
    assert!(!trie.search("car"));
}

#[test]
fn test_node_sizes_track_children() {
    let trie = populated();
    let car = trie.node_at("car").unwrap();
    // d, e, p, t
    assert_eq!(car.size(), 4);
    assert!(car.is_word_end());
    assert_eq!(car.children().map(|(c, _)| c).collect::<String>(), "dept");
}
