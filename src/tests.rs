use std::collections::BTreeMap;

use proptest::prelude::*;

use super::{AvlTree, BinarySearchTree, Color, Entry, Kind, RedBlackTree, SkipList, WordIndex};

const N: usize = 1_000;
const LARGE_N: usize = 1_000_000;

struct All {
    bst: BinarySearchTree,
    avl: AvlTree,
    rbt: RedBlackTree,
    skip_list: SkipList,
}

impl All {
    fn new() -> Self {
        Self {
            bst: BinarySearchTree::new(),
            avl: AvlTree::new(),
            rbt: RedBlackTree::new(),
            skip_list: SkipList::with_seed(0),
        }
    }

    fn insert(&mut self, token: &str) {
        self.bst.insert(token);
        self.avl.insert(token);
        self.rbt.insert(token);
        self.skip_list.insert(token);
    }

    fn check_consistency(&self) {
        self.bst.check_consistency();
        self.avl.check_consistency();
        self.rbt.check_consistency();
        self.skip_list.check_consistency();
    }

    fn indexes(&self) -> [&dyn WordIndex; 4] {
        [&self.bst, &self.avl, &self.rbt, &self.skip_list]
    }
}

fn expected_listing<'a>(tokens: &[&'a str]) -> Vec<Entry<'a>> {
    let mut counts: BTreeMap<&'a str, u64> = BTreeMap::new();
    for &token in tokens {
        *counts.entry(token).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .enumerate()
        .map(|(i, (token, count))| Entry::new(i + 1, token, count))
        .collect()
}

fn random_tokens(seed: u64, len: usize, vocabulary: usize) -> Vec<String> {
    use rand::{rngs::StdRng, Rng, SeedableRng};

    let mut rng = StdRng::seed_from_u64(seed);
    (0..len)
        .map(|_| format!("w{}", rng.gen_range(0..vocabulary)))
        .collect()
}

#[test]
fn test_new() {
    let all = All::new();
    for index in all.indexes() {
        assert!(index.is_empty());
        assert_eq!(index.len(), 0);
        assert_eq!(index.total(), 0);
        assert_eq!(index.entries().count(), 0);
    }
    assert_eq!(all.bst.height(), 0);
    assert_eq!(all.avl.height(), 0);
    assert_eq!(all.rbt.height(), 0);
    assert_eq!(all.skip_list.height(), 1);
    all.check_consistency();
}

#[test]
fn test_interchangeable() {
    let tokens = random_tokens(0, N, N / 4);
    let tokens: Vec<&str> = tokens.iter().map(String::as_str).collect();

    let mut all = All::new();
    for token in &tokens {
        all.insert(token);
        all.check_consistency();
    }

    let expected = expected_listing(&tokens);
    for index in all.indexes() {
        let listed: Vec<Entry> = index.entries().collect();
        assert_eq!(listed, expected);
        assert_eq!(index.len(), expected.len());
        assert_eq!(index.total(), N as u64);
        for entry in &expected {
            assert_eq!(index.get(entry.token), Some(entry.count));
        }
        assert_eq!(index.get("missing"), None);
    }
}

#[test]
fn test_relisting() {
    let tokens = random_tokens(1, N / 2, N);
    let mut all = All::new();
    for token in &tokens {
        all.insert(token);
    }
    for index in all.indexes() {
        let first: Vec<Entry> = index.entries().collect();
        let second: Vec<Entry> = index.entries().collect();
        assert_eq!(first, second);
    }
    let first: Vec<Entry> = all.avl.iter().collect();
    let second: Vec<Entry> = (&all.avl).into_iter().collect();
    assert_eq!(first, second);
}

#[test]
fn test_count() {
    for k in [1, 2, 7, 100] {
        let mut all = All::new();
        for _ in 0..k {
            all.insert("echo");
        }
        all.check_consistency();
        for index in all.indexes() {
            let listed: Vec<Entry> = index.entries().collect();
            assert_eq!(listed, vec![Entry::new(1, "echo", k)]);
        }
    }
}

#[test]
fn test_bst_scenario() {
    let mut tree = BinarySearchTree::new();
    for token in ["b", "a", "c"] {
        tree.insert(token);
    }
    let listed: Vec<(usize, &str, u64)> = tree
        .iter()
        .map(|entry| (entry.rank, entry.token, entry.count))
        .collect();
    assert_eq!(listed, vec![(1, "a", 1), (2, "b", 1), (3, "c", 1)]);
}

#[test]
fn test_avl_scenario() {
    let months = [
        "mar", "may", "nov", "aug", "apr", "jan", "dec", "jul", "feb", "jun", "oct", "sep",
    ];
    let mut tree = AvlTree::new();
    for month in months {
        tree.insert(month);
        tree.check_consistency();
    }
    let listed: Vec<&str> = tree.iter().map(|entry| entry.token).collect();
    assert_eq!(
        listed,
        vec!["apr", "aug", "dec", "feb", "jan", "jul", "jun", "mar", "may", "nov", "oct", "sep"]
    );
    assert!(tree.iter().all(|entry| entry.count == 1));
}

#[test]
fn test_rbt_scenario() {
    let mut tree = RedBlackTree::new();
    for token in ["a", "a", "a"] {
        tree.insert(token);
    }
    tree.check_consistency();
    let listed: Vec<Entry> = tree.iter().collect();
    assert_eq!(listed, vec![Entry::new(1, "a", 3)]);
    assert_eq!(tree.root_color(), Some(Color::Black));
}

#[test]
fn test_skip_list_scenario() {
    for seed in 0..10 {
        let mut list = SkipList::with_seed(seed);
        let mut last_height = list.height();
        for i in 0..50 {
            list.insert(&format!("token{i}"));
            assert!(list.height() >= last_height);
            assert!(list.height() <= list.len());
            last_height = list.height();
        }
        list.check_consistency();
    }
}

#[test]
fn test_balanced_heights() {
    let mut all = All::new();
    for i in 0..N {
        all.insert(&format!("{i:05}"));
    }
    all.check_consistency();
    assert_eq!(all.bst.height(), N);
    assert!(all.avl.height() <= 15);
    assert!(all.rbt.height() <= 20);
    assert!(all.rbt.black_height() >= 5);
    assert!(all.skip_list.height() <= 32);
}

#[test]
fn test_unusual_tokens() {
    let long = "x".repeat(4096);
    let tokens = ["", " ", "Zebra", "apple", "\u{e9}t\u{e9}", long.as_str(), "", "apple"];
    let mut all = All::new();
    for token in tokens {
        all.insert(token);
        all.check_consistency();
    }
    let expected = expected_listing(&tokens);
    for index in all.indexes() {
        let listed: Vec<Entry> = index.entries().collect();
        assert_eq!(listed, expected);
        assert_eq!(index.get(""), Some(2));
    }
    // Byte order: uppercase before lowercase, multi-byte after ASCII
    assert_eq!(expected[2].token, "Zebra");
    assert_eq!(expected.last().map(|entry| entry.token), Some("\u{e9}t\u{e9}"));
}

#[test]
fn test_clear() {
    let tokens = random_tokens(2, N / 2, N / 8);
    for kind in Kind::ALL {
        let mut index = kind.build_seeded(0);
        for token in &tokens {
            index.insert(token);
        }
        assert!(!index.is_empty());
        index.clear();
        assert!(index.is_empty());
        assert_eq!(index.total(), 0);
        assert_eq!(index.entries().next(), None);
        for token in &tokens {
            index.insert(token);
        }
        assert_eq!(index.total(), tokens.len() as u64);
    }
}

#[test]
fn test_debug() {
    let expected = r#"{"a": 2, "b": 1}"#;
    let tokens = ["b", "a", "a"];
    assert_eq!(format!("{:?}", tokens.into_iter().collect::<BinarySearchTree>()), expected);
    assert_eq!(format!("{:?}", tokens.into_iter().collect::<AvlTree>()), expected);
    assert_eq!(format!("{:?}", tokens.into_iter().collect::<RedBlackTree>()), expected);
    assert_eq!(format!("{:?}", tokens.into_iter().collect::<SkipList>()), expected);
}

#[test]
fn test_mixed_workloads() {
    let sorted: Vec<String> = (0..200).map(|i| format!("{i:03}")).collect();
    let zig_zag: Vec<String> = (0..100)
        .flat_map(|i| [format!("{i:03}"), format!("{:03}", 199 - i)])
        .collect();
    let mut workloads = vec![sorted, zig_zag];
    for seed in 0..50 {
        workloads.push(random_tokens(seed, 200, 60));
    }

    for (seed, tokens) in workloads.iter().enumerate() {
        let tokens: Vec<&str> = tokens.iter().map(String::as_str).collect();
        let mut all = All::new();
        all.skip_list = SkipList::with_seed(seed as u64);
        for token in &tokens {
            all.insert(token);
            all.check_consistency();
        }
        let expected = expected_listing(&tokens);
        for index in all.indexes() {
            assert!(index.entries().eq(expected.iter().copied()));
        }
    }
}

#[test]
#[ignore]
fn test_large() {
    let tokens = random_tokens(0, LARGE_N, LARGE_N / 2);
    let mut avl = AvlTree::new();
    let mut rbt = RedBlackTree::new();
    let mut skip_list = SkipList::with_seed(0);
    for token in &tokens {
        avl.insert(token);
        rbt.insert(token);
        skip_list.insert(token);
    }
    avl.check_consistency();
    rbt.check_consistency();
    skip_list.check_consistency();
    assert!(avl.iter().eq(rbt.iter()));
    assert!(rbt.iter().eq(skip_list.iter()));
}

proptest! {
    #[test]
    fn prop_same_listing(tokens in prop::collection::vec("[a-e]{0,3}", 0..200), seed in any::<u64>()) {
        let tokens: Vec<&str> = tokens.iter().map(String::as_str).collect();
        let mut bst = BinarySearchTree::new();
        let mut avl = AvlTree::new();
        let mut rbt = RedBlackTree::new();
        let mut skip_list = SkipList::with_seed(seed);
        for token in &tokens {
            bst.insert(token);
            avl.insert(token);
            rbt.insert(token);
            skip_list.insert(token);
        }
        avl.check_consistency();
        rbt.check_consistency();
        skip_list.check_consistency();

        let expected = expected_listing(&tokens);
        prop_assert_eq!(bst.iter().collect::<Vec<_>>(), expected.clone());
        prop_assert_eq!(avl.iter().collect::<Vec<_>>(), expected.clone());
        prop_assert_eq!(rbt.iter().collect::<Vec<_>>(), expected.clone());
        prop_assert_eq!(skip_list.iter().collect::<Vec<_>>(), expected);
    }

    #[test]
    fn prop_counts_sum_to_inserts(tokens in prop::collection::vec("[a-z]{1,4}", 1..300)) {
        let mut rbt = RedBlackTree::new();
        let mut skip_list = SkipList::with_seed(0);
        for token in &tokens {
            rbt.insert(token);
            skip_list.insert(token);
        }
        let rbt_sum: u64 = rbt.iter().map(|entry| entry.count).sum();
        let skip_sum: u64 = skip_list.iter().map(|entry| entry.count).sum();
        prop_assert_eq!(rbt_sum, tokens.len() as u64);
        prop_assert_eq!(skip_sum, tokens.len() as u64);
        prop_assert!(skip_list.height() <= skip_list.len());
    }
}
