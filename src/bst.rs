//! Unbalanced binary search tree.

use std::cmp::{self, Ordering};
use std::fmt;
use std::iter::FromIterator;

use crate::index::{Entries, Entry, WordIndex};

/// Word index backed by a plain binary search tree.
///
/// No rebalancing takes place, so sorted input degenerates the tree into a list.
/// Traversal and teardown use explicit stacks, so even a degenerate tree is safe
/// to walk and drop.
///
/// ```
/// use word_index::BinarySearchTree;
/// let mut tree = BinarySearchTree::new();
/// tree.insert("b");
/// tree.insert("a");
/// tree.insert("b");
/// assert_eq!(tree.get("b"), Some(2));
/// assert_eq!(tree.len(), 2);
/// ```
pub struct BinarySearchTree {
    root: Link,
    num_nodes: usize,
    num_words: u64,
}

type Link = Option<Box<Node>>;

struct Node {
    token: Box<str>,
    count: u64,
    left: Link,
    right: Link,
}

/// An iterator over the entries of a binary search tree, in ascending order.
pub struct Iter<'a> {
    stack: Vec<&'a Node>,
    rank: usize,
    remaining: usize,
}

impl BinarySearchTree {
    /// Creates an empty tree.
    /// No memory is allocated until the first token is inserted.
    pub fn new() -> Self {
        Self {
            root: None,
            num_nodes: 0,
            num_words: 0,
        }
    }

    /// Returns true if the tree contains no tokens.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns the number of distinct tokens.
    pub fn len(&self) -> usize {
        self.num_nodes
    }

    /// Returns the number of inserts, duplicates included.
    pub fn total(&self) -> u64 {
        self.num_words
    }

    /// Returns the number of levels of the tree.
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut stack: Vec<(&Node, usize)> = Vec::new();
        if let Some(root) = self.root.as_deref() {
            stack.push((root, 1));
        }
        while let Some((node, depth)) = stack.pop() {
            height = cmp::max(height, depth);
            if let Some(left) = node.left.as_deref() {
                stack.push((left, depth + 1));
            }
            if let Some(right) = node.right.as_deref() {
                stack.push((right, depth + 1));
            }
        }
        height
    }

    /// Clears the tree, deallocating all memory.
    pub fn clear(&mut self) {
        let mut stack: Vec<Box<Node>> = self.root.take().into_iter().collect();
        while let Some(mut node) = stack.pop() {
            stack.extend(node.left.take());
            stack.extend(node.right.take());
        }
        self.num_nodes = 0;
        self.num_words = 0;
    }

    /// Returns the occurrence count of a token.
    pub fn get(&self, token: &str) -> Option<u64> {
        let mut current = self.root.as_deref();
        while let Some(node) = current {
            current = match token.cmp(&*node.token) {
                Ordering::Equal => return Some(node.count),
                Ordering::Less => node.left.as_deref(),
                Ordering::Greater => node.right.as_deref(),
            };
        }
        None
    }

    /// Returns true if the token has been inserted.
    pub fn contains(&self, token: &str) -> bool {
        self.get(token).is_some()
    }

    /// Inserts a token as a new leaf, or increments its count if already present.
    pub fn insert(&mut self, token: &str) {
        self.num_words += 1;
        let mut link = &mut self.root;
        while let Some(node) = link {
            match token.cmp(&*node.token) {
                Ordering::Equal => {
                    node.count += 1;
                    return;
                }
                Ordering::Less => link = &mut node.left,
                Ordering::Greater => link = &mut node.right,
            }
        }
        *link = Some(Box::new(Node::new(token)));
        self.num_nodes += 1;
    }

    /// Gets an iterator over the entries of the tree, in ascending token order.
    pub fn iter(&self) -> Iter<'_> {
        Iter::new(self.root.as_deref(), self.num_nodes)
    }

    #[cfg(any(test, feature = "consistency_check"))]
    pub fn check_consistency(&self) {
        let mut num_nodes = 0;
        let mut num_words = 0;
        let mut prev: Option<&str> = None;
        for entry in self.iter() {
            if let Some(prev) = prev {
                assert!(prev < entry.token);
            }
            assert!(entry.count >= 1);
            num_nodes += 1;
            num_words += entry.count;
            assert_eq!(entry.rank, num_nodes);
            prev = Some(entry.token);
        }
        assert_eq!(num_nodes, self.num_nodes);
        assert_eq!(num_words, self.num_words);
        assert_eq!(self.root.is_none(), self.num_nodes == 0);
    }
}

impl Node {
    fn new(token: &str) -> Self {
        Self {
            token: token.into(),
            count: 1,
            left: None,
            right: None,
        }
    }
}

impl Drop for BinarySearchTree {
    fn drop(&mut self) {
        self.clear();
    }
}

impl Default for BinarySearchTree {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for BinarySearchTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.iter().map(|entry| (entry.token, entry.count)))
            .finish()
    }
}

impl<'t> Extend<&'t str> for BinarySearchTree {
    fn extend<I: IntoIterator<Item = &'t str>>(&mut self, tokens: I) {
        for token in tokens {
            self.insert(token);
        }
    }
}

impl<'t> FromIterator<&'t str> for BinarySearchTree {
    fn from_iter<I: IntoIterator<Item = &'t str>>(tokens: I) -> Self {
        let mut tree = Self::new();
        tree.extend(tokens);
        tree
    }
}

impl<'a> IntoIterator for &'a BinarySearchTree {
    type Item = Entry<'a>;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl WordIndex for BinarySearchTree {
    fn insert(&mut self, token: &str) {
        BinarySearchTree::insert(self, token);
    }

    fn get(&self, token: &str) -> Option<u64> {
        BinarySearchTree::get(self, token)
    }

    fn len(&self) -> usize {
        self.num_nodes
    }

    fn total(&self) -> u64 {
        self.num_words
    }

    fn height(&self) -> usize {
        BinarySearchTree::height(self)
    }

    fn clear(&mut self) {
        BinarySearchTree::clear(self);
    }

    fn entries(&self) -> Entries<'_> {
        Box::new(self.iter())
    }
}

impl<'a> Iter<'a> {
    fn new(root: Option<&'a Node>, len: usize) -> Self {
        let mut iter = Self {
            stack: Vec::new(),
            rank: 0,
            remaining: len,
        };
        iter.push_left_spine(root);
        iter
    }

    fn push_left_spine(&mut self, mut link: Option<&'a Node>) {
        while let Some(node) = link {
            self.stack.push(node);
            link = node.left.as_deref();
        }
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = Entry<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_left_spine(node.right.as_deref());
        self.rank += 1;
        self.remaining -= 1;
        Some(Entry::new(self.rank, &node.token, node.count))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Iter<'_> {}

#[cfg(test)]
mod tests {
    use super::BinarySearchTree;
    use crate::index::Entry;

    #[test]
    fn test_new() {
        let tree = BinarySearchTree::new();
        assert!(tree.is_empty());
        assert_eq!(tree.height(), 0);
        assert_eq!(tree.iter().next(), None);
        tree.check_consistency();
    }

    #[test]
    fn test_list_three() {
        let mut tree = BinarySearchTree::new();
        for token in ["b", "a", "c"] {
            tree.insert(token);
            tree.check_consistency();
        }
        let listed: Vec<Entry> = tree.iter().collect();
        assert_eq!(
            listed,
            vec![Entry::new(1, "a", 1), Entry::new(2, "b", 1), Entry::new(3, "c", 1)]
        );
        assert_eq!(tree.height(), 2);
    }

    #[test]
    fn test_duplicates_keep_shape() {
        let mut tree = BinarySearchTree::new();
        tree.extend(["m", "f", "t"]);
        let height = tree.height();
        for _ in 0..10 {
            tree.insert("f");
        }
        assert_eq!(tree.height(), height);
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.total(), 13);
        assert_eq!(tree.get("f"), Some(11));
        assert_eq!(tree.get("z"), None);
        tree.check_consistency();
    }

    #[test]
    fn test_sorted_input_degenerates() {
        const N: usize = 2_000;
        let tokens: Vec<String> = (0..N).map(|i| format!("{i:05}")).collect();
        let mut tree = BinarySearchTree::new();
        for token in &tokens {
            tree.insert(token);
        }
        tree.check_consistency();
        assert_eq!(tree.len(), N);
        assert_eq!(tree.height(), N);
        for (entry, token) in tree.iter().zip(&tokens) {
            assert_eq!(entry.token, token.as_str());
        }
        assert_eq!(tree.iter().len(), N);
    }

    #[test]
    fn test_clear() {
        let mut tree: BinarySearchTree = ["x", "y", "x"].into_iter().collect();
        assert_eq!(tree.total(), 3);
        tree.clear();
        assert!(tree.is_empty());
        assert_eq!(tree.total(), 0);
        tree.insert("y");
        assert_eq!(tree.get("y"), Some(1));
        tree.check_consistency();
    }

    #[test]
    fn test_debug() {
        let tree: BinarySearchTree = ["b", "a", "b"].into_iter().collect();
        assert_eq!(format!("{tree:?}"), r#"{"a": 1, "b": 2}"#);
    }
}
