//! Skip list of sentinel-bounded lanes, stored in an index arena.
//!
//! ```text
//! lane 2: -inf ------------------> fox ----------------> +inf
//! lane 1: -inf ------> cat ------> fox ------> owl ----> +inf
//! lane 0: -inf -> ant -> cat -> dog -> fox -> gnu -> owl -> +inf
//! ```
//!
//! Lane 0 holds every distinct token together with its count. Each node above it
//! is a tower copy linked `down` to the node below and `up` from it; the node
//! graph is a mesh of plain indices into one arena owned by the list.

use std::fmt;
use std::iter::FromIterator;

use log::{debug, trace};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::error::{Error, Result};
use crate::index::{Entries, Entry, WordIndex};

/// Default cap on the number of lanes.
pub const DEFAULT_MAX_HEIGHT: usize = 32;

/// Construction parameters for a [`SkipList`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkipListConfig {
    /// Seed for the coin flips deciding promotions. `None` seeds from OS entropy.
    pub seed: Option<u64>,
    /// Upper bound on the number of lanes. Must be at least 1.
    pub max_height: usize,
}

impl Default for SkipListConfig {
    fn default() -> Self {
        Self {
            seed: None,
            max_height: DEFAULT_MAX_HEIGHT,
        }
    }
}

impl SkipListConfig {
    /// Makes the coin flips reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the cap on the number of lanes.
    pub fn with_max_height(mut self, max_height: usize) -> Self {
        self.max_height = max_height;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.max_height == 0 {
            return Err(Error::InvalidMaxHeight(self.max_height));
        }
        Ok(())
    }
}

/// Word index backed by a skip list.
///
/// A new token is promoted into each further lane with probability 1/2. A tower
/// never reaches more lanes than the configured cap, nor more lanes than there
/// are distinct tokens, so `height() <= max(1, len())` always holds. Lanes are
/// added on demand and never removed until the list is cleared.
///
/// ```
/// use word_index::SkipList;
/// let mut list = SkipList::with_seed(7);
/// for token in "the quick brown fox jumps over the lazy dog".split(' ') {
///     list.insert(token);
/// }
/// assert_eq!(list.get("the"), Some(2));
/// assert_eq!(list.len(), 8);
/// assert!(list.height() <= list.len());
/// ```
pub struct SkipList {
    nodes: Vec<Node>,
    head: Idx,
    tail: Idx,
    bottom_head: Idx,
    height: usize,
    num_items: usize,
    num_words: u64,
    max_height: usize,
    rng: StdRng,
}

/// Arena index.
type Idx = usize;

/// Missing link marker.
const NULL: Idx = Idx::MAX;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Key {
    NegInf,
    Token(Box<str>),
    PosInf,
}

struct Node {
    key: Key,
    /// Occurrences; only meaningful in lane 0.
    count: u64,
    left: Idx,
    right: Idx,
    up: Idx,
    down: Idx,
}

/// An iterator over the entries of a skip list, in ascending order.
pub struct Iter<'a> {
    list: &'a SkipList,
    next: Idx,
    rank: usize,
}

impl SkipList {
    /// Creates an empty list with one lane, seeding its coin flips from OS entropy.
    pub fn new() -> Self {
        Self::from_parts(DEFAULT_MAX_HEIGHT, StdRng::from_entropy())
    }

    /// Creates an empty list whose promotions are reproducible for a given seed.
    pub fn with_seed(seed: u64) -> Self {
        Self::from_parts(DEFAULT_MAX_HEIGHT, StdRng::seed_from_u64(seed))
    }

    /// Creates an empty list from an explicit configuration.
    pub fn with_config(config: SkipListConfig) -> Result<Self> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self::from_parts(config.max_height, rng))
    }

    fn from_parts(max_height: usize, rng: StdRng) -> Self {
        let mut list = Self {
            nodes: Vec::new(),
            head: NULL,
            tail: NULL,
            bottom_head: NULL,
            height: 0,
            num_items: 0,
            num_words: 0,
            max_height,
            rng,
        };
        list.add_lane();
        list
    }

    /// Returns true if the list contains no tokens.
    pub fn is_empty(&self) -> bool {
        self.num_items == 0
    }

    /// Returns the number of distinct tokens.
    pub fn len(&self) -> usize {
        self.num_items
    }

    /// Returns the number of inserts, duplicates included.
    pub fn total(&self) -> u64 {
        self.num_words
    }

    /// Returns the number of lanes, at least 1.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the configured cap on the number of lanes.
    pub fn max_height(&self) -> usize {
        self.max_height
    }

    /// Clears the list back to a single empty lane, deallocating all memory.
    /// The coin flip sequence carries on where it left off.
    pub fn clear(&mut self) {
        self.nodes = Vec::new();
        self.head = NULL;
        self.tail = NULL;
        self.bottom_head = NULL;
        self.height = 0;
        self.num_items = 0;
        self.num_words = 0;
        self.add_lane();
    }

    /// Returns the occurrence count of a token.
    pub fn get(&self, token: &str) -> Option<u64> {
        match self.search(token) {
            (index, true) => Some(self.nodes[index].count),
            (_, false) => None,
        }
    }

    /// Returns true if the token has been inserted.
    pub fn contains(&self, token: &str) -> bool {
        self.search(token).1
    }

    /// Inserts a token, or increments its count if already present.
    pub fn insert(&mut self, token: &str) {
        self.num_words += 1;
        let (found_at, found) = self.search(token);
        if found {
            self.nodes[found_at].count += 1;
            return;
        }

        let new = self.alloc(Key::Token(token.into()), 1);
        let right = self.nodes[found_at].right;
        self.splice(found_at, new, right);
        self.num_items += 1;

        // Flip coins to build the tower
        let max_lanes = self.max_height.min(self.num_items);
        let mut below = new;
        let mut lanes = 1;
        while lanes < max_lanes && self.rng.gen::<bool>() {
            lanes += 1;
            if lanes > self.height {
                self.add_lane();
            }

            // Nearest nodes on either side that reach into the lane above
            let mut left = self.nodes[below].left;
            while self.nodes[left].up == NULL {
                left = self.nodes[left].left;
            }
            let mut right = self.nodes[below].right;
            while self.nodes[right].up == NULL {
                right = self.nodes[right].right;
            }
            let (left, right) = (self.nodes[left].up, self.nodes[right].up);

            let tower = self.alloc(Key::Token(token.into()), 0);
            self.splice(left, tower, right);
            self.nodes[tower].down = below;
            self.nodes[below].up = tower;
            trace!("promoted {token:?} into lane {}", lanes - 1);
            below = tower;
        }
    }

    /// Gets an iterator over the entries of the list, in ascending token order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            list: self,
            next: self.nodes[self.bottom_head].right,
            rank: 0,
        }
    }

    /// Returns the lane 0 node holding the token and `true`, or the lane 0 node
    /// the token would follow and `false`.
    fn search(&self, token: &str) -> (Idx, bool) {
        let mut current = self.head;
        loop {
            loop {
                let right = self.nodes[current].right;
                if self.nodes[right].key.at_most(token) {
                    current = right;
                } else {
                    break;
                }
            }
            if self.nodes[current].key.is(token) {
                while self.nodes[current].down != NULL {
                    current = self.nodes[current].down;
                }
                return (current, true);
            }
            if self.nodes[current].down == NULL {
                return (current, false);
            }
            current = self.nodes[current].down;
        }
    }

    fn alloc(&mut self, key: Key, count: u64) -> Idx {
        self.nodes.push(Node::new(key, count));
        self.nodes.len() - 1
    }

    fn splice(&mut self, left: Idx, node: Idx, right: Idx) {
        debug_assert_eq!(self.nodes[left].right, right);
        self.nodes[node].left = left;
        self.nodes[node].right = right;
        self.nodes[left].right = node;
        self.nodes[right].left = node;
    }

    /// Puts a new empty lane on top, its sentinels stacked on the current top ones.
    fn add_lane(&mut self) {
        let head = self.alloc(Key::NegInf, 0);
        let tail = self.alloc(Key::PosInf, 0);
        self.nodes[head].right = tail;
        self.nodes[tail].left = head;
        if self.height == 0 {
            self.bottom_head = head;
        } else {
            self.nodes[head].down = self.head;
            self.nodes[tail].down = self.tail;
            self.nodes[self.head].up = head;
            self.nodes[self.tail].up = tail;
            debug!("skip list grew to {} lanes", self.height + 1);
        }
        self.head = head;
        self.tail = tail;
        self.height += 1;
    }

    #[cfg(test)]
    fn lane_tokens(&self, lane: usize) -> Vec<&str> {
        let mut lane_head = self.bottom_head;
        for _ in 0..lane {
            lane_head = self.nodes[lane_head].up;
        }
        let mut tokens = Vec::new();
        let mut current = self.nodes[lane_head].right;
        while let Key::Token(token) = &self.nodes[current].key {
            tokens.push(&**token);
            current = self.nodes[current].right;
        }
        tokens
    }

    #[cfg(any(test, feature = "consistency_check"))]
    pub fn check_consistency(&self) {
        let mut num_nodes = 0;
        let mut num_items = 0;
        let mut num_words = 0;
        let mut lane_head = self.bottom_head;
        let mut top_head = NULL;
        for lane in 0..self.height {
            let head = &self.nodes[lane_head];
            assert_eq!(head.key, Key::NegInf);
            assert_eq!(head.left, NULL);
            if lane == 0 {
                assert_eq!(head.down, NULL);
            } else {
                assert_eq!(self.nodes[head.down].up, lane_head);
            }

            // Walk the lane
            let mut prev = lane_head;
            let mut current = head.right;
            loop {
                let node = &self.nodes[current];
                assert_eq!(node.left, prev);
                assert!(self.nodes[prev].key < node.key);
                num_nodes += 1;
                if node.key == Key::PosInf {
                    assert_eq!(node.right, NULL);
                    break;
                }
                if lane == 0 {
                    assert_eq!(node.down, NULL);
                    assert!(node.count >= 1);
                    num_items += 1;
                    num_words += node.count;
                } else {
                    // Every token in this lane is in the lane below
                    let down = &self.nodes[node.down];
                    assert_eq!(down.up, current);
                    assert_eq!(down.key, node.key);
                    assert_eq!(node.count, 0);
                }
                if node.up != NULL {
                    assert_eq!(self.nodes[node.up].down, current);
                }
                prev = current;
                current = node.right;
            }
            num_nodes += 1;

            top_head = lane_head;
            lane_head = head.up;
        }
        assert_eq!(lane_head, NULL);
        assert_eq!(top_head, self.head);
        let mut current = self.nodes[self.head].right;
        while current != self.tail {
            assert_eq!(self.nodes[current].up, NULL);
            current = self.nodes[current].right;
        }
        assert_eq!(self.nodes[self.tail].up, NULL);

        assert_eq!(num_nodes, self.nodes.len());
        assert_eq!(num_items, self.num_items);
        assert_eq!(num_words, self.num_words);
        assert!(self.height >= 1);
        assert!(self.height <= self.max_height.max(1));
        assert!(self.height <= self.num_items.max(1));
    }
}

impl Key {
    /// True for sentinels at negative infinity and tokens not greater than `token`.
    fn at_most(&self, token: &str) -> bool {
        match self {
            Key::NegInf => true,
            Key::Token(own) => &**own <= token,
            Key::PosInf => false,
        }
    }

    fn is(&self, token: &str) -> bool {
        matches!(self, Key::Token(own) if &**own == token)
    }
}

impl PartialOrd for Key {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Key {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use std::cmp::Ordering;

        match (self, other) {
            (Key::Token(lhs), Key::Token(rhs)) => lhs.cmp(rhs),
            (Key::NegInf, Key::NegInf) | (Key::PosInf, Key::PosInf) => Ordering::Equal,
            (Key::NegInf, _) | (_, Key::PosInf) => Ordering::Less,
            (_, Key::NegInf) | (Key::PosInf, _) => Ordering::Greater,
        }
    }
}

impl Node {
    fn new(key: Key, count: u64) -> Self {
        Self {
            key,
            count,
            left: NULL,
            right: NULL,
            up: NULL,
            down: NULL,
        }
    }
}

impl Default for SkipList {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SkipList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.iter().map(|entry| (entry.token, entry.count)))
            .finish()
    }
}

impl<'t> Extend<&'t str> for SkipList {
    fn extend<I: IntoIterator<Item = &'t str>>(&mut self, tokens: I) {
        for token in tokens {
            self.insert(token);
        }
    }
}

impl<'t> FromIterator<&'t str> for SkipList {
    fn from_iter<I: IntoIterator<Item = &'t str>>(tokens: I) -> Self {
        let mut list = Self::new();
        list.extend(tokens);
        list
    }
}

impl<'a> IntoIterator for &'a SkipList {
    type Item = Entry<'a>;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl WordIndex for SkipList {
    fn insert(&mut self, token: &str) {
        SkipList::insert(self, token);
    }

    fn get(&self, token: &str) -> Option<u64> {
        SkipList::get(self, token)
    }

    fn len(&self) -> usize {
        self.num_items
    }

    fn total(&self) -> u64 {
        self.num_words
    }

    fn height(&self) -> usize {
        self.height
    }

    fn clear(&mut self) {
        SkipList::clear(self);
    }

    fn entries(&self) -> Entries<'_> {
        Box::new(self.iter())
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = Entry<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = &self.list.nodes[self.next];
        match &node.key {
            Key::Token(token) => {
                self.next = node.right;
                self.rank += 1;
                Some(Entry::new(self.rank, token, node.count))
            }
            _ => None,
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.list.num_items - self.rank;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Iter<'_> {}
