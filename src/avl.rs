//! Height-balanced AVL tree with per-node balance factors.

use std::cmp::{self, Ordering};
use std::fmt;
use std::iter::FromIterator;
use std::marker::PhantomData;
use std::ptr::NonNull;

use log::debug;

use crate::index::{Entries, Entry, WordIndex};

/// Word index backed by an AVL tree.
///
/// Every node carries a balance factor, the height of its left subtree minus the
/// height of its right subtree, which is always -1, 0 or +1 between operations.
/// Inserts restore balance with at most one single (LL, RR) or double (LR, RL)
/// rotation.
///
/// ```
/// use word_index::AvlTree;
/// let mut tree = AvlTree::new();
/// for token in ["a", "b", "c", "d", "e", "f", "g"] {
///     tree.insert(token);
/// }
/// assert_eq!(tree.height(), 3);
/// ```
pub struct AvlTree {
    root: Link,
    num_nodes: usize,
    num_words: u64,
}

struct Node {
    token: Box<str>,
    count: u64,
    left: Link,
    right: Link,
    balance: i8,
}

type NodePtr = NonNull<Node>;
type Link = Option<NodePtr>;

/// Balance factor of a node whose left subtree is one level taller.
const LEFT_HEAVY: i8 = 1;
/// Balance factor of a node whose right subtree is one level taller.
const RIGHT_HEAVY: i8 = -1;

/// An iterator over the entries of an AVL tree, in ascending order.
pub struct Iter<'a> {
    stack: Vec<NodePtr>,
    rank: usize,
    remaining: usize,
    marker: PhantomData<&'a Node>,
}

impl AvlTree {
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
    ///
    /// Follows the taller child at every level as told by the balance factors,
    /// so this takes logarithmic time.
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut current = self.root;
        while let Some(node_ptr) = current {
            height += 1;
            let node = unsafe { node_ptr.as_ref() };
            current = if node.balance == RIGHT_HEAVY {
                node.right
            } else {
                node.left
            };
        }
        height
    }

    /// Clears the tree, deallocating all memory.
    pub fn clear(&mut self) {
        let mut stack: Vec<NodePtr> = self.root.take().into_iter().collect();
        while let Some(node_ptr) = stack.pop() {
            unsafe {
                stack.extend(node_ptr.as_ref().left);
                stack.extend(node_ptr.as_ref().right);
                Node::destroy(node_ptr);
            }
        }
        self.num_nodes = 0;
        self.num_words = 0;
    }

    /// Returns the occurrence count of a token.
    pub fn get(&self, token: &str) -> Option<u64> {
        let mut current = self.root;
        while let Some(node_ptr) = current {
            let node = unsafe { node_ptr.as_ref() };
            current = match token.cmp(&*node.token) {
                Ordering::Equal => return Some(node.count),
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
            };
        }
        None
    }

    /// Returns true if the token has been inserted.
    pub fn contains(&self, token: &str) -> bool {
        self.get(token).is_some()
    }

    /// Inserts a token, or increments its count if already present.
    ///
    /// Repeated tokens never change the shape of the tree.
    pub fn insert(&mut self, token: &str) {
        self.num_words += 1;
        let root_ptr = match self.root {
            None => {
                self.root = Some(Node::create(token));
                self.num_nodes += 1;
                return;
            }
            Some(root_ptr) => root_ptr,
        };

        unsafe {
            // Descend to the insert position. The pivot is the deepest node on the
            // path with a non-zero balance factor, the only place a rotation can be
            // needed; pivot_child is the next node on the path below it.
            let mut pivot_ptr = root_ptr;
            let mut pivot_parent: Link = None;
            let mut pivot_child: Link = None;
            let mut parent: Link = None;
            let mut node_ptr = root_ptr;
            loop {
                let node = &mut *node_ptr.as_ptr();
                let ordering = token.cmp(&*node.token);
                if ordering == Ordering::Equal {
                    node.count += 1;
                    return;
                }
                if node.balance != 0 {
                    pivot_ptr = node_ptr;
                    pivot_parent = parent;
                }
                let next = match ordering {
                    Ordering::Less => node.left,
                    _ => node.right,
                };
                if node_ptr == pivot_ptr {
                    pivot_child = next;
                }
                parent = Some(node_ptr);
                match next {
                    Some(next_ptr) => node_ptr = next_ptr,
                    None => break,
                }
            }

            // Attach the new leaf
            let new_ptr = Node::create(token);
            let leaf_parent = &mut *node_ptr.as_ptr();
            if token < &*leaf_parent.token {
                leaf_parent.left = Some(new_ptr);
            } else {
                leaf_parent.right = Some(new_ptr);
            }
            self.num_nodes += 1;

            let pivot = &mut *pivot_ptr.as_ptr();
            let child_ptr = pivot_child.unwrap_or(new_ptr);
            let direction = if token < &*pivot.token {
                LEFT_HEAVY
            } else {
                RIGHT_HEAVY
            };

            // Everything strictly between pivot and the new leaf was balanced and now
            // leans towards the leaf.
            let mut walk_ptr = child_ptr;
            while walk_ptr != new_ptr {
                let walk = &mut *walk_ptr.as_ptr();
                let next = if token < &*walk.token {
                    walk.balance = LEFT_HEAVY;
                    walk.left
                } else {
                    walk.balance = RIGHT_HEAVY;
                    walk.right
                };
                match next {
                    Some(next_ptr) => walk_ptr = next_ptr,
                    None => break,
                }
            }

            if pivot.balance == 0 {
                // Pivot is the root and absorbs the height increase
                pivot.balance = direction;
                return;
            }
            if pivot.balance == -direction {
                // Insert went into the shorter side
                pivot.balance = 0;
                return;
            }

            let subtree_ptr = if direction == LEFT_HEAVY {
                Self::rotate_left_heavy(pivot_ptr, child_ptr)
            } else {
                Self::rotate_right_heavy(pivot_ptr, child_ptr)
            };

            match pivot_parent {
                None => self.root = Some(subtree_ptr),
                Some(parent_ptr) => {
                    let parent = &mut *parent_ptr.as_ptr();
                    if parent.left == Some(pivot_ptr) {
                        parent.left = Some(subtree_ptr);
                    } else {
                        debug_assert!(parent.right == Some(pivot_ptr));
                        parent.right = Some(subtree_ptr);
                    }
                }
            }
        }
    }

    /// Restores balance at a pivot whose left subtree grew two levels taller than
    /// its right one, with an LL or LR rotation. Returns the new subtree root.
    fn rotate_left_heavy(a_ptr: NodePtr, b_ptr: NodePtr) -> NodePtr {
        unsafe {
            let a = &mut *a_ptr.as_ptr();
            let b = &mut *b_ptr.as_ptr();
            debug_assert!(a.left == Some(b_ptr));
            debug_assert!(b.balance != 0);
            match b.right {
                Some(c_ptr) if b.balance == RIGHT_HEAVY => {
                    debug!("LR rotation at {:?} through {:?}", a.token, b.token);
                    let c = &mut *c_ptr.as_ptr();
                    b.right = c.left;
                    a.left = c.right;
                    c.left = Some(b_ptr);
                    c.right = Some(a_ptr);
                    let (a_balance, b_balance) = match c.balance {
                        LEFT_HEAVY => (RIGHT_HEAVY, 0),
                        RIGHT_HEAVY => (0, LEFT_HEAVY),
                        _ => (0, 0),
                    };
                    a.balance = a_balance;
                    b.balance = b_balance;
                    c.balance = 0;
                    c_ptr
                }
                _ => {
                    debug!("LL rotation at {:?}", a.token);
                    a.left = b.right;
                    b.right = Some(a_ptr);
                    a.balance = 0;
                    b.balance = 0;
                    b_ptr
                }
            }
        }
    }

    /// Mirror of `rotate_left_heavy`: RR or RL rotation.
    fn rotate_right_heavy(a_ptr: NodePtr, b_ptr: NodePtr) -> NodePtr {
        unsafe {
            let a = &mut *a_ptr.as_ptr();
            let b = &mut *b_ptr.as_ptr();
            debug_assert!(a.right == Some(b_ptr));
            debug_assert!(b.balance != 0);
            match b.left {
                Some(c_ptr) if b.balance == LEFT_HEAVY => {
                    debug!("RL rotation at {:?} through {:?}", a.token, b.token);
                    let c = &mut *c_ptr.as_ptr();
                    b.left = c.right;
                    a.right = c.left;
                    c.right = Some(b_ptr);
                    c.left = Some(a_ptr);
                    let (a_balance, b_balance) = match c.balance {
                        LEFT_HEAVY => (0, RIGHT_HEAVY),
                        RIGHT_HEAVY => (LEFT_HEAVY, 0),
                        _ => (0, 0),
                    };
                    a.balance = a_balance;
                    b.balance = b_balance;
                    c.balance = 0;
                    c_ptr
                }
                _ => {
                    debug!("RR rotation at {:?}", a.token);
                    a.right = b.left;
                    b.left = Some(a_ptr);
                    a.balance = 0;
                    b.balance = 0;
                    b_ptr
                }
            }
        }
    }

    /// Gets an iterator over the entries of the tree, in ascending token order.
    pub fn iter(&self) -> Iter<'_> {
        Iter::new(self.root, self.num_nodes)
    }

    #[cfg(test)]
    fn root_token(&self) -> Option<&str> {
        self.root.map(|root_ptr| unsafe { &*(*root_ptr.as_ptr()).token })
    }

    #[cfg(any(test, feature = "consistency_check"))]
    pub fn check_consistency(&self) {
        // Returns subtree height
        fn check_node(link: Link, num_nodes: &mut usize, num_words: &mut u64) -> usize {
            let node_ptr = match link {
                None => return 0,
                Some(node_ptr) => node_ptr,
            };
            let node = unsafe { node_ptr.as_ref() };

            // Check links to child nodes
            if let Some(left_ptr) = node.left {
                assert!(unsafe { left_ptr.as_ref() }.token < node.token);
            }
            if let Some(right_ptr) = node.right {
                assert!(unsafe { right_ptr.as_ref() }.token > node.token);
            }
            assert!(node.count >= 1);

            let left_height = check_node(node.left, num_nodes, num_words);
            let right_height = check_node(node.right, num_nodes, num_words);

            // Check balance factor and AVL condition
            assert_eq!(node.balance as isize, left_height as isize - right_height as isize);
            assert!(left_height <= right_height + 1);
            assert!(right_height <= left_height + 1);

            *num_nodes += 1;
            *num_words += node.count;
            cmp::max(left_height, right_height) + 1
        }

        let mut num_nodes = 0;
        let mut num_words = 0;
        let height = check_node(self.root, &mut num_nodes, &mut num_words);
        assert_eq!(height, self.height());
        assert_eq!(num_nodes, self.num_nodes);
        assert_eq!(num_words, self.num_words);

        let mut prev: Option<&str> = None;
        for entry in self.iter() {
            if let Some(prev) = prev {
                assert!(prev < entry.token);
            }
            prev = Some(entry.token);
        }
    }
}

impl Node {
    fn create(token: &str) -> NodePtr {
        let boxed = Box::new(Node {
            token: token.into(),
            count: 1,
            left: None,
            right: None,
            balance: 0,
        });
        unsafe { NodePtr::new_unchecked(Box::into_raw(boxed)) }
    }

    unsafe fn destroy(node_ptr: NodePtr) {
        drop(Box::from_raw(node_ptr.as_ptr()));
    }
}

impl Drop for AvlTree {
    fn drop(&mut self) {
        self.clear();
    }
}

impl Default for AvlTree {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AvlTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.iter().map(|entry| (entry.token, entry.count)))
            .finish()
    }
}

impl<'t> Extend<&'t str> for AvlTree {
    fn extend<I: IntoIterator<Item = &'t str>>(&mut self, tokens: I) {
        for token in tokens {
            self.insert(token);
        }
    }
}

impl<'t> FromIterator<&'t str> for AvlTree {
    fn from_iter<I: IntoIterator<Item = &'t str>>(tokens: I) -> Self {
        let mut tree = Self::new();
        tree.extend(tokens);
        tree
    }
}

impl<'a> IntoIterator for &'a AvlTree {
    type Item = Entry<'a>;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl WordIndex for AvlTree {
    fn insert(&mut self, token: &str) {
        AvlTree::insert(self, token);
    }

    fn get(&self, token: &str) -> Option<u64> {
        AvlTree::get(self, token)
    }

    fn len(&self) -> usize {
        self.num_nodes
    }

    fn total(&self) -> u64 {
        self.num_words
    }

    fn height(&self) -> usize {
        AvlTree::height(self)
    }

    fn clear(&mut self) {
        AvlTree::clear(self);
    }

    fn entries(&self) -> Entries<'_> {
        Box::new(self.iter())
    }
}

impl<'a> Iter<'a> {
    fn new(root: Link, len: usize) -> Self {
        let mut iter = Self {
            stack: Vec::new(),
            rank: 0,
            remaining: len,
            marker: PhantomData,
        };
        iter.push_left_spine(root);
        iter
    }

    fn push_left_spine(&mut self, mut link: Link) {
        while let Some(node_ptr) = link {
            self.stack.push(node_ptr);
            link = unsafe { node_ptr.as_ref().left };
        }
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = Entry<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let node_ptr = self.stack.pop()?;
        let node: &'a Node = unsafe { &*node_ptr.as_ptr() };
        self.push_left_spine(node.right);
        self.rank += 1;
        self.remaining -= 1;
        Some(Entry::new(self.rank, &node.token, node.count))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Iter<'_> {}
