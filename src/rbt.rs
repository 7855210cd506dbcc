//! Red-black tree stored in an index arena with a shared black sentinel.

use std::cell::Cell;
use std::cmp::Ordering;
use std::fmt;
use std::iter::FromIterator;

use log::trace;

use crate::index::{Entries, Entry, WordIndex};

/// Word index backed by a red-black tree.
///
/// Nodes live in an arena and refer to their parent and children by index.
/// Slot 0 is the sentinel: it is black, links to itself, and stands in for every
/// absent child as well as the parent of the root.
///
/// ```
/// use word_index::RedBlackTree;
/// let mut tree = RedBlackTree::new();
/// tree.insert("a");
/// tree.insert("a");
/// tree.insert("a");
/// assert_eq!(tree.get("a"), Some(3));
/// assert_eq!(tree.len(), 1);
/// ```
pub struct RedBlackTree {
    nodes: Vec<Node>,
    root: usize,
    num_words: u64,
}

/// Node color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Red,
    Black,
}

struct Node {
    token: Box<str>,
    count: u64,
    color: Color,
    parent: usize,
    left: usize,
    right: usize,
}

/// Arena slot of the sentinel.
const NIL: usize = 0;

/// An iterator over the entries of a red-black tree, in ascending order.
pub struct Iter<'a> {
    tree: &'a RedBlackTree,
    next: usize,
    rank: usize,
}

#[derive(Clone, Copy)]
#[allow(clippy::enum_variant_names)]
enum Direction {
    FromParent,
    FromLeft,
    FromRight,
}

impl RedBlackTree {
    /// Creates an empty tree holding only the sentinel.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::sentinel()],
            root: NIL,
            num_words: 0,
        }
    }

    /// Returns true if the tree contains no tokens.
    pub fn is_empty(&self) -> bool {
        self.root == NIL
    }

    /// Returns the number of distinct tokens.
    pub fn len(&self) -> usize {
        self.nodes.len() - 1
    }

    /// Returns the number of inserts, duplicates included.
    pub fn total(&self) -> u64 {
        self.num_words
    }

    /// Returns the number of levels of the tree.
    pub fn height(&self) -> usize {
        let depth = Cell::new(0);
        let mut height = 0;
        self.traverse(
            |_| {
                depth.set(depth.get() + 1);
                height = height.max(depth.get());
            },
            |_| {},
            |_| depth.set(depth.get() - 1),
        );
        height
    }

    /// Returns the number of black nodes on any path from the root down to the
    /// sentinel, the root included.
    pub fn black_height(&self) -> usize {
        let mut black_height = 0;
        let mut current = self.root;
        while current != NIL {
            if self.nodes[current].color == Color::Black {
                black_height += 1;
            }
            current = self.nodes[current].left;
        }
        black_height
    }

    /// Returns the color of the root, or `None` for an empty tree.
    pub fn root_color(&self) -> Option<Color> {
        if self.root == NIL {
            None
        } else {
            Some(self.nodes[self.root].color)
        }
    }

    /// Clears the tree, deallocating all memory except the sentinel.
    pub fn clear(&mut self) {
        self.nodes.truncate(1);
        self.nodes.shrink_to_fit();
        self.root = NIL;
        self.num_words = 0;
    }

    /// Returns the occurrence count of a token.
    pub fn get(&self, token: &str) -> Option<u64> {
        let index = self.find(token);
        if index == NIL {
            None
        } else {
            Some(self.nodes[index].count)
        }
    }

    /// Returns true if the token has been inserted.
    pub fn contains(&self, token: &str) -> bool {
        self.find(token) != NIL
    }

    /// Inserts a token as a red leaf and restores the red-black properties, or
    /// increments its count if already present.
    pub fn insert(&mut self, token: &str) {
        self.num_words += 1;
        let mut parent = NIL;
        let mut current = self.root;
        let mut ordering = Ordering::Equal;
        while current != NIL {
            parent = current;
            ordering = token.cmp(&*self.nodes[current].token);
            current = match ordering {
                Ordering::Equal => {
                    self.nodes[current].count += 1;
                    return;
                }
                Ordering::Less => self.nodes[current].left,
                Ordering::Greater => self.nodes[current].right,
            };
        }

        let new = self.nodes.len();
        self.nodes.push(Node::new(token, parent));
        if parent == NIL {
            self.root = new;
        } else if ordering == Ordering::Less {
            self.nodes[parent].left = new;
        } else {
            self.nodes[parent].right = new;
        }

        self.insert_fixup(new);
    }

    /// Gets an iterator over the entries of the tree, in ascending token order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            tree: self,
            next: self.minimum(self.root),
            rank: 0,
        }
    }

    fn find(&self, token: &str) -> usize {
        let mut current = self.root;
        while current != NIL {
            current = match token.cmp(&*self.nodes[current].token) {
                Ordering::Equal => break,
                Ordering::Less => self.nodes[current].left,
                Ordering::Greater => self.nodes[current].right,
            };
        }
        current
    }

    fn minimum(&self, mut index: usize) -> usize {
        if index == NIL {
            return NIL;
        }
        while self.nodes[index].left != NIL {
            index = self.nodes[index].left;
        }
        index
    }

    fn successor(&self, mut index: usize) -> usize {
        if self.nodes[index].right != NIL {
            return self.minimum(self.nodes[index].right);
        }
        let mut parent = self.nodes[index].parent;
        while parent != NIL && index == self.nodes[parent].right {
            index = parent;
            parent = self.nodes[parent].parent;
        }
        parent
    }

    fn color(&self, index: usize) -> Color {
        self.nodes[index].color
    }

    fn set_color(&mut self, index: usize, color: Color) {
        debug_assert!(index != NIL || color == Color::Black);
        self.nodes[index].color = color;
    }

    /// Restores the red-black properties after `node` was attached as a red leaf.
    ///
    /// Entering each iteration the only possible violation is `node` and its
    /// parent both being red.
    fn insert_fixup(&mut self, mut node: usize) {
        while self.color(self.nodes[node].parent) == Color::Red {
            let parent = self.nodes[node].parent;
            let grandparent = self.nodes[parent].parent;
            if parent == self.nodes[grandparent].left {
                let uncle = self.nodes[grandparent].right;
                if self.color(uncle) == Color::Red {
                    trace!("fixup case 1 at {:?}", self.nodes[node].token);
                    self.set_color(parent, Color::Black);
                    self.set_color(uncle, Color::Black);
                    self.set_color(grandparent, Color::Red);
                    node = grandparent;
                    continue;
                }
                if node == self.nodes[parent].right {
                    trace!("fixup case 2 at {:?}", self.nodes[node].token);
                    node = parent;
                    self.rotate_left(node);
                }
                trace!("fixup case 3 at {:?}", self.nodes[node].token);
                let parent = self.nodes[node].parent;
                let grandparent = self.nodes[parent].parent;
                self.set_color(parent, Color::Black);
                self.set_color(grandparent, Color::Red);
                self.rotate_right(grandparent);
            } else {
                let uncle = self.nodes[grandparent].left;
                if self.color(uncle) == Color::Red {
                    trace!("fixup case 1 at {:?}", self.nodes[node].token);
                    self.set_color(parent, Color::Black);
                    self.set_color(uncle, Color::Black);
                    self.set_color(grandparent, Color::Red);
                    node = grandparent;
                    continue;
                }
                if node == self.nodes[parent].left {
                    trace!("fixup case 2 at {:?}", self.nodes[node].token);
                    node = parent;
                    self.rotate_right(node);
                }
                trace!("fixup case 3 at {:?}", self.nodes[node].token);
                let parent = self.nodes[node].parent;
                let grandparent = self.nodes[parent].parent;
                self.set_color(parent, Color::Black);
                self.set_color(grandparent, Color::Red);
                self.rotate_left(grandparent);
            }
        }
        let root = self.root;
        self.set_color(root, Color::Black);
    }

    fn rotate_left(&mut self, node: usize) {
        let right = self.nodes[node].right;
        debug_assert!(right != NIL);

        let right_left = self.nodes[right].left;
        self.nodes[node].right = right_left;
        if right_left != NIL {
            self.nodes[right_left].parent = node;
        }

        let parent = self.nodes[node].parent;
        self.nodes[right].parent = parent;
        if parent == NIL {
            self.root = right;
        } else if node == self.nodes[parent].left {
            self.nodes[parent].left = right;
        } else {
            self.nodes[parent].right = right;
        }

        self.nodes[right].left = node;
        self.nodes[node].parent = right;
    }

    fn rotate_right(&mut self, node: usize) {
        let left = self.nodes[node].left;
        debug_assert!(left != NIL);

        let left_right = self.nodes[left].right;
        self.nodes[node].left = left_right;
        if left_right != NIL {
            self.nodes[left_right].parent = node;
        }

        let parent = self.nodes[node].parent;
        self.nodes[left].parent = parent;
        if parent == NIL {
            self.root = left;
        } else if node == self.nodes[parent].right {
            self.nodes[parent].right = left;
        } else {
            self.nodes[parent].left = left;
        }

        self.nodes[left].right = node;
        self.nodes[node].parent = left;
    }

    #[cfg(any(test, feature = "consistency_check"))]
    pub fn check_consistency(&self) {
        // Returns the number of black nodes on every path down from index
        fn check_black_height(tree: &RedBlackTree, index: usize) -> usize {
            if index == NIL {
                return 0;
            }
            let node = &tree.nodes[index];
            let left = check_black_height(tree, node.left);
            let right = check_black_height(tree, node.right);
            assert_eq!(left, right);
            left + usize::from(node.color == Color::Black)
        }

        // Check sentinel
        let nil = &self.nodes[NIL];
        assert_eq!(nil.color, Color::Black);
        assert_eq!((nil.parent, nil.left, nil.right), (NIL, NIL, NIL));

        // Check root
        if self.root != NIL {
            assert_eq!(self.nodes[self.root].parent, NIL);
            assert_eq!(self.nodes[self.root].color, Color::Black);
        }

        // Check tree nodes
        let mut num_nodes = 0;
        let mut num_words = 0;
        self.traverse(
            |index| {
                let node = &self.nodes[index];
                assert!(node.count >= 1);
                if node.left != NIL {
                    assert_eq!(self.nodes[node.left].parent, index);
                    assert!(self.nodes[node.left].token < node.token);
                }
                if node.right != NIL {
                    assert_eq!(self.nodes[node.right].parent, index);
                    assert!(self.nodes[node.right].token > node.token);
                }

                // No red node has a red child
                if node.color == Color::Red {
                    assert_eq!(self.nodes[node.left].color, Color::Black);
                    assert_eq!(self.nodes[node.right].color, Color::Black);
                }

                num_nodes += 1;
                num_words += node.count;
            },
            |_| {},
            |_| {},
        );
        assert_eq!(num_nodes, self.len());
        assert_eq!(num_words, self.num_words);
        assert_eq!(check_black_height(self, self.root), self.black_height());

        let mut prev: Option<&str> = None;
        for entry in self.iter() {
            if let Some(prev) = prev {
                assert!(prev < entry.token);
            }
            prev = Some(entry.token);
        }
    }

    /// Walks the tree through parent links, without recursion or an explicit stack.
    fn traverse<Pre, In, Post>(&self, mut preorder: Pre, mut inorder: In, mut postorder: Post)
    where
        Pre: FnMut(usize),
        In: FnMut(usize),
        Post: FnMut(usize),
    {
        if self.root == NIL {
            return;
        }
        let mut index = self.root;
        let mut dir = Direction::FromParent;
        loop {
            let node = &self.nodes[index];
            match dir {
                Direction::FromParent => {
                    preorder(index);
                    if node.left != NIL {
                        index = node.left;
                    } else {
                        dir = Direction::FromLeft;
                    }
                }
                Direction::FromLeft => {
                    inorder(index);
                    if node.right != NIL {
                        index = node.right;
                        dir = Direction::FromParent;
                    } else {
                        dir = Direction::FromRight;
                    }
                }
                Direction::FromRight => {
                    postorder(index);
                    if node.parent == NIL {
                        break;
                    }
                    dir = if self.nodes[node.parent].left == index {
                        Direction::FromLeft
                    } else {
                        Direction::FromRight
                    };
                    index = node.parent;
                }
            }
        }
    }
}

impl Node {
    fn sentinel() -> Self {
        Self {
            token: "".into(),
            count: 0,
            color: Color::Black,
            parent: NIL,
            left: NIL,
            right: NIL,
        }
    }

    fn new(token: &str, parent: usize) -> Self {
        Self {
            token: token.into(),
            count: 1,
            color: Color::Red,
            parent,
            left: NIL,
            right: NIL,
        }
    }
}

impl Default for RedBlackTree {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RedBlackTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.iter().map(|entry| (entry.token, entry.count)))
            .finish()
    }
}

impl<'t> Extend<&'t str> for RedBlackTree {
    fn extend<I: IntoIterator<Item = &'t str>>(&mut self, tokens: I) {
        for token in tokens {
            self.insert(token);
        }
    }
}

impl<'t> FromIterator<&'t str> for RedBlackTree {
    fn from_iter<I: IntoIterator<Item = &'t str>>(tokens: I) -> Self {
        let mut tree = Self::new();
        tree.extend(tokens);
        tree
    }
}

impl<'a> IntoIterator for &'a RedBlackTree {
    type Item = Entry<'a>;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl WordIndex for RedBlackTree {
    fn insert(&mut self, token: &str) {
        RedBlackTree::insert(self, token);
    }

    fn get(&self, token: &str) -> Option<u64> {
        RedBlackTree::get(self, token)
    }

    fn len(&self) -> usize {
        RedBlackTree::len(self)
    }

    fn total(&self) -> u64 {
        self.num_words
    }

    fn height(&self) -> usize {
        RedBlackTree::height(self)
    }

    fn clear(&mut self) {
        RedBlackTree::clear(self);
    }

    fn entries(&self) -> Entries<'_> {
        Box::new(self.iter())
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = Entry<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next == NIL {
            return None;
        }
        let node = &self.tree.nodes[self.next];
        self.next = self.tree.successor(self.next);
        self.rank += 1;
        Some(Entry::new(self.rank, &node.token, node.count))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.tree.len() - self.rank;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Iter<'_> {}
