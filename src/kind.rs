use std::fmt;
use std::str::FromStr;

use crate::avl::AvlTree;
use crate::bst::BinarySearchTree;
use crate::error::Error;
use crate::index::WordIndex;
use crate::rbt::RedBlackTree;
use crate::skip_list::SkipList;

/// Selects one of the index implementations at runtime.
///
/// ```
/// use word_index::Kind;
/// let kind: Kind = "rbt".parse().unwrap();
/// let mut index = kind.build();
/// index.insert("word");
/// assert_eq!(index.get("word"), Some(1));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Bst,
    Avl,
    RedBlack,
    SkipList,
}

impl Kind {
    pub const ALL: [Kind; 4] = [Kind::Bst, Kind::Avl, Kind::RedBlack, Kind::SkipList];

    /// Short name, as accepted by `from_str`.
    pub fn name(self) -> &'static str {
        match self {
            Kind::Bst => "bst",
            Kind::Avl => "avl",
            Kind::RedBlack => "rbt",
            Kind::SkipList => "skiplist",
        }
    }

    /// Creates an empty index of this kind. A skip list seeds itself from OS entropy.
    pub fn build(self) -> Box<dyn WordIndex> {
        match self {
            Kind::Bst => Box::new(BinarySearchTree::new()),
            Kind::Avl => Box::new(AvlTree::new()),
            Kind::RedBlack => Box::new(RedBlackTree::new()),
            Kind::SkipList => Box::new(SkipList::new()),
        }
    }

    /// Creates an empty index of this kind. The seed only affects skip lists.
    pub fn build_seeded(self, seed: u64) -> Box<dyn WordIndex> {
        match self {
            Kind::SkipList => Box::new(SkipList::with_seed(seed)),
            kind => kind.build(),
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Kind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bst" => Ok(Kind::Bst),
            "avl" => Ok(Kind::Avl),
            "rbt" | "redblack" | "red-black" => Ok(Kind::RedBlack),
            "skiplist" | "skip-list" | "skip_list" => Ok(Kind::SkipList),
            _ => Err(Error::UnknownKind(s.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Kind;
    use crate::error::Error;

    #[test]
    fn test_parse() {
        for kind in Kind::ALL {
            assert_eq!(kind.name().parse::<Kind>(), Ok(kind));
            assert_eq!(kind.to_string().parse::<Kind>(), Ok(kind));
        }
        assert_eq!(" Red-Black ".parse::<Kind>(), Ok(Kind::RedBlack));
        assert_eq!("Skip_List".parse::<Kind>(), Ok(Kind::SkipList));
        assert_eq!(
            "splay".parse::<Kind>(),
            Err(Error::UnknownKind("splay".to_owned()))
        );
    }

    #[test]
    fn test_build() {
        for kind in Kind::ALL {
            let mut index = kind.build_seeded(0);
            assert!(index.is_empty());
            index.insert("x");
            index.insert("x");
            assert_eq!(index.len(), 1);
            assert_eq!(index.total(), 2);
            assert!(index.contains("x"));
        }
    }

    #[test]
    fn test_error_message() {
        let err = "heap".parse::<Kind>().unwrap_err();
        assert_eq!(
            err.to_string(),
            r#"unknown index kind: "heap" (expected bst, avl, rbt or skiplist)"#
        );
    }
}
