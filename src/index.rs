/// One row of an ordered listing: the 1-based rank of a token in ascending order,
/// the token itself and how many times it has been inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Entry<'a> {
    pub rank: usize,
    pub token: &'a str,
    pub count: u64,
}

impl<'a> Entry<'a> {
    pub fn new(rank: usize, token: &'a str, count: u64) -> Self {
        Self { rank, token, count }
    }
}

/// Boxed ordered enumeration returned through the trait object surface.
pub type Entries<'a> = Box<dyn Iterator<Item = Entry<'a>> + 'a>;

/// Insert-and-count index over text tokens.
///
/// All implementations are interchangeable: for the same sequence of inserts they
/// produce identical listings. Only the shape of the underlying structure, and
/// therefore `height`, differs.
pub trait WordIndex {
    /// Inserts a token, or increments its count if it is already present.
    fn insert(&mut self, token: &str);

    /// Returns the occurrence count of a token.
    fn get(&self, token: &str) -> Option<u64>;

    /// Returns true if the token has been inserted at least once.
    fn contains(&self, token: &str) -> bool {
        self.get(token).is_some()
    }

    /// Returns the number of distinct tokens.
    fn len(&self) -> usize;

    /// Returns true if nothing has been inserted.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of inserts, duplicates included.
    fn total(&self) -> u64;

    /// Returns the structural height (tree levels, or skip list lanes).
    fn height(&self) -> usize;

    /// Removes every token, deallocating all nodes.
    fn clear(&mut self);

    /// Enumerates all tokens in ascending order.
    fn entries(&self) -> Entries<'_>;
}

#[cfg(test)]
mod tests {
    use super::Entry;

    #[test]
    fn test_entry_fields() {
        let entry = Entry::new(3, "fox", 2);
        assert_eq!(entry.rank, 3);
        assert_eq!(entry.token, "fox");
        assert_eq!(entry.count, 2);
        assert_eq!(entry, Entry { rank: 3, token: "fox", count: 2 });
    }
}
