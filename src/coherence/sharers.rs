use smallvec::SmallVec;

use super::TileId;

const WORD_BITS: usize = u64::BITS as usize;

/// Fixed-capacity bitset of tile ids. Up to 256 tiles live inline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharerSet {
    capacity: usize,
    words: SmallVec<[u64; 4]>,
}

impl SharerSet {
    pub fn new(capacity: usize) -> Self {
        let num_words = capacity.div_ceil(WORD_BITS);
        Self {
            capacity,
            words: SmallVec::from_elem(0, num_words),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn locate(&self, tile: TileId) -> (usize, u64) {
        assert!(
            tile < self.capacity,
            "tile id {} out of range (max {} sharers)",
            tile,
            self.capacity
        );
        (tile / WORD_BITS, 1u64 << (tile % WORD_BITS))
    }

    pub fn contains(&self, tile: TileId) -> bool {
        let (word, mask) = self.locate(tile);
        self.words[word] & mask != 0
    }

    /// Returns whether the bit was newly set.
    pub fn insert(&mut self, tile: TileId) -> bool {
        let (word, mask) = self.locate(tile);
        let was_clear = self.words[word] & mask == 0;
        self.words[word] |= mask;
        was_clear
    }

    /// Returns whether the bit was previously set.
    pub fn remove(&mut self, tile: TileId) -> bool {
        let (word, mask) = self.locate(tile);
        let was_set = self.words[word] & mask != 0;
        self.words[word] &= !mask;
        was_set
    }

    pub fn len(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    pub fn first(&self) -> Option<TileId> {
        self.words
            .iter()
            .enumerate()
            .find(|(_, w)| **w != 0)
            .map(|(i, w)| i * WORD_BITS + w.trailing_zeros() as usize)
    }

    /// Tile ids in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = TileId> + '_ {
        self.words.iter().enumerate().flat_map(|(i, &word)| {
            let mut bits = word;
            std::iter::from_fn(move || {
                if bits == 0 {
                    return None;
                }
                let bit = bits.trailing_zeros() as usize;
                bits &= bits - 1;
                Some(i * WORD_BITS + bit)
            })
        })
    }

    pub fn clear(&mut self) {
        self.words.iter_mut().for_each(|w| *w = 0);
    }
}

#[cfg(test)]
mod tests {
    use super::SharerSet;

    #[test]
    fn insert_remove_and_count() {
        let mut set = SharerSet::new(130);
        assert!(set.is_empty());
        assert!(set.insert(3));
        assert!(set.insert(64));
        assert!(set.insert(129));
        assert!(!set.insert(64));
        assert_eq!(set.len(), 3);
        assert!(set.remove(64));
        assert!(!set.remove(64));
        assert_eq!(set.len(), 2);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![3, 129]);
    }

    #[test]
    fn first_is_lowest_id() {
        let mut set = SharerSet::new(200);
        assert_eq!(set.first(), None);
        set.insert(150);
        set.insert(70);
        assert_eq!(set.first(), Some(70));
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn rejects_tile_beyond_capacity() {
        let set = SharerSet::new(8);
        set.contains(8);
    }

    #[test]
    fn clear_empties_every_word() {
        let mut set = SharerSet::new(300);
        set.insert(0);
        set.insert(299);
        set.clear();
        assert!(set.is_empty());
        assert_eq!(set.len(), 0);
    }
}
