// disjoint_set.rs - Union-find over dense indices
//
// Path compression plus union by rank keeps `find` and `union` close to
// constant time.

#[derive(Debug, Clone)]
pub struct DisjointSet {
    parent: Vec<usize>,
    rank: Vec<u8>,
    components: usize,
}

impl DisjointSet {
    /// `len` singleton sets, one per index in `0..len`.
    pub fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
            rank: vec![0; len],
            components: len,
        }
    }

    /// Representative of the set containing `id`.
    ///
    /// # Panics
    /// If `id >= len`.
    pub fn find(&mut self, id: usize) -> usize {
        let mut root = id;
        while self.parent[root] != root {
            root = self.parent[root];
        }

        let mut current = id;
        while current != root {
            let next = self.parent[current];
            self.parent[current] = root;
            current = next;
        }
        root
    }

    /// Merge the sets of `a` and `b`. Returns `false` if they were already joined.
    pub fn union(&mut self, a: usize, b: usize) -> bool {
        let root_a = self.find(a);
        let root_b = self.find(b);
        if root_a == root_b {
            return false;
        }

        match self.rank[root_a].cmp(&self.rank[root_b]) {
            std::cmp::Ordering::Less => self.parent[root_a] = root_b,
            std::cmp::Ordering::Greater => self.parent[root_b] = root_a,
            std::cmp::Ordering::Equal => {
                self.parent[root_b] = root_a;
                self.rank[root_a] += 1;
            }
        }
        self.components -= 1;
        true
    }

    pub fn same_set(&mut self, a: usize, b: usize) -> bool {
        self.find(a) == self.find(b)
    }

    #[inline]
    pub fn component_count(&self) -> usize {
        self.components
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.parent.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_union_and_find() {
        let mut sets = DisjointSet::new(6);
        assert_eq!(sets.component_count(), 6);

        assert!(sets.union(0, 1));
        assert!(sets.union(2, 3));
        assert!(sets.union(1, 3));
        assert!(!sets.union(0, 2));

        assert!(sets.same_set(0, 3));
        assert!(!sets.same_set(0, 4));
        assert_eq!(sets.component_count(), 3);
        assert_eq!(sets.len(), 6);
    }

    #[test]
    fn test_chain_collapses_to_one_component() {
        let mut sets = DisjointSet::new(100);
        for i in 1..100 {
            assert!(sets.union(i - 1, i));
        }
        assert_eq!(sets.component_count(), 1);
        let root = sets.find(0);
        assert!((0..100).all(|i| sets.find(i) == root));
    }

    #[test]
    fn test_empty() {
        let sets = DisjointSet::new(0);
        assert!(sets.is_empty());
        assert_eq!(sets.component_count(), 0);
    }
}
