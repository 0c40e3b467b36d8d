// Disjoint-set union with union by size and path compression.
// find() and union(): O(a(n)) ~ O(1) amortized
pub(crate) struct Dsu {
    repr: Vec<usize>,
    size: Vec<usize>,
}

impl Dsu {
    pub(crate) fn new(n: usize) -> Self {
        Dsu {
            repr: (0..n).collect(),
            size: vec![1; n],
        }
    }

    pub(crate) fn find(&mut self, x: usize) -> usize {
        if self.repr[x] != x {
            self.repr[x] = self.find(self.repr[x]);
        }
        self.repr[x]
    }

    /// Merge the classes of `x` and `y`. Returns false if they were already
    /// the same class.
    pub(crate) fn union(&mut self, x: usize, y: usize) -> bool {
        let mut x_repr = self.find(x);
        let mut y_repr = self.find(y);

        if x_repr == y_repr {
            return false;
        }

        if self.size[x_repr] < self.size[y_repr] {
            std::mem::swap(&mut x_repr, &mut y_repr);
        }
        self.size[x_repr] += self.size[y_repr];
        self.repr[y_repr] = x_repr;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_union_find() {
        let mut dsu = Dsu::new(5);
        assert!(dsu.union(0, 1));
        assert!(dsu.union(3, 4));
        assert!(!dsu.union(1, 0));
        assert_eq!(dsu.find(0), dsu.find(1));
        assert_ne!(dsu.find(1), dsu.find(3));

        assert!(dsu.union(1, 4));
        assert_eq!(dsu.find(0), dsu.find(3));
        assert_ne!(dsu.find(2), dsu.find(0));
    }
}
