//! Tree node representation for the RRB vector.
//!
//! A node is either a leaf (holding element handles directly) or an
//! internal node (holding child pointers). Internal nodes come in two
//! flavors, matching the "size-table presence as a sum type" design note:
//! `Strict`, where every child but the last is perfectly full for its
//! height and indexing is pure bit-masking, and `Relaxed`, which carries a
//! cumulative size table for child lookup.
//!
//! Sharing is via `Rc`, so `Rc::make_mut` gives us copy-on-write for free:
//! callers that want persistent semantics clone the `Rc` handle before
//! descending (forcing a real clone the first time `make_mut` is called on
//! it), while a transient session mutates its own uniquely-held `Rc`
//! directly, which `make_mut` edits in place.

use std::rc::Rc;

use arrayvec::ArrayVec;

/// log2 of the branching factor.
pub(crate) const BITS: u32 = 5;
/// Maximum children per internal node / elements per leaf.
pub const BRANCHING_FACTOR: usize = 1 << BITS;
/// Mask selecting the low `BITS` bits of an index.
pub(crate) const MASK: usize = BRANCHING_FACTOR - 1;
/// Tree height such that `BRANCHING_FACTOR^MAX_HEIGHT >= 2^32`.
pub const MAX_HEIGHT: usize = 6;
/// Rebalance slack budget used by concatenation (`E` in the design doc).
pub(crate) const REBALANCE_SLACK: usize = 2;

pub(crate) type Children<T> = ArrayVec<Rc<Node<T>>, BRANCHING_FACTOR>;
pub(crate) type SizeTable = ArrayVec<u32, BRANCHING_FACTOR>;

pub(crate) enum Node<T> {
    Leaf(ArrayVec<T, BRANCHING_FACTOR>),
    Strict(Children<T>),
    Relaxed(Children<T>, SizeTable),
}

impl<T: Clone> Clone for Node<T> {
    fn clone(&self) -> Self {
        match self {
            Node::Leaf(v) => Node::Leaf(v.clone()),
            Node::Strict(c) => Node::Strict(c.clone()),
            Node::Relaxed(c, s) => Node::Relaxed(c.clone(), s.clone()),
        }
    }
}

/// The number of elements held by a completely full subtree whose root
/// sits at `shift` (i.e. one read of `(index >> shift) & MASK` selects a
/// child of this subtree). A leaf's shift is 0.
pub(crate) fn full_size_at_shift(shift: u32) -> u32 {
    debug_assert!(shift % BITS == 0);
    BRANCHING_FACTOR as u32 * (1u32 << shift)
}

impl<T: Clone> Node<T> {
    pub(crate) fn empty_leaf() -> Rc<Node<T>> {
        Rc::new(Node::Leaf(ArrayVec::new()))
    }

    pub(crate) fn leaf_from(items: ArrayVec<T, BRANCHING_FACTOR>) -> Rc<Node<T>> {
        Rc::new(Node::Leaf(items))
    }

    #[inline]
    pub(crate) fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf(_))
    }

    #[inline]
    pub(crate) fn has_size_table(&self) -> bool {
        matches!(self, Node::Relaxed(..))
    }

    #[inline]
    pub(crate) fn leaf(&self) -> &ArrayVec<T, BRANCHING_FACTOR> {
        match self {
            Node::Leaf(v) => v,
            _ => panic!("leaf() called on internal node"),
        }
    }

    #[inline]
    pub(crate) fn leaf_mut(&mut self) -> &mut ArrayVec<T, BRANCHING_FACTOR> {
        match self {
            Node::Leaf(v) => v,
            _ => panic!("leaf_mut() called on internal node"),
        }
    }

    #[inline]
    pub(crate) fn children(&self) -> &Children<T> {
        match self {
            Node::Leaf(_) => panic!("children() called on leaf node"),
            Node::Strict(c) => c,
            Node::Relaxed(c, _) => c,
        }
    }

    #[inline]
    pub(crate) fn sizes(&self) -> Option<&SizeTable> {
        match self {
            Node::Relaxed(_, s) => Some(s),
            _ => None,
        }
    }

    pub(crate) fn len(&self) -> usize {
        match self {
            Node::Leaf(v) => v.len(),
            Node::Strict(c) => c.len(),
            Node::Relaxed(c, _) => c.len(),
        }
    }

    /// Total element count reachable through this node, given the shift
    /// (height above the leaves) it is stored at.
    pub(crate) fn subtree_count(&self, shift: u32) -> usize {
        match self {
            Node::Leaf(v) => v.len(),
            Node::Relaxed(_, sizes) => *sizes.last().expect("relaxed node has no children") as usize,
            Node::Strict(children) => {
                let child_shift = shift - BITS;
                let full = full_size_at_shift(child_shift) as usize;
                let last = children.len() - 1;
                last * full + children[last].subtree_count(child_shift)
            }
        }
    }

    /// Resolve the child index and the index local to that child for a
    /// lookup of `index` at this node's `shift`. At most two forward
    /// probes are performed on the relaxed path, per the `E <= 2`
    /// rebalancing invariant.
    pub(crate) fn child_for(&self, index: usize, shift: u32) -> (usize, usize) {
        match self {
            Node::Strict(_) => {
                let child_idx = (index >> shift) & MASK;
                (child_idx, index)
            }
            Node::Relaxed(_, sizes) => {
                let mut child_idx = (index >> shift) & MASK;
                while sizes[child_idx] as usize <= index {
                    child_idx += 1;
                }
                let local = if child_idx == 0 {
                    index
                } else {
                    index - sizes[child_idx - 1] as usize
                };
                (child_idx, local)
            }
            Node::Leaf(_) => panic!("child_for() called on leaf node"),
        }
    }
}

#[cfg(debug_assertions)]
impl<T: Clone> Node<T> {
    /// Validates the size-table / strict-radix invariants of spec.md §8
    /// (universal invariants 2 and 3). Debug-only, matching the teacher's
    /// `Branch::debug_check_invariants` convention of a free-in-release
    /// consistency check.
    pub(crate) fn debug_check_invariants(&self, shift: u32) {
        match self {
            Node::Leaf(v) => debug_assert!(v.len() <= BRANCHING_FACTOR),
            Node::Strict(children) => {
                debug_assert!(!children.is_empty());
                let child_shift = shift - BITS;
                let full = full_size_at_shift(child_shift) as usize;
                for child in &children[..children.len() - 1] {
                    debug_assert_eq!(child.subtree_count(child_shift), full);
                    child.debug_check_invariants(child_shift);
                }
                children
                    .last()
                    .unwrap()
                    .debug_check_invariants(child_shift);
            }
            Node::Relaxed(children, sizes) => {
                debug_assert_eq!(children.len(), sizes.len());
                debug_assert!(!sizes.is_empty());
                let mut prev = 0u32;
                for (i, &s) in sizes.iter().enumerate() {
                    debug_assert!(s > prev || (i == 0 && s >= prev));
                    prev = s;
                }
                let child_shift = shift - BITS;
                for (child, &sz) in children.iter().zip(sizes.iter()) {
                    debug_assert!(child.subtree_count(child_shift) as u32 <= sz);
                    child.debug_check_invariants(child_shift);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_leaf_has_zero_len() {
        let leaf: Rc<Node<i32>> = Node::empty_leaf();
        assert_eq!(leaf.len(), 0);
        assert!(leaf.is_leaf());
    }

    #[test]
    fn full_size_at_shift_matches_branching_factor() {
        assert_eq!(full_size_at_shift(0), BRANCHING_FACTOR as u32);
        assert_eq!(full_size_at_shift(BITS), (BRANCHING_FACTOR * BRANCHING_FACTOR) as u32);
    }

    #[test]
    fn strict_child_for_is_pure_bit_masking() {
        let mut children = Children::<i32>::new();
        for _ in 0..4 {
            children.push(Node::empty_leaf());
        }
        let node = Node::Strict(children);
        let (idx, local) = node.child_for(BRANCHING_FACTOR + 3, BITS);
        assert_eq!(idx, 1);
        assert_eq!(local, BRANCHING_FACTOR + 3);
    }

    #[test]
    fn relaxed_child_for_walks_size_table() {
        let mut children = Children::<i32>::new();
        let mut sizes = SizeTable::new();
        for _ in 0..3 {
            children.push(Node::empty_leaf());
        }
        sizes.extend([10u32, 18, 25]);
        let node = Node::Relaxed(children, sizes);
        let (idx, local) = node.child_for(12, BITS);
        assert_eq!(idx, 1);
        assert_eq!(local, 2);
    }
}
