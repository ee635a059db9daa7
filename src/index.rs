//! Indexed lookup into the tree portion of a vector (the tail is handled
//! by the caller in `vector.rs`/`transient.rs`).

use crate::node::{Node, BITS};

/// Descends from `root` (stored at `shift`) to the element at `index`.
///
/// `index` must be local to the tree (i.e. already offset past the tail).
/// Strict nodes resolve their child with a single mask-and-shift; relaxed
/// nodes walk their size table forward at most two steps, per the `E <= 2`
/// balancing invariant.
pub(crate) fn tree_get<T: Clone>(root: &Node<T>, shift: u32, index: usize) -> &T {
    if shift == 0 {
        return &root.leaf()[index];
    }
    let (child_idx, local) = root.child_for(index, shift);
    tree_get(&root.children()[child_idx], shift - BITS, local)
}
