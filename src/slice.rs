//! Slicing: right-slice then left-slice (spec.md §4.5).

use std::rc::Rc;

use arrayvec::ArrayVec;

use crate::concat::build_node;
use crate::node::{Children, Node, BITS, BRANCHING_FACTOR};

/// Trims `node` (at `shift`) down to its first `keep` elements (`keep >=
/// 1`). Returns the replacement subtree (`None` if it collapsed to
/// nothing, which only happens when the cut removes the node's sole
/// child) and the rightmost surviving leaf, truncated to the cut point,
/// which the caller promotes into the tail.
fn right_slice_rec<T: Clone>(node: &Node<T>, shift: u32, keep: usize) -> (Option<Rc<Node<T>>>, Rc<Node<T>>) {
    if shift == 0 {
        let mut kept: ArrayVec<T, BRANCHING_FACTOR> = ArrayVec::new();
        kept.try_extend_from_slice(&node.leaf()[..keep])
            .expect("keep <= leaf length");
        return (None, Node::leaf_from(kept));
    }
    let (child_idx, local) = node.child_for(keep - 1, shift);
    let (trimmed_child, leaf) = right_slice_rec(&node.children()[child_idx], shift - BITS, local + 1);

    let mut new_children = Children::<T>::new();
    new_children
        .try_extend_from_slice(&node.children()[..child_idx])
        .expect("prefix of a bounded children array fits");
    if let Some(tc) = trimmed_child {
        new_children.push(tc);
    }
    if new_children.is_empty() {
        (None, leaf)
    } else {
        (Some(build_node(new_children, shift - BITS)), leaf)
    }
}

/// Trims `node` (at `shift`) down to the elements from `drop` onward
/// (`drop` may be 0, a no-op copy down the spine).
fn left_slice_rec<T: Clone>(node: &Node<T>, shift: u32, drop: usize) -> Rc<Node<T>> {
    if shift == 0 {
        let mut kept: ArrayVec<T, BRANCHING_FACTOR> = ArrayVec::new();
        kept.try_extend_from_slice(&node.leaf()[drop..])
            .expect("drop <= leaf length");
        return Node::leaf_from(kept);
    }
    let (child_idx, local) = node.child_for(drop, shift);
    let trimmed_first = left_slice_rec(&node.children()[child_idx], shift - BITS, local);

    let mut new_children = Children::<T>::new();
    new_children.push(trimmed_first);
    new_children
        .try_extend_from_slice(&node.children()[child_idx + 1..])
        .expect("suffix of a bounded children array fits");
    build_node(new_children, shift - BITS)
}

fn collapse_unary_root<T: Clone>(mut root: Rc<Node<T>>, mut shift: u32) -> (Rc<Node<T>>, u32) {
    while shift > 0 && root.children().len() == 1 {
        let only = root.children()[0].clone();
        root = only;
        shift -= BITS;
    }
    (root, shift)
}

/// Drops every index `>= to`. `to` must be `<= cnt`.
pub(crate) fn right_slice<T: Clone>(
    root: Option<Rc<Node<T>>>,
    shift: u32,
    tail: Rc<Node<T>>,
    cnt: usize,
    to: usize,
) -> (Option<Rc<Node<T>>>, u32, Rc<Node<T>>) {
    let tail_len = tail.len();
    let tree_len = cnt - tail_len;
    if to >= cnt {
        return (root, shift, tail);
    }
    if to == 0 {
        return (None, 0, Node::empty_leaf());
    }
    if to >= tree_len {
        let local = to - tree_len;
        if local > 0 {
            let mut kept: ArrayVec<T, BRANCHING_FACTOR> = ArrayVec::new();
            kept.try_extend_from_slice(&tail.leaf()[..local]).unwrap();
            return (root, shift, Node::leaf_from(kept));
        }
        // The cut lands exactly on the old tail boundary: every element
        // is kept, but the tail invariant requires tail_len >= 1 whenever
        // the tree is non-empty, so the tree's own rightmost leaf is
        // promoted to become the (now non-empty) tail instead of leaving
        // an empty one alongside a non-empty tree.
        let mut root = root;
        let mut shift = shift;
        let promoted = crate::push_pop::pop_tail(&mut root, &mut shift);
        return (root, shift, promoted);
    }
    let r = root.expect("to < tree_len implies a non-empty tree");
    match right_slice_rec(&r, shift, to) {
        (None, leaf) => (None, 0, leaf),
        (Some(new_root), leaf) => {
            let (new_root, new_shift) = collapse_unary_root(new_root, shift);
            (Some(new_root), new_shift, leaf)
        }
    }
}

/// Drops every index `< from`. `from` must be `<= cnt`.
pub(crate) fn left_slice<T: Clone>(
    root: Option<Rc<Node<T>>>,
    shift: u32,
    tail: Rc<Node<T>>,
    cnt: usize,
    from: usize,
) -> (Option<Rc<Node<T>>>, u32, Rc<Node<T>>) {
    if from == 0 {
        return (root, shift, tail);
    }
    let tail_len = tail.len();
    let tree_len = cnt - tail_len;
    if from >= tree_len {
        let local = from - tree_len;
        let mut kept: ArrayVec<T, BRANCHING_FACTOR> = ArrayVec::new();
        kept.try_extend_from_slice(&tail.leaf()[local..]).unwrap();
        return (None, 0, Node::leaf_from(kept));
    }
    let r = root.expect("from < tree_len implies a non-empty tree");
    let new_root = left_slice_rec(&r, shift, from);
    let (new_root, new_shift) = collapse_unary_root(new_root, shift);
    (Some(new_root), new_shift, tail)
}

/// Returns the element range `[from, to)`, applying right-slice then
/// left-slice as spec.md §4.5 prescribes.
pub(crate) fn slice<T: Clone>(
    root: Option<Rc<Node<T>>>,
    shift: u32,
    tail: Rc<Node<T>>,
    cnt: usize,
    from: usize,
    to: usize,
) -> (Option<Rc<Node<T>>>, u32, Rc<Node<T>>) {
    let (root, shift, tail) = right_slice(root, shift, tail, cnt, to);
    left_slice(root, shift, tail, to, from)
}
