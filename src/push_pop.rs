//! Tail buffer management, `push_back` and `pop_back`.
//!
//! The tail holds the newest `0..=BRANCHING_FACTOR` elements outside the
//! tree proper, giving O(1) amortized push/pop (spec.md §4.3). When the
//! tail fills up it is pushed down into the tree as a new rightmost leaf;
//! when the tail shrinks to nothing the rightmost leaf of the tree is
//! promoted back out to refill it.

use std::rc::Rc;

use crate::node::{Children, Node, SizeTable, BITS, BRANCHING_FACTOR};

/// Builds a fresh minimal right spine of height `shift` above `leaf`.
fn new_path<T: Clone>(shift: u32, leaf: Rc<Node<T>>) -> Rc<Node<T>> {
    if shift == 0 {
        return leaf;
    }
    let mut children = Children::<T>::new();
    children.push(new_path(shift - BITS, leaf));
    Rc::new(Node::Strict(children))
}

/// Attempts to attach `leaf` as the new rightmost leaf somewhere within
/// `node`'s subtree (stored at `shift`, `shift >= BITS`). Returns `None` on
/// success (`node` mutated in place); returns the leaf back unchanged if
/// this subtree has no room left, so the caller can attach it as a new
/// sibling one level up.
fn push_tail_rec<T: Clone>(
    node: &mut Rc<Node<T>>,
    shift: u32,
    leaf: Rc<Node<T>>,
) -> Option<Rc<Node<T>>> {
    let n = Rc::make_mut(node);
    if shift == BITS {
        return match n {
            Node::Strict(children) => {
                if children.len() < BRANCHING_FACTOR {
                    children.push(leaf);
                    None
                } else {
                    Some(leaf)
                }
            }
            Node::Relaxed(children, sizes) => {
                if children.len() < BRANCHING_FACTOR {
                    let base = sizes.last().copied().unwrap_or(0);
                    sizes.push(base + leaf.len() as u32);
                    children.push(leaf);
                    None
                } else {
                    Some(leaf)
                }
            }
            Node::Leaf(_) => unreachable!("shift > 0 cannot reach a leaf"),
        };
    }

    let (children, sizes_opt): (&mut Children<T>, Option<&mut SizeTable>) = match n {
        Node::Strict(c) => (c, None),
        Node::Relaxed(c, s) => (c, Some(s)),
        Node::Leaf(_) => unreachable!("shift > 0 cannot reach a leaf"),
    };
    let last = children.len() - 1;
    match push_tail_rec(&mut children[last], shift - BITS, leaf) {
        None => {
            if let Some(sizes) = sizes_opt {
                let base = if last == 0 { 0 } else { sizes[last - 1] };
                sizes[last] = base + children[last].subtree_count(shift - BITS) as u32;
            }
            None
        }
        Some(leaf) => {
            if children.len() < BRANCHING_FACTOR {
                let branch = new_path(shift - BITS, leaf);
                if let Some(sizes) = sizes_opt {
                    let base = sizes.last().copied().unwrap_or(0);
                    sizes.push(base + branch.subtree_count(shift - BITS) as u32);
                }
                children.push(branch);
                None
            } else {
                Some(leaf)
            }
        }
    }
}

/// Pushes a full leaf (the just-filled tail) into the tree, growing the
/// root if every existing branch is already full.
pub(crate) fn push_tail<T: Clone>(
    root: &mut Option<Rc<Node<T>>>,
    shift: &mut u32,
    leaf: Rc<Node<T>>,
) {
    match root {
        None => {
            *root = Some(leaf);
            *shift = 0;
        }
        Some(r) => {
            if *shift == 0 {
                let mut children = Children::<T>::new();
                children.push(r.clone());
                children.push(leaf);
                *r = Rc::new(Node::Strict(children));
                *shift = BITS;
            } else if let Some(overflow) = push_tail_rec(r, *shift, leaf) {
                let mut children = Children::<T>::new();
                children.push(r.clone());
                children.push(new_path(*shift, overflow));
                *r = Rc::new(Node::Strict(children));
                *shift += BITS;
            }
        }
    }
}

/// Detaches and returns the rightmost leaf reachable from `node` (stored
/// at `shift >= BITS`), decrementing the surviving ancestors' size tables
/// by the leaf's length in place. This is the fix for the original
/// implementation's unresolved "patch up correct size here" gap: the
/// decrement always happens, using the leaf's real length rather than
/// assuming it was full.
fn promote_rightmost_leaf<T: Clone>(node: &mut Rc<Node<T>>, shift: u32) -> Rc<Node<T>> {
    let n = Rc::make_mut(node);
    match n {
        Node::Leaf(_) => unreachable!("caller must not recurse into a leaf"),
        Node::Strict(children) => {
            let last = children.len() - 1;
            if shift == BITS {
                children.pop().unwrap()
            } else {
                let leaf = promote_rightmost_leaf(&mut children[last], shift - BITS);
                if children[last].len() == 0 {
                    children.pop();
                }
                leaf
            }
        }
        Node::Relaxed(children, sizes) => {
            let last = children.len() - 1;
            if shift == BITS {
                sizes.pop();
                children.pop().unwrap()
            } else {
                let leaf = promote_rightmost_leaf(&mut children[last], shift - BITS);
                if children[last].len() == 0 {
                    children.pop();
                    sizes.pop();
                } else {
                    *sizes.last_mut().unwrap() -= leaf.len() as u32;
                }
                leaf
            }
        }
    }
}

/// Detaches the rightmost leaf of the whole tree, collapsing any ancestor
/// that becomes childless or that degenerates to a single child (keeping
/// tree height minimal). Also used by `slice.rs` to re-carve a tree/tail
/// split when a cut lands exactly on the old tail boundary.
pub(crate) fn pop_tail<T: Clone>(root: &mut Option<Rc<Node<T>>>, shift: &mut u32) -> Rc<Node<T>> {
    let mut r = root.take().expect("pop_tail called on an empty tree");
    if *shift == 0 {
        return r;
    }
    let leaf = promote_rightmost_leaf(&mut r, *shift);
    loop {
        let child_count = r.children().len();
        if child_count == 0 {
            *shift = 0;
            return leaf;
        }
        if child_count == 1 && *shift > BITS {
            let only = r.children()[0].clone();
            r = only;
            *shift -= BITS;
        } else {
            break;
        }
    }
    *root = Some(r);
    leaf
}

/// Appends `value`, pushing the tail into the tree first if it is full.
pub(crate) fn push_back<T: Clone>(
    root: &mut Option<Rc<Node<T>>>,
    shift: &mut u32,
    tail: &mut Rc<Node<T>>,
    value: T,
) {
    if tail.len() < BRANCHING_FACTOR {
        Rc::make_mut(tail).leaf_mut().push(value);
        return;
    }
    let full_tail = std::mem::replace(tail, Node::empty_leaf());
    push_tail(root, shift, full_tail);
    Rc::make_mut(tail).leaf_mut().push(value);
}

/// Removes the last element. The caller must ensure the vector is
/// non-empty.
pub(crate) fn pop_back<T: Clone>(
    root: &mut Option<Rc<Node<T>>>,
    shift: &mut u32,
    tail: &mut Rc<Node<T>>,
) {
    if tail.len() > 1 {
        Rc::make_mut(tail).leaf_mut().pop();
        return;
    }
    if root.is_none() {
        *tail = Node::empty_leaf();
        return;
    }
    *tail = pop_tail(root, shift);
}
