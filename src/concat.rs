//! Concatenation: tail folding, recursive tree merge, and the rebalance
//! step that keeps height logarithmic across the seam (spec.md §4.4).

use std::rc::Rc;

use crate::node::{full_size_at_shift, Children, Node, SizeTable, BITS, BRANCHING_FACTOR, REBALANCE_SLACK};
use crate::push_pop::push_tail;

fn into_children<T: Clone>(node: Rc<Node<T>>) -> Children<T> {
    match Rc::try_unwrap(node) {
        Ok(Node::Strict(c)) => c,
        Ok(Node::Relaxed(c, _)) => c,
        Ok(Node::Leaf(_)) => unreachable!("into_children called on a leaf"),
        Err(rc) => match &*rc {
            Node::Strict(c) => c.clone(),
            Node::Relaxed(c, _) => c.clone(),
            Node::Leaf(_) => unreachable!("into_children called on a leaf"),
        },
    }
}

fn children_need_size_table<T: Clone>(children: &Children<T>, child_shift: u32) -> bool {
    let full = full_size_at_shift(child_shift) as usize;
    children[..children.len() - 1]
        .iter()
        .any(|c| c.subtree_count(child_shift) != full)
}

/// Wraps a freshly repacked children array as an internal node, attaching
/// a size table iff some child is not strict-radix-full for its height.
pub(crate) fn build_node<T: Clone>(children: Children<T>, child_shift: u32) -> Rc<Node<T>> {
    if children_need_size_table(&children, child_shift) {
        let mut sizes = SizeTable::new();
        let mut acc = 0u32;
        for c in &children {
            acc += c.subtree_count(child_shift) as u32;
            sizes.push(acc);
        }
        Rc::new(Node::Relaxed(children, sizes))
    } else {
        Rc::new(Node::Strict(children))
    }
}

/// Repacks a run of leaves so that all but possibly the last are full.
fn rebalance_leaves<T: Clone>(leaves: Vec<Rc<Node<T>>>) -> Vec<Rc<Node<T>>> {
    let plan_len: usize = leaves.iter().map(|l| l.leaf().len()).sum();
    let ideal = plan_len.div_ceil(BRANCHING_FACTOR).max(1);
    if leaves.len() <= ideal + REBALANCE_SLACK {
        return leaves;
    }
    let mut flat: Vec<T> = Vec::with_capacity(plan_len);
    for leaf in leaves {
        match Rc::try_unwrap(leaf) {
            Ok(Node::Leaf(v)) => flat.extend(v),
            Err(rc) => flat.extend(rc.leaf().iter().cloned()),
            _ => unreachable!("rebalance_leaves given a non-leaf"),
        }
    }
    flat.chunks(BRANCHING_FACTOR)
        .map(|chunk| {
            let mut av = arrayvec::ArrayVec::new();
            av.try_extend_from_slice(chunk)
                .expect("chunk never exceeds BRANCHING_FACTOR");
            Node::leaf_from(av)
        })
        .collect()
}

/// Redistributes child pointers among a run of internal nodes (all at
/// `child_shift`'s parent level) so that all but possibly the last are
/// full, without touching anything below `child_shift`.
fn rebalance_internal<T: Clone>(nodes: Vec<Rc<Node<T>>>, child_shift: u32) -> Vec<Rc<Node<T>>> {
    let plan_len: usize = nodes.iter().map(|n| n.children().len()).sum();
    let ideal = plan_len.div_ceil(BRANCHING_FACTOR).max(1);
    if nodes.len() <= ideal + REBALANCE_SLACK {
        return nodes;
    }
    let mut flat: Vec<Rc<Node<T>>> = Vec::with_capacity(plan_len);
    for node in nodes {
        flat.extend(into_children(node));
    }
    flat.chunks(BRANCHING_FACTOR)
        .map(|chunk| {
            let mut av = Children::<T>::new();
            av.try_extend_from_slice(chunk)
                .expect("chunk never exceeds BRANCHING_FACTOR");
            build_node(av, child_shift)
        })
        .collect()
}

fn rightmost_child<T: Clone>(node: &Rc<Node<T>>) -> Rc<Node<T>> {
    node.children().last().expect("node has no children").clone()
}

fn leftmost_child<T: Clone>(node: &Rc<Node<T>>) -> Rc<Node<T>> {
    node.children().first().expect("node has no children").clone()
}

/// Wraps a flat run of up to roughly `2*BRANCHING_FACTOR` sibling nodes,
/// all living at `child_shift`, into one or two parent nodes of length
/// `<= BRANCHING_FACTOR`. Splits into two only when the run doesn't fit
/// under a single parent; shared by `merge`'s recursive splice and
/// `merge_trees`'s top-level wrap.
fn wrap_children<T: Clone>(children: Vec<Rc<Node<T>>>, child_shift: u32) -> Vec<Rc<Node<T>>> {
    if children.len() <= BRANCHING_FACTOR {
        let mut av = Children::<T>::new();
        av.try_extend_from_slice(&children)
            .expect("rebalance bounds output within BRANCHING_FACTOR for this B");
        vec![build_node(av, child_shift)]
    } else {
        let mid = children.len() / 2;
        let (left, right) = children.split_at(mid);
        let mut lc = Children::<T>::new();
        lc.try_extend_from_slice(left).expect("half of a bounded split fits");
        let mut rc = Children::<T>::new();
        rc.try_extend_from_slice(right).expect("half of a bounded split fits");
        vec![build_node(lc, child_shift), build_node(rc, child_shift)]
    }
}

/// The recursive merge core of spec.md §4.4b/c. `a` and `b` themselves
/// live at `shift`; returns the rebalanced sequence of children, living at
/// `shift - BITS`, for whatever replaces `a` and `b` at `shift`. The
/// caller is responsible for wrapping that sequence into actual node(s) at
/// `shift` (via `wrap_children`) — a plain list of children is not itself
/// a node.
fn merge<T: Clone>(a: Rc<Node<T>>, b: Rc<Node<T>>, shift: u32) -> Vec<Rc<Node<T>>> {
    if shift == BITS {
        let a_children = into_children(a);
        let b_children = into_children(b);
        let mut leaves = Vec::with_capacity(a_children.len() + b_children.len());
        leaves.extend(a_children);
        leaves.extend(b_children);
        rebalance_leaves(leaves)
    } else {
        let a_right = rightmost_child(&a);
        let b_left = leftmost_child(&b);
        // `merge` one level down returns children at `shift - 2*BITS`;
        // wrap them into actual node(s) at `shift - BITS` before splicing
        // them in among `a`'s and `b`'s other, already-built children.
        let middle_children = merge(a_right, b_left, shift - BITS);
        let middle = wrap_children(middle_children, shift - 2 * BITS);

        let mut a_children = into_children(a);
        let mut b_children = into_children(b);
        a_children.pop();
        b_children.remove(0);

        let mut combined = Vec::with_capacity(a_children.len() + middle.len() + b_children.len());
        combined.extend(a_children);
        combined.extend(middle);
        combined.extend(b_children);
        // `combined` holds sibling nodes at `shift - BITS`; rebalancing
        // them means flattening *their* children, at `shift - 2*BITS`.
        rebalance_internal(combined, shift - 2 * BITS)
    }
}

fn pad_to_shift<T: Clone>(mut node: Rc<Node<T>>, mut shift: u32, target_shift: u32) -> Rc<Node<T>> {
    while shift < target_shift {
        let mut children = Children::<T>::new();
        children.push(node);
        node = Rc::new(Node::Strict(children));
        shift += BITS;
    }
    node
}

/// Collapses a root that has degenerated to a single child, keeping tree
/// height minimal (spec.md §4.4d).
fn collapse_unary_root<T: Clone>(mut root: Rc<Node<T>>, mut shift: u32) -> (Rc<Node<T>>, u32) {
    while shift > 0 && root.children().len() == 1 {
        let only = root.children()[0].clone();
        root = only;
        shift -= BITS;
    }
    (root, shift)
}

fn merge_trees<T: Clone>(
    a: Rc<Node<T>>,
    a_shift: u32,
    b: Rc<Node<T>>,
    b_shift: u32,
) -> (Rc<Node<T>>, u32) {
    let top_shift = a_shift.max(b_shift);
    let a = pad_to_shift(a, a_shift, top_shift);
    let b = pad_to_shift(b, b_shift, top_shift);

    // `merged` is a flat run of siblings; `children_shift` is the level
    // those siblings themselves live at (0 for the bare-leaves case, since
    // there's no level below 0 to derive it from; `top_shift - BITS`
    // otherwise, per `merge`'s contract).
    let (merged, children_shift) = if top_shift == 0 {
        (rebalance_leaves(vec![a, b]), 0)
    } else {
        (merge(a, b, top_shift), top_shift - BITS)
    };

    let wrapped = wrap_children(merged, children_shift);
    let wrapped_shift = children_shift + BITS;

    let (root, shift) = if wrapped.len() == 1 {
        (wrapped.into_iter().next().unwrap(), wrapped_shift)
    } else {
        let mut grandparent = Children::<T>::new();
        grandparent
            .try_extend_from_slice(&wrapped)
            .expect("wrap_children never returns more than two nodes");
        (build_node(grandparent, wrapped_shift), wrapped_shift + BITS)
    };

    collapse_unary_root(root, shift)
}

/// Concatenates the tree+tail pair of two non-empty vectors. The caller
/// (`vector.rs`) is responsible for the empty-operand fast paths of
/// spec.md §4.4 ("if either is empty, return the other").
pub(crate) fn concat<T: Clone>(
    l_root: Option<Rc<Node<T>>>,
    l_shift: u32,
    l_tail: Rc<Node<T>>,
    r_root: Option<Rc<Node<T>>>,
    r_shift: u32,
) -> (Option<Rc<Node<T>>>, u32) {
    let mut tl_root = l_root;
    let mut tl_shift = l_shift;
    if l_tail.len() > 0 {
        push_tail(&mut tl_root, &mut tl_shift, l_tail);
    }
    let tl = tl_root.expect("a non-empty left operand always yields a tree after tail folding");

    match r_root {
        None => (Some(tl), tl_shift),
        Some(tr) => {
            let (root, shift) = merge_trees(tl, tl_shift, tr, r_shift);
            (Some(root), shift)
        }
    }
}
