//! Transient bulk-mutation view of a [`Vector`] (spec.md §4.6).
//!
//! A `TransientVector` is the single-owner, in-place-mutating counterpart
//! to the persistent `Vector`. Copy-on-write during a transient session is
//! driven entirely by `Rc::make_mut`: the first mutation to a node still
//! shared with the originating persistent handle clones it, and every
//! mutation after that reuses the now uniquely-owned clone in place. This
//! is the same aliasing guarantee the original GUID-stamping discipline
//! gives, derived for free from `Rc`'s own reference count rather than a
//! hand-stamped identity field on every node (see DESIGN.md).
//!
//! `Rc<Node<T>>` is `!Send`/`!Sync`, so a second thread can never observe
//! (let alone mutate) a transient's nodes — the cross-owner half of
//! spec.md's misuse discipline is enforced at compile time. The remaining
//! half, detecting use after the transient has been sealed back into a
//! persistent value, is checked at runtime by `check_transience`.

use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::OutOfBounds;
use crate::node::Node;
use crate::vector::Vector;
use crate::{index, push_pop, update};

static NEXT_ID: AtomicU64 = AtomicU64::new(0);

pub struct TransientVector<T> {
    id: u64,
    cnt: usize,
    shift: u32,
    root: Option<Rc<Node<T>>>,
    tail: Rc<Node<T>>,
    sealed: bool,
}

impl<T: Clone> Vector<T> {
    /// Opens a transient bulk-mutation session over this vector. The
    /// persistent handle remains valid and unaffected; nodes are shared
    /// until the transient actually mutates them.
    pub fn to_transient(&self) -> TransientVector<T> {
        TransientVector {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            cnt: self.cnt,
            shift: self.shift,
            root: self.root.clone(),
            tail: self.tail.clone(),
            sealed: false,
        }
    }
}

impl<T: Clone> TransientVector<T> {
    /// The identity stamped on this session at creation. Diagnostic only;
    /// nothing in the public API accepts a token back from the caller —
    /// Rust's ownership rules already make it impossible for a second
    /// owner to reach this transient's nodes.
    pub fn id(&self) -> u64 {
        self.id
    }

    fn check_transience(&self) {
        if self.sealed {
            panic!("transient vector used after to_persistent() sealed it");
        }
    }

    pub fn len(&self) -> usize {
        self.check_transience();
        self.cnt
    }

    pub fn is_empty(&self) -> bool {
        self.check_transience();
        self.cnt == 0
    }

    pub fn get(&self, index: usize) -> Result<&T, OutOfBounds> {
        self.check_transience();
        if index >= self.cnt {
            return Err(OutOfBounds { index, len: self.cnt });
        }
        let tail_len = self.tail.len();
        let tree_len = self.cnt - tail_len;
        if index >= tree_len {
            Ok(&self.tail.leaf()[index - tree_len])
        } else {
            let root = self.root.as_ref().expect("tree_len > 0 implies a root");
            Ok(index::tree_get(root, self.shift, index))
        }
    }

    pub fn last(&self) -> Result<&T, OutOfBounds> {
        self.check_transience();
        if self.cnt == 0 {
            return Err(OutOfBounds { index: 0, len: 0 });
        }
        self.get(self.cnt - 1)
    }

    pub fn push(&mut self, value: T) {
        self.check_transience();
        push_pop::push_back(&mut self.root, &mut self.shift, &mut self.tail, value);
        self.cnt += 1;
    }

    pub fn pop(&mut self) -> Result<(), OutOfBounds> {
        self.check_transience();
        if self.cnt == 0 {
            return Err(OutOfBounds { index: 0, len: 0 });
        }
        push_pop::pop_back(&mut self.root, &mut self.shift, &mut self.tail);
        self.cnt -= 1;
        Ok(())
    }

    pub fn set(&mut self, index: usize, value: T) -> Result<(), OutOfBounds> {
        self.check_transience();
        if index >= self.cnt {
            return Err(OutOfBounds { index, len: self.cnt });
        }
        let tail_len = self.tail.len();
        let tree_len = self.cnt - tail_len;
        if index >= tree_len {
            Rc::make_mut(&mut self.tail).leaf_mut()[index - tree_len] = value;
        } else {
            let root = self.root.as_mut().expect("tree_len > 0 implies a root");
            update::tree_update(root, self.shift, index, value);
        }
        Ok(())
    }

    pub fn update(&mut self, index: usize, value: T) -> Result<(), OutOfBounds> {
        self.set(index, value)
    }

    /// Falls back to the persistent slice algorithm and reinstalls the
    /// result into this transient's header, matching the original
    /// implementation's own `transient_rrb_slice`, which spec.md §9
    /// accepts as conformant despite abandoning in-place mutation for
    /// this one operation.
    pub fn slice(&mut self, from: usize, to: usize) -> Result<(), OutOfBounds> {
        self.check_transience();
        if from > to || to > self.cnt {
            return Err(OutOfBounds { index: to, len: self.cnt });
        }
        let (root, shift, tail) = crate::slice::slice(
            self.root.clone(),
            self.shift,
            self.tail.clone(),
            self.cnt,
            from,
            to,
        );
        self.root = root;
        self.shift = shift;
        self.tail = tail;
        self.cnt = to - from;
        Ok(())
    }

    /// Seals this session: further use of `self` panics (spec.md boundary
    /// scenario 6). Takes `&mut self` rather than consuming it so that a
    /// caller who does keep using the handle after sealing hits the
    /// documented fatal error instead of a compile error that would make
    /// the scenario untestable.
    pub fn to_persistent(&mut self) -> Vector<T> {
        self.check_transience();
        self.sealed = true;
        Vector::from_parts(self.cnt, self.shift, self.root.clone(), self.tail.clone())
    }
}
