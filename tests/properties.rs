//! Property tests for the round-trip laws and universal invariants of
//! spec.md §8, cross-checked against `std::Vec` and, for a second
//! independent oracle, `im::Vector`.

use proptest::prelude::*;
use rrb_vector::Vector;

fn to_vec<T: Clone>(v: &Vector<T>) -> Vec<T> {
    v.iter().cloned().collect()
}

#[derive(Debug, Clone, Copy)]
enum Op {
    Push(i32),
    Pop,
    Set(usize, i32),
    SliceFrom(usize),
}

fn ops_strategy(max_ops: usize) -> impl Strategy<Value = Vec<Op>> {
    // Generated sequentially so each op's index ranges are meaningful given
    // a running model length; proptest doesn't offer a stateful generator
    // directly, so we bound indices to a conservative small window and let
    // the model clamp out-of-range ops instead.
    prop::collection::vec(
        prop_oneof![
            any::<i32>().prop_map(Op::Push),
            Just(Op::Pop),
            (0usize..2048, any::<i32>()).prop_map(|(i, v)| Op::Set(i, v)),
            (0usize..2048).prop_map(Op::SliceFrom),
        ],
        0..max_ops,
    )
}

/// Applies `op` to both the RRB vector and the `Vec` oracle, clamping any
/// index that has drifted out of range (since the op stream isn't generated
/// with knowledge of the running length) to a no-op instead of a panic.
fn apply(v: Vector<i32>, model: &mut Vec<i32>, op: &Op) -> Vector<i32> {
    match *op {
        Op::Push(x) => {
            model.push(x);
            v.push_back(x)
        }
        Op::Pop => {
            if model.is_empty() {
                v
            } else {
                model.pop();
                v.pop_back().unwrap()
            }
        }
        Op::Set(i, x) => {
            if model.is_empty() {
                v
            } else {
                let i = i % model.len();
                model[i] = x;
                v.set(i, x).unwrap()
            }
        }
        Op::SliceFrom(from) => {
            if model.is_empty() {
                v
            } else {
                let from = from % (model.len() + 1);
                *model = model[from..].to_vec();
                v.slice(from, v.len()).unwrap()
            }
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn matches_vec_oracle_across_a_random_op_sequence(ops in ops_strategy(300)) {
        let mut v = Vector::new();
        let mut model: Vec<i32> = Vec::new();
        for op in &ops {
            v = apply(v, &mut model, op);
            prop_assert_eq!(v.len(), model.len());
            prop_assert_eq!(to_vec(&v), model.clone());
        }
    }

    #[test]
    fn matches_im_vector_oracle_across_a_random_op_sequence(ops in ops_strategy(300)) {
        let mut v = Vector::new();
        let mut oracle: im::Vector<i32> = im::Vector::new();
        for op in &ops {
            match *op {
                Op::Push(x) => {
                    v = v.push_back(x);
                    oracle.push_back(x);
                }
                Op::Pop => {
                    if !oracle.is_empty() {
                        v = v.pop_back().unwrap();
                        oracle.pop_back();
                    }
                }
                Op::Set(i, x) => {
                    if !oracle.is_empty() {
                        let i = i % oracle.len();
                        v = v.set(i, x).unwrap();
                        oracle.set(i, x);
                    }
                }
                Op::SliceFrom(from) => {
                    if !oracle.is_empty() {
                        let from = from % (oracle.len() + 1);
                        v = v.slice(from, v.len()).unwrap();
                        // `split_off` truncates `oracle` to `[0, from)` and
                        // returns `[from, end)`, mirroring `Vec::split_off`.
                        oracle = oracle.split_off(from);
                    }
                }
            }
            prop_assert_eq!(v.len(), oracle.len());
            prop_assert_eq!(to_vec(&v), oracle.iter().cloned().collect::<Vec<_>>());
        }
    }

    #[test]
    fn push_then_nth_last_matches_pushed_value(
        prefix in prop::collection::vec(any::<i32>(), 0..200),
        x in any::<i32>(),
    ) {
        let base: Vector<i32> = prefix.iter().copied().collect();
        let pushed = base.push_back(x);
        prop_assert_eq!(pushed.get(base.len()), Ok(&x));
        for i in 0..base.len() {
            prop_assert_eq!(pushed.get(i), base.get(i));
        }
    }

    #[test]
    fn pop_after_push_is_value_equal(
        prefix in prop::collection::vec(any::<i32>(), 0..200),
        x in any::<i32>(),
    ) {
        let base: Vector<i32> = prefix.iter().copied().collect();
        let round_tripped = base.push_back(x).pop_back().unwrap();
        prop_assert_eq!(round_tripped, base);
    }

    #[test]
    fn update_replaces_exactly_one_slot(
        prefix in prop::collection::vec(any::<i32>(), 1..200),
        x in any::<i32>(),
        idx in any::<usize>(),
    ) {
        let base: Vector<i32> = prefix.iter().copied().collect();
        let idx = idx % base.len();
        let updated = base.set(idx, x).unwrap();
        prop_assert_eq!(updated.get(idx), Ok(&x));
        for i in 0..base.len() {
            if i != idx {
                prop_assert_eq!(updated.get(i), base.get(i));
            }
        }
    }

    #[test]
    fn concat_preserves_length_and_indices(
        a in prop::collection::vec(any::<i32>(), 0..150),
        b in prop::collection::vec(any::<i32>(), 0..150),
    ) {
        let va: Vector<i32> = a.iter().copied().collect();
        let vb: Vector<i32> = b.iter().copied().collect();
        let joined = va.concat(&vb);

        prop_assert_eq!(joined.len(), va.len() + vb.len());
        for i in 0..va.len() {
            prop_assert_eq!(joined.get(i), va.get(i));
        }
        for i in 0..vb.len() {
            prop_assert_eq!(joined.get(va.len() + i), vb.get(i));
        }
    }

    #[test]
    fn slice_preserves_length_and_indices(
        elems in prop::collection::vec(any::<i32>(), 1..400),
        f in any::<usize>(),
        t in any::<usize>(),
    ) {
        let v: Vector<i32> = elems.iter().copied().collect();
        let mut from = f % (v.len() + 1);
        let mut to = t % (v.len() + 1);
        if from > to {
            std::mem::swap(&mut from, &mut to);
        }
        let sliced = v.slice(from, to).unwrap();

        prop_assert_eq!(sliced.len(), to - from);
        for i in 0..sliced.len() {
            prop_assert_eq!(sliced.get(i), v.get(from + i));
        }
    }

    #[test]
    fn to_persistent_of_to_transient_is_value_equal(
        elems in prop::collection::vec(any::<i32>(), 0..400),
    ) {
        let v: Vector<i32> = elems.iter().copied().collect();
        let mut t = v.to_transient();
        let round_tripped = t.to_persistent();
        prop_assert_eq!(round_tripped, v);
    }

    #[test]
    fn transient_push_only_matches_pushed_sequence(
        elems in prop::collection::vec(any::<i32>(), 0..400),
    ) {
        let mut t = Vector::new().to_transient();
        for &x in &elems {
            t.push(x);
        }
        for (i, &x) in elems.iter().enumerate() {
            prop_assert_eq!(t.get(i), Ok(&x));
        }
        prop_assert_eq!(t.len(), elems.len());
    }
}
