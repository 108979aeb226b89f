use proptest::prelude::*;
use tree_patch::{apply_array_patch, ArrayOp, ArrayPatchOptions, Node};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Action {
    Keep,
    Remove,
    Add,
}

fn action() -> impl Strategy<Value = Action> {
    prop_oneof![Just(Action::Keep), Just(Action::Remove), Just(Action::Add)]
}

/// A source length, one action per position (including the append position),
/// and a permutation of the resulting operations.
fn case() -> impl Strategy<Value = (usize, Vec<Action>, Vec<usize>)> {
    (0usize..24)
        .prop_flat_map(|len| (Just(len), proptest::collection::vec(action(), len + 1)))
        .prop_flat_map(|(len, actions)| {
            let n = actions.len();
            (Just(len), Just(actions), Just((0..n).collect::<Vec<_>>()).prop_shuffle())
        })
}

fn source(len: usize) -> Vec<Node> {
    (0..len as i64).map(Node::from).collect()
}

fn ops_for(len: usize, actions: &[Action]) -> Vec<ArrayOp> {
    let mut ops = Vec::new();
    for (i, action) in actions.iter().enumerate() {
        match action {
            Action::Remove if i < len => ops.push(ArrayOp::remove(i)),
            Action::Add => ops.push(ArrayOp::add(i, Node::from(format!("new-{i}")))),
            _ => {}
        }
    }
    ops
}

fn expected(len: usize, actions: &[Action]) -> Vec<Node> {
    let mut out = Vec::new();
    for (i, action) in actions.iter().enumerate() {
        if *action == Action::Add {
            out.push(Node::from(format!("new-{i}")));
        }
        if i < len && *action != Action::Remove {
            out.push(Node::from(i as i64));
        }
    }
    out
}

proptest! {
    #[test]
    fn independent_batch_ignores_operation_order((len, actions, order) in case()) {
        let ops = ops_for(len, &actions);
        let shuffled: Vec<ArrayOp> = order
            .iter()
            .filter(|&&i| i < ops.len())
            .map(|&i| ops[i].clone())
            .collect();
        prop_assert_eq!(shuffled.len(), ops.len());

        let options = ArrayPatchOptions::default();
        let in_order = apply_array_patch(&source(len), &ops, &options).unwrap();
        let reordered = apply_array_patch(&source(len), &shuffled, &options).unwrap();
        prop_assert_eq!(&in_order, &reordered);
        prop_assert_eq!(in_order, expected(len, &actions));
    }
}
