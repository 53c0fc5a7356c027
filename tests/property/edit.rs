use super::strategies::*;
use proptest::prelude::*;
use proptest::sample::Index;
use vrcmrd_advisories::edit::*;
use vrcmrd_advisories::enums::ConditionKind;
use vrcmrd_advisories::primitives::{MAX_CONDITION_DEPTH, collect_leaf_kinds, depth};
use vrcmrd_advisories::types::Condition;

#[derive(Clone, Debug)]
enum Step {
    Add(ConditionKind),
    Remove(Index),
    Replace(Index, Condition),
    SetNot(Condition),
    SetKind(ConditionKind),
}

fn arb_step() -> impl Strategy<Value = Step> {
    prop_oneof![
        arb_kind().prop_map(Step::Add),
        any::<Index>().prop_map(Step::Remove),
        (any::<Index>(), arb_leaf()).prop_map(|(i, c)| Step::Replace(i, c)),
        arb_leaf().prop_map(Step::SetNot),
        arb_kind().prop_map(Step::SetKind),
    ]
}

fn all_paths(condition: &Condition, path: NodePath, out: &mut Vec<NodePath>) {
    for (i, child) in condition.children().iter().enumerate() {
        all_paths(child, path.child(i), out);
    }
    out.push(path);
}

fn node_count(condition: &Condition) -> usize {
    1 + condition.children().iter().map(node_count).sum::<usize>()
}

fn op_for(step: &Step, target: &Condition) -> EditOp {
    let len = target.children().len().max(1);
    match step.clone() {
        Step::Add(kind) => EditOp::AddChild(kind),
        Step::Remove(i) => EditOp::RemoveChildAt(i.index(len)),
        Step::Replace(i, c) => EditOp::ReplaceChildAt(i.index(len), c),
        Step::SetNot(c) => EditOp::SetNotChild(c),
        Step::SetKind(kind) => EditOp::SetKind(kind),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    // Any sequence of edits leaves a finite tree within the depth limit that
    // the traversal can walk, and a rejected edit leaves the tree as it was.
    #[test]
    fn edits_preserve_tree_invariants(
        start in arb_condition(),
        steps in prop::collection::vec((any::<Index>(), arb_step()), 0..24),
    ) {
        let mut tree = start;
        for (at, step) in &steps {
            let mut paths = Vec::new();
            all_paths(&tree, NodePath::root(), &mut paths);
            let path = &paths[at.index(paths.len())];
            let target = node_at(&tree, path).unwrap();
            let op = op_for(step, target);

            let before = tree.clone();
            match edit_at(&tree, path, op) {
                Ok(next) => tree = next,
                Err(e) => {
                    let expected = path.to_string();
                    prop_assert_eq!(&tree, &before);
                    prop_assert_eq!(e.path.as_deref(), Some(expected.as_str()));
                }
            }
            prop_assert_eq!(collect_leaf_kinds(&tree).count(), node_count(&tree));
            prop_assert!(depth(&tree) <= MAX_CONDITION_DEPTH);
        }
    }

    // Child operations succeed exactly on AllOf/AnyOf
    #[test]
    fn child_ops_only_on_sequences(node in arb_condition(), kind in arb_kind()) {
        let sequence = matches!(node, Condition::AllOf(_) | Condition::AnyOf(_));
        prop_assert_eq!(add_child(&node, kind).is_ok(), sequence);
        prop_assert_eq!(set_not_child(&node, Condition::AgeNotVerified).is_ok(), matches!(node, Condition::Not(_)));
    }

    #[test]
    fn set_kind_yields_default_node(node in arb_condition(), kind in arb_kind()) {
        let edited = set_kind(&node, kind);
        prop_assert_eq!(edited.kind(), kind);
        prop_assert!(edited.children().len() <= 1);
    }
}
