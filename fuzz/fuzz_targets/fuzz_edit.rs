#![no_main]

use arbitrary::{Arbitrary, Unstructured};
use libfuzzer_sys::fuzz_target;
use vrcmrd_advisories::edit::{EditOp, NodePath, edit_at};
use vrcmrd_advisories::enums::ConditionKind;
use vrcmrd_advisories::parse::parse_condition;
use vrcmrd_advisories::primitives::{MAX_CONDITION_DEPTH, collect_leaf_kinds, depth, new_condition};
use vrcmrd_advisories::types::Condition;

// Enough steps for a single path to run into the depth limit.
const MAX_STEPS: usize = 64;

fn node_count(condition: &Condition) -> usize {
    1 + condition.children().iter().map(node_count).sum::<usize>()
}

/// Walks down from the root following fuzzer choices.
fn arbitrary_path(u: &mut Unstructured<'_>, root: &Condition) -> arbitrary::Result<NodePath> {
    let mut path = NodePath::root();
    let mut node = root;
    while !node.children().is_empty() && bool::arbitrary(u)? {
        let i = u.choose_index(node.children().len())?;
        node = &node.children()[i];
        path = path.child(i);
    }
    Ok(path)
}

fn arbitrary_op(u: &mut Unstructured<'_>) -> arbitrary::Result<EditOp> {
    let kind = *u.choose(&ConditionKind::ALL)?;
    let index = u.int_in_range(0..=4)?;
    Ok(match u.int_in_range(0..=4)? {
        0 => EditOp::SetKind(kind),
        1 => EditOp::AddChild(kind),
        2 => EditOp::RemoveChildAt(index),
        3 => EditOp::ReplaceChildAt(index, new_condition(kind)),
        _ => EditOp::SetNotChild(new_condition(kind)),
    })
}

fuzz_target!(|data: &[u8]| {
    let mut u = Unstructured::new(data);
    let mut tree = new_condition(ConditionKind::AllOf);

    for _ in 0..MAX_STEPS {
        let Ok(path) = arbitrary_path(&mut u, &tree) else { break };
        let Ok(op) = arbitrary_op(&mut u) else { break };
        let before = tree.clone();
        match edit_at(&tree, &path, op) {
            Ok(next) => tree = next,
            Err(_) => assert_eq!(tree, before),
        }
        assert_eq!(collect_leaf_kinds(&tree).count(), node_count(&tree));
        assert!(depth(&tree) <= MAX_CONDITION_DEPTH);
        let json = serde_json::to_string(&tree).unwrap();
        let back = parse_condition(&json).unwrap();
        assert_eq!(back, tree);
    }
});
