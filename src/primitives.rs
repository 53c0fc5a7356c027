//! Condition tree primitives.
//!
//! Construction of default nodes and the traversals shared by evaluation,
//! validation and the template catalog.

use crate::enums::{ConditionKind, TrustRank};
use crate::types::Condition;

/// Deepest condition tree that editing, parsing and validation accept,
/// counting nodes from the root.
///
/// Written out, every level costs two JSON nesting levels, so a stored
/// advisory list at this depth stays well inside serde_json's recursion
/// limit and every accepted tree reads back.
pub const MAX_CONDITION_DEPTH: usize = 32;

// ─── new_condition ──────────────────────────────────────────────────────────

/// Builds a node of `kind` with its default payload.
///
/// Composites get an empty child sequence (`Not` wraps an empty `AnyOf`),
/// string leaves an empty string, the day count 0, trust rank `Nuisance`
/// and platform unset.
pub fn new_condition(kind: ConditionKind) -> Condition {
    match kind {
        ConditionKind::AllOf => Condition::AllOf(Vec::new()),
        ConditionKind::AnyOf => Condition::AnyOf(Vec::new()),
        ConditionKind::Not => Condition::Not(Box::new(Condition::AnyOf(Vec::new()))),
        ConditionKind::UsernameContains => Condition::UsernameContains(String::new()),
        ConditionKind::AccountAgeAtMostDays => Condition::AccountAgeAtMostDays(0),
        ConditionKind::AvatarMayBe => Condition::AvatarMayBe(String::new()),
        ConditionKind::IsGroupMember => Condition::IsGroupMember(String::new()),
        ConditionKind::AgeNotVerified => Condition::AgeNotVerified,
        ConditionKind::PlatformIs => Condition::PlatformIs(None),
        ConditionKind::TrustRankAtMost => Condition::TrustRankAtMost(TrustRank::Nuisance),
        ConditionKind::InstanceGroupRestricted => Condition::InstanceGroupRestricted,
        ConditionKind::InstanceOwner => Condition::InstanceOwner(String::new()),
        ConditionKind::LogLinePrefix => Condition::LogLinePrefix(String::new()),
    }
}

// ─── collect_leaf_kinds ─────────────────────────────────────────────────────

/// Lazy pre-order traversal over the nodes of a condition tree.
///
/// Yields every node, composites included, parent before children and
/// children in order.
#[derive(Clone, Debug)]
pub struct Nodes<'a> {
    stack: Vec<&'a Condition>,
}

impl<'a> Iterator for Nodes<'a> {
    type Item = &'a Condition;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children().iter().rev());
        Some(node)
    }
}

/// Pre-order iterator over every node at or below `condition`.
pub fn nodes(condition: &Condition) -> Nodes<'_> {
    Nodes {
        stack: vec![condition],
    }
}

/// The kinds of every node at or below `condition`, in pre-order.
///
/// A multiset: a kind appears once per node of that kind.
pub fn collect_leaf_kinds(condition: &Condition) -> impl Iterator<Item = ConditionKind> + '_ {
    nodes(condition).map(Condition::kind)
}

/// Whether any node at or below `condition` has the given kind.
pub fn contains_kind(condition: &Condition, kind: ConditionKind) -> bool {
    collect_leaf_kinds(condition).any(|k| k == kind)
}

/// Number of non-composite nodes in the tree.
pub fn leaf_count(condition: &Condition) -> usize {
    collect_leaf_kinds(condition)
        .filter(|k| !k.is_composite())
        .count()
}

/// Length of the longest root-to-leaf path, counting nodes.
pub fn depth(condition: &Condition) -> usize {
    // Iterative: parsed trees are measured here before the depth limit applies.
    let mut max = 0;
    let mut stack = vec![(condition, 1usize)];
    while let Some((node, d)) = stack.pop() {
        max = max.max(d);
        stack.extend(node.children().iter().map(|c| (c, d + 1)));
    }
    max
}
