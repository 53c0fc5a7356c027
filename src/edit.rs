//! Condition editor model.
//!
//! Every operation takes the current tree by reference and returns a new
//! tree; the input is never modified, and a rejected edit leaves the caller
//! holding the unchanged original. New children are moved in by value, so
//! no subtree is ever shared and no node can come to contain an ancestor.
//! No edit produces a tree deeper than [`MAX_CONDITION_DEPTH`].

use crate::enums::{ConditionKind, Platform, TrustRank};
use crate::error::{EditError, EditErrorKind};
use crate::primitives::{MAX_CONDITION_DEPTH, depth, new_condition};
use crate::types::Condition;
use std::fmt;
use tracing::warn;

/// A replacement payload for a leaf node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LeafPayload {
    /// For `UsernameContains`, `AvatarMayBe`, `IsGroupMember`,
    /// `InstanceOwner` and `LogLinePrefix`.
    Text(String),
    Days(u32),
    Platform(Option<Platform>),
    TrustRank(TrustRank),
}

/// One structural edit, applied to the node it addresses.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EditOp {
    SetKind(ConditionKind),
    SetLeafPayload(LeafPayload),
    AddChild(ConditionKind),
    RemoveChildAt(usize),
    ReplaceChildAt(usize, Condition),
    SetNotChild(Condition),
}

impl EditOp {
    /// Applies this edit to `node`, producing the edited copy.
    pub fn apply(self, node: &Condition) -> Result<Condition, EditError> {
        match self {
            EditOp::SetKind(kind) => Ok(set_kind(node, kind)),
            EditOp::SetLeafPayload(payload) => set_leaf_payload(node, payload),
            EditOp::AddChild(kind) => add_child(node, kind),
            EditOp::RemoveChildAt(index) => remove_child_at(node, index),
            EditOp::ReplaceChildAt(index, child) => replace_child_at(node, index, child),
            EditOp::SetNotChild(child) => set_not_child(node, child),
        }
    }
}

// ─── Node operations ────────────────────────────────────────────────────────

/// Replaces the node with a default node of `kind`, discarding its payload
/// and children.
pub fn set_kind(_node: &Condition, kind: ConditionKind) -> Condition {
    new_condition(kind)
}

/// Replaces a leaf's payload. Composites and payload-less leaves are rejected.
pub fn set_leaf_payload(node: &Condition, payload: LeafPayload) -> Result<Condition, EditError> {
    let edited = match (node, payload) {
        (Condition::UsernameContains(_), LeafPayload::Text(s)) => Condition::UsernameContains(s),
        (Condition::AvatarMayBe(_), LeafPayload::Text(s)) => Condition::AvatarMayBe(s),
        (Condition::IsGroupMember(_), LeafPayload::Text(s)) => Condition::IsGroupMember(s),
        (Condition::InstanceOwner(_), LeafPayload::Text(s)) => Condition::InstanceOwner(s),
        (Condition::LogLinePrefix(_), LeafPayload::Text(s)) => Condition::LogLinePrefix(s),
        (Condition::AccountAgeAtMostDays(_), LeafPayload::Days(n)) => {
            Condition::AccountAgeAtMostDays(n)
        }
        (Condition::PlatformIs(_), LeafPayload::Platform(p)) => Condition::PlatformIs(p),
        (Condition::TrustRankAtMost(_), LeafPayload::TrustRank(r)) => Condition::TrustRankAtMost(r),
        (other, payload) if other.kind().has_payload() => {
            return Err(edit_error(
                EditErrorKind::PayloadMismatch,
                format!("{} cannot take payload {}", other.kind(), payload),
            ));
        }
        (other, _) => {
            return Err(edit_error(
                EditErrorKind::WrongShape,
                format!("{} has no payload to set", other.kind()),
            ));
        }
    };
    Ok(edited)
}

/// Appends a default child of `kind` to an `AllOf` or `AnyOf`.
pub fn add_child(node: &Condition, kind: ConditionKind) -> Result<Condition, EditError> {
    let mut edited = node.clone();
    children_mut(&mut edited, "add a child to")?.push(new_condition(kind));
    within_depth(edited, 0)
}

/// Removes the child at `index` from an `AllOf` or `AnyOf`.
pub fn remove_child_at(node: &Condition, index: usize) -> Result<Condition, EditError> {
    let mut edited = node.clone();
    let children = children_mut(&mut edited, "remove a child from")?;
    check_index(index, children.len())?;
    children.remove(index);
    Ok(edited)
}

/// Replaces the child at `index` of an `AllOf` or `AnyOf`.
pub fn replace_child_at(
    node: &Condition,
    index: usize,
    child: Condition,
) -> Result<Condition, EditError> {
    let mut edited = node.clone();
    let children = children_mut(&mut edited, "replace a child of")?;
    check_index(index, children.len())?;
    children[index] = child;
    within_depth(edited, 0)
}

/// Replaces the single child of a `Not`.
pub fn set_not_child(node: &Condition, child: Condition) -> Result<Condition, EditError> {
    match node {
        Condition::Not(_) => within_depth(Condition::Not(Box::new(child)), 0),
        other => Err(edit_error(
            EditErrorKind::WrongShape,
            format!("cannot set the negated child of {}", other.kind()),
        )),
    }
}

fn children_mut<'a>(
    node: &'a mut Condition,
    action: &str,
) -> Result<&'a mut Vec<Condition>, EditError> {
    match node {
        Condition::AllOf(children) | Condition::AnyOf(children) => Ok(children),
        other => Err(edit_error(
            EditErrorKind::WrongShape,
            format!("cannot {} {}", action, other.kind()),
        )),
    }
}

/// Rejects `node` if, placed `above` levels below the root, it would push the
/// tree past [`MAX_CONDITION_DEPTH`].
fn within_depth(node: Condition, above: usize) -> Result<Condition, EditError> {
    let total = above + depth(&node);
    if total > MAX_CONDITION_DEPTH {
        return Err(edit_error(
            EditErrorKind::TooDeep,
            format!(
                "edit would nest the condition {} levels deep (limit {})",
                total, MAX_CONDITION_DEPTH
            ),
        ));
    }
    Ok(node)
}

fn check_index(index: usize, len: usize) -> Result<(), EditError> {
    if index < len {
        Ok(())
    } else {
        Err(edit_error(
            EditErrorKind::IndexOutOfBounds,
            format!("child index {} out of bounds for {} children", index, len),
        ))
    }
}

fn edit_error(kind: EditErrorKind, message: String) -> EditError {
    EditError {
        kind,
        message,
        path: None,
    }
}

impl fmt::Display for LeafPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeafPayload::Text(s) => write!(f, "text {:?}", s),
            LeafPayload::Days(n) => write!(f, "day count {}", n),
            LeafPayload::Platform(Some(p)) => write!(f, "platform {}", p),
            LeafPayload::Platform(None) => write!(f, "unset platform"),
            LeafPayload::TrustRank(r) => write!(f, "trust rank {:?}", r),
        }
    }
}

// ─── Path-addressed edits ───────────────────────────────────────────────────

/// Child indices leading from the root to a node. `Not`'s child is index 0.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct NodePath(pub Vec<usize>);

impl NodePath {
    pub fn root() -> Self {
        NodePath(Vec::new())
    }

    pub fn child(&self, index: usize) -> Self {
        let mut steps = self.0.clone();
        steps.push(index);
        NodePath(steps)
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "condition")?;
        for step in &self.0 {
            write!(f, "[{}]", step)?;
        }
        Ok(())
    }
}

/// The node at `path`, if the path resolves.
pub fn node_at<'a>(root: &'a Condition, path: &NodePath) -> Option<&'a Condition> {
    path.0
        .iter()
        .try_fold(root, |node, &index| node.children().get(index))
}

/// Applies `op` to the node at `path` and returns the edited whole tree.
pub fn edit_at(root: &Condition, path: &NodePath, op: EditOp) -> Result<Condition, EditError> {
    let mut edited = root.clone();
    let mut target = &mut edited;
    for &index in &path.0 {
        target = match target.child_mut(index) {
            Some(child) => child,
            None => {
                warn!(%path, "edit path does not resolve");
                return Err(EditError {
                    kind: EditErrorKind::InvalidPath,
                    message: format!("no child at index {}", index),
                    path: Some(path.to_string()),
                });
            }
        };
    }
    match op
        .apply(target)
        .and_then(|node| within_depth(node, path.0.len()))
    {
        Ok(node) => {
            *target = node;
            Ok(edited)
        }
        Err(mut e) => {
            warn!(%path, error = %e.message, "rejected condition edit");
            e.path = Some(path.to_string());
            Err(e)
        }
    }
}
