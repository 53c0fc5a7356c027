//! Condition evaluation.
//!
//! Evaluation is pure: a condition tree and one user snapshot in, a boolean
//! out. Missing user data makes the affected leaf false rather than failing.

use crate::enums::*;
use crate::normalize::display_name;
use crate::template::{TemplateContext, resolve};
use crate::types::*;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use tracing::debug;

// ─── MatchOptions ───────────────────────────────────────────────────────────

/// Knobs for leaf matching.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchOptions {
    /// Applies to `UsernameContains` and `LogLinePrefix`.
    pub case_sensitive: bool,
    /// Instant account ages are measured against. `None` means now.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_time: Option<DateTime<Utc>>,
}

impl Default for MatchOptions {
    fn default() -> Self {
        MatchOptions {
            case_sensitive: true,
            reference_time: None,
        }
    }
}

impl MatchOptions {
    pub fn at(reference_time: DateTime<Utc>) -> Self {
        MatchOptions {
            reference_time: Some(reference_time),
            ..MatchOptions::default()
        }
    }

    fn now(&self) -> DateTime<Utc> {
        self.reference_time.unwrap_or_else(Utc::now)
    }
}

// ─── evaluate ───────────────────────────────────────────────────────────────

/// Evaluates `condition` against one user with default options.
pub fn evaluate(condition: &Condition, attrs: &UserAttributes) -> bool {
    evaluate_with(condition, attrs, &MatchOptions::default())
}

/// Evaluates `condition` against one user.
///
/// `AllOf` and `AnyOf` short-circuit left to right; an empty `AllOf` is true
/// and an empty `AnyOf` is false. Recursion follows the tree, whose depth the
/// editor, parser and validator hold to
/// [`MAX_CONDITION_DEPTH`](crate::primitives::MAX_CONDITION_DEPTH).
pub fn evaluate_with(condition: &Condition, attrs: &UserAttributes, options: &MatchOptions) -> bool {
    match condition {
        Condition::AllOf(children) => children.iter().all(|c| evaluate_with(c, attrs, options)),
        Condition::AnyOf(children) => children.iter().any(|c| evaluate_with(c, attrs, options)),
        Condition::Not(child) => !evaluate_with(child, attrs, options),
        Condition::UsernameContains(needle) => {
            text_matches(&attrs.username, needle, options, |h, n| h.contains(n))
        }
        Condition::AccountAgeAtMostDays(max_days) => match account_age_days(attrs, options) {
            Some(days) => days <= i64::from(*max_days),
            None => false,
        },
        Condition::AvatarMayBe(avatar_id) => attrs.avatar_id.as_deref() == Some(avatar_id.as_str()),
        Condition::IsGroupMember(group_id) => attrs.is_group_member(group_id),
        Condition::AgeNotVerified => !attrs.age_verified,
        Condition::PlatformIs(platform) => match (platform, attrs.platform) {
            (Some(wanted), Some(actual)) => *wanted == actual,
            _ => false,
        },
        Condition::TrustRankAtMost(max_rank) => match attrs.trust_rank {
            Some(rank) => rank <= *max_rank,
            None => false,
        },
        Condition::InstanceGroupRestricted => attrs.instance_access.is_group_restricted(),
        Condition::InstanceOwner(owner) => attrs.instance_owner.as_deref() == Some(owner.as_str()),
        Condition::LogLinePrefix(prefix) => match &attrs.log_line {
            Some(line) => text_matches(line, prefix, options, |h, n| h.starts_with(n)),
            None => false,
        },
    }
}

fn text_matches(
    haystack: &str,
    needle: &str,
    options: &MatchOptions,
    predicate: impl Fn(&str, &str) -> bool,
) -> bool {
    if options.case_sensitive {
        predicate(haystack, needle)
    } else {
        predicate(&haystack.to_lowercase(), &needle.to_lowercase())
    }
}

/// Whole days since account creation, clamped at zero. `None` if unknown.
pub fn account_age_days(attrs: &UserAttributes, options: &MatchOptions) -> Option<i64> {
    let created = attrs.account_created?;
    Some((options.now() - created).num_days().max(0))
}

/// The first group named by an `IsGroupMember` leaf that holds for the user.
///
/// Leaves under `Not` are skipped, since a satisfied `Not` means the user is
/// not in that group.
pub fn matched_group<'a>(
    condition: &Condition,
    attrs: &'a UserAttributes,
) -> Option<&'a GroupMembership> {
    match condition {
        Condition::IsGroupMember(group_id) => attrs.group(group_id),
        Condition::AllOf(children) | Condition::AnyOf(children) => {
            children.iter().find_map(|c| matched_group(c, attrs))
        }
        _ => None,
    }
}

// ─── Advisory-level helpers ─────────────────────────────────────────────────

/// The active advisories whose condition holds for the user, most severe
/// first. Advisories of equal level keep their input order.
pub fn active_advisories<'a>(
    advisories: &'a [Advisory],
    attrs: &UserAttributes,
    options: &MatchOptions,
) -> Vec<&'a Advisory> {
    let mut hits: Vec<&Advisory> = advisories
        .iter()
        .filter(|a| a.active && evaluate_with(&a.condition, attrs, options))
        .collect();
    hits.sort_by_key(|a| Reverse(a.level));
    debug!(
        user = %attrs.id,
        evaluated = advisories.len(),
        matched = hits.len(),
        "evaluated advisories"
    );
    hits
}

/// Highest level among the given advisories.
pub fn highest_level<'a>(advisories: impl IntoIterator<Item = &'a Advisory>) -> Option<AdvisoryLevel> {
    advisories.into_iter().map(|a| a.level).max()
}

/// Renders the notice shown when `advisory` applies to the user.
pub fn build_notice(advisory: &Advisory, attrs: &UserAttributes, options: &MatchOptions) -> Notice {
    let context = TemplateContext::for_user(&advisory.condition, attrs, options);
    Notice {
        title: Some(display_name(advisory)),
        message: resolve(&advisory.message_template, &context),
        level: advisory.level,
        created_at: options.now(),
        local: true,
        send_notification: advisory.send_notification,
        send_tts: advisory.send_tts,
        relevant_group_id: matched_group(&advisory.condition, attrs).map(|g| g.id.clone()),
        relevant_advisory_id: Some(advisory.id.clone()),
        relevant_user_id: Some(attrs.id.clone()).filter(|id| !id.is_empty()),
    }
}
