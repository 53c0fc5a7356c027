//! Message template resolution.
//!
//! Placeholders are `{{:name:}}` or `{{:name||default:}}`. A placeholder
//! resolves to the named variable, else its default text, else nothing.
//! Unterminated or malformed placeholders are passed through literally.

use crate::enums::ConditionKind;
use crate::evaluate::{MatchOptions, account_age_days, matched_group};
use crate::primitives::collect_leaf_kinds;
use crate::types::{Condition, UserAttributes};
use std::collections::HashMap;

const OPEN: &str = "{{:";
const CLOSE: &str = ":}}";
const DEFAULT_SEPARATOR: &str = "||";

// ─── Scanner ────────────────────────────────────────────────────────────────

/// One piece of a scanned template.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Fragment<'a> {
    Literal(&'a str),
    Placeholder {
        name: &'a str,
        default: Option<&'a str>,
    },
}

/// Lazy left-to-right scan of a template into fragments.
#[derive(Clone, Debug)]
pub struct Fragments<'a> {
    text: &'a str,
    pos: usize,
    // Result of the last search for a closer. A found closer stays valid
    // until the scan passes it; a failed search stays failed.
    closer: Option<Option<usize>>,
}

/// Scans `template` into literal and placeholder fragments.
pub fn fragments(template: &str) -> Fragments<'_> {
    Fragments {
        text: template,
        pos: 0,
        closer: None,
    }
}

impl<'a> Fragments<'a> {
    /// Start of the first `:}}` at or after `from`.
    fn closer_from(&mut self, from: usize) -> Option<usize> {
        match self.closer {
            Some(Some(at)) if at >= from => Some(at),
            Some(None) => None,
            _ => {
                let found = self.text[from..].find(CLOSE).map(|i| from + i);
                self.closer = Some(found);
                found
            }
        }
    }
}

impl<'a> Iterator for Fragments<'a> {
    type Item = Fragment<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let text = self.text;
        let rest = &text[self.pos..];
        if rest.is_empty() {
            return None;
        }
        let Some(start) = rest.find(OPEN) else {
            self.pos = text.len();
            return Some(Fragment::Literal(rest));
        };
        if start > 0 {
            self.pos += start;
            return Some(Fragment::Literal(&rest[..start]));
        }

        let body_start = self.pos + OPEN.len();
        let Some(close) = self.closer_from(body_start) else {
            // Unterminated: the remainder is literal text.
            self.pos = text.len();
            return Some(Fragment::Literal(rest));
        };
        match split_body(&text[body_start..close]) {
            Some((name, default)) => {
                self.pos = close + CLOSE.len();
                Some(Fragment::Placeholder { name, default })
            }
            None => {
                // Malformed: emit the opening marker literally and rescan after it,
                // so a well-formed placeholder nested in the garbage still resolves.
                self.pos += OPEN.len();
                Some(Fragment::Literal(&rest[..OPEN.len()]))
            }
        }
    }
}

/// Splits a placeholder body into its name and optional default. The name is
/// an identifier; anything after it must start with `||`.
fn split_body(body: &str) -> Option<(&str, Option<&str>)> {
    let name_len = body
        .bytes()
        .take_while(|b| b.is_ascii_alphanumeric() || *b == b'_')
        .count();
    let (name, rest) = body.split_at(name_len);
    if name.is_empty() || name.as_bytes()[0].is_ascii_digit() {
        return None;
    }
    if rest.is_empty() {
        return Some((name, None));
    }
    rest.strip_prefix(DEFAULT_SEPARATOR)
        .map(|default| (name, Some(default)))
}

/// Names referenced by placeholders in `template`, in order of appearance.
pub fn placeholders(template: &str) -> impl Iterator<Item = &str> + '_ {
    fragments(template).filter_map(|f| match f {
        Fragment::Placeholder { name, .. } => Some(name),
        Fragment::Literal(_) => None,
    })
}

// ─── Context ────────────────────────────────────────────────────────────────

/// Named values available to a template.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TemplateContext {
    values: HashMap<String, String>,
}

impl TemplateContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Fills every variable the condition offers that has a value for this user.
    pub fn for_user(condition: &Condition, attrs: &UserAttributes, options: &MatchOptions) -> Self {
        let mut context = TemplateContext::new();
        for name in available_variables(condition) {
            if let Some(value) = variable_value(name, condition, attrs, options) {
                context.insert(name, value);
            }
        }
        context
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TemplateContext {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut context = TemplateContext::new();
        for (k, v) in iter {
            context.insert(k, v);
        }
        context
    }
}

fn variable_value(
    name: &str,
    condition: &Condition,
    attrs: &UserAttributes,
    options: &MatchOptions,
) -> Option<String> {
    let non_empty = |s: &str| Some(s.to_string()).filter(|s| !s.is_empty());
    match name {
        "username" => non_empty(&attrs.username),
        "user_id" => non_empty(&attrs.id),
        "account_age_days" => account_age_days(attrs, options).map(|d| d.to_string()),
        "avatar_name" => attrs.avatar_name.clone(),
        "avatar_id" => attrs.avatar_id.clone(),
        "group_name" => matched_group(condition, attrs).and_then(|g| g.name.clone()),
        "group_id" => matched_group(condition, attrs).map(|g| g.id.clone()),
        "platform" => attrs.platform.map(|p| p.label().to_string()),
        "trust_rank" => attrs.trust_rank.map(|r| r.label().to_string()),
        "instance_owner" => attrs.instance_owner.clone(),
        "log_line" => attrs.log_line.clone(),
        _ => None,
    }
}

// ─── Catalog ────────────────────────────────────────────────────────────────

/// Variables offered regardless of the condition.
pub const ALWAYS_AVAILABLE: &[&str] = &["username", "user_id"];

/// Variables a node of `kind` makes available.
pub fn variables_for(kind: ConditionKind) -> &'static [&'static str] {
    match kind {
        ConditionKind::UsernameContains => &["username"],
        ConditionKind::AccountAgeAtMostDays => &["account_age_days"],
        ConditionKind::AvatarMayBe => &["avatar_name", "avatar_id"],
        ConditionKind::IsGroupMember => &["group_name", "group_id"],
        ConditionKind::PlatformIs => &["platform"],
        ConditionKind::TrustRankAtMost => &["trust_rank"],
        ConditionKind::InstanceOwner => &["instance_owner"],
        ConditionKind::LogLinePrefix => &["log_line"],
        ConditionKind::AllOf
        | ConditionKind::AnyOf
        | ConditionKind::Not
        | ConditionKind::AgeNotVerified
        | ConditionKind::InstanceGroupRestricted => &[],
    }
}

/// Ordered, deduplicated variables offered to the author of `condition`.
pub fn available_variables(condition: &Condition) -> Vec<&'static str> {
    let mut names: Vec<&'static str> = ALWAYS_AVAILABLE.to_vec();
    for kind in collect_leaf_kinds(condition) {
        for name in variables_for(kind) {
            if !names.contains(name) {
                names.push(name);
            }
        }
    }
    names
}

// ─── resolve ────────────────────────────────────────────────────────────────

/// Substitutes every placeholder in `template` from `context`.
pub fn resolve(template: &str, context: &TemplateContext) -> String {
    let mut out = String::with_capacity(template.len());
    for fragment in fragments(template) {
        match fragment {
            Fragment::Literal(text) => out.push_str(text),
            Fragment::Placeholder { name, default } => {
                if let Some(value) = context.get(name) {
                    out.push_str(value);
                } else if let Some(default) = default {
                    out.push_str(default);
                }
            }
        }
    }
    out
}
