//! Advisory validation against rules A-001 through A-008.
//!
//! Returns **all** errors and warnings, not just the first. Validation does not
//! modify the advisory.

use crate::edit::NodePath;
use crate::enums::{AdvisoryLevel, ConditionKind};
use crate::error::*;
use crate::primitives::{MAX_CONDITION_DEPTH, contains_kind, depth, leaf_count};
use crate::template::{available_variables, placeholders};
use crate::types::*;
use regex::Regex;
use std::sync::LazyLock;

// ─── Cached regexes ─────────────────────────────────────────────────────────

static ADVISORY_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^vrcmrd_adv_[1-9A-HJ-NP-Za-km-z]{12}$").unwrap()
});

static GROUP_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^grp_[A-Za-z0-9-]+$").unwrap());

static AVATAR_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^avtr_[A-Za-z0-9-]+$").unwrap());

static OWNER_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(usr|grp)_[A-Za-z0-9-]+$").unwrap());

/// Validate an advisory against all rules. Returns every error and warning found.
pub fn validate(advisory: &Advisory) -> ValidationResult {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    a001_id_format(advisory, &mut errors);
    a002_template_present(advisory, &mut errors);
    a003_log_line_alone(advisory, &mut errors);
    // Per-node rules only run on trees within the depth limit.
    if a008_depth_limit(advisory, &mut errors) {
        walk(&advisory.condition, &NodePath::root(), &mut |node, path| {
            a004_identifier_payloads(node, path, &mut errors);
            a005_text_payloads(node, path, &mut errors);
            a007_platform_selected(node, path, &mut errors);
            w001_double_negation(node, path, &mut warnings);
            w002_empty_composite(node, path, &mut warnings);
        });
    }
    a006_known_placeholders(advisory, &mut errors);

    w003_silent_maximum(advisory, &mut warnings);

    ValidationResult { errors, warnings }
}

/// Validate every advisory in a list, prefixing paths with the list index.
pub fn validate_all(advisories: &[Advisory]) -> ValidationResult {
    let mut result = ValidationResult::default();
    for (i, advisory) in advisories.iter().enumerate() {
        let single = validate(advisory);
        result
            .errors
            .extend(single.errors.into_iter().map(|mut e| {
                e.path = format!("[{}].{}", i, e.path);
                e
            }));
        result
            .warnings
            .extend(single.warnings.into_iter().map(|mut w| {
                w.path = w.path.map(|p| format!("[{}].{}", i, p));
                w
            }));
    }
    for (i, advisory) in advisories.iter().enumerate() {
        if advisories[..i].iter().any(|a| a.id == advisory.id) {
            result.errors.push(error(
                "A-001",
                format!("[{}].id", i),
                format!("duplicate advisory id '{}'", advisory.id),
            ));
        }
    }
    result
}

fn walk(condition: &Condition, path: &NodePath, visit: &mut dyn FnMut(&Condition, &NodePath)) {
    visit(condition, path);
    for (i, child) in condition.children().iter().enumerate() {
        walk(child, &path.child(i), visit);
    }
}

fn error(rule: &str, path: impl Into<String>, message: impl Into<String>) -> ValidationError {
    ValidationError {
        rule: rule.to_string(),
        path: path.into(),
        message: message.into(),
    }
}

fn warning(code: &str, path: impl Into<String>, message: impl Into<String>) -> Diagnostic {
    Diagnostic {
        severity: DiagnosticSeverity::Warning,
        code: code.to_string(),
        path: Some(path.into()),
        message: message.into(),
    }
}

// ─── A-001: Advisory id format ──────────────────────────────────────────────

fn a001_id_format(advisory: &Advisory, errors: &mut Vec<ValidationError>) {
    if !ADVISORY_ID_RE.is_match(&advisory.id) {
        errors.push(error(
            "A-001",
            "id",
            format!(
                "advisory id '{}' must be 'vrcmrd_adv_' followed by 12 Base58 characters",
                advisory.id
            ),
        ));
    }
}

// ─── A-002: Message template present ────────────────────────────────────────

fn a002_template_present(advisory: &Advisory, errors: &mut Vec<ValidationError>) {
    if advisory.message_template.trim().is_empty() {
        errors.push(error(
            "A-002",
            "message_template",
            "message template must not be empty",
        ));
    }
}

// ─── A-003: LogLinePrefix stands alone ──────────────────────────────────────

fn a003_log_line_alone(advisory: &Advisory, errors: &mut Vec<ValidationError>) {
    let condition = &advisory.condition;
    if contains_kind(condition, ConditionKind::LogLinePrefix) && leaf_count(condition) > 1 {
        errors.push(error(
            "A-003",
            "condition",
            "LogLinePrefix cannot be combined with other conditions",
        ));
    }
}

// ─── A-004: Identifier payload shapes ───────────────────────────────────────

fn a004_identifier_payloads(node: &Condition, path: &NodePath, errors: &mut Vec<ValidationError>) {
    let (value, re, expected) = match node {
        Condition::IsGroupMember(id) => (id, &*GROUP_ID_RE, "a group id (grp_…)"),
        Condition::AvatarMayBe(id) => (id, &*AVATAR_ID_RE, "an avatar id (avtr_…)"),
        Condition::InstanceOwner(id) => (id, &*OWNER_ID_RE, "a user or group id (usr_… or grp_…)"),
        _ => return,
    };
    if !re.is_match(value) {
        errors.push(error(
            "A-004",
            path.to_string(),
            format!("{} expects {}, got '{}'", node.kind(), expected, value),
        ));
    }
}

// ─── A-005: Text payloads non-empty ─────────────────────────────────────────

fn a005_text_payloads(node: &Condition, path: &NodePath, errors: &mut Vec<ValidationError>) {
    match node {
        Condition::UsernameContains(s) | Condition::LogLinePrefix(s) if s.is_empty() => {
            errors.push(error(
                "A-005",
                path.to_string(),
                format!("{} must not be empty", node.kind()),
            ));
        }
        _ => {}
    }
}

// ─── A-006: Placeholders name offered variables ─────────────────────────────

fn a006_known_placeholders(advisory: &Advisory, errors: &mut Vec<ValidationError>) {
    let offered = available_variables(&advisory.condition);
    for name in placeholders(&advisory.message_template) {
        if !offered.contains(&name) {
            errors.push(error(
                "A-006",
                "message_template",
                format!(
                    "placeholder '{}' is not available for this condition (available: {})",
                    name,
                    offered.join(", ")
                ),
            ));
        }
    }
}

// ─── A-007: Platform selected ───────────────────────────────────────────────

fn a007_platform_selected(node: &Condition, path: &NodePath, errors: &mut Vec<ValidationError>) {
    if let Condition::PlatformIs(None) = node {
        errors.push(error("A-007", path.to_string(), "PlatformIs needs a platform"));
    }
}

// ─── A-008: Depth limit ─────────────────────────────────────────────────────

fn a008_depth_limit(advisory: &Advisory, errors: &mut Vec<ValidationError>) -> bool {
    let found = depth(&advisory.condition);
    if found > MAX_CONDITION_DEPTH {
        errors.push(error(
            "A-008",
            "condition",
            format!(
                "condition nests {} levels deep, more than the limit of {}",
                found, MAX_CONDITION_DEPTH
            ),
        ));
        return false;
    }
    true
}

// ─── Warnings ───────────────────────────────────────────────────────────────

fn w001_double_negation(node: &Condition, path: &NodePath, warnings: &mut Vec<Diagnostic>) {
    if let Condition::Not(child) = node
        && let Condition::Not(_) = child.as_ref()
    {
        warnings.push(warning(
            "W-001",
            path.to_string(),
            "directly nested Not conditions cancel out",
        ));
    }
}

fn w002_empty_composite(node: &Condition, path: &NodePath, warnings: &mut Vec<Diagnostic>) {
    match node {
        Condition::AllOf(children) if children.is_empty() => warnings.push(warning(
            "W-002",
            path.to_string(),
            "empty AllOf always matches",
        )),
        Condition::AnyOf(children) if children.is_empty() => warnings.push(warning(
            "W-002",
            path.to_string(),
            "empty AnyOf never matches",
        )),
        _ => {}
    }
}

fn w003_silent_maximum(advisory: &Advisory, warnings: &mut Vec<Diagnostic>) {
    if advisory.active
        && advisory.level == AdvisoryLevel::Maximum
        && !advisory.send_notification
        && !advisory.send_tts
    {
        warnings.push(warning(
            "W-003",
            "level",
            "Maximum-level advisory sends neither a notification nor speech",
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> Advisory {
        let mut adv = Advisory::new("vrcmrd_adv_abcdefghijkm");
        adv.message_template = "{{:username:}} is new".into();
        adv.condition = Condition::AccountAgeAtMostDays(7);
        adv
    }

    #[test]
    fn valid_advisory_passes() {
        let result = validate(&valid());
        assert!(result.is_valid(), "{:?}", result.errors);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn base58_excludes_ambiguous_characters() {
        let mut adv = valid();
        adv.id = "vrcmrd_adv_abcdefghijk0".into();
        assert!(validate(&adv).errors.iter().any(|e| e.rule == "A-001"));
    }

    #[test]
    fn depth_limit_is_an_error() {
        let mut adv = valid();
        adv.condition = (0..MAX_CONDITION_DEPTH).fold(Condition::AccountAgeAtMostDays(7), |c, _| {
            Condition::Not(Box::new(c))
        });
        let result = validate(&adv);
        assert_eq!(result.errors.len(), 1, "{:?}", result.errors);
        assert_eq!(result.errors[0].rule, "A-008");
        assert_eq!(result.errors[0].path, "condition");
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn log_line_must_stand_alone() {
        let mut adv = valid();
        adv.condition = Condition::AllOf(vec![
            Condition::LogLinePrefix("[ModerationManager]".into()),
            Condition::AgeNotVerified,
        ]);
        assert!(validate(&adv).errors.iter().any(|e| e.rule == "A-003"));
        adv.condition = Condition::AllOf(vec![Condition::LogLinePrefix("[Mod]".into())]);
        assert!(!validate(&adv).errors.iter().any(|e| e.rule == "A-003"));
    }

    #[test]
    fn identifier_paths_point_at_node() {
        let mut adv = valid();
        adv.condition = Condition::AnyOf(vec![
            Condition::AccountAgeAtMostDays(1),
            Condition::IsGroupMember("not-a-group".into()),
        ]);
        let result = validate(&adv);
        let err = result.errors.iter().find(|e| e.rule == "A-004").unwrap();
        assert_eq!(err.path, "condition[1]");
    }

    #[test]
    fn unknown_placeholder_is_rejected() {
        let mut adv = valid();
        adv.message_template = "{{:group_name:}} member".into();
        assert!(validate(&adv).errors.iter().any(|e| e.rule == "A-006"));
    }

    #[test]
    fn double_negation_warns() {
        let mut adv = valid();
        adv.condition = Condition::Not(Box::new(Condition::Not(Box::new(
            Condition::AccountAgeAtMostDays(3),
        ))));
        let result = validate(&adv);
        assert!(result.warnings.iter().any(|w| w.code == "W-001"));
    }

    #[test]
    fn duplicate_ids_in_list() {
        let result = validate_all(&[valid(), valid()]);
        assert!(result.errors.iter().any(|e| e.rule == "A-001" && e.path == "[1].id"));
    }
}
