use crate::types::*;

const MAX_DERIVED_NAME_CHARS: usize = 80;

/// Normalize an advisory into its canonical form.
///
/// A blank name is derived from the condition (or the message template),
/// the template is trimmed, and tags are trimmed, sorted and deduplicated.
///
/// This is idempotent: `normalize(normalize(a)) == normalize(a)`.
pub fn normalize(mut advisory: Advisory) -> Advisory {
    advisory.name = display_name(&advisory);
    advisory.message_template = advisory.message_template.trim().to_string();

    let mut tags: Vec<String> = advisory
        .tags
        .iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();
    tags.sort();
    tags.dedup();
    advisory.tags = tags;

    advisory
}

/// The advisory's name, or one derived from its condition or template when
/// the name is blank.
pub fn display_name(advisory: &Advisory) -> String {
    let name = advisory.name.trim();
    if !name.is_empty() {
        return name.to_string();
    }
    let derived = match &advisory.condition {
        Condition::AllOf(children) if children.is_empty() => {
            advisory.message_template.trim().to_string()
        }
        condition => describe(condition),
    };
    if derived.is_empty() {
        return "Untitled advisory".to_string();
    }
    truncate_chars(&capitalize(&derived), MAX_DERIVED_NAME_CHARS)
}

/// Short English description of a condition tree.
pub fn describe(condition: &Condition) -> String {
    match condition {
        Condition::AllOf(children) => join(children, "and", "always"),
        Condition::AnyOf(children) => join(children, "or", "never"),
        Condition::Not(child) => format!("not {}", describe_nested(child)),
        Condition::UsernameContains(s) => format!("username contains \"{}\"", s),
        Condition::AccountAgeAtMostDays(n) => format!("account at most {} days old", n),
        Condition::AvatarMayBe(s) => format!("avatar may be {}", s),
        Condition::IsGroupMember(s) => format!("member of {}", s),
        Condition::AgeNotVerified => "not age-verified".to_string(),
        Condition::PlatformIs(Some(p)) => format!("on {}", p.label()),
        Condition::PlatformIs(None) => "on an unset platform".to_string(),
        Condition::TrustRankAtMost(r) => format!("trust rank at most {}", r.label()),
        Condition::InstanceGroupRestricted => "group-restricted instance".to_string(),
        Condition::InstanceOwner(s) => format!("instance owned by {}", s),
        Condition::LogLinePrefix(s) => format!("log line starts with \"{}\"", s),
    }
}

fn join(children: &[Condition], conjunction: &str, empty: &str) -> String {
    match children {
        [] => empty.to_string(),
        [only] => describe(only),
        _ => children
            .iter()
            .map(describe_nested)
            .collect::<Vec<_>>()
            .join(&format!(" {} ", conjunction)),
    }
}

fn describe_nested(condition: &Condition) -> String {
    match condition {
        Condition::AllOf(children) | Condition::AnyOf(children) if children.len() > 1 => {
            format!("({})", describe(condition))
        }
        other => describe(other),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max - 1).collect();
    out.push('…');
    out
}
