//! Advisory lists and user snapshots from JSON (config store) or YAML (import).
//!
//! Parsing performs deserialization and type mapping only. It does NOT
//! validate advisories or apply normalization. The one structural check is
//! depth: condition trees deeper than [`MAX_CONDITION_DEPTH`] are rejected.

use crate::error::{ParseError, ParseErrorKind};
use crate::primitives::{MAX_CONDITION_DEPTH, depth};
use crate::types::{Advisory, Condition, UserAttributes};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Parse the stored advisory list (a JSON array).
pub fn parse_advisories(input: &str) -> Result<Vec<Advisory>, ParseError> {
    let value = json_value(input)?;
    advisories_from_value(value)
}

/// Parse an advisory list from YAML (a sequence of advisory mappings).
pub fn parse_advisories_yaml(input: &str) -> Result<Vec<Advisory>, ParseError> {
    if input.trim().is_empty() {
        return Err(empty_input());
    }
    check_multi_document(input)?;

    let value: Value = serde_saphyr::from_str(input).map_err(|e| {
        let msg = e.to_string();
        ParseError {
            kind: classify_saphyr_error(&msg),
            message: msg,
            path: None,
            line: None,
            column: None,
        }
    })?;
    advisories_from_value(value)
}

/// Parse a single advisory from JSON.
pub fn parse_advisory(input: &str) -> Result<Advisory, ParseError> {
    advisory_from_value(json_value(input)?, None)
}

/// Parse a bare condition tree from JSON.
pub fn parse_condition(input: &str) -> Result<Condition, ParseError> {
    let condition = from_value(json_value(input)?, Some("condition"))?;
    check_depth(&condition, "condition")?;
    Ok(condition)
}

/// Parse a user snapshot from JSON.
pub fn parse_user(input: &str) -> Result<UserAttributes, ParseError> {
    from_value(json_value(input)?, None)
}

pub(crate) fn advisories_from_value(value: Value) -> Result<Vec<Advisory>, ParseError> {
    // A never-written config key reads back as null.
    let items = match value {
        Value::Null => return Ok(Vec::new()),
        Value::Array(items) => items,
        _ => {
            return Err(ParseError {
                kind: ParseErrorKind::TypeMismatch,
                message: "advisory list must be an array".to_string(),
                path: None,
                line: None,
                column: None,
            });
        }
    };
    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| advisory_from_value(item, Some(&format!("[{}]", i))))
        .collect()
}

fn advisory_from_value(value: Value, path: Option<&str>) -> Result<Advisory, ParseError> {
    let advisory: Advisory = from_value(value, path)?;
    let condition_path = match path {
        Some(prefix) => format!("{}.condition", prefix),
        None => "condition".to_string(),
    };
    check_depth(&advisory.condition, &condition_path)?;
    Ok(advisory)
}

fn check_depth(condition: &Condition, path: &str) -> Result<(), ParseError> {
    let found = depth(condition);
    if found > MAX_CONDITION_DEPTH {
        return Err(ParseError {
            kind: ParseErrorKind::TooDeep,
            message: format!(
                "condition nests {} levels deep (limit {})",
                found, MAX_CONDITION_DEPTH
            ),
            path: Some(path.to_string()),
            line: None,
            column: None,
        });
    }
    Ok(())
}

fn json_value(input: &str) -> Result<Value, ParseError> {
    if input.trim().is_empty() {
        return Err(empty_input());
    }
    serde_json::from_str(input).map_err(|e| json_error(&e, None))
}

fn from_value<T: DeserializeOwned>(value: Value, path: Option<&str>) -> Result<T, ParseError> {
    serde_json::from_value(value).map_err(|e| json_error(&e, path))
}

fn json_error(e: &serde_json::Error, path: Option<&str>) -> ParseError {
    let msg = e.to_string();
    // Errors raised from a Value have no position.
    let (line, column) = if e.line() == 0 {
        (None, None)
    } else {
        (Some(e.line()), Some(e.column()))
    };
    ParseError {
        kind: classify_json_error(e, &msg),
        message: msg,
        path: path.map(str::to_string),
        line,
        column,
    }
}

fn empty_input() -> ParseError {
    ParseError {
        kind: ParseErrorKind::Syntax,
        message: "empty input".to_string(),
        path: None,
        line: None,
        column: None,
    }
}

/// Only matches `---` at column 0 to avoid false positives inside block scalars.
fn check_multi_document(input: &str) -> Result<(), ParseError> {
    let mut markers = input
        .lines()
        .enumerate()
        .filter(|(_, line)| line.starts_with("---") && line[3..].trim().is_empty());
    if let Some((line_num, _)) = markers.nth(1) {
        return Err(ParseError {
            kind: ParseErrorKind::Syntax,
            message: "multi-document YAML is not supported".to_string(),
            path: None,
            line: Some(line_num + 1),
            column: None,
        });
    }
    Ok(())
}

fn classify_saphyr_error(msg: &str) -> ParseErrorKind {
    let lower = msg.to_lowercase();
    if lower.contains("unknown") || lower.contains("variant") {
        ParseErrorKind::UnknownVariant
    } else if lower.contains("type") || lower.contains("invalid") || lower.contains("expected") {
        ParseErrorKind::TypeMismatch
    } else {
        ParseErrorKind::Syntax
    }
}

fn classify_json_error(e: &serde_json::Error, msg: &str) -> ParseErrorKind {
    let lower = msg.to_lowercase();
    if lower.contains("unknown variant") {
        ParseErrorKind::UnknownVariant
    } else if e.is_syntax() || e.is_eof() {
        ParseErrorKind::Syntax
    } else {
        ParseErrorKind::TypeMismatch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::AdvisoryLevel;

    #[test]
    fn null_reads_as_empty_list() {
        assert!(parse_advisories("null").unwrap().is_empty());
    }

    #[test]
    fn syntax_error_has_position() {
        let err = parse_advisories("[{\"id\": }]").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::Syntax);
        assert_eq!(err.line, Some(1));
    }

    #[test]
    fn bad_item_reports_index() {
        let input = r#"[{"id": "a"}, {"id": "b", "level": "loud"}]"#;
        let err = parse_advisories(input).unwrap_err();
        assert_eq!(err.path.as_deref(), Some("[1]"));
    }

    #[test]
    fn unknown_condition_type() {
        let err = parse_condition(r#"{"type": "IsBanned"}"#).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnknownVariant);
    }

    #[test]
    fn yaml_list() {
        let input = "- id: vrcmrd_adv_abcdefghijkm\n  level: 4\n  condition:\n    type: AgeNotVerified\n";
        let list = parse_advisories_yaml(input).unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].level, AdvisoryLevel::Maximum);
        assert_eq!(list[0].condition, Condition::AgeNotVerified);
    }

    fn not_chain(levels: usize) -> Condition {
        (0..levels).fold(Condition::AgeNotVerified, |c, _| Condition::Not(Box::new(c)))
    }

    #[test]
    fn deepest_allowed_list_reads_back() {
        let mut adv = Advisory::new("deep");
        adv.condition = not_chain(MAX_CONDITION_DEPTH - 1);
        let json = serde_json::to_string(&vec![adv.clone()]).unwrap();
        assert_eq!(parse_advisories(&json).unwrap(), vec![adv]);
    }

    #[test]
    fn too_deep_condition_is_rejected_with_path() {
        let mut adv = Advisory::new("deep");
        adv.condition = not_chain(MAX_CONDITION_DEPTH);
        let json = serde_json::to_string(&vec![Advisory::new("flat"), adv]).unwrap();
        let err = parse_advisories(&json).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::TooDeep);
        assert_eq!(err.path.as_deref(), Some("[1].condition"));
    }

    #[test]
    fn yaml_rejects_multiple_documents() {
        let err = parse_advisories_yaml("---\n- id: a\n---\n- id: b\n").unwrap_err();
        assert_eq!(err.line, Some(3));
    }
}
