use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use tracing::debug;

use crate::enums::*;

// ─── Condition ──────────────────────────────────────────────────────────────

/// A node of an advisory's boolean condition tree.
///
/// Parents own their children exclusively, so a tree is always finite and
/// acyclic. On the wire a node is `{"type": <kind>, "data": <payload>}`;
/// `Not` wraps its child as `{"data": <condition>}` and payload-less leaves
/// omit `data`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Condition {
    AllOf(Vec<Condition>),
    AnyOf(Vec<Condition>),
    Not(Box<Condition>),
    UsernameContains(String),
    AccountAgeAtMostDays(u32),
    AvatarMayBe(String),
    IsGroupMember(String),
    AgeNotVerified,
    /// `None` until a platform is picked; never matches.
    PlatformIs(Option<Platform>),
    TrustRankAtMost(TrustRank),
    InstanceGroupRestricted,
    InstanceOwner(String),
    LogLinePrefix(String),
}

impl Default for Condition {
    fn default() -> Self {
        Condition::AllOf(Vec::new())
    }
}

impl Condition {
    pub fn kind(&self) -> ConditionKind {
        match self {
            Condition::AllOf(_) => ConditionKind::AllOf,
            Condition::AnyOf(_) => ConditionKind::AnyOf,
            Condition::Not(_) => ConditionKind::Not,
            Condition::UsernameContains(_) => ConditionKind::UsernameContains,
            Condition::AccountAgeAtMostDays(_) => ConditionKind::AccountAgeAtMostDays,
            Condition::AvatarMayBe(_) => ConditionKind::AvatarMayBe,
            Condition::IsGroupMember(_) => ConditionKind::IsGroupMember,
            Condition::AgeNotVerified => ConditionKind::AgeNotVerified,
            Condition::PlatformIs(_) => ConditionKind::PlatformIs,
            Condition::TrustRankAtMost(_) => ConditionKind::TrustRankAtMost,
            Condition::InstanceGroupRestricted => ConditionKind::InstanceGroupRestricted,
            Condition::InstanceOwner(_) => ConditionKind::InstanceOwner,
            Condition::LogLinePrefix(_) => ConditionKind::LogLinePrefix,
        }
    }

    /// Direct children in evaluation order. Empty for leaves.
    pub fn children(&self) -> &[Condition] {
        match self {
            Condition::AllOf(children) | Condition::AnyOf(children) => children,
            Condition::Not(child) => std::slice::from_ref(child.as_ref()),
            _ => &[],
        }
    }

    /// Mutable access to the child at `index`, for any composite kind.
    pub(crate) fn child_mut(&mut self, index: usize) -> Option<&mut Condition> {
        match self {
            Condition::AllOf(children) | Condition::AnyOf(children) => children.get_mut(index),
            Condition::Not(child) if index == 0 => Some(child.as_mut()),
            _ => None,
        }
    }

    /// The payload of a leaf, in its wire form. `None` for composites and
    /// payload-less leaves.
    pub fn payload(&self) -> Option<Value> {
        match self {
            Condition::UsernameContains(s)
            | Condition::AvatarMayBe(s)
            | Condition::IsGroupMember(s)
            | Condition::InstanceOwner(s)
            | Condition::LogLinePrefix(s) => Some(Value::String(s.clone())),
            Condition::AccountAgeAtMostDays(n) => Some(Value::from(*n)),
            Condition::PlatformIs(p) => Some(Value::String(
                p.map(|p| p.as_str().to_string()).unwrap_or_default(),
            )),
            Condition::TrustRankAtMost(rank) => serde_json::to_value(rank).ok(),
            Condition::AllOf(_)
            | Condition::AnyOf(_)
            | Condition::Not(_)
            | Condition::AgeNotVerified
            | Condition::InstanceGroupRestricted => None,
        }
    }
}

#[derive(Serialize)]
struct NotWrapper<'a> {
    data: &'a Condition,
}

impl Serialize for Condition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("type", self.kind().as_str())?;
        match self {
            Condition::AllOf(children) | Condition::AnyOf(children) => {
                map.serialize_entry("data", children)?;
            }
            Condition::Not(child) => {
                map.serialize_entry("data", &NotWrapper { data: child.as_ref() })?;
            }
            other => {
                if let Some(payload) = other.payload() {
                    map.serialize_entry("data", &payload)?;
                }
            }
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Condition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        condition_from_value(&value).map_err(serde::de::Error::custom)
    }
}

fn condition_from_value(value: &Value) -> Result<Condition, String> {
    let map = value
        .as_object()
        .ok_or_else(|| format!("condition must be an object, got {}", value))?;
    let tag = map
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| "condition must have a string 'type' field".to_string())?;
    let kind = ConditionKind::from_name(tag)
        .ok_or_else(|| format!("unknown variant `{}` for condition type", tag))?;
    let data = map.get("data").unwrap_or(&Value::Null);

    let condition = match kind {
        ConditionKind::AllOf => Condition::AllOf(children_from_value(data, kind)?),
        ConditionKind::AnyOf => Condition::AnyOf(children_from_value(data, kind)?),
        ConditionKind::Not => {
            // Stored as {"data": <condition>}; a bare condition is accepted too.
            let inner = match data.as_object() {
                Some(obj) if !obj.contains_key("type") => obj
                    .get("data")
                    .ok_or_else(|| "Not condition must wrap its child in 'data'".to_string())?,
                Some(_) => data,
                None => return Err("Not condition requires a child condition".to_string()),
            };
            Condition::Not(Box::new(condition_from_value(inner)?))
        }
        ConditionKind::UsernameContains => Condition::UsernameContains(string_payload(data, kind)?),
        ConditionKind::AvatarMayBe => Condition::AvatarMayBe(string_payload(data, kind)?),
        ConditionKind::IsGroupMember => Condition::IsGroupMember(string_payload(data, kind)?),
        ConditionKind::InstanceOwner => Condition::InstanceOwner(string_payload(data, kind)?),
        ConditionKind::LogLinePrefix => Condition::LogLinePrefix(string_payload(data, kind)?),
        ConditionKind::AccountAgeAtMostDays => {
            Condition::AccountAgeAtMostDays(day_count_payload(data)?)
        }
        ConditionKind::PlatformIs => match data {
            Value::Null => Condition::PlatformIs(None),
            Value::String(s) if s.is_empty() => Condition::PlatformIs(None),
            other => Condition::PlatformIs(Some(
                serde_json::from_value(other.clone()).map_err(|e| e.to_string())?,
            )),
        },
        ConditionKind::TrustRankAtMost => Condition::TrustRankAtMost(
            serde_json::from_value(data.clone()).map_err(|e| e.to_string())?,
        ),
        ConditionKind::AgeNotVerified => Condition::AgeNotVerified,
        ConditionKind::InstanceGroupRestricted => Condition::InstanceGroupRestricted,
    };
    Ok(condition)
}

fn children_from_value(data: &Value, kind: ConditionKind) -> Result<Vec<Condition>, String> {
    match data {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => items.iter().map(condition_from_value).collect(),
        other => Err(format!("{} expects an array of conditions, got {}", kind, other)),
    }
}

fn string_payload(data: &Value, kind: ConditionKind) -> Result<String, String> {
    match data {
        Value::String(s) => Ok(s.clone()),
        Value::Null => Ok(String::new()),
        other => Err(format!("{} expects a string, got {}", kind, other)),
    }
}

fn day_count_payload(data: &Value) -> Result<u32, String> {
    if let Some(n) = data.as_u64() {
        return u32::try_from(n).map_err(|_| format!("day count {} is too large", n));
    }
    // Numeric inputs may hand over whole numbers as floats.
    match data.as_f64() {
        Some(f) if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= u32::MAX as f64 => {
            Ok(f as u32)
        }
        _ => Err(format!(
            "AccountAgeAtMostDays expects a non-negative whole number, got {}",
            data
        )),
    }
}

// ─── Advisory ───────────────────────────────────────────────────────────────

/// A named, leveled warning rule: a condition plus a message template and
/// delivery flags.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advisory {
    /// Backend-issued identity, immutable once assigned.
    pub id: String,
    /// Display label; derived from the condition when left blank.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub level: AdvisoryLevel,
    #[serde(default)]
    pub message_template: String,
    /// Milliseconds since the epoch, as a decimal string.
    #[serde(default, deserialize_with = "timestamp_string")]
    pub created_at: String,
    #[serde(default, deserialize_with = "timestamp_string")]
    pub updated_at: String,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub updated_by: Option<String>,
    /// Inactive advisories are never evaluated.
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub condition: Condition,
    #[serde(default)]
    pub send_notification: bool,
    #[serde(default)]
    pub send_tts: bool,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Advisory {
    /// A fresh advisory with the editor's defaults: inactive, level `High`,
    /// and an empty `AllOf` condition.
    pub fn new(id: impl Into<String>) -> Self {
        let now = Utc::now().timestamp_millis().to_string();
        Advisory {
            id: id.into(),
            name: String::new(),
            level: AdvisoryLevel::High,
            message_template: String::new(),
            created_at: now.clone(),
            updated_at: now,
            created_by: None,
            updated_by: None,
            active: false,
            condition: Condition::default(),
            send_notification: false,
            send_tts: false,
            tags: Vec::new(),
        }
    }
}

/// Reads a value the backend may report in forms this crate does not know.
/// Anything that does not parse is treated as missing.
fn unknown_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    match T::deserialize(&value) {
        Ok(parsed) => Ok(Some(parsed)),
        Err(e) => {
            debug!(%value, error = %e, "treating unrecognised user attribute as unknown");
            Ok(None)
        }
    }
}

/// Accepts a timestamp written as a string or a bare number.
fn timestamp_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!(
            "timestamp must be a string or number, got {}",
            other
        ))),
    }
}

// ─── UserAttributes ─────────────────────────────────────────────────────────

/// A group the user belongs to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMembership {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Snapshot of one user's attributes, supplied by the backend per evaluation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserAttributes {
    pub id: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_name: Option<String>,
    pub groups: Vec<GroupMembership>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_owner: Option<String>,
    pub instance_access: InstanceAccess,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_created: Option<DateTime<Utc>>,
    pub age_verified: bool,
    /// Unrecognised platforms read as unknown.
    #[serde(deserialize_with = "unknown_as_none", skip_serializing_if = "Option::is_none")]
    pub platform: Option<Platform>,
    #[serde(deserialize_with = "unknown_as_none", skip_serializing_if = "Option::is_none")]
    pub trust_rank: Option<TrustRank>,
    /// Most recent log line attributed to the user.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_line: Option<String>,
}

impl UserAttributes {
    pub fn group(&self, group_id: &str) -> Option<&GroupMembership> {
        self.groups.iter().find(|g| g.id == group_id)
    }

    pub fn is_group_member(&self, group_id: &str) -> bool {
        self.group(group_id).is_some()
    }
}

// ─── Notice ─────────────────────────────────────────────────────────────────

/// A rendered advisory hit (or a local announcement) shown in notice history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    pub title: Option<String>,
    pub message: String,
    pub level: AdvisoryLevel,
    pub created_at: DateTime<Utc>,
    /// Raised by an advisory authored in this application.
    pub local: bool,
    pub send_notification: bool,
    pub send_tts: bool,
    pub relevant_group_id: Option<String>,
    pub relevant_advisory_id: Option<String>,
    pub relevant_user_id: Option<String>,
}

impl Notice {
    /// Text handed to speech synthesis: title and message as two sentences.
    pub fn speech_text(&self) -> String {
        format!("{}. {}.", self.title.as_deref().unwrap_or(""), self.message)
    }
}
