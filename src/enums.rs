//! Closed enumerations used throughout the advisory model.
//!
//! These are "closed" enums: only the defined variants are valid, and every
//! `match` over them is exhaustive, so adding a variant is a compile-time
//! checked change in the evaluator, editor and template catalog.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

// ─── AdvisoryLevel ──────────────────────────────────────────────────────────

/// Ordinal severity of an advisory. Serialized as its integer ordinal (0–4).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum AdvisoryLevel {
    /// Icons and call-outs only; never prioritized in the roster.
    None,
    Low,
    Medium,
    #[default]
    High,
    /// Cuts off queued speech so this advisory is read out immediately.
    Maximum,
}

impl AdvisoryLevel {
    pub const ALL: [AdvisoryLevel; 5] = [
        AdvisoryLevel::None,
        AdvisoryLevel::Low,
        AdvisoryLevel::Medium,
        AdvisoryLevel::High,
        AdvisoryLevel::Maximum,
    ];

    pub fn ordinal(self) -> u8 {
        match self {
            AdvisoryLevel::None => 0,
            AdvisoryLevel::Low => 1,
            AdvisoryLevel::Medium => 2,
            AdvisoryLevel::High => 3,
            AdvisoryLevel::Maximum => 4,
        }
    }

    pub fn from_ordinal(n: u64) -> Option<AdvisoryLevel> {
        match n {
            0 => Some(AdvisoryLevel::None),
            1 => Some(AdvisoryLevel::Low),
            2 => Some(AdvisoryLevel::Medium),
            3 => Some(AdvisoryLevel::High),
            4 => Some(AdvisoryLevel::Maximum),
            _ => None,
        }
    }

    /// Whether speech for this level flushes the queue instead of appending.
    pub fn interrupts_speech(self) -> bool {
        self == AdvisoryLevel::Maximum
    }

    pub fn label(self) -> &'static str {
        match self {
            AdvisoryLevel::None => "None",
            AdvisoryLevel::Low => "Low",
            AdvisoryLevel::Medium => "Medium",
            AdvisoryLevel::High => "High",
            AdvisoryLevel::Maximum => "Maximum",
        }
    }
}

impl Serialize for AdvisoryLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.ordinal())
    }
}

impl<'de> Deserialize<'de> for AdvisoryLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let n = u64::deserialize(deserializer)?;
        AdvisoryLevel::from_ordinal(n).ok_or_else(|| {
            serde::de::Error::custom(format!("advisory level must be 0..=4, got {}", n))
        })
    }
}

// ─── TrustRank ──────────────────────────────────────────────────────────────

/// User reputation classification, totally ordered from least to most trusted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum TrustRank {
    #[default]
    Nuisance,
    Visitor,
    NewUser,
    User,
    KnownUser,
    TrustedUser,
    Admin,
}

impl TrustRank {
    pub const ALL: [TrustRank; 7] = [
        TrustRank::Nuisance,
        TrustRank::Visitor,
        TrustRank::NewUser,
        TrustRank::User,
        TrustRank::KnownUser,
        TrustRank::TrustedUser,
        TrustRank::Admin,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TrustRank::Nuisance => "Nuisance",
            TrustRank::Visitor => "Visitor",
            TrustRank::NewUser => "New User",
            TrustRank::User => "User",
            TrustRank::KnownUser => "Known User",
            TrustRank::TrustedUser => "Trusted User",
            TrustRank::Admin => "Admin",
        }
    }
}

impl fmt::Display for TrustRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ─── Platform ───────────────────────────────────────────────────────────────

/// Client platform. The platform API spells PC as `standalonewindows`,
/// which is accepted on input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    #[default]
    #[serde(alias = "standalonewindows")]
    Pc,
    Android,
    Ios,
}

impl Platform {
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Pc => "pc",
            Platform::Android => "android",
            Platform::Ios => "ios",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Platform::Pc => "PC",
            Platform::Android => "Android",
            Platform::Ios => "iOS",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── InstanceAccess ─────────────────────────────────────────────────────────

/// Access type of the instance the user is in, as reported by the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum InstanceAccess {
    #[serde(rename = "public")]
    Public,
    #[serde(rename = "friends+")]
    FriendsPlus,
    #[serde(rename = "friends")]
    Friends,
    #[serde(rename = "invite+")]
    InvitePlus,
    #[serde(rename = "invite")]
    Invite,
    /// Group members only.
    #[serde(rename = "group")]
    Group,
    #[serde(rename = "group+")]
    GroupPlus,
    #[serde(rename = "groupPublic")]
    GroupPublic,
    /// Also any access type this crate does not recognise.
    #[default]
    #[serde(rename = "unknown", other)]
    Unknown,
}

impl InstanceAccess {
    /// Group-only and Group+ instances. Group-public instances are open to anyone.
    pub fn is_group_restricted(self) -> bool {
        matches!(self, InstanceAccess::Group | InstanceAccess::GroupPlus)
    }
}

// ─── ConditionKind ──────────────────────────────────────────────────────────

/// Discriminant of a [`Condition`](crate::types::Condition) node.
///
/// Serialized by variant name, which is also the `type` tag of the wire form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ConditionKind {
    AllOf,
    AnyOf,
    Not,
    UsernameContains,
    AccountAgeAtMostDays,
    AvatarMayBe,
    IsGroupMember,
    AgeNotVerified,
    PlatformIs,
    TrustRankAtMost,
    InstanceGroupRestricted,
    InstanceOwner,
    LogLinePrefix,
}

impl ConditionKind {
    pub const ALL: [ConditionKind; 13] = [
        ConditionKind::AllOf,
        ConditionKind::AnyOf,
        ConditionKind::Not,
        ConditionKind::UsernameContains,
        ConditionKind::AccountAgeAtMostDays,
        ConditionKind::AvatarMayBe,
        ConditionKind::IsGroupMember,
        ConditionKind::AgeNotVerified,
        ConditionKind::PlatformIs,
        ConditionKind::TrustRankAtMost,
        ConditionKind::InstanceGroupRestricted,
        ConditionKind::InstanceOwner,
        ConditionKind::LogLinePrefix,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ConditionKind::AllOf => "AllOf",
            ConditionKind::AnyOf => "AnyOf",
            ConditionKind::Not => "Not",
            ConditionKind::UsernameContains => "UsernameContains",
            ConditionKind::AccountAgeAtMostDays => "AccountAgeAtMostDays",
            ConditionKind::AvatarMayBe => "AvatarMayBe",
            ConditionKind::IsGroupMember => "IsGroupMember",
            ConditionKind::AgeNotVerified => "AgeNotVerified",
            ConditionKind::PlatformIs => "PlatformIs",
            ConditionKind::TrustRankAtMost => "TrustRankAtMost",
            ConditionKind::InstanceGroupRestricted => "InstanceGroupRestricted",
            ConditionKind::InstanceOwner => "InstanceOwner",
            ConditionKind::LogLinePrefix => "LogLinePrefix",
        }
    }

    pub fn from_name(name: &str) -> Option<ConditionKind> {
        ConditionKind::ALL.into_iter().find(|k| k.as_str() == name)
    }

    /// `AllOf`, `AnyOf` and `Not`.
    pub fn is_composite(self) -> bool {
        matches!(
            self,
            ConditionKind::AllOf | ConditionKind::AnyOf | ConditionKind::Not
        )
    }

    /// Composite kinds holding an ordered child sequence.
    pub fn has_children(self) -> bool {
        matches!(self, ConditionKind::AllOf | ConditionKind::AnyOf)
    }

    /// Leaf kinds carrying an editable payload.
    pub fn has_payload(self) -> bool {
        !self.is_composite()
            && !matches!(
                self,
                ConditionKind::AgeNotVerified | ConditionKind::InstanceGroupRestricted
            )
    }

    /// Human-readable name shown in the kind picker.
    pub fn display_name(self) -> &'static str {
        match self {
            ConditionKind::AllOf => "All of...",
            ConditionKind::AnyOf => "Any of...",
            ConditionKind::Not => "Not...",
            ConditionKind::UsernameContains => "Username contains",
            ConditionKind::AccountAgeAtMostDays => "Account age at most",
            ConditionKind::AvatarMayBe => "Avatar",
            ConditionKind::IsGroupMember => "Is member of group",
            ConditionKind::AgeNotVerified => "Not 18+ age-verified",
            ConditionKind::PlatformIs => "Platform",
            ConditionKind::TrustRankAtMost => "Max trust rank",
            ConditionKind::InstanceGroupRestricted => "Group-only or Group+ instance",
            ConditionKind::InstanceOwner => "Instance owned by",
            ConditionKind::LogLinePrefix => "Log line has prefix",
        }
    }
}

impl fmt::Display for ConditionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── DeliveryPreference ─────────────────────────────────────────────────────

/// Which advisories produce a notification (or speech). Stored as `"0"`..`"2"`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryPreference {
    Off,
    /// Only advisories authored in this application.
    #[default]
    Own,
    /// Every advisory that asks to be delivered.
    AllNotifying,
}

impl DeliveryPreference {
    pub fn from_config_value(value: &str) -> Option<DeliveryPreference> {
        match value.trim() {
            "0" => Some(DeliveryPreference::Off),
            "1" => Some(DeliveryPreference::Own),
            "2" => Some(DeliveryPreference::AllNotifying),
            _ => None,
        }
    }

    pub fn as_config_value(self) -> &'static str {
        match self {
            DeliveryPreference::Off => "0",
            DeliveryPreference::Own => "1",
            DeliveryPreference::AllNotifying => "2",
        }
    }

    /// Whether a notice with the given origin and delivery flag passes this preference.
    pub fn allows(self, local: bool, requested: bool) -> bool {
        match self {
            DeliveryPreference::Off => false,
            DeliveryPreference::Own => requested && local,
            DeliveryPreference::AllNotifying => requested,
        }
    }
}
