use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use proptest::sample::select;
use vrcmrd_advisories::enums::*;
use vrcmrd_advisories::evaluate::MatchOptions;
use vrcmrd_advisories::types::*;

pub fn reference_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
}

pub fn options() -> MatchOptions {
    MatchOptions::at(reference_time())
}

pub fn arb_text() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_ \\[\\]]{0,12}"
}

pub fn arb_platform() -> impl Strategy<Value = Platform> {
    prop_oneof![Just(Platform::Pc), Just(Platform::Android), Just(Platform::Ios)]
}

pub fn arb_trust_rank() -> impl Strategy<Value = TrustRank> {
    select(TrustRank::ALL.to_vec())
}

pub fn arb_kind() -> impl Strategy<Value = ConditionKind> {
    select(ConditionKind::ALL.to_vec())
}

pub fn arb_leaf() -> impl Strategy<Value = Condition> {
    prop_oneof![
        arb_text().prop_map(Condition::UsernameContains),
        (0u32..400).prop_map(Condition::AccountAgeAtMostDays),
        "avtr_[a-z0-9]{1,3}".prop_map(Condition::AvatarMayBe),
        "grp_[a-c]".prop_map(Condition::IsGroupMember),
        Just(Condition::AgeNotVerified),
        proptest::option::of(arb_platform()).prop_map(Condition::PlatformIs),
        arb_trust_rank().prop_map(Condition::TrustRankAtMost),
        Just(Condition::InstanceGroupRestricted),
        "(usr|grp)_[a-c]".prop_map(Condition::InstanceOwner),
        arb_text().prop_map(Condition::LogLinePrefix),
    ]
}

/// Trees up to four levels deep with at most four children per composite.
pub fn arb_condition() -> impl Strategy<Value = Condition> {
    arb_leaf().prop_recursive(4, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Condition::AllOf),
            prop::collection::vec(inner.clone(), 0..4).prop_map(Condition::AnyOf),
            inner.prop_map(|c| Condition::Not(Box::new(c))),
        ]
    })
}

/// Trees without `Not`, so evaluation is monotone in each leaf.
pub fn arb_positive_condition() -> impl Strategy<Value = Condition> {
    arb_leaf().prop_recursive(4, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Condition::AllOf),
            prop::collection::vec(inner, 0..4).prop_map(Condition::AnyOf),
        ]
    })
}

pub fn arb_user() -> impl Strategy<Value = UserAttributes> {
    (
        (
            arb_text(),
            proptest::option::of("avtr_[a-z0-9]{1,3}"),
            prop::collection::vec("grp_[a-c]", 0..3),
            proptest::option::of("(usr|grp)_[a-c]"),
            select(vec![
                InstanceAccess::Public,
                InstanceAccess::Friends,
                InstanceAccess::Group,
                InstanceAccess::GroupPlus,
                InstanceAccess::GroupPublic,
                InstanceAccess::Unknown,
            ]),
        ),
        (
            proptest::option::of(0i64..800),
            any::<bool>(),
            proptest::option::of(arb_platform()),
            proptest::option::of(arb_trust_rank()),
            proptest::option::of(arb_text()),
        ),
    )
        .prop_map(
            |(
                (username, avatar_id, groups, instance_owner, instance_access),
                (age_days, age_verified, platform, trust_rank, log_line),
            )| UserAttributes {
                id: "usr_prop".to_string(),
                username,
                avatar_id,
                avatar_name: None,
                groups: groups
                    .into_iter()
                    .map(|id| GroupMembership { id, name: None })
                    .collect(),
                instance_owner,
                instance_access,
                account_created: age_days.map(|d| reference_time() - Duration::days(d)),
                age_verified,
                platform,
                trust_rank,
                log_line,
            },
        )
}
