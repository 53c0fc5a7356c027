#![no_main]

use arbitrary::{Arbitrary, Unstructured};
use chrono::{Duration, TimeZone, Utc};
use libfuzzer_sys::fuzz_target;
use vrcmrd_advisories::enums::{ConditionKind, InstanceAccess, Platform, TrustRank};
use vrcmrd_advisories::evaluate::{MatchOptions, evaluate_with};
use vrcmrd_advisories::primitives::new_condition;
use vrcmrd_advisories::types::{Condition, GroupMembership, UserAttributes};

const MAX_DEPTH: usize = 8;

fn arbitrary_platform(u: &mut Unstructured<'_>) -> arbitrary::Result<Platform> {
    Ok(*u.choose(&[Platform::Pc, Platform::Android, Platform::Ios])?)
}

/// Generate an arbitrary condition tree, bounded in depth.
fn arbitrary_condition(u: &mut Unstructured<'_>, depth: usize) -> arbitrary::Result<Condition> {
    let kind = *u.choose(&ConditionKind::ALL)?;
    let composite = kind.is_composite() && depth < MAX_DEPTH;
    let condition = match kind {
        ConditionKind::AllOf | ConditionKind::AnyOf if composite => {
            let len = u.int_in_range(0..=4)?;
            let mut children = Vec::with_capacity(len);
            for _ in 0..len {
                children.push(arbitrary_condition(u, depth + 1)?);
            }
            if kind == ConditionKind::AllOf {
                Condition::AllOf(children)
            } else {
                Condition::AnyOf(children)
            }
        }
        ConditionKind::Not if composite => {
            Condition::Not(Box::new(arbitrary_condition(u, depth + 1)?))
        }
        ConditionKind::UsernameContains => Condition::UsernameContains(String::arbitrary(u)?),
        ConditionKind::AccountAgeAtMostDays => Condition::AccountAgeAtMostDays(u32::arbitrary(u)?),
        ConditionKind::AvatarMayBe => Condition::AvatarMayBe(String::arbitrary(u)?),
        ConditionKind::IsGroupMember => Condition::IsGroupMember(String::arbitrary(u)?),
        ConditionKind::PlatformIs => Condition::PlatformIs(if bool::arbitrary(u)? {
            Some(arbitrary_platform(u)?)
        } else {
            None
        }),
        ConditionKind::TrustRankAtMost => Condition::TrustRankAtMost(*u.choose(&TrustRank::ALL)?),
        ConditionKind::InstanceOwner => Condition::InstanceOwner(String::arbitrary(u)?),
        ConditionKind::LogLinePrefix => Condition::LogLinePrefix(String::arbitrary(u)?),
        other => new_condition(other),
    };
    Ok(condition)
}

fn arbitrary_user(u: &mut Unstructured<'_>) -> arbitrary::Result<UserAttributes> {
    let groups = Vec::<String>::arbitrary(u)?
        .into_iter()
        .map(|id| GroupMembership { id, name: None })
        .collect();
    let age_days = Option::<u16>::arbitrary(u)?;
    Ok(UserAttributes {
        id: String::arbitrary(u)?,
        username: String::arbitrary(u)?,
        avatar_id: Option::<String>::arbitrary(u)?,
        avatar_name: None,
        groups,
        instance_owner: Option::<String>::arbitrary(u)?,
        instance_access: *u.choose(&[
            InstanceAccess::Public,
            InstanceAccess::Group,
            InstanceAccess::GroupPlus,
            InstanceAccess::Unknown,
        ])?,
        account_created: age_days
            .map(|d| Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap() - Duration::days(d.into())),
        age_verified: bool::arbitrary(u)?,
        platform: if bool::arbitrary(u)? { Some(arbitrary_platform(u)?) } else { None },
        trust_rank: if bool::arbitrary(u)? { Some(*u.choose(&TrustRank::ALL)?) } else { None },
        log_line: Option::<String>::arbitrary(u)?,
    })
}

fuzz_target!(|data: &[u8]| {
    let mut u = Unstructured::new(data);

    let cond = match arbitrary_condition(&mut u, 0) {
        Ok(c) => c,
        Err(_) => return,
    };
    let user = match arbitrary_user(&mut u) {
        Ok(v) => v,
        Err(_) => return,
    };
    let options = MatchOptions {
        case_sensitive: bool::arbitrary(&mut u).unwrap_or(true),
        reference_time: Some(Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()),
    };

    let direct = evaluate_with(&cond, &user, &options);
    let negated = evaluate_with(&Condition::Not(Box::new(cond)), &user, &options);
    assert_ne!(direct, negated);
});
