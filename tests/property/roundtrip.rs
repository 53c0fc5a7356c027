use super::strategies::*;
use proptest::prelude::*;
use vrcmrd_advisories::enums::AdvisoryLevel;
use vrcmrd_advisories::normalize::normalize;
use vrcmrd_advisories::parse::{parse_advisories, parse_condition};
use vrcmrd_advisories::serialize::serialize_advisories;
use vrcmrd_advisories::types::Advisory;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    // Serializing then deserializing any tree yields the same tree
    #[test]
    fn condition_json_roundtrip(c in arb_condition()) {
        let json = serde_json::to_string(&c).unwrap();
        let back = parse_condition(&json).unwrap();
        prop_assert_eq!(back, c);
    }

    #[test]
    fn advisory_list_roundtrip(
        conditions in prop::collection::vec(arb_condition(), 0..4),
        level in proptest::sample::select(AdvisoryLevel::ALL.to_vec()),
        active in any::<bool>(),
    ) {
        let advisories: Vec<Advisory> = conditions
            .into_iter()
            .enumerate()
            .map(|(i, condition)| {
                let mut adv = Advisory::new(format!("vrcmrd_adv_{:012}", i));
                adv.level = level;
                adv.active = active;
                adv.condition = condition;
                adv
            })
            .collect();
        let json = serialize_advisories(&advisories).unwrap();
        prop_assert_eq!(parse_advisories(&json).unwrap(), advisories);
    }

    #[test]
    fn normalize_is_idempotent(
        c in arb_condition(),
        name in "[a-z ]{0,8}",
        template in "[a-z {}:]{0,16}",
        tags in prop::collection::vec("[a-c ]{0,3}", 0..5),
    ) {
        let mut adv = Advisory::new("vrcmrd_adv_4f9KqXw2ZpRt");
        adv.condition = c;
        adv.name = name;
        adv.message_template = template;
        adv.tags = tags;
        let once = normalize(adv);
        prop_assert_eq!(normalize(once.clone()), once);
    }
}
