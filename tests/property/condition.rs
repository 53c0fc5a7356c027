use super::strategies::*;
use proptest::prelude::*;
use vrcmrd_advisories::evaluate::{MatchOptions, evaluate_with};
use vrcmrd_advisories::primitives::{collect_leaf_kinds, depth, leaf_count};
use vrcmrd_advisories::types::Condition;

fn node_count(condition: &Condition) -> usize {
    1 + condition.children().iter().map(node_count).sum::<usize>()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    // Not(Not(c)) is boolean-equal to c
    #[test]
    fn double_negation(c in arb_condition(), user in arb_user()) {
        let opts = options();
        let wrapped = Condition::Not(Box::new(Condition::Not(Box::new(c.clone()))));
        prop_assert_eq!(evaluate_with(&wrapped, &user, &opts), evaluate_with(&c, &user, &opts));
    }

    #[test]
    fn all_of_is_conjunction(a in arb_condition(), b in arb_condition(), user in arb_user()) {
        let opts = options();
        let expected = evaluate_with(&a, &user, &opts) && evaluate_with(&b, &user, &opts);
        prop_assert_eq!(evaluate_with(&Condition::AllOf(vec![a, b]), &user, &opts), expected);
    }

    #[test]
    fn any_of_is_disjunction(a in arb_condition(), b in arb_condition(), user in arb_user()) {
        let opts = options();
        let expected = evaluate_with(&a, &user, &opts) || evaluate_with(&b, &user, &opts);
        prop_assert_eq!(evaluate_with(&Condition::AnyOf(vec![a, b]), &user, &opts), expected);
    }

    #[test]
    fn empty_composites_are_identities(user in arb_user()) {
        let opts = options();
        prop_assert!(evaluate_with(&Condition::AllOf(vec![]), &user, &opts));
        prop_assert!(!evaluate_with(&Condition::AnyOf(vec![]), &user, &opts));
    }

    // Without Not, a case-sensitive hit is also a case-insensitive hit
    #[test]
    fn case_folding_only_widens(c in arb_positive_condition(), user in arb_user()) {
        let sensitive = options();
        let insensitive = MatchOptions { case_sensitive: false, ..options() };
        if evaluate_with(&c, &user, &sensitive) {
            prop_assert!(evaluate_with(&c, &user, &insensitive));
        }
    }

    // The traversal visits every node once, root first
    #[test]
    fn traversal_visits_every_node(c in arb_condition()) {
        let kinds: Vec<_> = collect_leaf_kinds(&c).collect();
        prop_assert_eq!(kinds.len(), node_count(&c));
        prop_assert_eq!(kinds[0], c.kind());
        // Restartable: a second pass yields the same sequence
        prop_assert_eq!(collect_leaf_kinds(&c).collect::<Vec<_>>(), kinds.clone());
        prop_assert!(leaf_count(&c) <= kinds.len());
        prop_assert!(depth(&c) <= kinds.len());
    }
}
