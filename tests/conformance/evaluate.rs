use super::common::{load_suite, reference_time, report};
use serde_json::Value;
use vrcmrd_advisories::evaluate::{MatchOptions, evaluate_with};
use vrcmrd_advisories::types::*;

#[derive(Debug, serde::Deserialize)]
struct EvaluateCase {
    id: String,
    name: String,
    condition: Value,
    user: Value,
    expected: bool,
}

#[test]
fn evaluate_suite() {
    let Some(cases) = load_suite::<EvaluateCase>("evaluate.yaml") else {
        return;
    };
    let options = MatchOptions::at(reference_time());

    let mut passed = 0;
    let mut failed = 0;
    for case in &cases {
        let condition: Condition = match serde_json::from_value(case.condition.clone()) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("  FAIL [{}] {}: condition: {}", case.id, case.name, e);
                failed += 1;
                continue;
            }
        };
        let user: UserAttributes = match serde_json::from_value(case.user.clone()) {
            Ok(u) => u,
            Err(e) => {
                eprintln!("  FAIL [{}] {}: user: {}", case.id, case.name, e);
                failed += 1;
                continue;
            }
        };
        let actual = evaluate_with(&condition, &user, &options);
        if actual == case.expected {
            passed += 1;
        } else {
            eprintln!(
                "  FAIL [{}] {}: expected {}, got {}",
                case.id, case.name, case.expected, actual
            );
            failed += 1;
        }
    }
    report("evaluate", passed, failed);
}
