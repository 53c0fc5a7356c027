use super::common::{load_suite, report};
use serde_json::Value;
use vrcmrd_advisories::types::Advisory;
use vrcmrd_advisories::validate::validate;

#[derive(Debug, serde::Deserialize)]
struct ValidateCase {
    id: String,
    name: String,
    advisory: Value,
    errors: Vec<String>,
    warnings: Vec<String>,
}

fn sorted(mut codes: Vec<String>) -> Vec<String> {
    codes.sort();
    codes
}

#[test]
fn validate_suite() {
    let Some(cases) = load_suite::<ValidateCase>("validate.yaml") else {
        return;
    };

    let mut passed = 0;
    let mut failed = 0;
    for case in cases {
        let advisory: Advisory = match serde_json::from_value(case.advisory) {
            Ok(a) => a,
            Err(e) => {
                eprintln!("  FAIL [{}] {}: advisory: {}", case.id, case.name, e);
                failed += 1;
                continue;
            }
        };
        let result = validate(&advisory);
        let errors = sorted(result.errors.iter().map(|e| e.rule.clone()).collect());
        let warnings = sorted(result.warnings.iter().map(|w| w.code.clone()).collect());
        if errors == sorted(case.errors.clone()) && warnings == sorted(case.warnings.clone()) {
            passed += 1;
        } else {
            eprintln!(
                "  FAIL [{}] {}: expected errors {:?} warnings {:?}, got {:?} {:?}",
                case.id, case.name, case.errors, case.warnings, errors, warnings
            );
            for e in &result.errors {
                eprintln!("    {}", e);
            }
            failed += 1;
        }
    }
    report("validate", passed, failed);
}
