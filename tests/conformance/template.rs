use super::common::{load_suite, report};
use std::collections::HashMap;
use vrcmrd_advisories::template::{TemplateContext, resolve};

#[derive(Debug, serde::Deserialize)]
struct TemplateCase {
    id: String,
    name: String,
    template: String,
    #[serde(default)]
    context: HashMap<String, String>,
    expected: String,
}

#[test]
fn template_suite() {
    let Some(cases) = load_suite::<TemplateCase>("template.yaml") else {
        return;
    };

    let mut passed = 0;
    let mut failed = 0;
    for case in cases {
        let context: TemplateContext = case.context.into_iter().collect();
        let actual = resolve(&case.template, &context);
        if actual == case.expected {
            passed += 1;
        } else {
            eprintln!(
                "  FAIL [{}] {}: expected {:?}, got {:?}",
                case.id, case.name, case.expected, actual
            );
            failed += 1;
        }
    }
    report("template", passed, failed);
}
