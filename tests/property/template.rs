use proptest::prelude::*;
use vrcmrd_advisories::template::{Fragment, TemplateContext, fragments, resolve};

fn no_open_marker() -> impl Strategy<Value = String> {
    "[a-z :|{}]{0,12}".prop_filter("contains a placeholder opener", |s| !s.contains("{{:"))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    // Text without an opener is passed through untouched
    #[test]
    fn plain_text_is_identity(text in no_open_marker()) {
        prop_assert_eq!(resolve(&text, &TemplateContext::new()), text);
    }

    #[test]
    fn named_value_is_substituted(
        prefix in no_open_marker(),
        name in "[a-z_][a-z0-9_]{0,8}",
        value in ".{0,12}",
        suffix in "[a-z ]{0,12}",
    ) {
        let template = format!("{}{{{{:{}:}}}}{}", prefix, name, suffix);
        let context: TemplateContext = [(name, value.clone())].into_iter().collect();
        prop_assert_eq!(resolve(&template, &context), format!("{}{}{}", prefix, value, suffix));
    }

    #[test]
    fn default_used_when_absent(
        name in "[a-z_][a-z0-9_]{0,8}",
        default in "[a-z ]{0,10}",
    ) {
        let template = format!("<{{{{:{}||{}:}}}}>", name, default);
        prop_assert_eq!(resolve(&template, &TemplateContext::new()), format!("<{}>", default));
    }

    // Fragments reassemble into the scanned text, so nothing is lost or invented
    #[test]
    fn fragments_reassemble(template in "[a-z{}:| ]{0,40}") {
        let mut rebuilt = String::new();
        for fragment in fragments(&template) {
            match fragment {
                Fragment::Literal(text) => rebuilt.push_str(text),
                Fragment::Placeholder { name, default } => {
                    rebuilt.push_str("{{:");
                    rebuilt.push_str(name);
                    if let Some(default) = default {
                        rebuilt.push_str("||");
                        rebuilt.push_str(default);
                    }
                    rebuilt.push_str(":}}");
                }
            }
        }
        prop_assert_eq!(rebuilt, template);
    }

    #[test]
    fn resolve_never_panics(template in ".{0,64}") {
        let context: TemplateContext = [("username", "Ann")].into_iter().collect();
        let _ = resolve(&template, &context);
    }
}
