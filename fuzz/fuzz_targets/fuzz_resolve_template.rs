#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use vrcmrd_advisories::template::{Fragment, TemplateContext, fragments, resolve};

#[derive(Debug, Arbitrary)]
struct Input {
    template: String,
    context: Vec<(String, String)>,
}

fuzz_target!(|input: Input| {
    let context: TemplateContext = input.context.into_iter().collect();
    let _ = resolve(&input.template, &context);

    // The scanner must account for every byte of the template.
    let mut rebuilt = String::with_capacity(input.template.len());
    for fragment in fragments(&input.template) {
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
    assert_eq!(rebuilt, input.template);
});
