use super::common::conformance_dir;
use serde_json::Value;
use vrcmrd_advisories::parse::{parse_advisories, parse_advisories_yaml};
use vrcmrd_advisories::serialize::{serialize_advisories, serialize_advisories_yaml};
use vrcmrd_advisories::types::Condition;

fn stored_list() -> Option<String> {
    let path = conformance_dir().join("roundtrip.json");
    if !path.exists() {
        eprintln!("Skipping roundtrip tests: {:?} not found", path);
        return None;
    }
    Some(std::fs::read_to_string(&path).unwrap())
}

#[test]
fn json_roundtrip_is_lossless() {
    let Some(input) = stored_list() else { return };
    let first = parse_advisories(&input).unwrap();
    let json = serialize_advisories(&first).unwrap();
    let second = parse_advisories(&json).unwrap();
    assert_eq!(first, second);
}

#[test]
fn json_output_keeps_stored_shape() {
    let Some(input) = stored_list() else { return };
    let advisories = parse_advisories(&input).unwrap();
    let out: Value = serde_json::from_str(&serialize_advisories(&advisories).unwrap()).unwrap();

    assert_eq!(out[0]["level"], 3);
    let not = &out[0]["condition"]["data"][1];
    assert_eq!(not["type"], "Not");
    assert_eq!(not["data"]["data"]["type"], "TrustRankAtMost");
    // Payload-less leaves drop their null data.
    assert!(out[0]["condition"]["data"][2].get("data").is_none());
    assert_eq!(out[1]["condition"]["data"][5]["data"], "");
}

#[test]
fn yaml_roundtrip_is_lossless() {
    let Some(input) = stored_list() else { return };
    let from_json = parse_advisories(&input).unwrap();
    let yaml = serialize_advisories_yaml(&from_json).unwrap();
    let from_yaml = match parse_advisories_yaml(&yaml) {
        Ok(list) => list,
        Err(e) => panic!("re-parse error: {}\n{}", e, yaml),
    };
    assert_eq!(from_json, from_yaml);
}

#[test]
fn unset_platform_survives_roundtrip() {
    let Some(input) = stored_list() else { return };
    let advisories = parse_advisories(&input).unwrap();
    let Condition::AnyOf(children) = &advisories[1].condition else {
        panic!("expected AnyOf root");
    };
    assert_eq!(children[5], Condition::PlatformIs(None));
}
