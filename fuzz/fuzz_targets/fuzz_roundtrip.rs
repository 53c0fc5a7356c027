#![no_main]

use libfuzzer_sys::fuzz_target;
use vrcmrd_advisories::{parse_advisories, serialize_advisories};

fuzz_target!(|data: &[u8]| {
    let s = String::from_utf8_lossy(data);

    let advisories = match parse_advisories(&s) {
        Ok(list) => list,
        Err(_) => return,
    };

    let json = match serialize_advisories(&advisories) {
        Ok(j) => j,
        Err(_) => return,
    };

    // Anything we accepted must come back unchanged from what we wrote.
    match parse_advisories(&json) {
        Ok(again) => assert_eq!(again, advisories, "roundtrip changed advisories"),
        Err(e) => panic!(
            "Roundtrip failure: serialized advisories cannot be re-parsed: {}\n\
             Input (lossy): {:?}\n\
             Serialized JSON:\n{}",
            e,
            s.get(..200).unwrap_or(&s),
            json.get(..500).unwrap_or(&json),
        ),
    }
});
