#![no_main]
use libfuzzer_sys::fuzz_target;
use xmlprops::xml::to_xml;
use xmlprops::{from_xml_str, get, set};

fuzz_target!(|data: &[u8]| {
    if let Ok(path) = std::str::from_utf8(data) {
        if let Ok(mut doc) = from_xml_str("<deployment><cluster hostcount=\"1\"/></deployment>") {
            let _ = get(&doc, path, &[]);
            if set(&mut doc, path, "v", &["a", "b", "c"]).is_ok() {
                // an accepted write must leave a document the loader accepts
                assert!(from_xml_str(&to_xml(&doc)).is_ok());
            }
        }
    }
});
