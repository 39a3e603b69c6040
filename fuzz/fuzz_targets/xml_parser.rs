#![no_main]
use libfuzzer_sys::fuzz_target;
use xmlprops::from_xml_bytes;
use xmlprops::xml::to_xml;

fuzz_target!(|data: &[u8]| {
    if let Ok(doc) = from_xml_bytes(data) {
        // whatever parses must still parse after being written back out
        let text = to_xml(&doc);
        assert!(from_xml_bytes(text.as_bytes()).is_ok());
    }
});
