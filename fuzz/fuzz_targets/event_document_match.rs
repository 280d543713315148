#![no_main]

use libfuzzer_sys::fuzz_target;
use notifier_events::{CanonicalEvent, EventContext, EventShape, CHANGE_MESSAGE_MAX_CHARS};

fuzz_target!(|data: &[u8]| {
    let raw = String::from_utf8_lossy(data);
    let event = CanonicalEvent::from_raw_document(
        EventContext::new("owner/repo", "main", "1", Some("CI".to_string())),
        &raw,
    );

    if event.source_shape == EventShape::Unmatched {
        assert_eq!(event.display_name, None);
        assert_eq!(event.change_identifier, None);
        assert_eq!(event.change_url, "https://github.com/owner/repo/");
    }
    if let Some(message) = &event.change_message {
        assert!(message.chars().count() <= CHANGE_MESSAGE_MAX_CHARS);
        assert!(!message.contains(['<', '>', '\n', '\r']));
    }
    assert!(!event.change_url.is_empty());
});
