#![no_main]

use libfuzzer_sys::fuzz_target;

use kycgate_verification::WebhookEvent;

fuzz_target!(|data: &[u8]| {
    // Authenticated bodies are still untrusted input: parsing must never
    // panic, and a parsed vendor event always carries a usable id and status.
    if let Ok(WebhookEvent::Vendor { payload, .. }) = WebhookEvent::from_slice(data) {
        assert!(!payload.correlation_id.as_str().trim().is_empty());
        assert!(payload.status.reported().is_some());
    }
});
