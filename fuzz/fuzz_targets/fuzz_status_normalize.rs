#![no_main]

use libfuzzer_sys::fuzz_target;

use kycgate_types::{KycStatus, Role};

fuzz_target!(|data: &str| {
    if let Ok(status) = KycStatus::normalize(data) {
        assert_ne!(status, KycStatus::Unset);
        // Canonical names normalize to themselves.
        assert_eq!(KycStatus::normalize(status.as_str()), Ok(status));
    }
    let _ = data.parse::<Role>();
});
