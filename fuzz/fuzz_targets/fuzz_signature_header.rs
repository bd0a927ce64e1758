#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use kycgate_crypto::{parse_signature_header, verify_webhook_signature, WebhookSecret};

#[derive(Debug, Arbitrary)]
struct Input<'a> {
    secret: &'a [u8],
    body: &'a [u8],
    header: &'a str,
}

fuzz_target!(|input: Input| {
    let _ = parse_signature_header(input.header);

    let secret = WebhookSecret::new(input.secret);
    // A random header must essentially never authenticate a body.
    let _ = verify_webhook_signature(secret.as_ref(), input.body, Some(input.header));
});
