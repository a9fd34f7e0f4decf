//! Properties of the client-facing error envelope.

use meridian_core::{ErrorCategory, ErrorMessage, MeridianError, ParamSource};
use proptest::prelude::*;

fn source() -> impl Strategy<Value = ParamSource> {
    prop_oneof![
        Just(ParamSource::Body),
        Just(ParamSource::Query),
        Just(ParamSource::Header),
        Just(ParamSource::Cookie),
        Just(ParamSource::Path),
    ]
}

fn message() -> impl Strategy<Value = ErrorMessage> {
    ("[a-z_]{1,12}", "[ -~]{1,40}", source())
        .prop_map(|(key, text, source)| ErrorMessage::new(text).with_key(key).with_source(source))
}

proptest! {
    #[test]
    fn prop_validation_envelope_lists_every_message(
        messages in prop::collection::vec(message(), 1..6),
        url in "/[a-z]{0,10}",
    ) {
        let err = MeridianError::validation(format!("Validation failed for GET {url}"), messages.clone());
        let envelope = err.to_envelope(None);

        prop_assert_eq!(envelope.error.category, ErrorCategory::Validation);
        prop_assert_eq!(envelope.error.code.as_str(), "VALIDATION_ERROR");
        let details = envelope.error.details.expect("validation details");
        let listed: Vec<ErrorMessage> = serde_json::from_value(details).unwrap();
        prop_assert_eq!(listed, messages);
    }

    #[test]
    fn prop_internal_detail_never_leaks(secret in "[ -~]{1,40}") {
        let err = MeridianError::internal(secret.clone());
        let envelope = err.to_envelope(Some("req-1"));

        prop_assert_eq!(envelope.error.message.as_str(), "Internal Server Error");
        prop_assert!(envelope.error.details.is_none());
        prop_assert_eq!(envelope.request_id.as_deref(), Some("req-1"));
    }
}
