use serde_json::{Map, Value};

use super::diagnostics::{self, Diagnostic};
use super::verdict::ValidationVerdict;
use super::MAX_PAYLOAD_BYTES;
use crate::platform::TargetPlatform;

/// Classifies `text` as a push payload for `target`.
///
/// Order: size ceiling, pre-parse diagnostics, structural parse, top-level
/// object check, then platform key checks. Never fails; every problem is a
/// verdict variant.
pub fn validate(text: &str, target: TargetPlatform) -> ValidationVerdict {
    let byte_size = text.len();
    if byte_size > MAX_PAYLOAD_BYTES {
        return ValidationVerdict::PayloadTooLarge { byte_size };
    }

    if let Some(diagnostic) = diagnostics::pre_parse(text) {
        return invalid(diagnostic);
    }

    let value: Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(e) => return invalid(diagnostics::parse_failure(text, &e)),
    };

    let Value::Object(object) = value else {
        return invalid(diagnostics::top_level_not_object());
    };

    check_platform_keys(&object, target)
}

/// Structural check only: does the text parse as any JSON value.
pub fn parses_as_json(text: &str) -> bool {
    serde_json::from_str::<Value>(text).is_ok()
}

fn invalid(diagnostic: Diagnostic) -> ValidationVerdict {
    ValidationVerdict::InvalidJson {
        message: diagnostic.message,
        fix: diagnostic.fix,
    }
}

fn warning(message: &str, fix: &str) -> ValidationVerdict {
    ValidationVerdict::ValidWithWarning {
        message: message.to_string(),
        fix: Some(fix.to_string()),
    }
}

fn check_platform_keys(object: &Map<String, Value>, target: TargetPlatform) -> ValidationVerdict {
    let has = |key: &str| object.contains_key(key);
    match target {
        TargetPlatform::IosSimulator if has("aps") => ValidationVerdict::Valid,
        TargetPlatform::IosSimulator if has("notification") => warning(
            "This looks like an Android/FCM payload (\"notification\" key), but the target is iOS Simulator",
            "Switch the target to Android Emulator, or move the content into an \"aps\" dictionary",
        ),
        TargetPlatform::IosSimulator if has("title") => warning(
            "This looks like a Web Push payload (top-level \"title\"), but the target is iOS Simulator",
            "Switch the target to Desktop, or use an iOS template with an \"aps\" key",
        ),
        TargetPlatform::IosSimulator if has("data") => warning(
            "This looks like an Android/FCM data message (\"data\" key), but the target is iOS Simulator",
            "Switch the target to Android Emulator, or add an \"aps\" dictionary",
        ),
        TargetPlatform::IosSimulator => ValidationVerdict::MissingRequiredKey,
        TargetPlatform::AndroidEmulator if has("aps") => warning(
            "This looks like an iOS/APNs payload (\"aps\" key), but the target is Android Emulator",
            "Switch the target to iOS Simulator, or use an Android template with a \"notification\" key",
        ),
        TargetPlatform::Desktop if has("aps") => warning(
            "This looks like an iOS/APNs payload (\"aps\" key), but the target is Desktop",
            "Use a Web template with top-level \"title\" and \"body\" keys",
        ),
        TargetPlatform::AndroidEmulator | TargetPlatform::Desktop => ValidationVerdict::Valid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const IOS: TargetPlatform = TargetPlatform::IosSimulator;
    const ANDROID: TargetPlatform = TargetPlatform::AndroidEmulator;
    const DESKTOP: TargetPlatform = TargetPlatform::Desktop;

    fn warning_message(verdict: &ValidationVerdict) -> &str {
        match verdict {
            ValidationVerdict::ValidWithWarning { message, .. } => message,
            other => panic!("expected warning, got {other:?}"),
        }
    }

    #[test]
    fn alert_payload_is_valid() {
        let json = r#"{"aps": {"alert": {"title": "Test", "body": "Hello"}}}"#;
        assert_eq!(validate(json, IOS), ValidationVerdict::Valid);
    }

    #[test]
    fn silent_push_is_valid() {
        assert_eq!(validate(r#"{"aps":{"content-available":1}}"#, IOS), ValidationVerdict::Valid);
    }

    #[test]
    fn fcm_payload_on_ios_warns() {
        let verdict = validate(r#"{"notification":{"title":"T"}}"#, IOS);
        let message = warning_message(&verdict);
        assert!(message.contains("Android") || message.contains("FCM"));
        assert!(verdict.is_valid());
    }

    #[test]
    fn web_payload_on_ios_warns() {
        let verdict = validate(r#"{"title": "Update", "body": "Click"}"#, IOS);
        assert!(warning_message(&verdict).contains("Web Push"));
    }

    #[test]
    fn web_payload_with_data_on_ios_is_named_web_push() {
        let verdict = validate(r#"{"title": "Done", "data": {"task_id": "abc"}}"#, IOS);
        assert!(warning_message(&verdict).contains("Web Push"));
    }

    #[test]
    fn data_only_payload_on_ios_warns_fcm() {
        let verdict = validate(r#"{"data": {"action": "sync"}}"#, IOS);
        assert!(warning_message(&verdict).contains("FCM"));
    }

    #[test]
    fn missing_aps_on_ios() {
        assert_eq!(
            validate(r#"{"custom": "no aps key here"}"#, IOS),
            ValidationVerdict::MissingRequiredKey
        );
    }

    #[test]
    fn apns_payload_on_android_warns() {
        let verdict = validate(r#"{"aps": {"alert": "hi"}}"#, ANDROID);
        assert!(warning_message(&verdict).contains("APNs"));
        assert!(verdict.fix().unwrap().contains("Android template"));
    }

    #[test]
    fn apns_payload_on_desktop_suggests_web_template() {
        let verdict = validate(r#"{"aps": {"alert": "hi"}}"#, DESKTOP);
        assert!(verdict.is_warning());
        assert!(verdict.fix().unwrap().contains("Web template"));
    }

    #[test]
    fn web_payload_with_data_on_desktop_is_clean() {
        let json = r#"{"title": "Task Complete", "body": "Ready.", "data": {"url": "/tasks/1"}}"#;
        assert_eq!(validate(json, DESKTOP), ValidationVerdict::Valid);
    }

    #[test]
    fn web_payload_on_android_is_valid() {
        let json = r#"{"title": "Task Complete", "body": "Ready.", "data": {"task_id": "abc"}}"#;
        assert_eq!(validate(json, ANDROID), ValidationVerdict::Valid);
    }

    #[test]
    fn fcm_payload_on_desktop_is_valid() {
        let json = r#"{"notification": {"title": "Test", "body": "Hello"}}"#;
        assert_eq!(validate(json, DESKTOP), ValidationVerdict::Valid);
    }

    #[test]
    fn fcm_payload_on_android_is_clean() {
        assert_eq!(
            validate(r#"{"notification": {"title": "T", "body": "B"}}"#, ANDROID),
            ValidationVerdict::Valid
        );
    }

    #[test]
    fn trailing_comma_reported_at_line_one() {
        let verdict = validate(r#"{"a": 1,}"#, IOS);
        match verdict {
            ValidationVerdict::InvalidJson { message, fix } => {
                assert!(message.contains("Trailing comma"), "{message}");
                assert!(message.contains("line 1"), "{message}");
                assert!(fix.is_some());
            }
            other => panic!("expected invalid JSON, got {other:?}"),
        }
    }

    #[test]
    fn quoted_trailing_comma_reported_first() {
        let verdict = validate(r#"'{"a": 1,}'"#, IOS);
        assert!(verdict.message().contains("Trailing comma"));
    }

    #[test]
    fn pasted_closing_curly_quote_is_named_not_brace_count() {
        let verdict = validate("{\"aps\":{\"alert\":\"Hi\u{201D}}}", IOS);
        assert!(!verdict.is_valid());
        assert!(verdict.message().contains("U+201D"), "{}", verdict.message());
        assert!(!verdict.message().contains("Unbalanced"));
        assert!(verdict.fix().unwrap().contains("straight double quotes"));
    }

    #[test]
    fn top_level_array_rejected() {
        let verdict = validate("[1, 2]", IOS);
        assert!(verdict.message().contains("Top level must be a JSON object"));
        assert_eq!(verdict.fix(), Some("Wrap the payload in braces: { ... }"));
    }

    #[test]
    fn oversized_reports_exact_size_before_parsing() {
        let text = format!("{{{}", "x".repeat(5000));
        assert_eq!(
            validate(&text, IOS),
            ValidationVerdict::PayloadTooLarge { byte_size: 5001 }
        );
    }

    #[test]
    fn size_is_measured_in_bytes() {
        let body = "é".repeat(2100);
        let text = format!(r#"{{"aps":{{"alert":"{body}"}}}}"#);
        assert!(text.chars().count() < MAX_PAYLOAD_BYTES);
        assert!(matches!(validate(&text, IOS), ValidationVerdict::PayloadTooLarge { .. }));
    }

    #[test]
    fn exactly_at_limit_is_accepted() {
        let prefix = r#"{"aps":{},"pad":""#;
        let suffix = r#""}"#;
        let pad = "a".repeat(MAX_PAYLOAD_BYTES - prefix.len() - suffix.len());
        let text = format!("{prefix}{pad}{suffix}");
        assert_eq!(text.len(), MAX_PAYLOAD_BYTES);
        assert_eq!(validate(&text, IOS), ValidationVerdict::Valid);
    }

    #[test]
    fn parses_as_json_is_structural_only() {
        assert!(parses_as_json("[]"));
        assert!(parses_as_json(r#"{"custom": 1}"#));
        assert!(!parses_as_json("{"));
    }

    proptest! {
        #[test]
        fn aps_object_never_missing_key(key in "[a-z]{1,12}", value in "[a-zA-Z0-9 ]{0,64}") {
            let json = serde_json::json!({ "aps": { "alert": value.clone() }, key: value }).to_string();
            let verdict = validate(&json, IOS);
            prop_assert!(verdict.is_valid());
            prop_assert_ne!(verdict, ValidationVerdict::MissingRequiredKey);
        }

        #[test]
        fn oversized_always_too_large(extra in 1usize..2048, filler in "[ -~]") {
            let text = filler.repeat(MAX_PAYLOAD_BYTES + extra);
            prop_assert_eq!(
                validate(&text, IOS),
                ValidationVerdict::PayloadTooLarge { byte_size: MAX_PAYLOAD_BYTES + extra }
            );
        }
    }
}
