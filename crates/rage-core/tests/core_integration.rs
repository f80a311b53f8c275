#![allow(clippy::unwrap_used, clippy::expect_used)]

use rage_core::*;

// ---------------------------------------------------------------------------
// 1. JSON errors convert through `?`
// ---------------------------------------------------------------------------

fn parse(raw: &str) -> RageResult<serde_json::Value> {
    Ok(serde_json::from_str(raw)?)
}

#[test]
fn json_error_converts_with_question_mark() {
    let err = parse("{not json").unwrap_err();
    assert!(matches!(err, RageError::Json(_)));
    assert!(err.to_string().starts_with("JSON error:"));

    assert!(parse("{\"entries\": []}").is_ok());
}

// ---------------------------------------------------------------------------
// 2. Variant display strings
// ---------------------------------------------------------------------------

#[test]
fn variant_display_prefixes() {
    let cases: Vec<(RageError, &str)> = vec![
        (RageError::Memory("x".into()), "Memory error: x"),
        (RageError::InvalidInput("x".into()), "Invalid input: x"),
        (RageError::Http("x".into()), "HTTP error: x"),
        (RageError::Config("x".into()), "Config error: x"),
    ];
    for (err, expected) in cases {
        assert_eq!(err.to_string(), expected);
    }
}

#[test]
fn only_http_errors_are_http() {
    assert!(RageError::Http("503".into()).is_http());
    assert!(!RageError::Memory("disk".into()).is_http());
    assert!(!RageError::DimensionMismatch {
        expected: 2,
        actual: 3
    }
    .is_http());
}
