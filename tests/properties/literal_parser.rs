//! Property tests for the restricted literal parser.

use proptest::prelude::*;

use tunespace::{parse, DomainError, Raw, Value};

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        (-1_000_000i64..1_000_000).prop_map(Value::from),
        (-1.0e6..1.0e6f64).prop_map(Value::from),
        "[a-z][a-z0-9_]{0,11}".prop_filter("not a keyword", |s| s != "true" && s != "false")
            .prop_map(|s| Value::Str(s)),
        any::<bool>().prop_map(Value::from),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: the parser never panics on arbitrary input, it only
    /// returns `Ok` or a `Parse` error.
    #[test]
    fn property_parse_never_panics(input in "(?s).{0,256}") {
        let _ = parse(&input);
    }

    /// PROPERTY: every scalar's literal text parses back to the same value.
    #[test]
    fn property_scalar_display_round_trips(value in scalar()) {
        let parsed = parse(&value.to_string()).expect("scalar text must parse");
        prop_assert_eq!(parsed, Raw::Scalar(value));
    }

    /// PROPERTY: identifiers are never accepted, anywhere in the input.
    #[test]
    fn property_identifiers_always_fail(
        word in "[a-z][a-z_]{2,10}".prop_filter("not a keyword", |s| s != "true" && s != "false"),
    ) {
        let bare = parse(&word);
        prop_assert!(
            matches!(bare, Err(DomainError::Parse { .. })),
            "bare identifier parsed: {:?}",
            bare
        );
        let nested = parse(&format!(r#"{{"k": {word}}}"#));
        prop_assert!(
            matches!(nested, Err(DomainError::Parse { .. })),
            "nested identifier parsed: {:?}",
            nested
        );
    }

    /// PROPERTY: string escaping round-trips arbitrary content.
    #[test]
    fn property_string_content_round_trips(content in "(?s).{0,64}") {
        let value = Value::Str(content.clone());
        let parsed = parse(&value.to_string()).expect("escaped string must parse");
        prop_assert_eq!(parsed, Raw::Scalar(value));
    }
}
