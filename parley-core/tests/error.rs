use parley_core::{ErrorKind, ParleyError};

#[test]
fn error_display_for_upstream() {
    let err = ParleyError::Upstream {
        status: 500,
        message: "Ollama API error".to_string(),
    };
    assert_eq!(
        format!("{err}"),
        "Generation endpoint returned 500: Ollama API error"
    );
    assert_eq!(err.status(), Some(500));
    assert_eq!(err.kind(), ErrorKind::Upstream);
}

#[test]
fn error_display_for_network_failure() {
    let err = ParleyError::NetworkFailure("connection refused".to_string());
    assert_eq!(format!("{err}"), "Connection error: connection refused");
    assert_eq!(err.kind(), ErrorKind::Network);
    assert_eq!(err.status(), None);
}

#[test]
fn error_display_for_malformed_response() {
    let err = ParleyError::MalformedResponse("missing field `response`".to_string());
    assert_eq!(
        format!("{err}"),
        "Malformed response: missing field `response`"
    );
    assert_eq!(err.kind(), ErrorKind::Malformed);
}

#[test]
fn serde_errors_convert_and_count_as_malformed() {
    let parse = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
    let err: ParleyError = parse.into();
    assert!(matches!(err, ParleyError::Serde(_)));
    assert_eq!(err.kind(), ErrorKind::Malformed);
}

#[test]
fn config_errors_have_their_own_kind() {
    let err = ParleyError::InvalidConfig("GEMINI_API_KEY is not set".to_string());
    assert_eq!(err.kind(), ErrorKind::Config);
}
