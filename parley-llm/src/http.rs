use std::time::Duration;

use parley_core::ParleyError;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use url::Url;

pub(crate) fn build_client(timeout: Duration) -> Result<Client, ParleyError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|err| ParleyError::InvalidConfig(err.to_string()))
}

/// Validates a base URL and strips any trailing slash.
pub(crate) fn normalize_base_url(base_url: &str) -> Result<String, ParleyError> {
    let trimmed = base_url.trim().trim_end_matches('/');
    Url::parse(trimmed)
        .map_err(|err| ParleyError::InvalidConfig(format!("invalid base url '{base_url}': {err}")))?;
    Ok(trimmed.to_string())
}

/// Transport-level failures: refused connections, DNS, timeouts, broken bodies.
///
/// The request URL is dropped from the message so query credentials never
/// reach logs or API responses.
pub(crate) fn network_error(err: reqwest::Error) -> ParleyError {
    let err = err.without_url();
    if err.is_timeout() {
        tracing::warn!(error = %err, "generation request timed out");
    }
    ParleyError::NetworkFailure(err.to_string())
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorBody {
    Flat { error: String },
    Nested { error: NestedError },
}

#[derive(Debug, Deserialize)]
struct NestedError {
    message: String,
}

/// Builds an upstream error, preferring the `error` text backends put in JSON
/// bodies over the raw body.
pub(crate) fn upstream_error(status: StatusCode, body: &str) -> ParleyError {
    let message = match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody::Flat { error }) => error,
        Ok(ErrorBody::Nested { error }) => error.message,
        Err(_) if body.trim().is_empty() => status
            .canonical_reason()
            .unwrap_or("unknown status")
            .to_string(),
        Err(_) => body.trim().to_string(),
    };
    tracing::warn!(status = status.as_u16(), %message, "generation endpoint returned an error");
    ParleyError::Upstream {
        status: status.as_u16(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_error_reads_flat_and_nested_bodies() {
        let flat = upstream_error(StatusCode::NOT_FOUND, r#"{"error":"model 'x' not found"}"#);
        assert!(matches!(
            flat,
            ParleyError::Upstream { status: 404, ref message } if message == "model 'x' not found"
        ));

        let nested = upstream_error(
            StatusCode::BAD_REQUEST,
            r#"{"error":{"code":400,"message":"API key not valid"}}"#,
        );
        assert!(matches!(
            nested,
            ParleyError::Upstream { status: 400, ref message } if message == "API key not valid"
        ));
    }

    #[test]
    fn upstream_error_falls_back_to_reason_phrase() {
        let err = upstream_error(StatusCode::INTERNAL_SERVER_ERROR, "");
        assert!(matches!(
            err,
            ParleyError::Upstream { status: 500, ref message } if message == "Internal Server Error"
        ));
    }

    #[test]
    fn base_urls_are_validated_and_trimmed() {
        assert_eq!(
            normalize_base_url("http://localhost:11434/").unwrap(),
            "http://localhost:11434"
        );
        assert!(matches!(
            normalize_base_url("not a url"),
            Err(ParleyError::InvalidConfig(_))
        ));
    }
}
