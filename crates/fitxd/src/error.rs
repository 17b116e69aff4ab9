use reqwest::StatusCode;

/// Longest upstream body excerpt carried into an error message.
const MAX_BODY_EXCERPT: usize = 200;

pub type Result<T> = std::result::Result<T, Error>;

/// Failure while reading utilization or publishing a sensor state.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The remote API answered with a non-success status.
    #[error("{endpoint} responded with {status}{}", body_excerpt(.body))]
    RemoteRequest {
        endpoint: String,
        status: StatusCode,
        body: String,
    },

    /// The response body did not have the expected shape.
    #[error("unexpected response from {endpoint}: {reason}")]
    DataFormat { endpoint: String, reason: String },

    /// DNS, connect, timeout or body read failure.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl Error {
    pub(crate) fn data_format(endpoint: &str, reason: impl Into<String>) -> Self {
        Error::DataFormat {
            endpoint: endpoint.to_string(),
            reason: reason.into(),
        }
    }

    /// HTTP status of a rejected request, if the failure was one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::RemoteRequest { status, .. } => Some(*status),
            Error::Transport(e) => e.status(),
            Error::DataFormat { .. } => None,
        }
    }
}

fn body_excerpt(body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        return String::new();
    }

    if body.chars().count() > MAX_BODY_EXCERPT {
        let excerpt: String = body.chars().take(MAX_BODY_EXCERPT).collect();
        format!(": {}...", excerpt)
    } else {
        format!(": {}", body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_request_display_includes_body() {
        let err = Error::RemoteRequest {
            endpoint: "http://ha.local/api/states/sensor.jim".to_string(),
            status: StatusCode::UNAUTHORIZED,
            body: "401: Unauthorized\n".to_string(),
        };

        assert_eq!(
            err.to_string(),
            "http://ha.local/api/states/sensor.jim responded with 401 Unauthorized: 401: Unauthorized"
        );
        assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
    }

    #[test]
    fn test_remote_request_display_without_body() {
        let err = Error::RemoteRequest {
            endpoint: "http://fitx.local/x".to_string(),
            status: StatusCode::BAD_GATEWAY,
            body: String::new(),
        };

        assert_eq!(err.to_string(), "http://fitx.local/x responded with 502 Bad Gateway");
    }

    #[test]
    fn test_long_body_is_truncated() {
        let excerpt = body_excerpt(&"x".repeat(MAX_BODY_EXCERPT + 50));
        assert_eq!(excerpt.len(), 2 + MAX_BODY_EXCERPT + 3);
        assert!(excerpt.ends_with("..."));
    }

    #[test]
    fn test_data_format_has_no_status() {
        let err = Error::data_format("http://fitx.local/x", "no current record");
        assert_eq!(err.status(), None);
        assert_eq!(
            err.to_string(),
            "unexpected response from http://fitx.local/x: no current record"
        );
    }
}
