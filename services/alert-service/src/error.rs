use axum::{
    extract::rejection::BytesRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Why an alert body never reached the handler. Responses carry the status only.
#[derive(Debug, Error)]
pub enum PayloadRejection {
    #[error("malformed JSON body: {0}")]
    Malformed(String),

    #[error("expected `Content-Type: application/json`")]
    UnsupportedContentType,

    #[error("unreadable request body: {reason}")]
    Unreadable { status: StatusCode, reason: String },
}

impl PayloadRejection {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Malformed(_) => StatusCode::BAD_REQUEST,
            Self::UnsupportedContentType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::Unreadable { status, .. } => *status,
        }
    }
}

impl From<serde_json::Error> for PayloadRejection {
    fn from(err: serde_json::Error) -> Self {
        Self::Malformed(err.to_string())
    }
}

impl From<BytesRejection> for PayloadRejection {
    fn from(rejection: BytesRejection) -> Self {
        Self::Unreadable {
            status: rejection.status(),
            reason: rejection.body_text(),
        }
    }
}

impl IntoResponse for PayloadRejection {
    fn into_response(self) -> Response {
        tracing::warn!(error = %self, "alert rejected");
        self.status().into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses() {
        assert_eq!(
            PayloadRejection::Malformed("eof".to_string()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            PayloadRejection::UnsupportedContentType.status(),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
        let too_large = PayloadRejection::Unreadable {
            status: StatusCode::PAYLOAD_TOO_LARGE,
            reason: "length limit exceeded".to_string(),
        };
        assert_eq!(too_large.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn parser_errors_are_malformed() {
        let err = serde_json::from_str::<serde_json::Value>("{not json").expect_err("bad json");
        let rejection = PayloadRejection::from(err);
        assert!(matches!(rejection, PayloadRejection::Malformed(_)));
        assert_eq!(rejection.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn response_has_no_body_text() {
        let response = PayloadRejection::Malformed("eof".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(!response.headers().contains_key("content-type"));
    }
}
