use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Error taxonomy surfaced by the API. Every variant maps to a fixed HTTP
/// status and a human-readable message; nothing here is retried internally.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Duplicate username or email at registration.
    #[error("{0}")]
    Conflict(String),

    /// Password rejected by the credential policy (first failing rule).
    #[error("{0}")]
    PolicyViolation(String),

    /// Missing/invalid session token or wrong login credential.
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated but the caller's role does not permit the action.
    #[error("Insufficient permissions")]
    Forbidden,

    /// Target identifier unknown.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Reset token not held by any user.
    #[error("Invalid reset token")]
    InvalidToken,

    /// Reset token found but past its expiry.
    #[error("Reset token has expired")]
    ExpiredToken,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Conflict(_)
            | ApiError::PolicyViolation(_)
            | ApiError::InvalidToken
            | ApiError::ExpiredToken => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = match &self {
            ApiError::Internal(e) => {
                error!(error = %e, "internal error");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_match_taxonomy() {
        assert_eq!(
            ApiError::Conflict("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Unauthorized("x".into()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ApiError::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::NotFound("Team").status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::InvalidToken.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::ExpiredToken.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn messages_are_user_facing() {
        assert_eq!(ApiError::Forbidden.to_string(), "Insufficient permissions");
        assert_eq!(ApiError::NotFound("Team").to_string(), "Team not found");
        assert_eq!(ApiError::InvalidToken.to_string(), "Invalid reset token");
        assert_eq!(
            ApiError::ExpiredToken.to_string(),
            "Reset token has expired"
        );
    }
}
