use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

/// Error taxonomy for the HTTP surface. Every variant renders as the
/// uniform JSON envelope `{code, name, description}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    /// Duplicate value rejected by a storage uniqueness constraint.
    /// Reported to clients as a 400, matching the registration contract.
    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: u16,
    pub name: &'static str,
    pub description: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::Conflict(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Validation(_) | Self::Conflict(_) => "Bad Request",
            Self::Unauthorized(_) => "Unauthorized",
            Self::Forbidden(_) => "Forbidden",
            Self::NotFound(_) => "Not Found",
            Self::Internal(_) => "Internal Server Error",
        }
    }

    fn description(&self) -> String {
        match self {
            // Internal details stay in the logs.
            Self::Internal(_) => "The server encountered an internal error.".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Internal(ref e) = self {
            error!(error = %e, "internal error");
        }
        let status = self.status();
        let body = ErrorBody {
            code: status.as_u16(),
            name: self.name(),
            description: self.description(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Self::NotFound("Resource not found".into()),
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                Self::Conflict("A record with this value already exists".into())
            }
            other => Self::Internal(other.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping_follows_the_taxonomy() {
        assert_eq!(
            ApiError::Validation("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Unauthorized("x".into()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Forbidden("x".into()).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(ApiError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        // Duplicate email is reported as a plain 400, not 409.
        assert_eq!(
            ApiError::Conflict("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn envelope_has_code_name_description() {
        let body = ErrorBody {
            code: 404,
            name: "Not Found",
            description: "Entry not found".into(),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["code"], 404);
        assert_eq!(json["name"], "Not Found");
        assert_eq!(json["description"], "Entry not found");
    }

    #[test]
    fn row_not_found_maps_to_not_found() {
        let err: ApiError = sqlx::Error::RowNotFound.into();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn internal_hides_details_from_the_client() {
        let err = ApiError::Internal(anyhow::anyhow!("connection pool exhausted"));
        assert!(!err.description().contains("pool"));
    }
}
