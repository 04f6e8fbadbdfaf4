use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use derive_more::Display;

/// Error kinds surfaced by handlers. Engine functions are pure and do not
/// produce these; they arise at parse/authorization/persistence boundaries.
#[derive(Debug, Display)]
pub enum ApiError {
    #[display(fmt = "{}", _0)]
    NotFound(String),

    #[display(fmt = "{}", _0)]
    Unauthorized(String),

    #[display(fmt = "{}", _0)]
    Forbidden(String),

    #[display(fmt = "{}", _0)]
    InvalidInput(String),

    #[display(fmt = "{}", _0)]
    Conflict(String),

    /// Persistence failure. The context string is logged; the client sees an
    /// opaque message.
    #[display(fmt = "Internal Server Error")]
    Dependency(String),
}

impl ApiError {
    pub fn not_found(what: impl Into<String>) -> Self {
        ApiError::NotFound(what.into())
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        ApiError::InvalidInput(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        ApiError::Conflict(msg.into())
    }

    /// Wraps a sqlx error with call-site context, logging it here so handlers
    /// stay free of repeated `tracing::error!` closures.
    pub fn db(context: &'static str, e: sqlx::Error) -> Self {
        tracing::error!(error = %e, context, "database operation failed");
        ApiError::Dependency(context.to_string())
    }

    /// MySQL signals unique-key violations with SQLSTATE 23000; surface those
    /// as `Conflict` instead of an opaque 500.
    pub fn db_or_conflict(context: &'static str, conflict_msg: &str, e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.code().as_deref() == Some("23000") {
                return ApiError::Conflict(conflict_msg.to_string());
            }
        }
        ApiError::db(context, e)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Dependency(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "message": self.to_string()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_match_kinds() {
        assert_eq!(
            ApiError::not_found("x").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::invalid("x").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::conflict("x").status_code(), StatusCode::CONFLICT);
        assert_eq!(
            ApiError::Dependency("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn dependency_message_is_opaque() {
        let e = ApiError::Dependency("select attendance".into());
        assert_eq!(e.to_string(), "Internal Server Error");
    }
}
