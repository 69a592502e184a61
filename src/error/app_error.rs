use rocket::http::Status;
use rocket::response::Responder;
use rocket::{Request, Response};
use rocket_okapi::OpenApiError;
use rocket_okapi::okapi::openapi3::Responses;
use rocket_okapi::r#gen::OpenApiGenerator;
use rocket_okapi::response::OpenApiResponderInner;
use std::io::Cursor;
use thiserror::Error;
use tracing::error;
use validator::ValidationErrors;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Internal server error")]
    Db {
        message: String,
        #[source]
        source: sqlx::error::Error,
    },
    /// Magic link token does not exist (never issued, or already redeemed).
    #[error("Invalid or unknown link")]
    InvalidToken,
    /// Magic link token exists but its validity window has passed.
    #[error("Link has expired")]
    ExpiredToken,
    /// Missing, tampered, or expired session credential.
    #[error("Authentication required")]
    Unauthenticated,
    #[error("Bad request: {0}")]
    MalformedInput(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Validation error: {0}")]
    ValidationError(#[from] ValidationErrors),
    #[error("Internal server error")]
    ConfigurationError {
        message: String,
        #[source]
        source: figment::Error,
    },
    #[error("Internal server error")]
    SessionMint {
        message: String,
        #[source]
        source: jsonwebtoken::errors::Error,
    },
    #[error("Internal server error")]
    Email { message: String },
    #[error("Internal server error")]
    Internal(String),
}

impl AppError {
    pub fn db(message: impl Into<String>, source: sqlx::error::Error) -> Self {
        Self::Db {
            message: message.into(),
            source,
        }
    }

    pub fn session_mint(message: impl Into<String>, source: jsonwebtoken::errors::Error) -> Self {
        Self::SessionMint {
            message: message.into(),
            source,
        }
    }

    pub fn email(message: impl Into<String>) -> Self {
        Self::Email { message: message.into() }
    }
}

impl From<&AppError> for Status {
    fn from(e: &AppError) -> Self {
        match e {
            AppError::Db { .. } => Status::InternalServerError,
            AppError::InvalidToken => Status::Unauthorized,
            AppError::ExpiredToken => Status::Unauthorized,
            AppError::Unauthenticated => Status::Unauthorized,
            AppError::MalformedInput(_) => Status::BadRequest,
            AppError::NotFound(_) => Status::NotFound,
            AppError::ValidationError(_) => Status::BadRequest,
            AppError::ConfigurationError { .. } => Status::InternalServerError,
            AppError::SessionMint { .. } => Status::InternalServerError,
            AppError::Email { .. } => Status::InternalServerError,
            AppError::Internal(_) => Status::InternalServerError,
        }
    }
}

impl<'r> Responder<'r, 'static> for AppError {
    fn respond_to(self, req: &Request<'_>) -> rocket::response::Result<'static> {
        let method = req.method();
        let uri = req.uri();

        let request_id = req
            .local_cache(|| None::<crate::middleware::RequestId>)
            .as_ref()
            .map(|r| r.0.as_str())
            .unwrap_or("unknown");

        let user_id = req
            .local_cache(|| None::<crate::auth::CurrentUser>)
            .as_ref()
            .map(|u| u.id.to_string())
            .unwrap_or_else(|| "anonymous".to_string());

        error!(
            error = ?self,
            request_id = %request_id,
            user_id = %user_id,
            method = %method,
            uri = %uri,
            "request failed"
        );

        let status = Status::from(&self);
        let body = self.to_string();

        Response::build().status(status).sized_body(body.len(), Cursor::new(body)).ok()
    }
}

impl OpenApiResponderInner for AppError {
    fn responses(_gen: &mut OpenApiGenerator) -> Result<Responses, OpenApiError> {
        use rocket_okapi::okapi::openapi3::{RefOr, Response as OpenApiResponse};
        let mut responses = Responses::default();
        for (code, description) in [
            ("400", "Bad Request"),
            ("401", "Unauthorized"),
            ("404", "Not Found"),
            ("500", "Internal Server Error"),
        ] {
            responses.responses.insert(
                code.to_string(),
                RefOr::Object(OpenApiResponse {
                    description: description.to_string(),
                    ..Default::default()
                }),
            );
        }
        Ok(responses)
    }
}

impl From<figment::Error> for AppError {
    fn from(e: figment::Error) -> Self {
        AppError::ConfigurationError {
            message: "Failed to read configuration".to_string(),
            source: e,
        }
    }
}

impl From<uuid::Error> for AppError {
    fn from(_: uuid::Error) -> Self {
        AppError::MalformedInput("Invalid UUID".to_string())
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => AppError::NotFound("Resource not found".to_string()),
            _ => AppError::db("Database error", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_errors_map_to_unauthorized() {
        assert_eq!(Status::from(&AppError::InvalidToken), Status::Unauthorized);
        assert_eq!(Status::from(&AppError::ExpiredToken), Status::Unauthorized);
        assert_eq!(Status::from(&AppError::Unauthenticated), Status::Unauthorized);
    }

    #[test]
    fn distinct_messages_for_invalid_and_expired() {
        // Callers rely on the body to tell a consumed link from a stale one.
        assert_ne!(AppError::InvalidToken.to_string(), AppError::ExpiredToken.to_string());
    }

    #[test]
    fn internal_errors_are_server_class() {
        let error = AppError::Internal("session signer not configured".to_string());
        assert_eq!(Status::from(&error), Status::InternalServerError);
        // And the body stays generic.
        assert_eq!(error.to_string(), "Internal server error");
    }

    #[test]
    fn unauthenticated_message_carries_no_identity() {
        let body = AppError::Unauthenticated.to_string();
        assert_eq!(body, "Authentication required");
    }
}
