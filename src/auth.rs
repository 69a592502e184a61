use crate::error::app_error::AppError;
use crate::service::session::SessionSigner;
use chrono::Utc;
use rocket::http::{Cookie, Status};
use rocket::outcome::Outcome;
use rocket::request::{FromRequest, Outcome as RequestOutcome, Request};
use rocket_okapi::okapi::openapi3::{Object, Responses, SecurityRequirement, SecurityScheme, SecuritySchemeData};
use rocket_okapi::r#gen::OpenApiGenerator;
use rocket_okapi::request::{OpenApiFromRequest, RequestHeaderInput};
use serde::Serialize;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "session";

/// Authenticated caller, extracted once per request from the session
/// credential. Verification is purely computational: no database access,
/// safe on every request.
#[derive(Debug, Clone, Serialize)]
pub struct CurrentUser {
    pub id: Uuid,
}

pub(crate) fn bearer_token(header_value: &str) -> Option<&str> {
    let token = header_value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for CurrentUser {
    type Error = AppError;

    async fn from_request(req: &'r Request<'_>) -> RequestOutcome<Self, Self::Error> {
        let cookies = req.cookies();

        let credential = cookies
            .get(SESSION_COOKIE)
            .map(|cookie| cookie.value().to_string())
            .or_else(|| req.headers().get_one("Authorization").and_then(bearer_token).map(str::to_string));

        let Some(credential) = credential else {
            return Outcome::Error((Status::Unauthorized, AppError::Unauthenticated));
        };

        let Some(signer) = req.rocket().state::<SessionSigner>() else {
            // Misconfiguration, not a caller problem: build_rocket always
            // manages the signer.
            tracing::error!("SessionSigner is not in managed state");
            return Outcome::Error((
                Status::InternalServerError,
                AppError::Internal("session signer not configured".to_string()),
            ));
        };

        match signer.verify(&credential, Utc::now()) {
            Ok(user_id) => {
                let current_user = CurrentUser { id: user_id };
                req.local_cache(|| Some(current_user.clone()));
                Outcome::Success(current_user)
            }
            Err(_) => {
                // Tell the client to drop the stale credential.
                cookies.remove(Cookie::build(SESSION_COOKIE).path("/").build());
                Outcome::Error((Status::Unauthorized, AppError::Unauthenticated))
            }
        }
    }
}

impl<'a> OpenApiFromRequest<'a> for CurrentUser {
    fn from_request_input(_gen: &mut OpenApiGenerator, _name: String, _required: bool) -> rocket_okapi::Result<RequestHeaderInput> {
        // Document the cookie-based authentication requirement
        let security_scheme = SecurityScheme {
            description: Some("Session cookie obtained by redeeming a magic link via POST /auth/redeem.".to_string()),
            data: SecuritySchemeData::ApiKey {
                name: SESSION_COOKIE.to_string(),
                location: "cookie".to_string(),
            },
            extensions: Object::default(),
        };

        let mut security_req = SecurityRequirement::new();
        security_req.insert("cookieAuth".to_string(), Vec::new());

        Ok(RequestHeaderInput::Security("cookieAuth".to_string(), security_scheme, security_req))
    }

    fn get_responses(_gen: &mut OpenApiGenerator) -> rocket_okapi::Result<Responses> {
        use rocket_okapi::okapi::openapi3::{RefOr, Response};
        let mut responses = Responses::default();
        responses.responses.insert(
            "401".to_string(),
            RefOr::Object(Response {
                description: "Unauthorized - Authentication required".to_string(),
                ..Default::default()
            }),
        );
        Ok(responses)
    }
}

#[cfg(test)]
mod tests {
    use super::bearer_token;

    #[test]
    fn bearer_token_strips_scheme() {
        assert_eq!(bearer_token("Bearer abc.def.ghi"), Some("abc.def.ghi"));
    }

    #[test]
    fn bearer_token_rejects_other_schemes() {
        assert_eq!(bearer_token("Basic dXNlcjpwYXNz"), None);
        assert_eq!(bearer_token("abc.def.ghi"), None);
    }

    #[test]
    fn bearer_token_rejects_empty_value() {
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("Bearer    "), None);
    }
}
