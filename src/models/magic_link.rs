use chrono::{DateTime, Utc};
use rocket::serde::{Deserialize, Serialize};
use schemars::JsonSchema;
use uuid::Uuid;
use validator::Validate;

/// Magic link record stored in the database. Only the SHA-256 hash of the
/// bearer token is persisted; the plain token exists solely inside the
/// delivered link.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MagicLink {
    pub id: Uuid,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl MagicLink {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// Request to send a sign-in link
#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct MagicLinkRequest {
    #[validate(email)]
    pub email: String,
}

/// Response for a link request (identical on every path to prevent
/// account enumeration)
#[derive(Debug, Serialize, JsonSchema)]
pub struct MagicLinkResponse {
    pub message: String,
}

pub const MAGIC_LINK_SENT_MESSAGE: &str = "If that address is valid, a sign-in link is on its way.";

/// Request to redeem a magic link token for a session
#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct RedeemRequest {
    #[validate(length(equal = 64))]
    pub token: String,
}

/// Freshly minted session credential
#[derive(Debug, Serialize, JsonSchema)]
pub struct SessionResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn link(expires_at: DateTime<Utc>) -> MagicLink {
        MagicLink {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            expires_at,
            created_at: expires_at - Duration::minutes(15),
        }
    }

    #[test]
    fn expiry_is_strictly_after_deadline() {
        let deadline = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let record = link(deadline);

        assert!(!record.is_expired(deadline));
        assert!(record.is_expired(deadline + Duration::seconds(1)));
    }

    #[test]
    fn redeem_request_rejects_short_tokens() {
        let request = RedeemRequest {
            token: "abc123".to_string(),
        };
        assert!(request.validate().is_err());

        let request = RedeemRequest {
            token: "a".repeat(64),
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn link_request_rejects_malformed_email() {
        assert!(
            MagicLinkRequest {
                email: String::new(),
            }
            .validate()
            .is_err()
        );
        assert!(
            MagicLinkRequest {
                email: "not-an-email".to_string(),
            }
            .validate()
            .is_err()
        );
        assert!(
            MagicLinkRequest {
                email: "someone@example.com".to_string(),
            }
            .validate()
            .is_ok()
        );
    }
}
