use crate::error::app_error::AppError;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Payload of a session credential. Validity lives entirely in the token:
/// nothing is stored server-side, so a credential cannot be revoked before
/// `exp` passes.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: Uuid,
    iat: i64,
    exp: i64,
}

/// Mints and verifies stateless session credentials with an HMAC key taken
/// from configuration. Verification is a pure function of
/// (credential, current time, key), so tests can pin `now`.
pub struct SessionSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl SessionSigner {
    pub fn new(secret: &str, ttl_days: i64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against the caller-supplied time, not the
        // library's wall clock.
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl: Duration::days(ttl_days),
        }
    }

    /// Issue a credential for `user_id`, valid from `now` until `now + ttl`.
    pub fn mint(&self, user_id: &Uuid, now: DateTime<Utc>) -> Result<(String, DateTime<Utc>), AppError> {
        let expires_at = now + self.ttl;
        let claims = Claims {
            sub: *user_id,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::session_mint("Failed to sign session token", e))?;

        Ok((token, expires_at))
    }

    /// Verify signature and expiry, returning the embedded user id.
    ///
    /// Every failure collapses to `Unauthenticated`: a tampered or stale
    /// credential must not reveal the identity it would otherwise carry.
    pub fn verify(&self, credential: &str, now: DateTime<Utc>) -> Result<Uuid, AppError> {
        let data =
            decode::<Claims>(credential, &self.decoding_key, &self.validation).map_err(|_| AppError::Unauthenticated)?;

        if now.timestamp() > data.claims.exp {
            return Err(AppError::Unauthenticated);
        }

        Ok(data.claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn signer() -> SessionSigner {
        SessionSigner::new("test-secret", 7)
    }

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn mint_then_verify_returns_user_id() {
        let user_id = Uuid::new_v4();
        let (token, expires_at) = signer().mint(&user_id, noon()).unwrap();

        assert_eq!(expires_at, noon() + Duration::days(7));
        assert_eq!(signer().verify(&token, noon()).unwrap(), user_id);
    }

    #[test]
    fn valid_until_embedded_expiry_then_rejected() {
        let user_id = Uuid::new_v4();
        let (token, expires_at) = signer().mint(&user_id, noon()).unwrap();

        // Still valid exactly at expiry.
        assert!(signer().verify(&token, expires_at).is_ok());
        // One second past, rejected.
        let result = signer().verify(&token, expires_at + Duration::seconds(1));
        assert!(matches!(result, Err(AppError::Unauthenticated)));
    }

    #[test]
    fn tampered_signature_is_rejected() {
        let (token, _) = signer().mint(&Uuid::new_v4(), noon()).unwrap();

        let mut tampered = token.clone();
        let last = tampered.pop().unwrap();
        tampered.push(if last == 'a' { 'b' } else { 'a' });

        let result = signer().verify(&tampered, noon());
        assert!(matches!(result, Err(AppError::Unauthenticated)));
    }

    #[test]
    fn wrong_key_is_rejected() {
        let (token, _) = signer().mint(&Uuid::new_v4(), noon()).unwrap();

        let other = SessionSigner::new("different-secret", 7);
        assert!(matches!(other.verify(&token, noon()), Err(AppError::Unauthenticated)));
    }

    #[test]
    fn garbage_credential_is_rejected() {
        assert!(matches!(signer().verify("not.a.jwt", noon()), Err(AppError::Unauthenticated)));
        assert!(matches!(signer().verify("", noon()), Err(AppError::Unauthenticated)));
    }
}
