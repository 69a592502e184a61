use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::magic_link::MagicLink;
use chrono::{DateTime, Utc};
use rand::Rng;
use sha2::{Digest, Sha256};
use uuid::Uuid;

impl PostgresRepository {
    /// Generate a cryptographically secure magic link token (256 bits of
    /// entropy, hex encoded).
    /// Returns: (plain_token, token_hash)
    pub fn generate_link_token() -> (String, String) {
        let mut rng = rand::thread_rng();
        let token_bytes: [u8; 32] = rng.r#gen();
        let token = hex::encode(token_bytes);

        // Store hash, send plain token inside the emailed link
        let token_hash = Self::hash_link_token(&token);

        (token, token_hash)
    }

    pub fn hash_link_token(token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token);
        hex::encode(hasher.finalize())
    }

    /// Create a magic link record. Multiple outstanding links per user are
    /// allowed; each is independently redeemable until consumed or expired.
    pub async fn create_magic_link(&self, user_id: &Uuid, token_hash: &str, expires_at: DateTime<Utc>) -> Result<MagicLink, AppError> {
        let link = sqlx::query_as::<_, MagicLink>(
            r#"
            INSERT INTO magic_links (user_id, token_hash, expires_at)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, expires_at, created_at
            "#,
        )
        .bind(user_id)
        .bind(token_hash)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(link)
    }

    /// Atomically delete the link with this token hash and return it.
    ///
    /// The conditional delete is what makes redemption exactly-once: of two
    /// concurrent redemptions only one gets the row back, the other sees
    /// `None`. Expiry is judged by the caller on the returned record; an
    /// expired row is still removed here, which doubles as opportunistic
    /// cleanup.
    pub async fn consume_magic_link(&self, token_hash: &str) -> Result<Option<MagicLink>, AppError> {
        let link = sqlx::query_as::<_, MagicLink>(
            r#"
            DELETE FROM magic_links
            WHERE token_hash = $1
            RETURNING id, user_id, expires_at, created_at
            "#,
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(link)
    }

    /// Clean up expired magic links. Correctness never depends on this
    /// running; redemption re-checks expiry on every attempt.
    pub async fn cleanup_expired_magic_links(&self) -> Result<u64, AppError> {
        let result = sqlx::query(
            r#"
            DELETE FROM magic_links
            WHERE expires_at < NOW()
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_token_is_hex_with_256_bits() {
        let (token, token_hash) = PostgresRepository::generate_link_token();

        // 32 random bytes, hex encoded
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));

        // SHA-256 digest, hex encoded
        assert_eq!(token_hash.len(), 64);
        assert!(token_hash.chars().all(|c| c.is_ascii_hexdigit()));

        assert_ne!(token, token_hash);
        assert_eq!(token_hash, PostgresRepository::hash_link_token(&token));
    }

    #[test]
    fn generated_tokens_are_unique() {
        let (token1, hash1) = PostgresRepository::generate_link_token();
        let (token2, hash2) = PostgresRepository::generate_link_token();

        assert_ne!(token1, token2);
        assert_ne!(hash1, hash2);
    }
}
