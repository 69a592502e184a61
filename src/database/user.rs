use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::user::User;
use crate::service::streak;
use chrono::{DateTime, Utc};
use uuid::Uuid;

const USER_COLUMNS: &str = "id, email, current_streak, longest_streak, last_activity_at, created_at";

impl PostgresRepository {
    /// Look up a user by email, creating one with zeroed streak counters if
    /// absent. A single upsert keeps concurrent first-time requests for the
    /// same address from racing on the unique email constraint.
    pub async fn get_or_create_user_by_email(&self, email: &str) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (email)
            VALUES ($1)
            ON CONFLICT (email) DO UPDATE SET email = EXCLUDED.email
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(email)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn get_user_by_id(&self, id: &Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE id = $1
            "#,
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Record a qualifying activity for streak purposes.
    ///
    /// The streak computation itself is pure (`streak::advance`); this method
    /// only persists its result with optimistic concurrency. The UPDATE is
    /// keyed on the `last_activity_at` value the counters were computed from,
    /// so two simultaneous activities cannot double-increment: the loser's
    /// conditional write matches zero rows and the loop re-reads. A same-day
    /// repeat is a no-op before any write happens.
    pub async fn record_activity(&self, user_id: &Uuid, now: DateTime<Utc>) -> Result<(), AppError> {
        const MAX_ATTEMPTS: usize = 3;

        for _ in 0..MAX_ATTEMPTS {
            let user = self
                .get_user_by_id(user_id)
                .await?
                .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

            let Some(updated) = streak::advance(&user.streak_counters(), now) else {
                return Ok(());
            };

            let result = sqlx::query(
                r#"
                UPDATE users
                SET current_streak = $1,
                    longest_streak = GREATEST(longest_streak, $2),
                    last_activity_at = $3
                WHERE id = $4
                  AND last_activity_at IS NOT DISTINCT FROM $5
                "#,
            )
            .bind(updated.current_streak)
            .bind(updated.longest_streak)
            .bind(updated.last_activity_at)
            .bind(user_id)
            .bind(user.last_activity_at)
            .execute(&self.pool)
            .await?;

            if result.rows_affected() == 1 {
                return Ok(());
            }
            // Lost the race; the re-read will usually land on the same-day
            // no-op branch.
        }

        tracing::warn!("record_activity gave up after {} contended attempts for user {}", MAX_ATTEMPTS, user_id);
        Ok(())
    }
}
