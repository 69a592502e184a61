use crate::service::streak::StreakCounters;
use chrono::{DateTime, Utc};
use rocket::serde::Serialize;
use schemars::JsonSchema;
use uuid::Uuid;

/// Account row. Created on the first magic-link request for an unseen email;
/// the streak columns are only ever touched by `record_activity`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub current_streak: i32,
    pub longest_streak: i32,
    pub last_activity_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn streak_counters(&self) -> StreakCounters {
        StreakCounters {
            current_streak: self.current_streak,
            longest_streak: self.longest_streak,
            last_activity_at: self.last_activity_at,
        }
    }
}

/// Dashboard stats for the authenticated user.
#[derive(Debug, Serialize, JsonSchema)]
pub struct StatsResponse {
    pub current_streak: i32,
    pub longest_streak: i32,
    pub total_notes: i64,
}
