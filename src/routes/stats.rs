use crate::auth::CurrentUser;
use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::user::StatsResponse;
use rocket::serde::json::Json;
use rocket::{State, get};
use rocket_okapi::openapi;
use sqlx::PgPool;

/// Streak counters and note count for the dashboard header
#[openapi(tag = "Stats")]
#[get("/")]
pub async fn get_stats(pool: &State<PgPool>, user: CurrentUser) -> Result<Json<StatsResponse>, AppError> {
    let repo = PostgresRepository { pool: pool.inner().clone() };

    let record = repo
        .get_user_by_id(&user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    let total_notes = repo.count_notes(&user.id).await?;

    Ok(Json(StatsResponse {
        current_streak: record.current_streak,
        longest_streak: record.longest_streak,
        total_notes,
    }))
}

pub fn routes() -> (Vec<rocket::Route>, okapi::openapi3::OpenApi) {
    rocket_okapi::openapi_get_routes_spec![get_stats]
}
