use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::note::{ContentType, Note, UpdateNoteRequest};
use serde_json::Value as JsonValue;
use uuid::Uuid;

const NOTE_COLUMNS: &str = "id, title, content, drawing_data, content_type, mood, user_id, created_at, updated_at";

impl PostgresRepository {
    pub async fn create_note(&self, user_id: &Uuid, title: &str, mood: Option<&str>) -> Result<Note, AppError> {
        let note = sqlx::query_as::<_, Note>(&format!(
            r#"
            INSERT INTO notes (title, content, drawing_data, content_type, mood, user_id)
            VALUES ($1, '', $2, $3, $4, $5)
            RETURNING {NOTE_COLUMNS}
            "#,
        ))
        .bind(title)
        .bind(JsonValue::Object(serde_json::Map::new()))
        .bind(ContentType::Text)
        .bind(mood)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(note)
    }

    /// Update a note. Scoped to the owning user so one account can never
    /// touch another's notes.
    pub async fn update_note(&self, id: &Uuid, user_id: &Uuid, request: &UpdateNoteRequest) -> Result<Option<Note>, AppError> {
        let note = sqlx::query_as::<_, Note>(&format!(
            r#"
            UPDATE notes
            SET title = $1,
                content = $2,
                drawing_data = $3,
                content_type = $4,
                mood = $5,
                updated_at = NOW()
            WHERE id = $6 AND user_id = $7
            RETURNING {NOTE_COLUMNS}
            "#,
        ))
        .bind(&request.title)
        .bind(&request.content)
        .bind(&request.drawing_data)
        .bind(request.content_type)
        .bind(&request.mood)
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(note)
    }

    pub async fn get_note_by_id(&self, id: &Uuid, user_id: &Uuid) -> Result<Option<Note>, AppError> {
        let note = sqlx::query_as::<_, Note>(&format!(
            r#"
            SELECT {NOTE_COLUMNS}
            FROM notes
            WHERE id = $1 AND user_id = $2
            "#,
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(note)
    }

    /// The sidebar shows the five most recently touched notes.
    pub async fn list_recent_notes(&self, user_id: &Uuid) -> Result<Vec<Note>, AppError> {
        let notes = sqlx::query_as::<_, Note>(&format!(
            r#"
            SELECT {NOTE_COLUMNS}
            FROM notes
            WHERE user_id = $1
            ORDER BY updated_at DESC
            LIMIT 5
            "#,
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(notes)
    }

    pub async fn count_notes(&self, user_id: &Uuid) -> Result<i64, AppError> {
        let count: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM notes
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0)
    }
}
