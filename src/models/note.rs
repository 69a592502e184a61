use chrono::{DateTime, Utc};
use rocket::serde::{Deserialize, Serialize};
use schemars::JsonSchema;
use serde_json::Value as JsonValue;
use uuid::Uuid;

/// How a note's body should be interpreted by the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, sqlx::Type)]
#[sqlx(type_name = "content_type", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum ContentType {
    Text,
    Drawing,
    Mixed,
}

#[derive(Debug, Clone, Serialize, JsonSchema, sqlx::FromRow)]
pub struct Note {
    pub id: Uuid,
    pub title: String,
    pub content: Option<String>,
    pub drawing_data: Option<JsonValue>,
    pub content_type: ContentType,
    pub mood: Option<String>,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating a note. Everything is optional except intent: a bare
/// `{}` creates an empty "Untitled" text note, matching the editor's
/// create-then-edit flow.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateNoteRequest {
    pub title: Option<String>,
    pub mood: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct UpdateNoteRequest {
    pub title: String,
    pub content: Option<String>,
    pub drawing_data: Option<JsonValue>,
    pub content_type: ContentType,
    pub mood: Option<String>,
}

impl CreateNoteRequest {
    pub fn title_or_default(&self) -> &str {
        match self.title.as_deref() {
            Some(title) if !title.trim().is_empty() => title,
            _ => "Untitled",
        }
    }
}
