use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Text extracted from an uploaded file. Feeds the generation context.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Asset {
    pub id: Uuid,
    pub project_id: Uuid,
    pub title: String,
    pub content: String,
    pub token_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
