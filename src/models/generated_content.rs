use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Output of one prompt in one generation run. `name` and `order` are copied
/// from the source prompt.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct GeneratedContent {
    pub id: Uuid,
    pub project_id: Uuid,
    pub name: String,
    pub result: String,
    #[sqlx(rename = "sort_order")]
    pub order: i32,
    pub model: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
