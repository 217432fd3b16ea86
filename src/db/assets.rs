use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Asset;

/// Assets in creation order; this is the order their content is joined in.
pub async fn list_by_project(pool: &PgPool, project_id: Uuid) -> Result<Vec<Asset>, sqlx::Error> {
    sqlx::query_as::<_, Asset>(
        "SELECT * FROM assets WHERE project_id = $1 ORDER BY created_at ASC, id ASC",
    )
    .bind(project_id)
    .fetch_all(pool)
    .await
}

pub async fn create(
    pool: &PgPool,
    project_id: Uuid,
    title: &str,
    content: &str,
    token_count: i32,
) -> Result<Asset, sqlx::Error> {
    sqlx::query_as::<_, Asset>(
        "INSERT INTO assets (id, project_id, title, content, token_count)
         VALUES ($1, $2, $3, $4, $5) RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(project_id)
    .bind(title)
    .bind(content)
    .bind(token_count)
    .fetch_one(pool)
    .await
}

pub async fn delete(pool: &PgPool, id: Uuid, project_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM assets WHERE id = $1 AND project_id = $2")
        .bind(id)
        .bind(project_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
