use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Project;

pub async fn list(pool: &PgPool, owner_id: Option<&str>) -> Result<Vec<Project>, sqlx::Error> {
    match owner_id {
        Some(owner_id) => {
            sqlx::query_as::<_, Project>(
                "SELECT * FROM projects WHERE owner_id = $1 ORDER BY created_at DESC",
            )
            .bind(owner_id)
            .fetch_all(pool)
            .await
        }
        None => {
            sqlx::query_as::<_, Project>("SELECT * FROM projects ORDER BY created_at DESC")
                .fetch_all(pool)
                .await
        }
    }
}

pub async fn create(pool: &PgPool, title: &str, owner_id: &str) -> Result<Project, sqlx::Error> {
    sqlx::query_as::<_, Project>(
        "INSERT INTO projects (id, title, owner_id) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(title)
    .bind(owner_id)
    .fetch_one(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Project>, sqlx::Error> {
    sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn update(pool: &PgPool, id: Uuid, title: &str) -> Result<Project, sqlx::Error> {
    sqlx::query_as::<_, Project>(
        "UPDATE projects SET title = $2, updated_at = now() WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(title)
    .fetch_one(pool)
    .await
}

/// Returns false when no project matched.
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM projects WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
