use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::models::GeneratedContent;

/// One row to be written by [`replace_for_project`].
#[derive(Debug, Clone)]
pub struct NewContent {
    pub name: String,
    pub result: String,
    pub order: i32,
    pub model: String,
}

pub async fn list_by_project(
    pool: &PgPool,
    project_id: Uuid,
) -> Result<Vec<GeneratedContent>, sqlx::Error> {
    sqlx::query_as::<_, GeneratedContent>(
        "SELECT * FROM generated_content WHERE project_id = $1
         ORDER BY sort_order ASC, created_at ASC",
    )
    .bind(project_id)
    .fetch_all(pool)
    .await
}

pub async fn find_by_id(
    pool: &PgPool,
    id: Uuid,
) -> Result<Option<GeneratedContent>, sqlx::Error> {
    sqlx::query_as::<_, GeneratedContent>("SELECT * FROM generated_content WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn delete_by_project(pool: &PgPool, project_id: Uuid) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM generated_content WHERE project_id = $1")
        .bind(project_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

/// Update a single row's `result`. `None` when the id is not in the project.
pub async fn update_result(
    pool: &PgPool,
    id: Uuid,
    project_id: Uuid,
    result: &str,
) -> Result<Option<GeneratedContent>, sqlx::Error> {
    sqlx::query_as::<_, GeneratedContent>(
        "UPDATE generated_content SET result = $3, updated_at = now()
         WHERE id = $1 AND project_id = $2 RETURNING *",
    )
    .bind(id)
    .bind(project_id)
    .bind(result)
    .fetch_optional(pool)
    .await
}

/// Replace every generated row of a project in one transaction.
///
/// Old rows are deleted, each new row is inserted under a fresh id and then
/// re-read by that id, so the caller gets exactly what a later GET would
/// return. Either the full set lands or nothing changes.
pub async fn replace_for_project(
    pool: &PgPool,
    project_id: Uuid,
    rows: &[NewContent],
) -> Result<Vec<GeneratedContent>, sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM generated_content WHERE project_id = $1")
        .bind(project_id)
        .execute(&mut *tx)
        .await?;

    let mut inserted = Vec::with_capacity(rows.len());
    for row in rows {
        let id = Uuid::now_v7();
        insert(&mut tx, id, project_id, row).await?;

        let stored = sqlx::query_as::<_, GeneratedContent>(
            "SELECT * FROM generated_content WHERE id = $1",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;
        inserted.push(stored);
    }

    tx.commit().await?;
    Ok(inserted)
}

async fn insert(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
    project_id: Uuid,
    row: &NewContent,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO generated_content (id, project_id, name, result, sort_order, model)
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(id)
    .bind(project_id)
    .bind(&row.name)
    .bind(&row.result)
    .bind(row.order)
    .bind(&row.model)
    .execute(&mut **tx)
    .await?;
    Ok(())
}
