use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::models::{Prompt, TemplatePrompt};

pub async fn list_by_project(pool: &PgPool, project_id: Uuid) -> Result<Vec<Prompt>, sqlx::Error> {
    sqlx::query_as::<_, Prompt>(
        "SELECT * FROM prompts WHERE project_id = $1 ORDER BY sort_order ASC, created_at ASC",
    )
    .bind(project_id)
    .fetch_all(pool)
    .await
}

pub async fn create(
    pool: &PgPool,
    project_id: Uuid,
    name: &str,
    prompt: &str,
    order: i32,
    token_count: i32,
) -> Result<Prompt, sqlx::Error> {
    sqlx::query_as::<_, Prompt>(
        "INSERT INTO prompts (id, project_id, name, prompt, sort_order, token_count)
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(project_id)
    .bind(name)
    .bind(prompt)
    .bind(order)
    .bind(token_count)
    .fetch_one(pool)
    .await
}

pub async fn update(
    pool: &PgPool,
    id: Uuid,
    project_id: Uuid,
    name: &str,
    prompt: &str,
    order: i32,
    token_count: i32,
) -> Result<Option<Prompt>, sqlx::Error> {
    sqlx::query_as::<_, Prompt>(
        "UPDATE prompts
         SET name = $3, prompt = $4, sort_order = $5, token_count = $6, updated_at = now()
         WHERE id = $1 AND project_id = $2 RETURNING *",
    )
    .bind(id)
    .bind(project_id)
    .bind(name)
    .bind(prompt)
    .bind(order)
    .bind(token_count)
    .fetch_optional(pool)
    .await
}

pub async fn delete(pool: &PgPool, id: Uuid, project_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM prompts WHERE id = $1 AND project_id = $2")
        .bind(id)
        .bind(project_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Next free `order` value for a project: one past the current maximum, or 0.
/// `None` once the maximum is already `i32::MAX`.
async fn next_order(
    tx: &mut Transaction<'_, Postgres>,
    project_id: Uuid,
) -> Result<Option<i32>, sqlx::Error> {
    let row: (Option<i32>,) =
        sqlx::query_as("SELECT MAX(sort_order) FROM prompts WHERE project_id = $1")
            .bind(project_id)
            .fetch_one(&mut **tx)
            .await?;
    Ok(match row.0 {
        Some(max) => max.checked_add(1),
        None => Some(0),
    })
}

async fn insert_in_tx(
    tx: &mut Transaction<'_, Postgres>,
    project_id: Uuid,
    name: &str,
    prompt: &str,
    order: i32,
    token_count: i32,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO prompts (id, project_id, name, prompt, sort_order, token_count)
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(Uuid::now_v7())
    .bind(project_id)
    .bind(name)
    .bind(prompt)
    .bind(order)
    .bind(token_count)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Copy template prompts into a project, placed after its existing prompts
/// and keeping the template's relative order.
///
/// Returns `false` without writing anything when the appended orders would
/// run past `i32::MAX`.
pub async fn append_from_template(
    pool: &PgPool,
    project_id: Uuid,
    template_prompts: &[TemplatePrompt],
) -> Result<bool, sqlx::Error> {
    let mut tx = pool.begin().await?;
    let Some(start) = next_order(&mut tx, project_id).await? else {
        return Ok(false);
    };

    for (offset, tp) in template_prompts.iter().enumerate() {
        let Some(order) = i32::try_from(offset)
            .ok()
            .and_then(|offset| start.checked_add(offset))
        else {
            // dropping the transaction rolls back rows already inserted
            return Ok(false);
        };
        insert_in_tx(
            &mut tx,
            project_id,
            &tp.name,
            &tp.prompt,
            order,
            tp.token_count,
        )
        .await?;
    }

    tx.commit().await?;
    Ok(true)
}
