use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Template, TemplatePrompt};

pub async fn list(pool: &PgPool, owner_id: Option<&str>) -> Result<Vec<Template>, sqlx::Error> {
    match owner_id {
        Some(owner_id) => {
            sqlx::query_as::<_, Template>(
                "SELECT * FROM templates WHERE owner_id = $1 ORDER BY created_at DESC",
            )
            .bind(owner_id)
            .fetch_all(pool)
            .await
        }
        None => {
            sqlx::query_as::<_, Template>("SELECT * FROM templates ORDER BY created_at DESC")
                .fetch_all(pool)
                .await
        }
    }
}

pub async fn create(pool: &PgPool, name: &str, owner_id: &str) -> Result<Template, sqlx::Error> {
    sqlx::query_as::<_, Template>(
        "INSERT INTO templates (id, name, owner_id) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(name)
    .bind(owner_id)
    .fetch_one(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Template>, sqlx::Error> {
    sqlx::query_as::<_, Template>("SELECT * FROM templates WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM templates WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn list_prompts(
    pool: &PgPool,
    template_id: Uuid,
) -> Result<Vec<TemplatePrompt>, sqlx::Error> {
    sqlx::query_as::<_, TemplatePrompt>(
        "SELECT * FROM template_prompts WHERE template_id = $1
         ORDER BY sort_order ASC, created_at ASC",
    )
    .bind(template_id)
    .fetch_all(pool)
    .await
}

pub async fn create_prompt(
    pool: &PgPool,
    template_id: Uuid,
    name: &str,
    prompt: &str,
    order: i32,
    token_count: i32,
) -> Result<TemplatePrompt, sqlx::Error> {
    sqlx::query_as::<_, TemplatePrompt>(
        "INSERT INTO template_prompts (id, template_id, name, prompt, sort_order, token_count)
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(template_id)
    .bind(name)
    .bind(prompt)
    .bind(order)
    .bind(token_count)
    .fetch_one(pool)
    .await
}
