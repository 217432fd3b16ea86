use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{GenerationRun, RunStatus};

pub async fn find(pool: &PgPool, project_id: Uuid) -> Result<Option<GenerationRun>, sqlx::Error> {
    sqlx::query_as::<_, GenerationRun>("SELECT * FROM generation_runs WHERE project_id = $1")
        .bind(project_id)
        .fetch_optional(pool)
        .await
}

/// Atomically move a project's run to `running`.
///
/// Returns `None` when another run is still `running` and was started less
/// than `stale_after_secs` ago. An older `running` row belongs to a process
/// that died mid-run and is taken over.
pub async fn begin(
    pool: &PgPool,
    project_id: Uuid,
    prompt_count: i32,
    stale_after_secs: i64,
) -> Result<Option<GenerationRun>, sqlx::Error> {
    sqlx::query_as::<_, GenerationRun>(
        "INSERT INTO generation_runs (project_id, status, prompt_count, error, started_at, finished_at, updated_at)
         VALUES ($1, $4, $2, NULL, now(), NULL, now())
         ON CONFLICT (project_id) DO UPDATE
         SET status = $4, prompt_count = EXCLUDED.prompt_count, error = NULL,
             started_at = now(), finished_at = NULL, updated_at = now()
         WHERE generation_runs.status <> $4
            OR generation_runs.started_at IS NULL
            OR generation_runs.started_at < now() - make_interval(secs => $3)
         RETURNING *",
    )
    .bind(project_id)
    .bind(prompt_count)
    .bind(stale_after_secs as f64)
    .bind(RunStatus::Running.as_str())
    .fetch_optional(pool)
    .await
}

pub async fn complete(pool: &PgPool, project_id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE generation_runs
         SET status = $2, error = NULL, finished_at = now(), updated_at = now()
         WHERE project_id = $1",
    )
    .bind(project_id)
    .bind(RunStatus::Completed.as_str())
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn fail(pool: &PgPool, project_id: Uuid, error: &str) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE generation_runs
         SET status = $2, error = $3, finished_at = now(), updated_at = now()
         WHERE project_id = $1",
    )
    .bind(project_id)
    .bind(RunStatus::Failed.as_str())
    .bind(error)
    .execute(pool)
    .await?;
    Ok(())
}
