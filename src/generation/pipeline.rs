use uuid::Uuid;

use crate::db;
use crate::db::generated_content::NewContent;
use crate::error::AppError;
use crate::models::GeneratedContent;
use crate::state::SharedState;

use super::context;
use super::dispatcher::{self, DispatchError};

/// Extra time on top of the run timeout before a `running` row counts as abandoned.
const STALE_RUN_GRACE_SECS: i64 = 30;

/// Run a full generation for a project and replace its generated content.
///
/// All-or-nothing: rows are written only after every prompt has produced
/// text, in one transaction. On any failure the project's previous rows are
/// left as they were and the run is marked failed.
pub async fn run(state: &SharedState, project_id: Uuid) -> Result<Vec<GeneratedContent>, AppError> {
    let cfg = &state.config.generation;

    let ctx = context::load(&state.pool, project_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Project not found".to_string()))?;

    if let Err(retry_after) =
        state
            .generation_limiter
            .check(project_id, cfg.rate_limit, cfg.rate_limit_window_secs)
    {
        return Err(AppError::RateLimited(format!(
            "Too many generation runs. Retry after {retry_after}s"
        )));
    }

    let prompt_count = i32::try_from(ctx.prompts.len()).unwrap_or(i32::MAX);
    let stale_after = cfg.run_timeout.as_secs() as i64 + STALE_RUN_GRACE_SECS;
    let started = db::generation_runs::begin(&state.pool, project_id, prompt_count, stale_after)
        .await
        .inspect_err(|_| state.generation_limiter.release(project_id))?;
    if started.is_none() {
        // a refused run does not count against the project's budget
        state.generation_limiter.release(project_id);
        return Err(AppError::Conflict(
            "A generation run is already in progress for this project".to_string(),
        ));
    }

    tracing::info!(
        "Generating content for project {} ({} prompts, {} context tokens)",
        ctx.project.id,
        ctx.prompts.len(),
        super::chunk::estimate_tokens(&ctx.context)
    );

    let generations =
        match dispatcher::dispatch(&state.invoker, &ctx.prompts, &ctx.context, cfg.run_timeout)
            .await
        {
            Ok(generations) => generations,
            Err(e) => {
                mark_failed(state, project_id, &failure_summary(&e)).await;
                return Err(AppError::Internal(format!(
                    "Generation failed for project {project_id}: {e}"
                )));
            }
        };

    let rows: Vec<NewContent> = ctx
        .prompts
        .iter()
        .zip(generations)
        .map(|(prompt, generation)| NewContent {
            name: prompt.name.clone(),
            result: generation.text,
            order: prompt.order,
            model: generation.model,
        })
        .collect();

    let inserted = match db::generated_content::replace_for_project(&state.pool, project_id, &rows)
        .await
    {
        Ok(inserted) => inserted,
        Err(e) => {
            mark_failed(state, project_id, "Failed to store generated content").await;
            return Err(AppError::Database(e));
        }
    };

    if let Err(e) = db::generation_runs::complete(&state.pool, project_id).await {
        tracing::error!("Failed to mark generation run completed for project {project_id}: {e}");
    }

    tracing::info!(
        "Generated {} rows for project {project_id}",
        inserted.len()
    );

    Ok(inserted)
}

/// What the run status reports. Provider detail stays in the logs.
fn failure_summary(err: &DispatchError) -> String {
    match err {
        DispatchError::Invoke { prompt, .. } => format!("Failed to generate content for prompt '{prompt}'"),
        DispatchError::TimedOut(limit) => {
            format!("Generation timed out after {}s", limit.as_secs())
        }
    }
}

async fn mark_failed(state: &SharedState, project_id: Uuid, error: &str) {
    if let Err(e) = db::generation_runs::fail(&state.pool, project_id, error).await {
        tracing::error!("Failed to mark generation run failed for project {project_id}: {e}");
    }
}
