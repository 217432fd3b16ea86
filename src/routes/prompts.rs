use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::db;
use crate::error::{AppError, FieldError};
use crate::generation::chunk;
use crate::models::Prompt;
use crate::state::SharedState;

use super::projects::require_project;

fn default_name() -> String {
    "New Prompt".to_string()
}

#[derive(Deserialize)]
pub struct CreatePrompt {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub order: i32,
}

#[derive(Deserialize)]
pub struct UpdatePrompt {
    pub name: String,
    pub prompt: String,
    pub order: i32,
}

#[derive(Deserialize)]
pub struct ImportTemplate {
    pub template_id: Uuid,
}

pub async fn list(
    State(state): State<SharedState>,
    Path(project_id): Path<Uuid>,
) -> Result<Json<Vec<Prompt>>, AppError> {
    require_project(&state, project_id).await?;
    let prompts = db::prompts::list_by_project(&state.pool, project_id).await?;
    Ok(Json(prompts))
}

pub async fn create(
    State(state): State<SharedState>,
    Path(project_id): Path<Uuid>,
    Json(req): Json<CreatePrompt>,
) -> Result<(StatusCode, Json<Prompt>), AppError> {
    validate_prompt(&req.name, req.order)?;
    require_project(&state, project_id).await?;

    let prompt = db::prompts::create(
        &state.pool,
        project_id,
        req.name.trim(),
        &req.prompt,
        req.order,
        chunk::token_count(&req.prompt),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(prompt)))
}

pub async fn update(
    State(state): State<SharedState>,
    Path((project_id, prompt_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<UpdatePrompt>,
) -> Result<Json<Prompt>, AppError> {
    validate_prompt(&req.name, req.order)?;

    let prompt = db::prompts::update(
        &state.pool,
        prompt_id,
        project_id,
        req.name.trim(),
        &req.prompt,
        req.order,
        chunk::token_count(&req.prompt),
    )
    .await?
    .ok_or_else(|| AppError::NotFound("Prompt not found".to_string()))?;
    Ok(Json(prompt))
}

pub async fn delete(
    State(state): State<SharedState>,
    Path((project_id, prompt_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<serde_json::Value>, AppError> {
    if !db::prompts::delete(&state.pool, prompt_id, project_id).await? {
        return Err(AppError::NotFound("Prompt not found".to_string()));
    }
    Ok(Json(serde_json::json!({ "message": "Prompt deleted" })))
}

/// Append a template's prompts to the project and return the full prompt list.
pub async fn import_template(
    State(state): State<SharedState>,
    Path(project_id): Path<Uuid>,
    Json(req): Json<ImportTemplate>,
) -> Result<Json<Vec<Prompt>>, AppError> {
    require_project(&state, project_id).await?;

    db::templates::find_by_id(&state.pool, req.template_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Template not found".to_string()))?;

    let template_prompts = db::templates::list_prompts(&state.pool, req.template_id).await?;
    if template_prompts.is_empty() {
        return Err(AppError::NotFound("Template has no prompts".to_string()));
    }

    if !db::prompts::append_from_template(&state.pool, project_id, &template_prompts).await? {
        return Err(AppError::Validation(vec![FieldError::new(
            "order",
            "Existing prompt order is too large to append template prompts",
        )]));
    }
    tracing::info!(
        "Imported {} prompts from template {} into project {project_id}",
        template_prompts.len(),
        req.template_id
    );

    let prompts = db::prompts::list_by_project(&state.pool, project_id).await?;
    Ok(Json(prompts))
}

pub(crate) fn validate_prompt(name: &str, order: i32) -> Result<(), AppError> {
    let mut errors = Vec::new();
    if name.trim().is_empty() {
        errors.push(FieldError::new("name", "Name is required"));
    }
    if order < 0 {
        errors.push(FieldError::new("order", "Order must not be negative"));
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}
