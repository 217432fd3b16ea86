use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::db;
use crate::error::{AppError, FieldError};
use crate::generation::chunk;
use crate::models::{Template, TemplatePrompt};
use crate::state::SharedState;

use super::prompts::validate_prompt;

#[derive(Deserialize)]
pub struct ListQuery {
    pub owner_id: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateTemplate {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub owner_id: String,
}

#[derive(Deserialize)]
pub struct CreateTemplatePrompt {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub prompt: String,
    pub order: i32,
}

pub async fn list(
    State(state): State<SharedState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Template>>, AppError> {
    let templates = db::templates::list(&state.pool, query.owner_id.as_deref()).await?;
    Ok(Json(templates))
}

pub async fn create(
    State(state): State<SharedState>,
    Json(req): Json<CreateTemplate>,
) -> Result<Json<Template>, AppError> {
    let mut errors = Vec::new();
    if req.name.trim().is_empty() {
        errors.push(FieldError::new("name", "Name is required"));
    }
    if req.owner_id.trim().is_empty() {
        errors.push(FieldError::new("owner_id", "Owner is required"));
    }
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let template = db::templates::create(&state.pool, req.name.trim(), req.owner_id.trim()).await?;
    Ok(Json(template))
}

pub async fn get(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Template>, AppError> {
    Ok(Json(require_template(&state, id).await?))
}

pub async fn delete(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    if !db::templates::delete(&state.pool, id).await? {
        return Err(AppError::NotFound("Template not found".to_string()));
    }
    Ok(Json(serde_json::json!({ "message": "Template deleted" })))
}

pub async fn list_prompts(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<TemplatePrompt>>, AppError> {
    require_template(&state, id).await?;
    let prompts = db::templates::list_prompts(&state.pool, id).await?;
    Ok(Json(prompts))
}

pub async fn create_prompt(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(req): Json<CreateTemplatePrompt>,
) -> Result<Json<TemplatePrompt>, AppError> {
    validate_prompt(&req.name, req.order)?;
    require_template(&state, id).await?;

    let prompt = db::templates::create_prompt(
        &state.pool,
        id,
        req.name.trim(),
        &req.prompt,
        req.order,
        chunk::token_count(&req.prompt),
    )
    .await?;
    Ok(Json(prompt))
}

async fn require_template(state: &SharedState, id: Uuid) -> Result<Template, AppError> {
    db::templates::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Template not found".to_string()))
}
