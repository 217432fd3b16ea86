use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::db;
use crate::error::{AppError, FieldError};
use crate::generation::chunk;
use crate::models::Asset;
use crate::state::SharedState;

use super::projects::require_project;

#[derive(Deserialize)]
pub struct CreateAsset {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

pub async fn list(
    State(state): State<SharedState>,
    Path(project_id): Path<Uuid>,
) -> Result<Json<Vec<Asset>>, AppError> {
    require_project(&state, project_id).await?;
    let assets = db::assets::list_by_project(&state.pool, project_id).await?;
    Ok(Json(assets))
}

pub async fn create(
    State(state): State<SharedState>,
    Path(project_id): Path<Uuid>,
    Json(req): Json<CreateAsset>,
) -> Result<Json<Asset>, AppError> {
    if req.title.trim().is_empty() {
        return Err(AppError::Validation(vec![FieldError::new(
            "title",
            "Title is required",
        )]));
    }
    require_project(&state, project_id).await?;

    let asset = db::assets::create(
        &state.pool,
        project_id,
        req.title.trim(),
        &req.content,
        chunk::token_count(&req.content),
    )
    .await?;
    Ok(Json(asset))
}

pub async fn delete(
    State(state): State<SharedState>,
    Path((project_id, asset_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<serde_json::Value>, AppError> {
    if !db::assets::delete(&state.pool, asset_id, project_id).await? {
        return Err(AppError::NotFound("Asset not found".to_string()));
    }
    Ok(Json(serde_json::json!({ "message": "Asset deleted" })))
}
