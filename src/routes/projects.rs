use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::db;
use crate::error::{AppError, FieldError};
use crate::models::Project;
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct ListQuery {
    pub owner_id: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateProject {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub owner_id: String,
}

#[derive(Deserialize)]
pub struct UpdateProject {
    #[serde(default)]
    pub title: String,
}

pub async fn list(
    State(state): State<SharedState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Project>>, AppError> {
    let projects = db::projects::list(&state.pool, query.owner_id.as_deref()).await?;
    Ok(Json(projects))
}

pub async fn create(
    State(state): State<SharedState>,
    Json(req): Json<CreateProject>,
) -> Result<Json<Project>, AppError> {
    let mut errors = Vec::new();
    validate_title(&req.title, &mut errors);
    if req.owner_id.trim().is_empty() {
        errors.push(FieldError::new("owner_id", "Owner is required"));
    }
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let project = db::projects::create(&state.pool, req.title.trim(), req.owner_id.trim()).await?;
    tracing::info!("Project {} created", project.id);
    Ok(Json(project))
}

pub async fn get(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Project>, AppError> {
    Ok(Json(require_project(&state, id).await?))
}

pub async fn update(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateProject>,
) -> Result<Json<Project>, AppError> {
    let mut errors = Vec::new();
    validate_title(&req.title, &mut errors);
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let project = db::projects::update(&state.pool, id, req.title.trim())
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => AppError::NotFound("Project not found".to_string()),
            _ => AppError::Database(e),
        })?;
    Ok(Json(project))
}

pub async fn delete(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    if !db::projects::delete(&state.pool, id).await? {
        return Err(AppError::NotFound("Project not found".to_string()));
    }
    tracing::info!("Project {id} deleted");
    Ok(Json(serde_json::json!({ "message": "Project deleted" })))
}

/// Load a project or fail with 404. Used by every project-scoped route.
pub(crate) async fn require_project(state: &SharedState, id: Uuid) -> Result<Project, AppError> {
    db::projects::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Project not found".to_string()))
}

fn validate_title(title: &str, errors: &mut Vec<FieldError>) {
    let len = title.trim().chars().count();
    if len == 0 || len > 255 {
        errors.push(FieldError::new(
            "title",
            "Title must be between 1 and 255 characters",
        ));
    }
}
