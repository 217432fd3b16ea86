use axum::extract::{Path, State};
use axum::Json;
use serde_json::Value;
use uuid::Uuid;

use crate::db;
use crate::error::{AppError, FieldError};
use crate::generation::pipeline;
use crate::models::{GeneratedContent, GenerationRun};
use crate::state::SharedState;

use super::projects::require_project;

pub async fn list(
    State(state): State<SharedState>,
    Path(project_id): Path<Uuid>,
) -> Result<Json<Vec<GeneratedContent>>, AppError> {
    require_project(&state, project_id).await?;
    let rows = db::generated_content::list_by_project(&state.pool, project_id).await?;
    Ok(Json(rows))
}

pub async fn generate(
    State(state): State<SharedState>,
    Path(project_id): Path<Uuid>,
) -> Result<Json<Vec<GeneratedContent>>, AppError> {
    let rows = pipeline::run(&state, project_id).await?;
    Ok(Json(rows))
}

pub async fn delete(
    State(state): State<SharedState>,
    Path(project_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    require_project(&state, project_id).await?;
    let deleted = db::generated_content::delete_by_project(&state.pool, project_id).await?;
    tracing::info!("Deleted {deleted} generated rows for project {project_id}");
    Ok(Json(serde_json::json!({
        "message": "Generated content deleted",
        "deleted": deleted,
    })))
}

pub async fn update(
    State(state): State<SharedState>,
    Path(project_id): Path<Uuid>,
    Json(body): Json<Value>,
) -> Result<Json<GeneratedContent>, AppError> {
    let (id, result) = parse_update(&body)?;

    let row = db::generated_content::update_result(&state.pool, id, project_id, &result)
        .await?
        .ok_or_else(|| AppError::NotFound("Generated content not found".to_string()))?;
    Ok(Json(row))
}

pub async fn status(
    State(state): State<SharedState>,
    Path(project_id): Path<Uuid>,
) -> Result<Json<GenerationRun>, AppError> {
    require_project(&state, project_id).await?;
    let run = db::generation_runs::find(&state.pool, project_id)
        .await?
        .unwrap_or_else(|| GenerationRun::idle(project_id));
    Ok(Json(run))
}

/// Validate a `{ "id": uuid, "result": non-empty string }` payload, reporting
/// every bad field at once.
fn parse_update(body: &Value) -> Result<(Uuid, String), AppError> {
    let mut errors = Vec::new();

    let id = match body.get("id") {
        Some(Value::String(s)) => match Uuid::parse_str(s) {
            Ok(id) => Some(id),
            Err(_) => {
                errors.push(FieldError::new("id", "Id must be a valid UUID"));
                None
            }
        },
        Some(_) => {
            errors.push(FieldError::new("id", "Id must be a string"));
            None
        }
        None => {
            errors.push(FieldError::new("id", "Id is required"));
            None
        }
    };

    let result = match body.get("result") {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::String(_)) | None | Some(Value::Null) => {
            errors.push(FieldError::new("result", "Result is required"));
            None
        }
        Some(_) => {
            errors.push(FieldError::new("result", "Result must be a string"));
            None
        }
    };

    match (id, result) {
        (Some(id), Some(result)) => Ok((id, result)),
        _ => Err(AppError::Validation(errors)),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn fields(err: AppError) -> Vec<String> {
        match err {
            AppError::Validation(errors) => errors.into_iter().map(|e| e.field).collect(),
            other => panic!("expected validation error, got {other}"),
        }
    }

    #[test]
    fn accepts_well_formed_payload() {
        let id = Uuid::now_v7();
        let (parsed, result) =
            parse_update(&json!({ "id": id.to_string(), "result": "edited" })).unwrap();
        assert_eq!(parsed, id);
        assert_eq!(result, "edited");
    }

    #[test]
    fn empty_result_is_rejected() {
        let err = parse_update(&json!({ "id": Uuid::now_v7().to_string(), "result": "" }))
            .unwrap_err();
        assert_eq!(fields(err), vec!["result"]);
    }

    #[test]
    fn reports_every_bad_field() {
        let err = parse_update(&json!({ "id": 42, "result": 7 })).unwrap_err();
        assert_eq!(fields(err), vec!["id", "result"]);

        let err = parse_update(&json!({})).unwrap_err();
        assert_eq!(fields(err), vec!["id", "result"]);
    }

    #[test]
    fn malformed_uuid_is_rejected() {
        let err = parse_update(&json!({ "id": "not-a-uuid", "result": "x" })).unwrap_err();
        assert_eq!(fields(err), vec!["id"]);
    }
}
