use sqlx::PgPool;
use uuid::Uuid;

use crate::db;
use crate::models::{Asset, Project, Prompt};

/// A project with everything a generation run reads from it.
pub struct GenerationContext {
    pub project: Project,
    pub prompts: Vec<Prompt>,
    /// All asset content joined by newlines, shared by every prompt.
    pub context: String,
}

/// `None` when the project does not exist.
pub async fn load(pool: &PgPool, project_id: Uuid) -> Result<Option<GenerationContext>, sqlx::Error> {
    let Some(project) = db::projects::find_by_id(pool, project_id).await? else {
        return Ok(None);
    };

    let assets = db::assets::list_by_project(pool, project_id).await?;
    let prompts = db::prompts::list_by_project(pool, project_id).await?;

    Ok(Some(GenerationContext {
        project,
        prompts,
        context: join_assets(&assets),
    }))
}

pub fn join_assets(assets: &[Asset]) -> String {
    assets
        .iter()
        .map(|asset| asset.content.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}
