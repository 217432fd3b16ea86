pub mod assets;
pub mod generated_content;
pub mod projects;
pub mod prompts;
pub mod templates;

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::state::SharedState;

pub fn api_routes() -> Router<SharedState> {
    Router::new()
        // Projects
        .route("/api/v1/projects", get(projects::list).post(projects::create))
        .route(
            "/api/v1/projects/{id}",
            get(projects::get)
                .put(projects::update)
                .delete(projects::delete),
        )
        // Assets
        .route(
            "/api/v1/projects/{id}/assets",
            get(assets::list).post(assets::create),
        )
        .route(
            "/api/v1/projects/{id}/assets/{asset_id}",
            delete(assets::delete),
        )
        // Prompts
        .route(
            "/api/v1/projects/{id}/prompts",
            get(prompts::list).post(prompts::create),
        )
        .route(
            "/api/v1/projects/{id}/prompts/{prompt_id}",
            put(prompts::update).delete(prompts::delete),
        )
        .route(
            "/api/v1/projects/{id}/import-template",
            post(prompts::import_template),
        )
        // Generated content
        .route(
            "/api/v1/projects/{id}/generated-content",
            get(generated_content::list)
                .post(generated_content::generate)
                .delete(generated_content::delete)
                .patch(generated_content::update),
        )
        .route(
            "/api/v1/projects/{id}/generated-content/status",
            get(generated_content::status),
        )
        // Templates
        .route("/api/v1/templates", get(templates::list).post(templates::create))
        .route(
            "/api/v1/templates/{id}",
            get(templates::get).delete(templates::delete),
        )
        .route(
            "/api/v1/templates/{id}/prompts",
            get(templates::list_prompts).post(templates::create_prompt),
        )
}
