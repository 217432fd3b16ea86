pub mod assets;
pub mod generated_content;
pub mod generation_runs;
pub mod projects;
pub mod prompts;
pub mod templates;
