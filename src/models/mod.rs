pub mod asset;
pub mod generated_content;
pub mod generation_run;
pub mod project;
pub mod prompt;
pub mod template;

pub use asset::Asset;
pub use generated_content::GeneratedContent;
pub use generation_run::{GenerationRun, RunStatus};
pub use project::Project;
pub use prompt::Prompt;
pub use template::{Template, TemplatePrompt};
