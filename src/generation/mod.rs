//! Per-project content generation: load the project's prompts and asset
//! context, generate text for every prompt concurrently with model fallback,
//! and store the results as one replacement set.

pub mod chunk;
pub mod context;
pub mod dispatcher;
pub mod invoker;
pub mod pipeline;
pub mod provider;

pub use invoker::{FallbackInvoker, Generation, InvokeError};
pub use provider::{OpenAiGenerator, ProviderError, TextGenerator};
