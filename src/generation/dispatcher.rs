use std::time::Duration;

use futures_util::future::try_join_all;

use crate::models::Prompt;

use super::invoker::{FallbackInvoker, Generation, InvokeError};

#[derive(Debug)]
pub enum DispatchError {
    Invoke { prompt: String, error: InvokeError },
    TimedOut(Duration),
}

impl std::fmt::Display for DispatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DispatchError::Invoke { prompt, error } => {
                write!(f, "prompt '{prompt}' failed: {error}")
            }
            DispatchError::TimedOut(limit) => {
                write!(f, "generation timed out after {}s", limit.as_secs())
            }
        }
    }
}

/// Run the invoker for every prompt at once and wait for all of them.
///
/// Results come back in the same order as `prompts`. The first failure
/// resolves the whole dispatch and drops the invocations still in flight.
pub async fn dispatch(
    invoker: &FallbackInvoker,
    prompts: &[Prompt],
    context: &str,
    limit: Duration,
) -> Result<Vec<Generation>, DispatchError> {
    let tasks = prompts.iter().map(|prompt| async move {
        invoker
            .invoke(&prompt.prompt, context)
            .await
            .map_err(|error| DispatchError::Invoke {
                prompt: prompt.name.clone(),
                error,
            })
    });

    match tokio::time::timeout(limit, try_join_all(tasks)).await {
        Ok(result) => result,
        Err(_) => Err(DispatchError::TimedOut(limit)),
    }
}
