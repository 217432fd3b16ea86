use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::generation::FallbackInvoker;
use crate::rate_limit::GenerationRateLimiter;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
    pub invoker: FallbackInvoker,
    pub generation_limiter: GenerationRateLimiter,
}
