use std::sync::Arc;
use std::time::Duration;

use tracing::error;

use intus_db::Database;

use crate::error::ApiError;
use crate::responder::Responder;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
    pub token_ttl: chrono::Duration,
    pub responder: Box<dyn Responder>,
    /// Artificial pause before the chat reply is produced.
    pub reply_delay: Duration,
}

impl AppStateInner {
    /// Run a blocking database call off the async runtime.
    pub async fn run_db<F, T>(self: &Arc<Self>, f: F) -> Result<T, ApiError>
    where
        F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let state = Arc::clone(self);
        blocking(move || f(&state.db)).await
    }
}

/// Run CPU-heavy or blocking work (password hashing, SQLite) on the blocking pool.
pub async fn blocking<F, T>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal(anyhow::anyhow!("blocking task failed"))
        })?
        .map_err(ApiError::from)
}
