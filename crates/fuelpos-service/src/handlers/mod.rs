//! API handlers.

pub mod fuel;
pub mod health;
pub mod sales;

use crate::error::ApiError;

/// Run storage work on the blocking pool.
///
/// Row lock waits park the calling thread, so they must stay off the async
/// workers.
pub(crate) async fn blocking<T, F>(work: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work).await?
}
