use log::debug;
use tokio::runtime::Runtime;
use tokio::sync::OnceCell;

use crate::error::StoreError;

static GLOBAL_RUNTIME: OnceCell<Runtime> = OnceCell::const_new();

pub async fn init_global_runtime() -> Result<&'static Runtime, StoreError> {
    GLOBAL_RUNTIME
        .get_or_try_init(async || {
            let threads = std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(2);
            let threads = std::cmp::max(threads, 2);
            debug!("Initializing global runtime with {} threads", threads);
            tokio::runtime::Builder::new_multi_thread()
                .worker_threads(threads)
                .enable_all()
                .build()
                .map_err(|e| StoreError::StorageUnavailable(format!("tokio runtime: {e}")))
        })
        .await
}

/// Runs a blocking store call on the shared runtime's blocking pool so the
/// caller's thread (typically the UI thread of the host app) never waits on SQLite.
pub async fn run_blocking<T, F>(f: F) -> Result<T, StoreError>
where
    F: FnOnce() -> Result<T, StoreError> + Send + 'static,
    T: Send + 'static,
{
    let runtime = init_global_runtime().await?;
    runtime
        .spawn_blocking(f)
        .await
        .map_err(|e| StoreError::StorageUnavailable(format!("blocking task failed: {e}")))?
}
