// Blocking network calls run on tokio's blocking pool so the cooperative
// loop keeps animating the loading indicator while a request is in flight.

use crate::error::PocketError;
use tokio::runtime::{Builder, Runtime};

/// Upper bound on concurrently running blocking calls.
pub const WORKER_THREADS: usize = 2;

/// Single-threaded scheduler whose blocking pool is the worker pool.
pub fn runtime() -> std::io::Result<Runtime> {
    Builder::new_current_thread()
        .enable_time()
        .max_blocking_threads(WORKER_THREADS)
        .thread_name("pocket-worker")
        .build()
}

/// Run `job` on a worker thread and wait for it without blocking the loop.
pub async fn offload<F, R>(job: F) -> Result<R, PocketError>
where
    F: FnOnce() -> Result<R, PocketError> + Send + 'static,
    R: Send + 'static,
{
    tokio::task::spawn_blocking(job)
        .await
        .map_err(|e| PocketError::Worker(e.to_string()))?
}
