//! Runtime utilities that abstract over the underlying async executor.
//!
//! Downstream crates use these to run a future to completion from synchronous
//! code (for example a `tracing` layer forwarding to an async log sink) without
//! depending on Tokio themselves.

pub use tokio::runtime::{Builder, Handle, Runtime};

/// Runs the provided future to completion on a throwaway current-thread runtime.
///
/// Must not be called from inside an existing runtime; callers that may be on
/// a runtime thread check [`Handle::try_current`] first and spawn instead.
pub fn block_on<F>(future: F) -> std::io::Result<F::Output>
where
    F: std::future::Future,
{
    let runtime = Builder::new_current_thread().enable_all().build()?;
    Ok(runtime.block_on(future))
}

/// Returns `true` when the calling thread is driven by a runtime.
pub fn in_runtime() -> bool {
    Handle::try_current().is_ok()
}
