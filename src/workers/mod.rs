//! Background execution of filesystem operations.
//!
//! Every mutating or transfer operation is started on a tokio runtime and returns a
//! [`TaskHandle`] straight away. The handle is a future resolving to the operation's
//! `Result`, so completion and failure are observable; dropping it detaches the task, which
//! keeps running and still logs its outcome.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::{FileKitError, Result};

/// Handle to an operation running in the background.
///
/// Await it from async code, or call [`TaskHandle::wait`] from a plain thread.
#[must_use = "dropping a TaskHandle detaches the operation; its result is only logged"]
pub struct TaskHandle<T> {
    operation: &'static str,
    runtime: Handle,
    inner: JoinHandle<Result<T>>,
}

impl<T> TaskHandle<T> {
    /// Name of the operation this handle tracks.
    pub fn operation(&self) -> &'static str {
        self.operation
    }

    pub fn is_finished(&self) -> bool {
        self.inner.is_finished()
    }

    /// Requests cancellation. Network fetches stop at their next await point. Filesystem
    /// work runs on the blocking pool and cannot be interrupted once it has started; only
    /// an operation that has not started yet is prevented from running.
    pub fn abort(&self) {
        debug!(operation = self.operation, "abort requested");
        self.inner.abort();
    }

    /// Blocks the current thread until the operation finishes.
    ///
    /// Must not be called from inside the runtime's async context.
    pub fn wait(self) -> Result<T> {
        let runtime = self.runtime.clone();
        runtime.block_on(self)
    }
}

impl<T> Future for TaskHandle<T> {
    type Output = Result<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        Pin::new(&mut this.inner).poll(cx).map(|joined| match joined {
            Ok(result) => result,
            Err(e) => Err(FileKitError::from(e)),
        })
    }
}

impl<T> fmt::Debug for TaskHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskHandle")
            .field("operation", &self.operation)
            .field("finished", &self.inner.is_finished())
            .finish()
    }
}

/// Runs blocking filesystem work on the runtime's blocking pool.
pub(crate) fn spawn_blocking<T, F>(runtime: &Handle, operation: &'static str, work: F) -> TaskHandle<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    let inner = runtime.spawn_blocking(move || report(operation, work()));
    TaskHandle { operation, runtime: runtime.clone(), inner }
}

/// Runs async work (network transfers) as a regular task.
pub(crate) fn spawn<T, F>(runtime: &Handle, operation: &'static str, work: F) -> TaskHandle<T>
where
    T: Send + 'static,
    F: Future<Output = Result<T>> + Send + 'static,
{
    let inner = runtime.spawn(async move { report(operation, work.await) });
    TaskHandle { operation, runtime: runtime.clone(), inner }
}

/// Logs the outcome so that failures of detached tasks are not lost.
fn report<T>(operation: &'static str, result: Result<T>) -> Result<T> {
    match &result {
        Ok(_) => debug!(operation, "background operation finished"),
        Err(e) => warn!(operation, error = %e, "background operation failed"),
    }
    result
}
