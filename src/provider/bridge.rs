//! Sync/async execution bridge
//!
//! Runs an asynchronous operation to completion from a synchronous
//! call site. The future is always driven by a dedicated shared bridge
//! runtime, so its continuations are never pinned to the caller's
//! scheduling context; only the calling thread blocks. This holds both
//! outside any runtime and when the caller is itself a runtime worker,
//! so the classic blocking-on-async deadlock cannot occur.

use std::future::Future;
use std::sync::mpsc;
use std::sync::OnceLock;

use tokio::runtime::{Builder, Handle, Runtime};

/// Shared runtime driving bridged operations
static BRIDGE_RUNTIME: OnceLock<Runtime> = OnceLock::new();

fn bridge_runtime() -> &'static Runtime {
    BRIDGE_RUNTIME.get_or_init(|| {
        Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("quarry-bridge")
            .enable_all()
            .build()
            .expect("failed to create shared bridge runtime")
    })
}

/// Blocks the calling thread until the future completes
///
/// The completed output is returned exactly as the future produced it;
/// a failing operation must carry its failure in its output type, which
/// arrives without any join-layer wrapper.
pub fn run_sync<F>(future: F) -> F::Output
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    if Handle::try_current().is_err() {
        // Not inside a runtime: drive the future directly
        return bridge_runtime().block_on(future);
    }

    // Inside a runtime: nested block_on is forbidden, and parking this
    // thread on its own scheduler would deadlock. Spawn onto the bridge
    // runtime and park only the calling thread on the result channel.
    let (tx, rx) = mpsc::channel();
    bridge_runtime().spawn(async move {
        let _ = tx.send(future.await);
    });
    rx.recv().expect("bridge task terminated without a result")
}
