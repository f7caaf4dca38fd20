//! Debug server lifecycle.
//!
//! States:
//! 1. Created - route table built, nothing bound yet
//! 2. Binding - background task is binding the listener
//! 3. Ready / BindFailed - bind outcome known
//! 4. Stopped - listener closed, serve loop finished

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    routing::{any, get},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::profiler::{Profiler, RuntimeProfiler, SharedProfiler};
use crate::sink::{ReconfigurableSink, SharedSink};

use super::handlers::{
    block_profile_rate_handler, log_level_handler, mutex_profile_fraction_handler, pprof_cmdline,
    pprof_index, pprof_index_redirect, pprof_named, pprof_profile, pprof_symbol, pprof_trace,
};

/// Default bound on how long `run` waits for the bind outcome.
pub const DEFAULT_READY_TIMEOUT: Duration = Duration::from_secs(5);

/// Capabilities shared by every handler.
pub struct AdminState {
    pub(crate) sink: SharedSink,
    pub(crate) profiler: SharedProfiler,
}

/// Lifecycle state of a debug server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    Created,
    Binding,
    Ready,
    BindFailed,
    Stopped,
}

/// Debug server builder.
pub struct DebugServer {
    address: String,
    sink: SharedSink,
    profiler: SharedProfiler,
    ready_timeout: Duration,
    state: watch::Sender<ServerState>,
}

impl DebugServer {
    /// Create a server for `address` that reconfigures `sink`.
    pub fn new(address: impl Into<String>, sink: impl ReconfigurableSink) -> Self {
        Self {
            address: address.into(),
            sink: Arc::new(sink),
            profiler: Arc::new(RuntimeProfiler::new()),
            ready_timeout: DEFAULT_READY_TIMEOUT,
            state: watch::Sender::new(ServerState::Created),
        }
    }

    /// Replace the built-in runtime profiler.
    pub fn with_profiler(mut self, profiler: impl Profiler) -> Self {
        self.profiler = Arc::new(profiler);
        self
    }

    /// Bound on how long `run` waits for the listener to bind.
    pub fn with_ready_timeout(mut self, timeout: Duration) -> Self {
        self.ready_timeout = timeout;
        self
    }

    /// Address the server binds on.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Subscribe to lifecycle state changes before `run`.
    ///
    /// Unlike [`ServerHandle::subscribe`] this also sees `Binding` and
    /// `BindFailed`, since no handle exists when the bind fails.
    pub fn subscribe(&self) -> watch::Receiver<ServerState> {
        self.state.subscribe()
    }

    /// Build the route table.
    pub fn router(&self) -> Router {
        let state = Arc::new(AdminState {
            sink: self.sink.clone(),
            profiler: self.profiler.clone(),
        });

        Router::new()
            // Profile dumps
            .route("/debug/pprof", get(pprof_index_redirect))
            .route("/debug/pprof/", get(pprof_index))
            .route("/debug/pprof/cmdline", get(pprof_cmdline))
            .route("/debug/pprof/profile", get(pprof_profile))
            .route("/debug/pprof/symbol", get(pprof_symbol).post(pprof_symbol))
            .route("/debug/pprof/trace", get(pprof_trace))
            .route("/debug/pprof/:name", get(pprof_named))
            // Live controls; methods are checked by the handlers
            .route("/log-level", any(log_level_handler))
            .route("/block-profile-rate", any(block_profile_rate_handler))
            .route("/mutex-profile-fraction", any(mutex_profile_fraction_handler))
            .with_state(state)
    }

    /// Bind and start serving in the background.
    ///
    /// Returns once the listener is accepting connections. A bind failure is
    /// returned as the original `io::Error`, so callers can check
    /// `kind() == io::ErrorKind::AddrInUse`.
    pub async fn run(self) -> io::Result<ServerHandle> {
        let router = self.router();
        let address = self.address;

        let state_tx = self.state;
        let state_rx = state_tx.subscribe();
        let (stop_tx, stop_rx) = watch::channel(false);
        let (ready_tx, ready_rx) = oneshot::channel::<io::Result<SocketAddr>>();

        state_tx.send_replace(ServerState::Binding);

        let mut task = tokio::spawn(async move {
            let listener = match TcpListener::bind(address.as_str()).await {
                Ok(bound) => bound,
                Err(e) => {
                    warn!(address = %address, error = %e, "debug server bind failed");
                    state_tx.send_replace(ServerState::BindFailed);
                    let _ = ready_tx.send(Err(e));
                    return Ok(());
                }
            };

            let local_addr = listener.local_addr()?;
            state_tx.send_replace(ServerState::Ready);
            let _ = ready_tx.send(Ok(local_addr));

            let result = serve_router(listener, router, wait_for_stop(stop_rx)).await;
            state_tx.send_replace(ServerState::Stopped);
            result
        });

        let local_addr = await_ready(ready_rx, self.ready_timeout, &mut task).await?;
        Ok(ServerHandle {
            local_addr,
            state: state_rx,
            stop: stop_tx,
            task,
        })
    }

    /// Serve on an already-bound listener until `shutdown` resolves.
    ///
    /// For supervisors that bind and signal readiness themselves.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let router = self.router();
        serve_router(listener, router, shutdown).await
    }
}

/// Handle to a running debug server.
///
/// Dropping the handle does not stop the server; call [`ServerHandle::stop`].
pub struct ServerHandle {
    local_addr: SocketAddr,
    state: watch::Receiver<ServerState>,
    stop: watch::Sender<bool>,
    task: JoinHandle<io::Result<()>>,
}

impl ServerHandle {
    /// Address the listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ServerState {
        *self.state.borrow()
    }

    /// Subscribe to lifecycle state changes.
    pub fn subscribe(&self) -> watch::Receiver<ServerState> {
        self.state.clone()
    }

    /// Stop accepting connections. In-flight requests complete.
    pub fn stop(&self) {
        self.stop.send_replace(true);
    }

    /// Wait for the serve loop to finish.
    pub async fn wait(self) -> io::Result<()> {
        match self.task.await {
            Ok(result) => result,
            Err(e) => Err(io::Error::other(e)),
        }
    }

    /// Stop and wait.
    pub async fn shutdown(self) -> io::Result<()> {
        self.stop();
        self.wait().await
    }
}

/// Bind and start serving `sink` controls on `address`.
pub async fn run(address: &str, sink: impl ReconfigurableSink) -> io::Result<ServerHandle> {
    DebugServer::new(address, sink).run().await
}

/// Wait at most `timeout` for the serve task to report its bind outcome.
///
/// On expiry the task is aborted and `TimedOut` is returned.
async fn await_ready(
    ready: oneshot::Receiver<io::Result<SocketAddr>>,
    timeout: Duration,
    task: &mut JoinHandle<io::Result<()>>,
) -> io::Result<SocketAddr> {
    match tokio::time::timeout(timeout, ready).await {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(_)) => match task.await {
            Ok(Err(e)) => Err(e),
            Ok(Ok(())) => Err(io::Error::other("debug server exited before binding")),
            Err(e) => Err(io::Error::other(e)),
        },
        Err(_) => {
            task.abort();
            Err(io::Error::new(
                io::ErrorKind::TimedOut,
                format!("debug server not ready after {}ms", timeout.as_millis()),
            ))
        }
    }
}

async fn serve_router<F>(listener: TcpListener, router: Router, shutdown: F) -> io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let address = listener.local_addr()?;
    info!(address = %address, "debug server listening");
    metrics::counter!("debugserver.server.starts").increment(1);

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            shutdown.await;
            info!(address = %address, "debug server shutting down");
        })
        .await?;

    info!(address = %address, "debug server stopped");
    Ok(())
}

async fn wait_for_stop(mut stop: watch::Receiver<bool>) {
    while !*stop.borrow_and_update() {
        if stop.changed().await.is_err() {
            // Handle dropped without stopping: keep serving.
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::LevelSink;

    #[tokio::test]
    async fn test_run_on_ephemeral_port() {
        let handle = DebugServer::new("127.0.0.1:0", LevelSink::silent(Vec::new()))
            .run()
            .await
            .unwrap();

        assert_ne!(handle.local_addr().port(), 0);
        assert_eq!(handle.state(), ServerState::Ready);

        let mut states = handle.subscribe();
        handle.stop();
        // idempotent
        handle.stop();

        while *states.borrow_and_update() != ServerState::Stopped {
            states.changed().await.unwrap();
        }
        handle.wait().await.unwrap();
    }

    #[tokio::test]
    async fn test_bind_failure_is_unwrapped() {
        let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let address = taken.local_addr().unwrap().to_string();

        let err = run(&address, LevelSink::silent(Vec::new()))
            .await
            .err()
            .unwrap();
        assert_eq!(err.kind(), io::ErrorKind::AddrInUse);
    }

    #[tokio::test]
    async fn test_bind_failure_is_observable_before_run() {
        let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let address = taken.local_addr().unwrap().to_string();

        let server = DebugServer::new(address, LevelSink::silent(Vec::new()));
        let states = server.subscribe();
        assert_eq!(*states.borrow(), ServerState::Created);

        assert!(server.run().await.is_err());
        assert_eq!(*states.borrow(), ServerState::BindFailed);
    }

    #[tokio::test]
    async fn test_ready_wait_times_out_and_aborts() {
        let (_ready_tx, ready_rx) = oneshot::channel();
        let mut task = tokio::spawn(std::future::pending::<io::Result<()>>());

        let err = await_ready(ready_rx, Duration::from_millis(50), &mut task)
            .await
            .err()
            .unwrap();
        assert_eq!(err.kind(), io::ErrorKind::TimedOut);

        let join = task.await.err().unwrap();
        assert!(join.is_cancelled());
    }

    #[tokio::test]
    async fn test_ready_wait_returns_bind_error() {
        let (ready_tx, ready_rx) = oneshot::channel();
        let mut task = tokio::spawn(async { Ok(()) });

        ready_tx
            .send(Err(io::Error::from(io::ErrorKind::AddrInUse)))
            .unwrap();
        let err = await_ready(ready_rx, DEFAULT_READY_TIMEOUT, &mut task)
            .await
            .err()
            .unwrap();
        assert_eq!(err.kind(), io::ErrorKind::AddrInUse);
    }

    #[tokio::test]
    async fn test_invalid_address() {
        let err = run("not an address", LevelSink::silent(Vec::new()))
            .await
            .err()
            .unwrap();
        assert_ne!(err.kind(), io::ErrorKind::TimedOut);
    }
}
