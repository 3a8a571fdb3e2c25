//! Serving the router with a bounded graceful shutdown.

use std::future::{Future, IntoFuture};
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// How the server stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOutcome {
    /// Every in-flight request finished before the deadline.
    Drained,
    /// The deadline passed with requests still running; they were abandoned.
    TimedOut,
}

/// Serve `router` until `signal` resolves, then give in-flight requests at
/// most `drain_timeout` to finish.
///
/// Connections still open at the deadline are left to the runtime, which
/// tears them down when the process exits.
pub async fn serve<F>(
    listener: TcpListener,
    router: Router,
    signal: F,
    drain_timeout: Duration,
) -> std::io::Result<ShutdownOutcome>
where
    F: Future<Output = ()> + Send + 'static,
{
    let (signalled_tx, signalled_rx) = oneshot::channel::<()>();
    let shutdown = async move {
        signal.await;
        let _ = signalled_tx.send(());
    };

    let server = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .into_future();
    tokio::pin!(server);

    tokio::select! {
        result = &mut server => return result.map(|()| ShutdownOutcome::Drained),
        Ok(()) = signalled_rx => {}
    }

    tracing::info!(
        timeout_secs = drain_timeout.as_secs_f64(),
        "Graceful shutdown started"
    );

    match tokio::time::timeout(drain_timeout, &mut server).await {
        Ok(result) => result.map(|()| ShutdownOutcome::Drained),
        Err(_) => {
            tracing::warn!(
                timeout_secs = drain_timeout.as_secs_f64(),
                "In-flight requests did not finish before the shutdown deadline"
            );
            Ok(ShutdownOutcome::TimedOut)
        }
    }
}
