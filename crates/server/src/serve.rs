//! Accept loop for the app.
//!
//! `axum::serve` has no connection level timeouts, so connections are driven
//! by hyper directly. A connection that sends no request headers within the
//! idle timeout is closed, both on first connect and between keep-alive
//! requests.

use std::{future::Future, io, time::Duration};

use axum::{extract::Request, Router};
use hyper::body::Incoming;
use hyper_util::{
    rt::{TokioExecutor, TokioIo, TokioTimer},
    server::conn::auto::Builder,
};
use tokio::{net::TcpListener, sync::watch};
use tower::Service;
use tracing::{debug, trace, warn};

pub async fn serve<F>(
    listener: TcpListener,
    app: Router,
    idle_timeout: Duration,
    shutdown: F,
) -> io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    // Dropping the receiver tells every connection to finish up
    let (signal_tx, signal_rx) = watch::channel(());
    tokio::spawn(async move {
        shutdown.await;
        drop(signal_rx);
    });

    // Each connection task holds a receiver. The sender closes when the last one is gone
    let (close_tx, close_rx) = watch::channel(());

    loop {
        let (stream, remote_addr) = tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok(accepted) => accepted,
                Err(err) => {
                    // Usually running out of file descriptors. Back off instead of spinning
                    warn!(%err, "Failed to accept connection");
                    tokio::time::sleep(Duration::from_secs(1)).await;
                    continue;
                }
            },
            _ = signal_tx.closed() => {
                debug!("Stopped accepting connections");
                break;
            }
        };
        trace!(%remote_addr, "Accepted connection");

        let app = app.clone();
        let signal_tx = signal_tx.clone();
        let close_rx = close_rx.clone();

        tokio::spawn(async move {
            let service = hyper::service::service_fn(move |request: Request<Incoming>| {
                app.clone().call(request)
            });

            let mut builder = Builder::new(TokioExecutor::new());
            builder
                .http1()
                .timer(TokioTimer::new())
                .header_read_timeout(idle_timeout);

            let conn = builder.serve_connection_with_upgrades(TokioIo::new(stream), service);
            tokio::pin!(conn);

            let mut shutting_down = false;
            loop {
                tokio::select! {
                    result = conn.as_mut() => {
                        if let Err(err) = result {
                            trace!(%remote_addr, %err, "Connection closed with error");
                        }
                        break;
                    }
                    _ = signal_tx.closed(), if !shutting_down => {
                        shutting_down = true;
                        conn.as_mut().graceful_shutdown();
                    }
                }
            }

            drop(close_rx);
        });
    }

    drop(close_rx);
    drop(listener);

    debug!(connections = close_tx.receiver_count(), "Waiting for open connections");
    close_tx.closed().await;

    Ok(())
}
