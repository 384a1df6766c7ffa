// Connection handling module
// Applies the connection limit, then serves one TCP connection on its own task

use std::cmp::max;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::{TokioIo, TokioTimer};
use tokio::net::TcpStream;

use crate::config::AppState;
use crate::handler;
use crate::logger;

/// Accept a connection unless `performance.max_connections` is reached
pub fn accept_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    state: &Arc<AppState>,
    conn_counter: &Arc<AtomicUsize>,
) {
    // Increment first, then check, so concurrent accepts cannot overshoot
    let prev_count = conn_counter.fetch_add(1, Ordering::SeqCst);

    if let Some(max_conn) = state.config.performance.max_connections {
        if prev_count >= usize::try_from(max_conn).unwrap_or(usize::MAX) {
            conn_counter.fetch_sub(1, Ordering::SeqCst);
            logger::log_connection_limit(&peer_addr, max_conn);
            drop(stream);
            return;
        }
    }

    tracing::trace!(%peer_addr, "connection accepted");
    disable_nagle(&stream);
    handle_connection(stream, Arc::clone(state), Arc::clone(conn_counter));
}

/// Small JSON responses go out immediately instead of waiting on Nagle
fn disable_nagle(stream: &TcpStream) {
    if let Err(e) = stream.set_nodelay(true) {
        logger::log_warning(&format!("Failed to set TCP_NODELAY: {e}"));
    }
}

/// Serve a single connection in a spawned task.
///
/// HTTP/1.1 with keep-alive when `keep_alive_timeout` is non-zero; request
/// headers must arrive within `read_timeout`. The whole connection is cut
/// off after the longest of the configured timeouts.
fn handle_connection(stream: TcpStream, state: Arc<AppState>, conn_counter: Arc<AtomicUsize>) {
    tokio::spawn(async move {
        let io = TokioIo::new(stream);

        let perf = &state.config.performance;
        let timeout_duration = Duration::from_secs(max(
            perf.keep_alive_timeout,
            max(perf.read_timeout, perf.write_timeout),
        ));

        let mut builder = http1::Builder::new();
        builder
            .timer(TokioTimer::new())
            .keep_alive(perf.keep_alive_timeout > 0)
            .header_read_timeout(Duration::from_secs(perf.read_timeout));

        let service_state = Arc::clone(&state);
        let conn = builder.serve_connection(
            io,
            service_fn(move |req| handler::handle_request(req, Arc::clone(&service_state))),
        );

        match tokio::time::timeout(timeout_duration, conn).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => logger::log_connection_error(&err),
            Err(_) => {
                logger::log_warning(&format!(
                    "Connection timeout after {} seconds",
                    timeout_duration.as_secs()
                ));
            }
        }

        conn_counter.fetch_sub(1, Ordering::SeqCst);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::create_reusable_listener;

    #[tokio::test]
    async fn test_accepted_stream_has_nodelay() {
        let listener = create_reusable_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = listener.local_addr().unwrap();
        let _client = TcpStream::connect(addr).await.unwrap();
        let (stream, _) = listener.accept().await.unwrap();

        disable_nagle(&stream);
        assert!(stream.nodelay().unwrap());
    }
}
