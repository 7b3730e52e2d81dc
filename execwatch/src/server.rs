//! HTTP scrape endpoint
//!
//! One route, `GET /metrics`, serving the Prometheus text exposition. The
//! handler only reads sink state; all writes happen on the polling task.
//! Scrapers are never turned away with an error status: if rendering ever
//! fails the handler logs it and serves an empty exposition.

use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use log::warn;
use tokio::net::TcpListener;
use tokio::sync::watch;

use crate::metrics::PrometheusSink;

/// Build the scrape router over a shared sink
pub fn router(sink: PrometheusSink) -> Router {
    Router::new().route("/metrics", get(serve_metrics)).with_state(sink)
}

async fn serve_metrics(State(sink): State<PrometheusSink>) -> impl IntoResponse {
    let body = match sink.render() {
        Ok(body) => body,
        Err(e) => {
            warn!("failed to render metrics: {e}");
            String::new()
        }
    };
    ([(CONTENT_TYPE, sink.content_type())], body)
}

/// Serve scrapes until the shutdown channel flips, then drain in-flight
/// requests before returning.
///
/// # Errors
/// Returns an error if the HTTP server itself fails; individual scrapes
/// never surface here.
pub async fn serve(
    listener: TcpListener,
    sink: PrometheusSink,
    mut shutdown: watch::Receiver<bool>,
) -> Result<()> {
    let app = router(sink);
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            while !*shutdown.borrow_and_update() {
                if shutdown.changed().await.is_err() {
                    break;
                }
            }
        })
        .await
        .context("metrics server failed")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use crate::metrics::MetricSink;

    use super::*;

    #[tokio::test]
    async fn test_metrics_endpoint_serves_the_exposition() {
        let sink = PrometheusSink::new().expect("registry setup");
        sink.increment_counter("ebpf_exec_events_total", 2);

        let response = serve_metrics(State(sink)).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .expect("content type header")
            .to_str()
            .expect("ascii header");
        assert!(content_type.starts_with("text/plain"));

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let body = String::from_utf8(bytes.to_vec()).expect("utf8 body");
        assert!(body.contains("ebpf_exec_events_total 2"));
    }

    #[tokio::test]
    async fn test_server_drains_on_shutdown_signal() {
        let sink = PrometheusSink::new().expect("registry setup");
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind ephemeral port");

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(serve(listener, sink, shutdown_rx));

        shutdown_tx.send(true).expect("receiver alive");
        tokio::time::timeout(std::time::Duration::from_secs(1), task)
            .await
            .expect("server should stop promptly")
            .expect("server task should not panic")
            .expect("server should shut down cleanly");
    }
}
