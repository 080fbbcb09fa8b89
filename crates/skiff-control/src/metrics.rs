use std::sync::atomic::{AtomicU64, Ordering};

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::api::AppState;

/// Counters shared by the HTTP layer and the poll loop.
#[derive(Debug, Default)]
pub struct Metrics {
    pub requests_total: AtomicU64,
    pub requests_inflight: AtomicU64,
    pub status_2xx: AtomicU64,
    pub status_4xx: AtomicU64,
    pub status_5xx: AtomicU64,
    /// Workloads placed and kept in the registry.
    pub workloads_created_total: AtomicU64,
    /// Placements that failed and were rolled back.
    pub placement_failures_total: AtomicU64,
    /// Placements sent but never answered; the workload was kept.
    pub placements_unconfirmed_total: AtomicU64,
    pub poll_rounds_total: AtomicU64,
    /// Status queries that failed or hit the deadline.
    pub poll_failures_total: AtomicU64,
}

impl Metrics {
    pub fn inc(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Prometheus text exposition.
    pub fn render(&self) -> String {
        let counters = [
            ("requests_total", "counter", "HTTP requests handled.", &self.requests_total),
            ("requests_inflight", "gauge", "HTTP requests in flight.", &self.requests_inflight),
            ("responses_2xx", "counter", "2xx responses.", &self.status_2xx),
            ("responses_4xx", "counter", "4xx responses.", &self.status_4xx),
            ("responses_5xx", "counter", "5xx responses.", &self.status_5xx),
            (
                "workloads_created_total",
                "counter",
                "Workloads placed on a node.",
                &self.workloads_created_total,
            ),
            (
                "placement_failures_total",
                "counter",
                "Placements rolled back after the node failed to acknowledge.",
                &self.placement_failures_total,
            ),
            (
                "placements_unconfirmed_total",
                "counter",
                "Placements kept without an acknowledgement from the node.",
                &self.placements_unconfirmed_total,
            ),
            ("poll_rounds_total", "counter", "Completed poll rounds.", &self.poll_rounds_total),
            (
                "poll_failures_total",
                "counter",
                "Node status queries that failed or timed out.",
                &self.poll_failures_total,
            ),
        ];

        let mut out = String::new();
        for (name, kind, help, value) in counters {
            out.push_str(&format!(
                "# HELP skiff_control_{name} {help}\n# TYPE skiff_control_{name} {kind}\nskiff_control_{name} {}\n",
                value.load(Ordering::Relaxed)
            ));
        }
        out
    }
}

/// GET /metrics
pub async fn metrics_handler(State(st): State<AppState>) -> impl IntoResponse {
    (axum::http::StatusCode::OK, st.metrics.render())
}

pub async fn track_requests(
    State(st): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, std::convert::Infallible> {
    st.metrics.requests_inflight.fetch_add(1, Ordering::Relaxed);
    let resp = next.run(req).await;
    st.metrics.requests_inflight.fetch_sub(1, Ordering::Relaxed);
    st.metrics.requests_total.fetch_add(1, Ordering::Relaxed);

    let status = resp.status().as_u16();
    if status >= 500 {
        Metrics::inc(&st.metrics.status_5xx);
    } else if status >= 400 {
        Metrics::inc(&st.metrics.status_4xx);
    } else if status >= 200 {
        Metrics::inc(&st.metrics.status_2xx);
    }

    Ok(resp)
}
