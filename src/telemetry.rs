//! Prometheus metrics: the exporter and the per-route request recorder.

use std::{net::SocketAddr, time::Instant};

use actix_web::{
    body::MessageBody,
    dev::{ServiceRequest, ServiceResponse},
    middleware::Next,
};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::config::Config;

pub const HTTP_REQUESTS_TOTAL: &str = "rowmq_http_requests_total";
pub const HTTP_REQUEST_DURATION_SECONDS: &str = "rowmq_http_request_duration_seconds";
pub const MESSAGES_ENQUEUED_TOTAL: &str = "rowmq_messages_enqueued_total";
pub const MESSAGES_LEASED_TOTAL: &str = "rowmq_messages_leased_total";

const UNMATCHED_ROUTE: &str = "unmatched";

/// Serves the Prometheus scrape endpoint on `metrics_host:metrics_port` and
/// installs it as the global recorder.
pub fn install_exporter(config: &Config) -> eyre::Result<SocketAddr> {
    let addr: SocketAddr = format!("{}:{}", config.metrics_host(), config.metrics_port()).parse()?;

    PrometheusBuilder::new().with_http_listener(addr).install()?;
    describe();

    tracing::info!(%addr, "metrics exporter listening");

    Ok(addr)
}

pub fn describe() {
    metrics::describe_counter!(HTTP_REQUESTS_TOTAL, "HTTP requests by method, route and status");
    metrics::describe_histogram!(
        HTTP_REQUEST_DURATION_SECONDS,
        metrics::Unit::Seconds,
        "HTTP request latency by method and route"
    );
    metrics::describe_counter!(MESSAGES_ENQUEUED_TOTAL, "Messages enqueued, by queue");
    metrics::describe_counter!(MESSAGES_LEASED_TOTAL, "Messages handed out by leases, by queue");
}

/// Middleware recording a counter and a latency histogram per request,
/// labelled with the matched route pattern rather than the raw path.
pub async fn record_request(
    req: ServiceRequest,
    next: Next<impl MessageBody>,
) -> Result<ServiceResponse<impl MessageBody>, actix_web::Error> {
    let method = req.method().to_string();
    let route = req
        .match_pattern()
        .unwrap_or_else(|| UNMATCHED_ROUTE.to_owned());
    let started = Instant::now();

    let res = next.call(req).await?;

    let status = res.status().as_u16().to_string();
    metrics::counter!(
        HTTP_REQUESTS_TOTAL,
        "method" => method.clone(),
        "route" => route.clone(),
        "status" => status
    )
    .increment(1);
    metrics::histogram!(HTTP_REQUEST_DURATION_SECONDS, "method" => method, "route" => route)
        .record(started.elapsed().as_secs_f64());

    Ok(res)
}
