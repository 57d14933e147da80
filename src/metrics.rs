//! Request metrics served at `/metrics`.

use actix_web_prom::{PrometheusMetrics, PrometheusMetricsBuilder};
use anyhow::{anyhow, Result};

pub const ENDPOINT: &str = "/metrics";

/// Request counters and latency histograms in the `topdecked` namespace.
/// The health check under `api_prefix` is not recorded.
pub fn middleware(api_prefix: &str) -> Result<PrometheusMetrics> {
    PrometheusMetricsBuilder::new("topdecked")
        .endpoint(ENDPOINT)
        .exclude(format!("{api_prefix}/healthz"))
        .build()
        .map_err(|e| anyhow!("building metrics middleware: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, web, App, HttpResponse};

    #[actix_rt::test]
    async fn records_routes_but_not_the_health_check() {
        let app = test::init_service(
            App::new()
                .wrap(middleware("/api").unwrap())
                .route("/api/lojas", web::get().to(HttpResponse::Ok))
                .route("/api/healthz", web::get().to(HttpResponse::Ok)),
        )
        .await;

        for uri in ["/api/lojas", "/api/healthz"] {
            test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        }
        let req = test::TestRequest::get().uri(ENDPOINT).to_request();
        let body = test::call_and_read_body(&app, req).await;
        let body = String::from_utf8(body.to_vec()).unwrap();
        assert!(body.contains("topdecked_http_requests_total"));
        assert!(body.contains("/api/lojas"));
        assert!(!body.contains("/api/healthz"));
    }
}
