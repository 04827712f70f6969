use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::with_operational_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use survey_bridge::config::AppConfig;
use survey_bridge::enrichment::EnrichmentService;
use survey_bridge::error::AppError;
use survey_bridge::geocode::MapitClient;
use survey_bridge::http::bridge_router;
use survey_bridge::reference::ReferenceTables;
use survey_bridge::telemetry;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let tables = Arc::new(ReferenceTables::new(&config.resources.dir));
    let preload = Arc::clone(&tables);
    match tokio::task::spawn_blocking(move || preload.preload()).await {
        Ok(Ok(())) => info!(dir = %tables.dir().display(), "reference tables loaded"),
        Ok(Err(err)) => warn!(%err, "reference tables will be loaded on demand"),
        Err(err) => warn!(%err, "reference table preload did not complete"),
    }

    let geocoder = MapitClient::new(&config.mapit)?;
    let service = Arc::new(EnrichmentService::new(tables, geocoder));

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let app = with_operational_routes(bridge_router(service, config.access.clone()))
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        mapit = %config.mapit.base_url,
        generation = %config.mapit.generation,
        access_key = config.access.access_key.is_some(),
        "survey bridge ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
