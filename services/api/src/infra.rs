use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[cfg(test)]
pub(crate) fn test_state(ready: bool) -> AppState {
    use metrics_exporter_prometheus::PrometheusBuilder;

    AppState {
        readiness: Arc::new(AtomicBool::new(ready)),
        metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
    }
}
