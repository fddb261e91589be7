use crate::cli::ServeArgs;
use crate::infra::{AppState, JsonFileStore};
use crate::routes::with_knowledge_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use profguide::config::AppConfig;
use profguide::error::AppError;
use profguide::knowledge::KnowledgeBaseService;
use profguide::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(path) = args.knowledge_base.take() {
        config.knowledge_base.path = path;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = Arc::new(JsonFileStore::new(config.knowledge_base.path.clone()));
    let service = Arc::new(KnowledgeBaseService::open(
        store,
        config.recommendations.service_settings(),
    )?);

    let app = with_knowledge_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        knowledge_base = %config.knowledge_base.path.display(),
        "profession recommender ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
