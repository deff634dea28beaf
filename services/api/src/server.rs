use crate::cli::ServeArgs;
use crate::infra::{AppState, FileRecordStore};
use crate::routes::with_credit_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use kredit_docs::config::AppConfig;
use kredit_docs::error::AppError;
use kredit_docs::telemetry;
use kredit_docs::workflows::credit::{CreditDocumentService, FsTemplateStore, PlaceholderRenderer};
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

    telemetry::init(&config.telemetry, config.environment)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let records = Arc::new(FileRecordStore::open(&config.storage.data_file)?);
    let templates = Arc::new(FsTemplateStore::new(&config.storage.template_dir));
    let renderer = Arc::new(PlaceholderRenderer::new(templates.clone()));
    let service = Arc::new(CreditDocumentService::new(
        records,
        renderer,
        templates,
        config.derivation.context_settings(),
    ));

    let app = with_credit_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        data_file = %config.storage.data_file.display(),
        template_dir = %config.storage.template_dir.display(),
        "credit document service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
