use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryOrderLedger};
use crate::routes::with_footprint_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use eco_intellect::config::AppConfig;
use eco_intellect::error::AppError;
use eco_intellect::footprint::FootprintService;
use eco_intellect::telemetry;
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

    telemetry::init(&config.telemetry)?;

    if !config.providers.factor_provider_enabled() {
        info!("GREENPT_API_KEY not set, emission factors come from the fallback table");
    }
    if !config.providers.projection_provider_enabled() {
        info!("WOLFRAM_APP_ID not set, tree estimates come from the absorption formula");
    }

    let service = Arc::new(FootprintService::from_config(
        Arc::new(InMemoryOrderLedger::default()),
        &config.providers,
    ));
    let providers = service.provider_status();

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        providers,
    };

    let app = with_footprint_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        emission_factors_live = providers.emission_factors_live,
        projections_live = providers.projections_live,
        "eco intellect api ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
