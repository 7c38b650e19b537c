use crate::cli::ServeArgs;
use crate::infra::{load_catalog, AppState, InMemorySessionRepository};
use crate::routes::with_session_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use rehab_offer::config::AppConfig;
use rehab_offer::error::AppError;
use rehab_offer::lookup::RealieClient;
use rehab_offer::session::OfferDesk;
use rehab_offer::telemetry;
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

    let catalog = Arc::new(load_catalog(&config)?);
    let provider = Arc::new(RealieClient::from_config(&config.provider)?);

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        catalog: catalog.clone(),
        offer_ranges: config.offers,
    };

    let repository = Arc::new(InMemorySessionRepository::default());
    let desk = Arc::new(OfferDesk::new(
        repository,
        provider,
        catalog,
        config.offers,
    ));

    let app = with_session_routes(desk)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        provider = %config.provider.base_url,
        "rehab offer service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
