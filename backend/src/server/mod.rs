//! Server construction and dependency wiring.
//!
//! This is the single place where the cache, the gate, and the use-case
//! services are built; handlers only ever see the ports in [`HttpState`].

mod config;
#[cfg(feature = "metrics")]
mod metrics;

pub use config::ServerConfig;

use std::sync::Arc;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use mockable::DefaultClock;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use gatekeeper::doc::ApiDoc;
use gatekeeper::domain::ports::{IdempotencyCache, IdempotencyMetrics};
use gatekeeper::domain::{
    GoatRegistrationService, IdempotencyConfig, IdempotencyGate, OrderAdmissionService,
};
use gatekeeper::inbound::http::error::json_config;
use gatekeeper::inbound::http::goats::register_goat;
use gatekeeper::inbound::http::health::{HealthState, live, ready};
use gatekeeper::inbound::http::orders::{finalize_order, verify_order};
use gatekeeper::inbound::http::state::HttpState;
#[cfg(feature = "metrics")]
use gatekeeper::outbound::metrics::PrometheusIdempotencyMetrics;
use gatekeeper::outbound::persistence::InMemoryGoatRepository;

/// Wire one gate over `cache` and hand it to both use-cases.
fn build_http_state<M>(
    cache: Arc<dyn IdempotencyCache>,
    metrics: Arc<M>,
    config: IdempotencyConfig,
) -> HttpState
where
    M: IdempotencyMetrics + 'static,
{
    let gate = Arc::new(IdempotencyGate::new(cache, metrics, config));
    let goats = GoatRegistrationService::new(
        Arc::clone(&gate),
        Arc::new(InMemoryGoatRepository::new()),
        Arc::new(DefaultClock),
    );
    let orders = OrderAdmissionService::new(gate);
    HttpState::new(Arc::new(goats), Arc::new(orders))
}

/// Build the HTTP state, recording admission metrics when a registry is set.
///
/// # Errors
///
/// Returns [`std::io::Error`] if metric registration fails.
#[cfg(feature = "metrics")]
fn http_state_for(config: &ServerConfig) -> std::io::Result<HttpState> {
    let cache = Arc::clone(&config.cache);
    let idempotency = config.idempotency.clone();
    match &config.prometheus {
        Some(prometheus) => {
            let metrics = PrometheusIdempotencyMetrics::new(&prometheus.registry).map_err(|e| {
                std::io::Error::other(format!("idempotency metrics registration failed: {e}"))
            })?;
            Ok(build_http_state(cache, Arc::new(metrics), idempotency))
        }
        None => Ok(build_http_state(
            cache,
            Arc::new(gatekeeper::domain::ports::NoOpIdempotencyMetrics),
            idempotency,
        )),
    }
}

/// Build the HTTP state with no-op admission metrics.
#[cfg(not(feature = "metrics"))]
fn http_state_for(config: &ServerConfig) -> std::io::Result<HttpState> {
    Ok(build_http_state(
        Arc::clone(&config.cache),
        Arc::new(gatekeeper::domain::ports::NoOpIdempotencyMetrics),
        config.idempotency.clone(),
    ))
}

fn build_app(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let api = web::scope("/api/v1")
        .service(register_goat)
        .service(verify_order)
        .service(finalize_order);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(json_config())
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(
        SwaggerUi::new("/docs/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    );

    app
}

/// Construct an Actix HTTP server over the configured cache.
///
/// Readiness is flipped once the socket is bound.
///
/// # Errors
///
/// Propagates [`std::io::Error`] when binding the socket or registering
/// metrics fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let http_state = web::Data::new(http_state_for(&config)?);
    let bind_addr = config.bind_addr;

    #[cfg(feature = "metrics")]
    let metrics_layer =
        metrics::MetricsLayer::from_option(config.prometheus.map(|setup| setup.middleware));

    let server = HttpServer::new(move || {
        let app = build_app(server_health_state.clone(), http_state.clone());

        #[cfg(feature = "metrics")]
        let app = app.wrap(metrics_layer.clone());

        app
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
