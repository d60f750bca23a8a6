//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::sync::Arc;

#[cfg(feature = "metrics")]
use actix_web_prom::PrometheusMetrics;
use gatekeeper::domain::IdempotencyConfig;
use gatekeeper::domain::ports::IdempotencyCache;
#[cfg(feature = "metrics")]
use prometheus::Registry;

/// Prometheus middleware plus the registry the gate's counters live in.
#[cfg(feature = "metrics")]
#[derive(Clone)]
pub struct PrometheusSetup {
    pub(crate) middleware: PrometheusMetrics,
    pub(crate) registry: Registry,
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) cache: Arc<dyn IdempotencyCache>,
    pub(crate) idempotency: IdempotencyConfig,
    #[cfg(feature = "metrics")]
    pub(crate) prometheus: Option<PrometheusSetup>,
}

impl ServerConfig {
    /// Construct a server configuration over an already connected cache.
    #[must_use]
    pub fn new(
        bind_addr: SocketAddr,
        cache: Arc<dyn IdempotencyCache>,
        idempotency: IdempotencyConfig,
    ) -> Self {
        Self {
            bind_addr,
            cache,
            idempotency,
            #[cfg(feature = "metrics")]
            prometheus: None,
        }
    }

    #[cfg(feature = "metrics")]
    /// Attach Prometheus middleware and its registry.
    #[must_use]
    pub fn with_metrics(mut self, middleware: PrometheusMetrics, registry: Registry) -> Self {
        self.prometheus = Some(PrometheusSetup {
            middleware,
            registry,
        });
        self
    }
}
