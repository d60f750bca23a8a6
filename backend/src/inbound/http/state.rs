//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they only depend
//! on domain ports and remain testable without a cache.

use std::sync::Arc;

use crate::domain::ports::{GoatRegistration, OrderAdmission};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub goats: Arc<dyn GoatRegistration>,
    pub orders: Arc<dyn OrderAdmission>,
}

impl HttpState {
    /// Bundle the use-case ports.
    pub fn new(goats: Arc<dyn GoatRegistration>, orders: Arc<dyn OrderAdmission>) -> Self {
        Self { goats, orders }
    }
}
