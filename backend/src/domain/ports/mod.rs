//! Domain ports and supporting types for the hexagonal boundary.

mod cache_credentials;
mod goat_registration;
mod goat_repository;
mod idempotency_cache;
mod idempotency_metrics;
mod order_admission;

#[cfg(test)]
pub use cache_credentials::MockCacheCredentialSource;
pub use cache_credentials::{CacheCredential, CacheCredentialSource, CredentialError};
#[cfg(test)]
pub use goat_registration::MockGoatRegistration;
pub use goat_registration::{GoatRegistration, ProtectedResponse, RegisterGoatRequest};
#[cfg(test)]
pub use goat_repository::MockGoatRepository;
pub use goat_repository::{GoatRepository, GoatRepositoryError};
#[cfg(test)]
pub use idempotency_cache::MockIdempotencyCache;
pub use idempotency_cache::{
    CacheLookup, ConditionalWrite, IdempotencyCache, IdempotencyCacheError, namespaced_key,
};
#[cfg(test)]
pub use idempotency_metrics::MockIdempotencyMetrics;
pub use idempotency_metrics::{
    IdempotencyMetricLabels, IdempotencyMetrics, IdempotencyMetricsError, NoOpIdempotencyMetrics,
};
#[cfg(test)]
pub use order_admission::MockOrderAdmission;
pub use order_admission::{
    FinalizeOrderState, OrderAdmission, VerifyOrderResult, VerifyOrderState,
};
