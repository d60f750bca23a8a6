//! Gatekeeper entry point: loads settings, connects the idempotency cache
//! once, and serves the HTTP API.

mod server;

use std::sync::Arc;

use actix_web::web;
use color_eyre::eyre::{Result, WrapErr, eyre};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use gatekeeper::domain::IdempotencyConfig;
use gatekeeper::domain::ports::{CacheCredential, CacheCredentialSource, IdempotencyCache};
use gatekeeper::inbound::http::health::HealthState;
use gatekeeper::outbound::cache::{
    InMemoryIdempotencyCache, RedisIdempotencyCache, RedisPool, RedisPoolConfig,
};
use gatekeeper::outbound::credentials::{
    CachedCredentialSource, EnvCredentialSource, SecretFileCredentialSource,
};
use gatekeeper::settings::{CacheSetting, CredentialSetting, GatekeeperSettings};
use server::{ServerConfig, create_server};

fn credential_source(setting: CredentialSetting) -> Option<Arc<dyn CacheCredentialSource>> {
    match setting {
        CredentialSetting::SecretFile(path) => Some(Arc::new(CachedCredentialSource::new(
            SecretFileCredentialSource::new(path),
        ))),
        CredentialSetting::Env(variable) => Some(Arc::new(CachedCredentialSource::new(
            EnvCredentialSource::new(variable),
        ))),
        CredentialSetting::None => None,
    }
}

async fn fetch_credential(setting: CredentialSetting) -> Result<Option<CacheCredential>> {
    match credential_source(setting) {
        Some(source) => {
            let credential = source
                .fetch()
                .await
                .wrap_err("failed to fetch cache credential")?;
            Ok(Some(credential))
        }
        None => Ok(None),
    }
}

async fn connect_cache(settings: &GatekeeperSettings) -> Result<Arc<dyn IdempotencyCache>> {
    match settings.cache()? {
        CacheSetting::InMemory => {
            warn!("using in-memory idempotency cache; keys are not shared between instances");
            Ok(Arc::new(InMemoryIdempotencyCache::default()))
        }
        CacheSetting::Redis { url, pool_size } => {
            let credential = fetch_credential(settings.credential()).await?;
            let config = RedisPoolConfig::new(url).with_max_size(pool_size);
            info!(redis_url = config.redis_url(), pool_size, "connecting idempotency cache");
            let pool = RedisPool::connect(config, credential.as_ref())
                .await
                .wrap_err("failed to build redis pool")?;
            Ok(Arc::new(RedisIdempotencyCache::new(pool)))
        }
    }
}

#[cfg(feature = "metrics")]
fn with_metrics(config: ServerConfig) -> Result<ServerConfig> {
    let registry = prometheus::Registry::new();
    let middleware = actix_web_prom::PrometheusMetricsBuilder::new("gatekeeper")
        .registry(registry.clone())
        .endpoint("/metrics")
        .build()
        .map_err(|err| eyre!("failed to configure prometheus metrics: {err}"))?;
    Ok(config.with_metrics(middleware, registry))
}

#[cfg(not(feature = "metrics"))]
fn with_metrics(config: ServerConfig) -> Result<ServerConfig> {
    Ok(config)
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = GatekeeperSettings::load_from_iter(std::env::args_os())
        .map_err(|err| eyre!("failed to load settings: {err}"))?;
    let bind_addr = settings.bind_addr()?;
    let idempotency = IdempotencyConfig::from_env();
    info!(
        cache_name = idempotency.cache_name(),
        ttl_seconds = idempotency.ttl().as_secs(),
        "idempotency gate configured"
    );

    let cache = connect_cache(&settings).await?;
    let config = with_metrics(ServerConfig::new(bind_addr, cache, idempotency))?;

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), config)
        .wrap_err_with(|| format!("failed to start server on {bind_addr}"))?;
    info!(%bind_addr, "gatekeeper listening");

    let result = server.await;
    health_state.mark_draining();
    result.wrap_err("server terminated with an error")
}
