//! Resolves the current USD rate from the cache, the configured providers, or
//! the last value known to be good.

use crate::core::cache::RateStore;
use crate::core::provider::{ProviderError, RateProvider};
use crate::core::rate::{CachedRate, Clock, SystemClock};
use anyhow::{Context, Result};
use chrono::Duration;
use rust_decimal::Decimal;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

pub const DEFAULT_TTL_SECS: i64 = 60 * 60;
pub const DEFAULT_FALLBACK_RATE: Decimal = Decimal::ONE_THOUSAND;
pub const DEFAULT_SOURCE: &str = "dolarhoy.com";

#[derive(Debug, Clone)]
pub struct ResolverPolicy {
    pub ttl: Duration,
    pub fallback_rate: Decimal,
    /// Label written with every cached entry.
    pub source: String,
}

impl Default for ResolverPolicy {
    fn default() -> Self {
        Self {
            ttl: Duration::seconds(DEFAULT_TTL_SECS),
            fallback_rate: DEFAULT_FALLBACK_RATE,
            source: DEFAULT_SOURCE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateOrigin {
    /// Cached entry inside the freshness window.
    Cache,
    /// Fresh quote from the named provider.
    Provider(String),
    /// Every provider failed; the stale cached value was kept.
    Stale,
    /// No usable cached value; the configured constant was used.
    Fallback,
}

impl fmt::Display for RateOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RateOrigin::Cache => write!(f, "cache"),
            RateOrigin::Provider(name) => write!(f, "provider {name}"),
            RateOrigin::Stale => write!(f, "stale cache"),
            RateOrigin::Fallback => write!(f, "fallback"),
        }
    }
}

#[derive(Debug)]
pub struct ProviderAttempt {
    pub provider: String,
    pub outcome: Result<Decimal, ProviderError>,
}

#[derive(Debug)]
pub struct Resolution {
    pub rate: Decimal,
    pub origin: RateOrigin,
    pub attempts: Vec<ProviderAttempt>,
}

impl Resolution {
    fn without_attempts(rate: Decimal, origin: RateOrigin) -> Self {
        Self {
            rate,
            origin,
            attempts: Vec::new(),
        }
    }
}

pub struct RateResolver {
    store: Arc<dyn RateStore>,
    providers: Vec<Arc<dyn RateProvider>>,
    clock: Arc<dyn Clock>,
    policy: ResolverPolicy,
}

impl RateResolver {
    /// Providers are tried in the given order until one returns a rate.
    pub fn new(store: Arc<dyn RateStore>, providers: Vec<Arc<dyn RateProvider>>) -> Self {
        Self {
            store,
            providers,
            clock: Arc::new(SystemClock),
            policy: ResolverPolicy::default(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_policy(mut self, policy: ResolverPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> &ResolverPolicy {
        &self.policy
    }

    /// Returns a usable rate. Faults only ever degrade the value.
    pub async fn get_rate(&self) -> Decimal {
        self.resolve().await.rate
    }

    #[instrument(name = "ResolveRate", skip(self))]
    pub async fn resolve(&self) -> Resolution {
        match self.try_resolve().await {
            Ok(resolution) => resolution,
            Err(e) => {
                warn!(error = %e, "Rate resolution failed, re-reading cache");
                match self.store.latest().await {
                    Ok(Some(entry)) if is_usable(entry.value) => {
                        Resolution::without_attempts(entry.value, RateOrigin::Stale)
                    }
                    Ok(_) => Resolution::without_attempts(
                        self.policy.fallback_rate,
                        RateOrigin::Fallback,
                    ),
                    Err(e) => {
                        warn!(error = %e, "Cache unavailable, using fallback rate");
                        Resolution::without_attempts(
                            self.policy.fallback_rate,
                            RateOrigin::Fallback,
                        )
                    }
                }
            }
        }
    }

    async fn try_resolve(&self) -> Result<Resolution> {
        let cached = self
            .store
            .latest()
            .await
            .context("Failed to read cached rate")?;

        match &cached {
            Some(entry) if entry.is_fresh(self.clock.now(), self.policy.ttl) => {
                debug!(rate = %entry.value, updated_at = %entry.updated_at, "Cache HIT for rate");
                return Ok(Resolution::without_attempts(
                    entry.value,
                    RateOrigin::Cache,
                ));
            }
            Some(entry) => debug!(updated_at = %entry.updated_at, "Cached rate is stale"),
            None => debug!("Cache MISS for rate"),
        }

        let (mut rate, mut origin) = match cached.map(|entry| entry.value) {
            Some(value) if is_usable(value) => (value, RateOrigin::Stale),
            _ => (self.policy.fallback_rate, RateOrigin::Fallback),
        };

        let mut attempts = Vec::with_capacity(self.providers.len());
        for provider in &self.providers {
            let outcome = provider.fetch_rate().await.and_then(|value| {
                if is_usable(value) {
                    Ok(value)
                } else {
                    Err(ProviderError::NotPositive(value))
                }
            });

            let fetched = match &outcome {
                Ok(value) => {
                    debug!(provider = provider.name(), rate = %value, "Provider returned rate");
                    Some(*value)
                }
                Err(e) => {
                    warn!(provider = provider.name(), error = %e, "Provider failed");
                    None
                }
            };
            attempts.push(ProviderAttempt {
                provider: provider.name().to_string(),
                outcome,
            });

            if let Some(value) = fetched {
                rate = value;
                origin = RateOrigin::Provider(provider.name().to_string());
                break;
            }
        }

        if !matches!(origin, RateOrigin::Provider(_)) {
            warn!(rate = %rate, origin = %origin, "No provider returned a rate");
        }

        // Written even when nothing was refreshed, which restarts the TTL.
        let entry = CachedRate::new(rate, self.policy.source.clone(), self.clock.now());
        if let Err(e) = self.store.upsert(&entry).await {
            warn!(error = %e, "Failed to write rate to cache");
        }

        Ok(Resolution {
            rate,
            origin,
            attempts,
        })
    }
}

fn is_usable(value: Decimal) -> bool {
    value > Decimal::ZERO
}
