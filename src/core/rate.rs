//! Cached rate entity and the time source used to judge its freshness.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The single logical row of the rate cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedRate {
    pub value: Decimal,
    pub source: String,
    pub updated_at: DateTime<Utc>,
}

impl CachedRate {
    pub fn new(value: Decimal, source: impl Into<String>, updated_at: DateTime<Utc>) -> Self {
        Self {
            value,
            source: source.into(),
            updated_at,
        }
    }

    /// True while `now - updated_at` is strictly below `ttl`.
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now.signed_duration_since(self.updated_at) < ttl
    }
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
