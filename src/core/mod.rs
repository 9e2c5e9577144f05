//! Core business logic abstractions

pub mod cache;
pub mod config;
pub mod convert;
pub mod log;
pub mod provider;
pub mod rate;
pub mod resolver;

// Re-export main types for cleaner imports
pub use cache::RateStore;
pub use provider::{ProviderError, RateProvider};
pub use rate::{CachedRate, Clock, FixedClock, SystemClock};
pub use resolver::{RateOrigin, RateResolver, Resolution, ResolverPolicy};
