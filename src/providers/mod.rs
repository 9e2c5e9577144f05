pub mod quote;

use crate::core::config::ProviderConfig;
use crate::core::provider::RateProvider;
use anyhow::Result;
use quote::QuoteProvider;
use std::sync::Arc;

/// Builds the provider chain in configuration order.
pub fn from_config(configs: &[ProviderConfig]) -> Result<Vec<Arc<dyn RateProvider>>> {
    configs
        .iter()
        .map(|config| -> Result<Arc<dyn RateProvider>> {
            Ok(Arc::new(QuoteProvider::from_config(config)?))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::default_providers;

    #[test]
    fn test_provider_chain_keeps_order() {
        let providers = from_config(&default_providers()).unwrap();
        let names: Vec<&str> = providers.iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["dolarhoy", "dolarapi"]);
    }
}
