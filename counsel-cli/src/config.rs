use anyhow::{Context, Result};
use counsel_core::{CaseApiClient, CounselConfig};
use std::sync::Arc;

/// Loads layered configuration and applies command-line overrides.
pub fn load_config(api_url: Option<&str>) -> Result<CounselConfig> {
    let mut config = CounselConfig::load().context(
        "Failed to load configuration. \n\
         Check counsel.toml or ~/.counsel/config.toml, or set COUNSEL_API_URL, e.g.\n\
         COUNSEL_API_URL=http://localhost:8000",
    )?;

    if let Some(url) = api_url {
        config.api.base_url = url.to_string();
        config
            .validate()
            .context("Invalid --api-url value")?;
    }

    if !config.display.color {
        colored::control::set_override(false);
    }

    Ok(config)
}

pub fn api_client(config: &CounselConfig) -> Result<Arc<CaseApiClient>> {
    Ok(Arc::new(CaseApiClient::from_config(config)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_client_from_default_config() {
        let config = CounselConfig::default();
        let client = api_client(&config).unwrap();
        assert_eq!(counsel_core::CaseBackend::base_url(client.as_ref()), "http://localhost:8000");
    }
}
