use std::{fs, path::Path};

use paylink::ClientConfig;
use serde::Deserialize;

use crate::Error;

pub const TOKEN_ENV: &str = "PAYLINK_ACCESS_TOKEN";

#[derive(Deserialize, Debug)]
pub struct Config {
    pub gateway: Gateway,
    #[serde(default)]
    pub polling: Polling,
}
impl Config {
    pub fn read(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path)
            .map_err(|e| format!("Cannot read configuration file {}: {e}", path.display()))?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self, Error> {
        Ok(toml::from_str(contents).map_err(|e| format!("Cannot parse configuration file: {e}"))?)
    }

    /// Gateway settings with the access token resolved. A token from the
    /// command line or `PAYLINK_ACCESS_TOKEN` wins over the file.
    pub fn client_config(&self, token_override: Option<String>) -> Result<ClientConfig, Error> {
        let access_token = token_override
            .filter(|t| !t.trim().is_empty())
            .or_else(|| self.gateway.access_token.clone())
            .ok_or_else(|| format!("No access token in config file or {TOKEN_ENV}"))?;

        let mut config = ClientConfig::new(access_token);
        if let Some(timeout_ms) = self.gateway.timeout_ms {
            config.timeout_ms = timeout_ms;
        }
        if let Some(base_url) = &self.gateway.base_url {
            config.base_url = base_url.clone();
        }
        config.headers = self.gateway.headers.clone().unwrap_or_default();
        Ok(config)
    }
}

#[derive(Deserialize, Debug, Default)]
pub struct Gateway {
    pub access_token: Option<String>,
    pub timeout_ms: Option<u64>,
    pub base_url: Option<String>,
    pub headers: Option<std::collections::HashMap<String, String>>,
}

#[derive(Deserialize, Debug)]
pub struct Polling {
    pub interval_secs: u64,
    pub max_attempts: u32,
}
impl Default for Polling {
    fn default() -> Self {
        // links expire after 20 minutes
        Self {
            interval_secs: 5,
            max_attempts: 240,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[gateway]
access_token = "from-file"
timeout_ms = 10000
base_url = "http://localhost:9000/v1"

[gateway.headers]
x-merchant = "shop-42"
"#;

    #[test]
    fn file_values_fill_client_config() {
        let conf = Config::parse(SAMPLE).unwrap();
        let client = conf.client_config(None).unwrap();
        assert_eq!(client.access_token, "from-file");
        assert_eq!(client.timeout_ms, 10000);
        assert_eq!(client.base_url, "http://localhost:9000/v1");
        assert_eq!(client.headers["x-merchant"], "shop-42");
        assert_eq!(conf.polling.interval_secs, 5);
    }

    #[test]
    fn environment_token_wins() {
        let conf = Config::parse(SAMPLE).unwrap();
        let client = conf.client_config(Some("from-env".into())).unwrap();
        assert_eq!(client.access_token, "from-env");
    }

    #[test]
    fn missing_token_is_an_error() {
        let conf = Config::parse("[gateway]\n").unwrap();
        assert!(conf.client_config(None).is_err());
        assert!(conf.client_config(Some("  ".into())).is_err());
    }

    #[test]
    fn defaults_apply_when_unset() {
        let conf = Config::parse("[gateway]\naccess_token = \"t\"\n").unwrap();
        let client = conf.client_config(None).unwrap();
        assert_eq!(client.timeout_ms, paylink::DEFAULT_TIMEOUT_MS);
        assert_eq!(client.base_url, paylink::DEFAULT_BASE_URL);
    }
}
