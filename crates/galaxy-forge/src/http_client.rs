use std::time::Duration;

use galaxy_config::config::Config;
use ureq::{tls::TlsConfig, Agent};

pub const DEFAULT_USER_AGENT: &str = concat!("galaxy-light/", env!("CARGO_PKG_VERSION"));

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub user_agent: Option<String>,
    pub timeout: Option<Duration>,
    pub insecure_skip_tls_verify: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: Some(DEFAULT_USER_AGENT.into()),
            timeout: Some(Duration::from_secs(5)),
            insecure_skip_tls_verify: true,
        }
    }
}

impl ClientConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            user_agent: Some(DEFAULT_USER_AGENT.into()),
            timeout: Some(config.timeout()),
            insecure_skip_tls_verify: config.insecure_skip_tls_verify(),
        }
    }

    /// Builds an HTTP `Agent` from this configuration.
    ///
    /// Non-2xx responses are returned as regular responses so callers can tell a
    /// missing project apart from an unavailable forge.
    pub fn build(&self) -> Agent {
        let mut config = Agent::config_builder()
            .timeout_global(self.timeout)
            .http_status_as_error(false)
            .tls_config(
                TlsConfig::builder()
                    .disable_verification(self.insecure_skip_tls_verify)
                    .build(),
            );

        if let Some(user_agent) = &self.user_agent {
            config = config.user_agent(user_agent);
        }

        config.build().into()
    }
}
