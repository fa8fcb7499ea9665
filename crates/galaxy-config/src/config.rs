use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use documented::{Documented, DocumentedFields};
use galaxy_utils::{
    path::{resolve_path, xdg_config_home},
    time::parse_duration,
};
use serde::{Deserialize, Serialize};
use toml_edit::DocumentMut;
use tracing::{debug, info};
use url::Url;

use crate::{
    annotations::annotate_toml_table,
    error::{ConfigError, Result},
};

pub const DEFAULT_GITLAB_ENDPOINT: &str = "http://127.0.0.1:8080";
pub const DEFAULT_ROOT_GROUP: &str = "ansible/collections";
pub const DEFAULT_TARGET_PATH: &str = "/tmp/galaxy-light";
pub const DEFAULT_BIND: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8181;
pub const DEFAULT_PROTOCOL: &str = "http";
pub const DEFAULT_TIMEOUT: &str = "5s";
pub const DEFAULT_COMPRESSION_LEVEL: u32 = 6;

/// Order in which resolved versions are listed, newest first.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionOrder {
    /// Numeric comparison of major, minor and patch.
    #[default]
    Semver,
    /// Plain descending string comparison (`9.0.0` sorts above `10.0.0`).
    Lexical,
}

/// galaxy-light configuration
#[derive(Clone, Debug, Default, Deserialize, Serialize, Documented, DocumentedFields)]
pub struct Config {
    /// Base URL of the GitLab instance hosting the collection repositories.
    /// Default: http://127.0.0.1:8080
    pub gitlab_endpoint: Option<String>,

    /// Group under which `<namespace>.<collection>` projects live.
    /// Default: ansible/collections
    pub root_group: Option<String>,

    /// Access token sent as `PRIVATE-TOKEN` to GitLab. Leave unset for public projects.
    pub gitlab_token: Option<String>,

    /// Directory where built collection artifacts and their metadata are stored.
    /// Default: /tmp/galaxy-light
    pub target_path: Option<String>,

    /// Address the API server binds to.
    /// Default: 127.0.0.1
    pub bind: Option<String>,

    /// Port the API server listens on.
    /// Default: 8181
    pub port: Option<u16>,

    /// Protocol used when building download links.
    /// Default: http
    pub protocol: Option<String>,

    /// Externally visible base URL used in API links and download URLs.
    /// Default: <protocol>://<bind>:<port>
    pub public_url: Option<String>,

    /// Skip TLS certificate verification when talking to GitLab.
    /// Self-hosted instances commonly use internal certificates.
    /// Default: true
    pub insecure_skip_tls_verify: Option<bool>,

    /// Timeout for each request made to GitLab.
    /// Default: 5s
    pub timeout: Option<String>,

    /// Ordering of listed versions: `semver` or `lexical`.
    /// Default: semver
    pub version_order: Option<VersionOrder>,

    /// Hold a per-artifact lock while building so concurrent requests for the
    /// same version build it only once.
    /// Default: true
    pub serialize_builds: Option<bool>,

    /// Gzip level for built artifacts, from 0 (stored) to 9 (smallest).
    /// Default: 6
    pub compression_level: Option<u32>,
}

/// Location of the configuration file: `$GALAXY_LIGHT_CONFIG`, or
/// `$XDG_CONFIG_HOME/galaxy-light/config.toml`.
pub fn config_path() -> PathBuf {
    match std::env::var("GALAXY_LIGHT_CONFIG") {
        Ok(path_str) => PathBuf::from(path_str),
        Err(_) => xdg_config_home().join("galaxy-light").join("config.toml"),
    }
}

impl Config {
    pub fn default_config() -> Self {
        Self {
            gitlab_endpoint: Some(DEFAULT_GITLAB_ENDPOINT.to_string()),
            root_group: Some(DEFAULT_ROOT_GROUP.to_string()),
            gitlab_token: None,
            target_path: Some(DEFAULT_TARGET_PATH.to_string()),
            bind: Some(DEFAULT_BIND.to_string()),
            port: Some(DEFAULT_PORT),
            protocol: Some(DEFAULT_PROTOCOL.to_string()),
            public_url: None,
            insecure_skip_tls_verify: Some(true),
            timeout: Some(DEFAULT_TIMEOUT.to_string()),
            version_order: Some(VersionOrder::Semver),
            serialize_builds: Some(true),
            compression_level: Some(DEFAULT_COMPRESSION_LEVEL),
        }
    }

    /// Loads the configuration from `path` (or [`config_path`]), applies the
    /// `GALAXY_LIGHT_*` environment overrides and resolves defaults.
    ///
    /// A missing configuration file is not an error; defaults are used instead.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = path.map(Path::to_path_buf).unwrap_or_else(config_path);

        let mut config = match fs::read_to_string(&config_path) {
            Ok(content) => {
                debug!("loading configuration from {}", config_path.display());
                toml::from_str(&content)?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(
                    "no configuration at {}, using defaults",
                    config_path.display()
                );
                Self::default_config()
            }
            Err(err) => return Err(ConfigError::IoError(err)),
        };

        config.apply_env_overrides()?;
        config.resolve()?;

        Ok(config)
    }

    /// Applies `GALAXY_LIGHT_*` environment variables on top of the file values.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());

        if let Some(v) = var("GALAXY_LIGHT_GITLAB_ENDPOINT") {
            self.gitlab_endpoint = Some(v);
        }
        if let Some(v) = var("GALAXY_LIGHT_GITLAB_ROOT_GROUP") {
            self.root_group = Some(v);
        }
        if let Some(v) = var("GALAXY_LIGHT_GITLAB_TOKEN") {
            self.gitlab_token = Some(v);
        }
        if let Some(v) = var("GALAXY_LIGHT_TARGET_PATH") {
            self.target_path = Some(v);
        }
        if let Some(v) = var("GALAXY_LIGHT_SERVER_BIND") {
            self.bind = Some(v);
        }
        if let Some(v) = var("GALAXY_LIGHT_SERVER_PORT") {
            let port = v
                .parse::<u16>()
                .ok()
                .filter(|p| *p != 0)
                .ok_or(ConfigError::InvalidPort(v))?;
            self.port = Some(port);
        }
        if let Some(v) = var("GALAXY_LIGHT_SERVER_PROTOCOL") {
            self.protocol = Some(v);
        }

        Ok(())
    }

    /// Fills unset fields with defaults and validates the result.
    pub fn resolve(&mut self) -> Result<()> {
        let endpoint = self
            .gitlab_endpoint
            .get_or_insert_with(|| DEFAULT_GITLAB_ENDPOINT.to_string());
        let trimmed = endpoint.trim().trim_end_matches('/').to_string();
        match Url::parse(&trimmed) {
            Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => {}
            _ => return Err(ConfigError::InvalidEndpoint(endpoint.clone())),
        }
        *endpoint = trimmed;

        let root_group = self
            .root_group
            .get_or_insert_with(|| DEFAULT_ROOT_GROUP.to_string());
        *root_group = root_group.trim().trim_matches('/').to_string();

        self.target_path
            .get_or_insert_with(|| DEFAULT_TARGET_PATH.to_string());
        self.bind.get_or_insert_with(|| DEFAULT_BIND.to_string());
        self.insecure_skip_tls_verify.get_or_insert(true);
        self.version_order.get_or_insert_with(VersionOrder::default);
        self.serialize_builds.get_or_insert(true);

        let level = *self
            .compression_level
            .get_or_insert(DEFAULT_COMPRESSION_LEVEL);
        if level > 9 {
            return Err(ConfigError::InvalidCompressionLevel(level));
        }

        if self.port == Some(0) {
            return Err(ConfigError::InvalidPort("0".into()));
        }
        self.port.get_or_insert(DEFAULT_PORT);

        let protocol = self
            .protocol
            .get_or_insert_with(|| DEFAULT_PROTOCOL.to_string());
        if !matches!(protocol.as_str(), "http" | "https") {
            return Err(ConfigError::InvalidProtocol(protocol.clone()));
        }

        let timeout = self
            .timeout
            .get_or_insert_with(|| DEFAULT_TIMEOUT.to_string());
        match parse_duration(timeout) {
            Some(duration) if !duration.is_zero() => {}
            _ => return Err(ConfigError::InvalidTimeout(timeout.clone())),
        }

        if let Some(public_url) = &mut self.public_url {
            let trimmed = public_url.trim().trim_end_matches('/').to_string();
            if Url::parse(&trimmed).is_err() {
                return Err(ConfigError::InvalidPublicUrl(public_url.clone()));
            }
            *public_url = trimmed;
        }

        if self.gitlab_token.as_deref().is_some_and(str::is_empty) {
            self.gitlab_token = None;
        }

        Ok(())
    }

    pub fn gitlab_endpoint(&self) -> &str {
        self.gitlab_endpoint
            .as_deref()
            .unwrap_or(DEFAULT_GITLAB_ENDPOINT)
    }

    pub fn root_group(&self) -> &str {
        self.root_group.as_deref().unwrap_or(DEFAULT_ROOT_GROUP)
    }

    pub fn gitlab_token(&self) -> Option<&str> {
        self.gitlab_token.as_deref()
    }

    pub fn get_target_path(&self) -> Result<PathBuf> {
        Ok(resolve_path(
            self.target_path.as_deref().unwrap_or(DEFAULT_TARGET_PATH),
        )?)
    }

    pub fn bind(&self) -> &str {
        self.bind.as_deref().unwrap_or(DEFAULT_BIND)
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    pub fn protocol(&self) -> &str {
        self.protocol.as_deref().unwrap_or(DEFAULT_PROTOCOL)
    }

    /// Address for the listener, in `host:port` form.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind(), self.port())
    }

    /// Base URL used to build links handed out to API clients.
    pub fn public_url(&self) -> String {
        match &self.public_url {
            Some(url) => url.clone(),
            None => format!("{}://{}:{}", self.protocol(), self.bind(), self.port()),
        }
    }

    pub fn insecure_skip_tls_verify(&self) -> bool {
        self.insecure_skip_tls_verify.unwrap_or(true)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
            .as_deref()
            .and_then(parse_duration)
            .unwrap_or(Duration::from_secs(5))
    }

    pub fn version_order(&self) -> VersionOrder {
        self.version_order.unwrap_or_default()
    }

    pub fn serialize_builds(&self) -> bool {
        self.serialize_builds.unwrap_or(true)
    }

    pub fn compression_level(&self) -> u32 {
        self.compression_level
            .unwrap_or(DEFAULT_COMPRESSION_LEVEL)
            .min(9)
    }

    pub fn to_annotated_document(&self) -> Result<DocumentMut> {
        let toml_string = toml::to_string_pretty(self)?;
        let mut doc = toml_string.parse::<DocumentMut>()?;

        annotate_toml_table::<Config>(doc.as_table_mut(), true)?;

        Ok(doc)
    }
}

/// Writes the default configuration, annotated with field documentation, to `path`
/// (or [`config_path`]). An existing file is never overwritten.
pub fn generate_default_config(path: Option<&Path>) -> Result<PathBuf> {
    let config_path = path.map(Path::to_path_buf).unwrap_or_else(config_path);

    if config_path.exists() {
        return Err(ConfigError::ConfigAlreadyExists);
    }

    let annotated_doc = Config::default_config().to_annotated_document()?;

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(&config_path, annotated_doc.to_string())?;
    info!(
        "Default configuration file generated with documentation at: {}",
        config_path.display()
    );
    Ok(config_path)
}

#[cfg(test)]
mod tests {
    use serial_test::serial;
    use tempfile::tempdir;

    use super::*;
    use crate::test_utils::with_env;

    #[test]
    fn test_default_config_creation() {
        let config = Config::default_config();

        assert_eq!(config.gitlab_endpoint(), "http://127.0.0.1:8080");
        assert_eq!(config.root_group(), "ansible/collections");
        assert_eq!(config.listen_addr(), "127.0.0.1:8181");
        assert_eq!(config.public_url(), "http://127.0.0.1:8181");
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert!(config.insecure_skip_tls_verify());
        assert!(config.serialize_builds());
        assert_eq!(config.version_order(), VersionOrder::Semver);
        assert!(config.gitlab_token().is_none());
    }

    #[test]
    fn test_resolve_sets_defaults_and_normalizes() {
        let mut config = Config {
            gitlab_endpoint: Some("https://gitlab.example.com/".into()),
            root_group: Some("/infra/ansible/".into()),
            gitlab_token: Some(String::new()),
            ..Default::default()
        };

        config.resolve().unwrap();

        assert_eq!(config.gitlab_endpoint(), "https://gitlab.example.com");
        assert_eq!(config.root_group(), "infra/ansible");
        assert_eq!(config.port, Some(8181));
        assert_eq!(config.timeout.as_deref(), Some("5s"));
        assert_eq!(config.version_order, Some(VersionOrder::Semver));
        assert!(config.gitlab_token.is_none());
    }

    #[test]
    fn test_resolve_rejects_invalid_endpoint() {
        let mut config = Config {
            gitlab_endpoint: Some("gitlab.example.com".into()),
            ..Default::default()
        };
        assert!(matches!(
            config.resolve(),
            Err(ConfigError::InvalidEndpoint(_))
        ));

        let mut config = Config {
            gitlab_endpoint: Some("ftp://gitlab.example.com".into()),
            ..Default::default()
        };
        assert!(matches!(
            config.resolve(),
            Err(ConfigError::InvalidEndpoint(_))
        ));
    }

    #[test]
    fn test_resolve_rejects_invalid_timeout() {
        for timeout in ["", "0s", "soon"] {
            let mut config = Config {
                timeout: Some(timeout.into()),
                ..Default::default()
            };
            assert!(
                matches!(config.resolve(), Err(ConfigError::InvalidTimeout(_))),
                "timeout {timeout:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_resolve_compression_level() {
        let mut config = Config::default();
        config.resolve().unwrap();
        assert_eq!(config.compression_level, Some(6));

        let mut config = Config {
            compression_level: Some(0),
            ..Default::default()
        };
        config.resolve().unwrap();
        assert_eq!(config.compression_level(), 0);

        let mut config = Config {
            compression_level: Some(10),
            ..Default::default()
        };
        assert!(matches!(
            config.resolve(),
            Err(ConfigError::InvalidCompressionLevel(10))
        ));
    }

    #[test]
    fn test_resolve_rejects_invalid_protocol() {
        let mut config = Config {
            protocol: Some("gopher".into()),
            ..Default::default()
        };
        assert!(matches!(
            config.resolve(),
            Err(ConfigError::InvalidProtocol(_))
        ));
    }

    #[test]
    fn test_public_url_override() {
        let mut config = Config {
            public_url: Some("https://galaxy.example.com/".into()),
            ..Default::default()
        };
        config.resolve().unwrap();
        assert_eq!(config.public_url(), "https://galaxy.example.com");
    }

    #[test]
    fn test_timeout_parsing() {
        let config = Config {
            timeout: Some("1m30s".into()),
            ..Default::default()
        };
        assert_eq!(config.timeout(), Duration::from_secs(90));
    }

    #[test]
    #[serial]
    fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
gitlab_endpoint = "https://git.internal"
root_group = "ops/collections"
port = 9000
version_order = "lexical"
insecure_skip_tls_verify = false
"#,
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();

        assert_eq!(config.gitlab_endpoint(), "https://git.internal");
        assert_eq!(config.root_group(), "ops/collections");
        assert_eq!(config.port(), 9000);
        assert_eq!(config.version_order(), VersionOrder::Lexical);
        assert!(!config.insecure_skip_tls_verify());
        assert_eq!(config.target_path.as_deref(), Some("/tmp/galaxy-light"));
    }

    #[test]
    #[serial]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config.gitlab_endpoint(), DEFAULT_GITLAB_ENDPOINT);
    }

    #[test]
    #[serial]
    fn test_load_invalid_toml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "port = \"not a number\"").unwrap();

        assert!(matches!(
            Config::load(Some(&path)),
            Err(ConfigError::TomlDeError(_))
        ));
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        with_env(
            &[
                ("GALAXY_LIGHT_GITLAB_ENDPOINT", Some("https://gitlab.corp")),
                ("GALAXY_LIGHT_GITLAB_ROOT_GROUP", Some("corp/ansible")),
                ("GALAXY_LIGHT_TARGET_PATH", Some("/srv/galaxy")),
                ("GALAXY_LIGHT_SERVER_BIND", Some("0.0.0.0")),
                ("GALAXY_LIGHT_SERVER_PORT", Some("9090")),
                ("GALAXY_LIGHT_SERVER_PROTOCOL", Some("https")),
            ],
            || {
                let mut config = Config::default_config();
                config.apply_env_overrides().unwrap();
                config.resolve().unwrap();

                assert_eq!(config.gitlab_endpoint(), "https://gitlab.corp");
                assert_eq!(config.root_group(), "corp/ansible");
                assert_eq!(config.get_target_path().unwrap(), PathBuf::from("/srv/galaxy"));
                assert_eq!(config.public_url(), "https://0.0.0.0:9090");
            },
        );
    }

    #[test]
    #[serial]
    fn test_env_override_invalid_port() {
        with_env(&[("GALAXY_LIGHT_SERVER_PORT", Some("eighty"))], || {
            let mut config = Config::default_config();
            assert!(matches!(
                config.apply_env_overrides(),
                Err(ConfigError::InvalidPort(_))
            ));
        });
    }

    #[test]
    #[serial]
    fn test_config_path_resolution() {
        with_env(&[("GALAXY_LIGHT_CONFIG", Some("/etc/galaxy-light.toml"))], || {
            assert_eq!(config_path(), PathBuf::from("/etc/galaxy-light.toml"));
        });

        with_env(
            &[
                ("GALAXY_LIGHT_CONFIG", None),
                ("XDG_CONFIG_HOME", Some("/tmp/xdg")),
            ],
            || {
                assert_eq!(
                    config_path(),
                    PathBuf::from("/tmp/xdg/galaxy-light/config.toml")
                );
            },
        );
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let config = Config::default_config();
        let serialized = toml::to_string(&config).unwrap();
        let deserialized: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(deserialized.gitlab_endpoint(), config.gitlab_endpoint());
        assert_eq!(deserialized.version_order(), config.version_order());
    }

    #[test]
    fn test_generate_default_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/config.toml");

        let written = generate_default_config(Some(&path)).unwrap();
        assert_eq!(written, path);

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("# Base URL of the GitLab instance"));
        assert!(content.contains("gitlab_endpoint = \"http://127.0.0.1:8080\""));

        let parsed: Config = toml::from_str(&content).unwrap();
        assert_eq!(parsed.port, Some(DEFAULT_PORT));

        assert!(matches!(
            generate_default_config(Some(&path)),
            Err(ConfigError::ConfigAlreadyExists)
        ));
    }
}
