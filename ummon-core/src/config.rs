use crate::error::ExporterError;
use crate::profile::MappingProfile;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Yaml},
};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::Path;

/// Upstream keys with their nested and legacy flat variable names.
///
/// These are read verbatim: figment's env provider would parse `007`
/// into the integer 7 and corrupt the credential.
const UPSTREAM_ENV: &[(&str, &str, &str)] = &[
    ("upstream.host", "UMMON_UPSTREAM__HOST", "UMMON_HOST"),
    ("upstream.user", "UMMON_UPSTREAM__USER", "UMMON_USER"),
    ("upstream.password", "UMMON_UPSTREAM__PASSWORD", "UMMON_PASSWORD"),
    ("upstream.scheme", "UMMON_UPSTREAM__SCHEME", "HTTP_PROTO"),
];

/// Routes the server mounts next to the metrics endpoint.
const RESERVED_PATHS: &[&str] = &["/health"];

/// Top-level exporter configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExporterConfig {
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub mapping: MappingProfile,
}

/// Connection details for the ummon-server API.
#[derive(Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Host (optionally with port). Also used as the `instance` label value.
    #[serde(default, deserialize_with = "string_like")]
    pub host: String,
    #[serde(default, deserialize_with = "string_like")]
    pub user: String,
    #[serde(default, deserialize_with = "string_like")]
    pub password: String,
    #[serde(default = "default_scheme")]
    pub scheme: String,
}

/// Metrics endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_addr")]
    pub addr: String,
    #[serde(default = "default_metrics_path")]
    pub metrics_path: String,
}

// ── Defaults ──────────────────────────────────────────────────

fn default_scheme() -> String { "https".into() }
fn default_addr() -> String { "0.0.0.0:9745".into() }
fn default_metrics_path() -> String { "/metrics".into() }

// ── Impls ─────────────────────────────────────────────────────

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            user: String::new(),
            password: String::new(),
            scheme: default_scheme(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_addr(),
            metrics_path: default_metrics_path(),
        }
    }
}

impl fmt::Debug for UpstreamConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpstreamConfig")
            .field("host", &self.host)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("scheme", &self.scheme)
            .finish()
    }
}

impl UpstreamConfig {
    /// `<scheme>://<host>/`, the base every endpoint path is joined onto.
    pub fn base_url(&self) -> Result<String, ExporterError> {
        let host = self.host.trim().trim_end_matches('/');
        if host.is_empty() {
            return Err(ExporterError::Config(
                "upstream host is not set (UMMON_HOST)".into(),
            ));
        }
        match self.scheme.as_str() {
            "http" | "https" => Ok(format!("{}://{}/", self.scheme, host)),
            other => Err(ExporterError::Config(format!(
                "unsupported upstream scheme: {other}"
            ))),
        }
    }

    pub fn has_credentials(&self) -> bool {
        !self.user.is_empty()
    }
}

impl ExporterConfig {
    /// Load configuration from an optional YAML file + env overrides.
    ///
    /// `UMMON_SERVER__ADDR` style variables override nested keys. The
    /// upstream block is taken from `UMMON_UPSTREAM__*` and then from the
    /// legacy flat variables, always as unparsed strings.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut figment = Figment::new();
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }
        figment = figment.merge(
            Env::prefixed("UMMON_")
                .filter(|key| !key.as_str().to_ascii_lowercase().starts_with("upstream"))
                .split("__"),
        );
        for (key, nested, _) in UPSTREAM_ENV {
            if let Ok(value) = std::env::var(nested) {
                figment = figment.merge(Serialized::default(key, value));
            }
        }
        for (key, _, legacy) in UPSTREAM_ENV {
            if let Ok(value) = std::env::var(legacy) {
                figment = figment.merge(Serialized::default(key, value));
            }
        }
        Ok(figment.extract()?)
    }

    /// Fail fast on settings that would make every scrape fail or that
    /// the router cannot mount.
    pub fn validate(&self) -> Result<(), ExporterError> {
        self.upstream.base_url()?;
        let path = self.server.metrics_path.as_str();
        if !path.starts_with('/') {
            return Err(ExporterError::Config(format!(
                "metrics path must start with '/': {path}"
            )));
        }
        if RESERVED_PATHS.contains(&path) {
            return Err(ExporterError::Config(format!(
                "metrics path collides with a built-in route: {path}"
            )));
        }
        if path.contains(['{', '}', '*', ':']) {
            return Err(ExporterError::Config(format!(
                "metrics path must be a literal path: {path}"
            )));
        }
        Ok(())
    }
}

/// An unquoted YAML scalar such as `password: secret1` stays a string,
/// but `user: 1001` arrives as a number. Accept any scalar and keep its
/// text; quote values whose exact spelling matters.
fn string_like<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Str(String),
        Int(i64),
        Float(f64),
        Bool(bool),
    }

    Ok(match Scalar::deserialize(deserializer)? {
        Scalar::Str(s) => s,
        Scalar::Int(n) => n.to_string(),
        Scalar::Float(n) => n.to_string(),
        Scalar::Bool(b) => b.to_string(),
    })
}
