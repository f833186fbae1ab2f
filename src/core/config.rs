use std::env;

use thiserror::Error;

const DEFAULT_CORS_ORIGINS: &[&str] = &[
    "http://localhost:5173",
    "http://localhost:3000",
    "http://localhost:8080",
];

#[derive(Debug, Clone)]
pub(crate) struct Settings {
    server: ServerSettings,
    runtime: RuntimeSettings,
    viewer: ViewerSettings,
    upstream: UpstreamSettings,
    cors: CorsSettings,
    telemetry: TelemetrySettings,
}

#[derive(Debug, Clone)]
pub(crate) struct ServerSettings {
    host: ServerHost,
    port: ServerPort,
}

/// Host-page settings: where the viewer bundle lives and which scripts the
/// normal and debug pages load.
#[derive(Debug, Clone)]
pub(crate) struct ViewerSettings {
    pub(crate) title: String,
    pub(crate) static_prefix: String,
    pub(crate) script: String,
    pub(crate) debug_script: String,
}

#[derive(Debug, Clone)]
pub(crate) struct UpstreamSettings {
    pub(crate) base_url: String,
    pub(crate) rois_path: String,
    pub(crate) timeout_seconds: u64,
    pub(crate) connect_timeout_seconds: u64,
    pub(crate) max_retries: u32,
}

#[derive(Debug, Clone)]
pub(crate) struct CorsSettings {
    pub(crate) origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub(crate) struct TelemetrySettings {
    pub(crate) log_level: String,
    pub(crate) json: bool,
    pub(crate) prometheus_enabled: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct RuntimeSettings {
    pub(crate) environment: Environment,
    pub(crate) strict_config: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Environment {
    Development,
    Production,
    Staging,
    Test,
}

impl Environment {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
            Environment::Staging => "staging",
            Environment::Test => "test",
        }
    }

    fn is_production(self) -> bool {
        matches!(self, Environment::Production)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ServerHost(String);

#[derive(Debug, Clone, Copy)]
pub(crate) struct ServerPort(u16);

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("invalid server host: {0}")]
    InvalidHost(String),
    #[error("invalid server port: {0}")]
    InvalidPort(String),
    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: String },
    #[error("invalid cors origins: {0}")]
    InvalidCors(String),
    #[error("missing required setting {0}")]
    MissingSetting(&'static str),
}

impl Settings {
    pub(crate) fn load() -> Result<Self, ConfigError> {
        let host = env_or_default("OL3_HOST", "0.0.0.0");
        let port = env_or_default("OL3_PORT", "8000");

        let environment =
            parse_environment(env_optional("OL3_ENV").or_else(|| env_optional("ENVIRONMENT")));
        let strict_config =
            env_optional("OL3_STRICT_CONFIG").map(|value| parse_bool(&value)).unwrap_or(false)
                || environment.is_production();

        let title = env_or_default("VIEWER_TITLE", "OL3 Viewer");
        let static_prefix = env_or_default("VIEWER_STATIC_PREFIX", "/static/ol3-viewer");
        let script = env_or_default("VIEWER_SCRIPT", "ol3-viewer.min.js");
        let debug_script = env_or_default("VIEWER_DEBUG_SCRIPT", "ol3-viewer.js");

        let upstream_base_url = env_optional("UPSTREAM_BASE_URL");
        if upstream_base_url.is_none() && strict_config {
            return Err(ConfigError::MissingSetting("UPSTREAM_BASE_URL"));
        }
        let rois_path = env_or_default("UPSTREAM_ROIS_PATH", "/webgateway/get_rois_json");
        let timeout_seconds =
            parse_u64("UPSTREAM_TIMEOUT_SECONDS", env_or_default("UPSTREAM_TIMEOUT_SECONDS", "30"))?;
        let connect_timeout_seconds = parse_u64(
            "UPSTREAM_CONNECT_TIMEOUT_SECONDS",
            env_or_default("UPSTREAM_CONNECT_TIMEOUT_SECONDS", "10"),
        )?;
        let max_retries =
            parse_u32("UPSTREAM_MAX_RETRIES", env_or_default("UPSTREAM_MAX_RETRIES", "2"))?;

        let cors_origins = parse_cors_origins(env_optional("BACKEND_CORS_ORIGINS"))?;

        let log_level = env_or_default("OL3_LOG_LEVEL", "info");
        let json = env_optional("OL3_LOG_JSON").map(|value| parse_bool(&value)).unwrap_or(false);
        let prometheus_enabled =
            env_optional("PROMETHEUS_ENABLED").map(|value| parse_bool(&value)).unwrap_or(false);

        let settings = Self {
            server: ServerSettings {
                host: ServerHost::parse(host)?,
                port: ServerPort::parse(port)?,
            },
            runtime: RuntimeSettings { environment, strict_config },
            viewer: ViewerSettings { title, static_prefix, script, debug_script },
            upstream: UpstreamSettings {
                base_url: upstream_base_url
                    .unwrap_or_else(|| "http://localhost:4080".to_string())
                    .trim_end_matches('/')
                    .to_string(),
                rois_path,
                timeout_seconds,
                connect_timeout_seconds,
                max_retries,
            },
            cors: CorsSettings { origins: cors_origins },
            telemetry: TelemetrySettings { log_level, json, prometheus_enabled },
        };

        settings.validate()?;

        Ok(settings)
    }

    pub(crate) fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host.0, self.server.port.0)
    }

    pub(crate) fn server_host(&self) -> &str {
        &self.server.host.0
    }

    pub(crate) fn server_port(&self) -> u16 {
        self.server.port.0
    }

    pub(crate) fn viewer(&self) -> &ViewerSettings {
        &self.viewer
    }

    pub(crate) fn upstream(&self) -> &UpstreamSettings {
        &self.upstream
    }

    pub(crate) fn cors(&self) -> &CorsSettings {
        &self.cors
    }

    pub(crate) fn telemetry(&self) -> &TelemetrySettings {
        &self.telemetry
    }

    pub(crate) fn runtime(&self) -> &RuntimeSettings {
        &self.runtime
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !self.viewer.static_prefix.starts_with('/') {
            return Err(ConfigError::InvalidValue {
                field: "VIEWER_STATIC_PREFIX",
                value: self.viewer.static_prefix.clone(),
            });
        }

        if !self.upstream.rois_path.starts_with('/') {
            return Err(ConfigError::InvalidValue {
                field: "UPSTREAM_ROIS_PATH",
                value: self.upstream.rois_path.clone(),
            });
        }

        if !(self.upstream.base_url.starts_with("http://")
            || self.upstream.base_url.starts_with("https://"))
        {
            return Err(ConfigError::InvalidValue {
                field: "UPSTREAM_BASE_URL",
                value: self.upstream.base_url.clone(),
            });
        }

        Ok(())
    }
}

impl UpstreamSettings {
    pub(crate) fn rois_url(&self, iid: i64) -> String {
        format!("{}{}/{}", self.base_url, self.rois_path.trim_end_matches('/'), iid)
    }
}

impl ServerHost {
    fn parse(value: String) -> Result<Self, ConfigError> {
        if value.trim().is_empty() {
            return Err(ConfigError::InvalidHost(value));
        }
        Ok(Self(value))
    }
}

impl ServerPort {
    fn parse(value: String) -> Result<Self, ConfigError> {
        let parsed: u16 = value.parse().map_err(|_| ConfigError::InvalidPort(value.clone()))?;
        if parsed == 0 {
            return Err(ConfigError::InvalidPort(value));
        }
        Ok(Self(parsed))
    }
}

fn env_optional(key: &str) -> Option<String> {
    env::var(key).ok().map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
}

fn env_or_default(key: &str, default: &str) -> String {
    env_optional(key).unwrap_or_else(|| default.to_string())
}

fn parse_u32(field: &'static str, value: String) -> Result<u32, ConfigError> {
    value.parse::<u32>().map_err(|_| ConfigError::InvalidValue { field, value })
}

fn parse_u64(field: &'static str, value: String) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidValue { field, value })
}

fn parse_cors_origins(value: Option<String>) -> Result<Vec<String>, ConfigError> {
    let Some(raw) = value else {
        return Ok(DEFAULT_CORS_ORIGINS.iter().map(|item| item.to_string()).collect());
    };

    if raw.trim().is_empty() {
        return Ok(DEFAULT_CORS_ORIGINS.iter().map(|item| item.to_string()).collect());
    }

    if raw.trim_start().starts_with('[') {
        let parsed: Vec<String> =
            serde_json::from_str(&raw).map_err(|_| ConfigError::InvalidCors(raw.clone()))?;
        if parsed.is_empty() {
            return Ok(DEFAULT_CORS_ORIGINS.iter().map(|item| item.to_string()).collect());
        }
        return Ok(parsed);
    }

    let items: Vec<String> = raw
        .split(',')
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect();

    if items.is_empty() {
        return Ok(DEFAULT_CORS_ORIGINS.iter().map(|item| item.to_string()).collect());
    }

    Ok(items)
}

fn parse_bool(value: &str) -> bool {
    matches!(value, "1" | "true" | "TRUE" | "yes" | "YES" | "on" | "ON")
}

fn parse_environment(value: Option<String>) -> Environment {
    match value.as_deref().map(|val| val.to_lowercase()) {
        Some(ref val) if val == "production" || val == "prod" => Environment::Production,
        Some(ref val) if val == "staging" => Environment::Staging,
        Some(ref val) if val == "test" || val == "testing" => Environment::Test,
        _ => Environment::Development,
    }
}
