use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_CONFIG_PATH: &str = "statusboard.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("cannot write default config file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("ignoring invalid STATUSBOARD_PORT {value:?}")]
    InvalidPort { value: String },
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub app: AppConfig,
    #[serde(default)]
    pub host: HostConfig,
    #[serde(default)]
    pub deployment: DeploymentConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub software: Option<String>,
}
fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port(), software: None }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_clean_log")]
    pub clean_log_on_start: bool,
}
fn default_clean_log() -> bool {
    true
}
impl Default for LoggingConfig {
    fn default() -> Self {
        Self { clean_log_on_start: default_clean_log() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub debug: bool,
    #[serde(default = "default_environment")]
    pub environment: String,
}
fn default_environment() -> String {
    "prod".into()
}
impl Default for AppConfig {
    fn default() -> Self {
        Self { debug: false, environment: default_environment() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HostConfig {
    #[serde(default = "default_uptime_path")]
    pub uptime_path: PathBuf,
}
fn default_uptime_path() -> PathBuf {
    PathBuf::from("/proc/uptime")
}
impl Default for HostConfig {
    fn default() -> Self {
        Self { uptime_path: default_uptime_path() }
    }
}

/// Static labels printed on the page. None of these are computed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DeploymentConfig {
    pub title: String,
    pub subtitle: String,
    pub container: String,
    pub orchestrator: String,
    pub replicas: u32,
    pub reverse_proxy: String,
    pub load_balancer: String,
    pub port_mapping: String,
    pub badges: Vec<String>,
    pub footer: String,
}

impl Default for DeploymentConfig {
    fn default() -> Self {
        Self {
            title: "DevOps Status".into(),
            subtitle: "Deployed via Docker Swarm + NGINX + CI/CD + Ansible".into(),
            container: "Rust + Axum".into(),
            orchestrator: "Docker Swarm".into(),
            replicas: 2,
            reverse_proxy: "NGINX".into(),
            load_balancer: "Upstream".into(),
            port_mapping: "80 → 8080".into(),
            badges: ["Docker Swarm", "NGINX", "GitHub Actions", "Ansible", "AWS EC2"]
                .into_iter()
                .map(String::from)
                .collect(),
            footer: "DevOps Assessment - Application Deployment".into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EffectiveConfig {
    pub host: String,
    pub port: u16,
    pub clean_log_on_start: bool,
    pub debug: bool,
    pub environment: String,
    pub server_software: Option<String>,
    pub uptime_path: PathBuf,
    pub deployment: DeploymentConfig,
}

pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# Statusboard Configuration

[server]
# Host/IP to bind. Default: 0.0.0.0 (env: STATUSBOARD_HOST)
host = "0.0.0.0"
# Port to bind. Default: 8080 (env: STATUSBOARD_PORT)
port = 8080
# Server software shown on the page. Default: unset, rendered as "Unknown" (env: SERVER_SOFTWARE)
# software = "nginx/1.25"

[logging]
# Truncate .logs/latest.log on startup. Default: true
clean_log_on_start = true

[app]
# Debug flag shown on the page. Default: false (env: APP_DEBUG, then YII_DEBUG)
debug = false
# Environment name shown on the page. Default: "prod" (env: APP_ENV, then YII_ENV)
environment = "prod"

[host]
# Pseudo-file holding seconds since boot as its first field. Uptime shows "N/A" if unreadable.
uptime_path = "/proc/uptime"

[deployment]
# Static labels rendered on the dashboard.
title = "DevOps Status"
subtitle = "Deployed via Docker Swarm + NGINX + CI/CD + Ansible"
container = "Rust + Axum"
orchestrator = "Docker Swarm"
replicas = 2
reverse_proxy = "NGINX"
load_balancer = "Upstream"
port_mapping = "80 → 8080"
badges = ["Docker Swarm", "NGINX", "GitHub Actions", "Ansible", "AWS EC2"]
footer = "DevOps Assessment - Application Deployment"
"#;

pub fn read_config_file(path: &Path) -> Result<RawConfig, ConfigError> {
    let contents = std::fs::read_to_string(path)
        .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
    toml::from_str(&contents).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
}

/// Result of loading the configuration. Loading happens before any tracing
/// subscriber is installed, so problems are kept here and emitted by
/// [`LoadedConfig::log_diagnostics`] once logging is up.
#[derive(Debug)]
pub struct LoadedConfig {
    pub cfg: EffectiveConfig,
    pub created_template: Option<PathBuf>,
    pub diagnostics: Vec<ConfigError>,
}

impl LoadedConfig {
    pub fn log_diagnostics(&self) {
        if let Some(path) = &self.created_template {
            tracing::info!(path = %path.display(), "Created default config file");
        }
        for e in &self.diagnostics {
            match e {
                ConfigError::Read { .. } | ConfigError::Parse { .. } => {
                    tracing::warn!(error = %e, "Using default configuration")
                }
                ConfigError::Write { .. } => tracing::warn!(error = %e, "Failed to create default config file"),
                ConfigError::InvalidPort { .. } => tracing::warn!(error = %e, "Keeping configured port"),
            }
        }
    }
}

/// Loads `.env`, then the config file, then applies environment overrides.
/// With `create_template` a missing file is first written from
/// [`DEFAULT_CONFIG_TEMPLATE`]; without it a missing file just means defaults.
/// Never fails: problems are collected and defaults stand in.
pub fn load_config(path: &Path, create_template: bool) -> LoadedConfig {
    let _ = dotenvy::dotenv();
    load_config_from(path, create_template, |key| std::env::var(key).ok())
}

pub fn load_config_from(
    path: &Path,
    create_template: bool,
    env: impl Fn(&str) -> Option<String>,
) -> LoadedConfig {
    let mut diagnostics = Vec::new();
    let mut created_template = None;

    let raw = if path.exists() || create_template {
        if !path.exists() {
            match std::fs::write(path, DEFAULT_CONFIG_TEMPLATE) {
                Ok(()) => created_template = Some(path.to_path_buf()),
                Err(source) => diagnostics.push(ConfigError::Write { path: path.to_path_buf(), source }),
            }
        }
        read_config_file(path).unwrap_or_else(|e| {
            diagnostics.push(e);
            RawConfig::default()
        })
    } else {
        RawConfig::default()
    };

    let cfg = resolve(raw, env, &mut diagnostics);
    LoadedConfig { cfg, created_template, diagnostics }
}

/// Merges file values with environment lookups. `env` is injected so the
/// precedence rules can be exercised without mutating the process environment.
pub fn resolve(
    raw: RawConfig,
    env: impl Fn(&str) -> Option<String>,
    diagnostics: &mut Vec<ConfigError>,
) -> EffectiveConfig {
    let non_blank = |key: &str| env(key).filter(|v| !v.trim().is_empty());

    let debug = env("APP_DEBUG").or_else(|| env("YII_DEBUG")).map(|v| is_truthy(&v)).unwrap_or(raw.app.debug);
    let environment = non_blank("APP_ENV")
        .or_else(|| non_blank("YII_ENV"))
        .or_else(|| Some(raw.app.environment).filter(|v| !v.trim().is_empty()))
        .unwrap_or_else(default_environment);

    let port = match env("STATUSBOARD_PORT") {
        Some(p) => p.trim().parse().unwrap_or_else(|_| {
            diagnostics.push(ConfigError::InvalidPort { value: p.clone() });
            raw.server.port
        }),
        None => raw.server.port,
    };

    EffectiveConfig {
        host: non_blank("STATUSBOARD_HOST").unwrap_or(raw.server.host),
        port,
        clean_log_on_start: raw.logging.clean_log_on_start,
        debug,
        environment,
        server_software: non_blank("SERVER_SOFTWARE").or(raw.server.software.filter(|s| !s.trim().is_empty())),
        uptime_path: raw.host.uptime_path,
        deployment: raw.deployment,
    }
}

fn is_truthy(value: &str) -> bool {
    let v = value.trim();
    v == "1" || v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("on") || v.eq_ignore_ascii_case("yes")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    fn env_of(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| vars.get(key).cloned()
    }

    fn resolve_with(raw: RawConfig, vars: &[(&str, &str)]) -> EffectiveConfig {
        resolve(raw, env_of(vars), &mut Vec::new())
    }

    #[test]
    fn defaults_without_env() {
        let cfg = resolve_with(RawConfig::default(), &[]);
        assert!(!cfg.debug);
        assert_eq!(cfg.environment, "prod");
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.host, "0.0.0.0");
        assert_eq!(cfg.server_software, None);
        assert_eq!(cfg.uptime_path, PathBuf::from("/proc/uptime"));
    }

    #[test]
    fn env_overrides_file() {
        let mut raw = RawConfig::default();
        raw.app.environment = "staging".into();
        raw.server.port = 9000;
        let cfg = resolve_with(
            raw,
            &[("APP_DEBUG", "true"), ("APP_ENV", "dev"), ("STATUSBOARD_PORT", "9100"), ("SERVER_SOFTWARE", "nginx")],
        );
        assert!(cfg.debug);
        assert_eq!(cfg.environment, "dev");
        assert_eq!(cfg.port, 9100);
        assert_eq!(cfg.server_software.as_deref(), Some("nginx"));
    }

    #[test]
    fn legacy_variable_names_are_fallbacks() {
        let cfg = resolve_with(RawConfig::default(), &[("YII_DEBUG", "1"), ("YII_ENV", "test")]);
        assert!(cfg.debug);
        assert_eq!(cfg.environment, "test");

        let cfg = resolve_with(RawConfig::default(), &[("APP_ENV", "dev"), ("YII_ENV", "test")]);
        assert_eq!(cfg.environment, "dev");
    }

    #[test]
    fn blank_environment_falls_back_to_prod() {
        let cfg = resolve_with(RawConfig::default(), &[("APP_ENV", "  ")]);
        assert_eq!(cfg.environment, "prod");
    }

    #[test]
    fn debug_truthiness() {
        for v in ["1", "true", "TRUE", "on", "Yes"] {
            assert!(resolve_with(RawConfig::default(), &[("APP_DEBUG", v)]).debug, "{v}");
        }
        for v in ["", "0", "false", "off", "no", "banana"] {
            assert!(!resolve_with(RawConfig::default(), &[("APP_DEBUG", v)]).debug, "{v}");
        }
    }

    #[test]
    fn env_debug_can_switch_off_file_debug() {
        let mut raw = RawConfig::default();
        raw.app.debug = true;
        assert!(!resolve_with(raw, &[("APP_DEBUG", "0")]).debug);
    }

    #[test]
    fn invalid_port_keeps_file_value() {
        let mut diagnostics = Vec::new();
        let cfg = resolve(RawConfig::default(), env_of(&[("STATUSBOARD_PORT", "eighty")]), &mut diagnostics);
        assert_eq!(cfg.port, 8080);
        assert!(matches!(diagnostics.as_slice(), [ConfigError::InvalidPort { value }] if value == "eighty"));
    }

    #[test]
    fn default_template_parses_to_defaults() {
        let raw: RawConfig = toml::from_str(DEFAULT_CONFIG_TEMPLATE).unwrap();
        assert_eq!(raw.deployment, DeploymentConfig::default());
        assert_eq!(raw.server.port, 8080);
        assert_eq!(raw.app.environment, "prod");
        assert!(raw.server.software.is_none());
    }

    #[test]
    fn partial_deployment_section_keeps_other_defaults() {
        let raw: RawConfig = toml::from_str("[deployment]\nreplicas = 5\n").unwrap();
        assert_eq!(raw.deployment.replicas, 5);
        assert_eq!(raw.deployment.reverse_proxy, "NGINX");
    }

    #[test]
    fn read_config_file_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("statusboard.toml");
        std::fs::write(&path, "[server\nport = ").unwrap();
        assert!(matches!(read_config_file(&path), Err(ConfigError::Parse { .. })));
        assert!(matches!(read_config_file(&dir.path().join("missing.toml")), Err(ConfigError::Read { .. })));
    }

    #[test]
    fn load_writes_template_when_asked() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("statusboard.toml");
        let loaded = load_config_from(&path, true, env_of(&[]));
        assert!(path.exists());
        assert_eq!(loaded.created_template.as_deref(), Some(path.as_path()));
        assert!(loaded.diagnostics.is_empty());
        assert_eq!(loaded.cfg.deployment, DeploymentConfig::default());
    }

    #[test]
    fn load_without_template_leaves_directory_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("statusboard.toml");
        let loaded = load_config_from(&path, false, env_of(&[]));
        assert!(!path.exists());
        assert!(loaded.created_template.is_none());
        assert!(loaded.diagnostics.is_empty());
        assert_eq!(loaded.cfg.port, 8080);
    }

    #[test]
    fn load_collects_file_and_env_problems() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[server\nport = ").unwrap();
        let loaded = load_config_from(&path, true, env_of(&[("STATUSBOARD_PORT", "eighty")]));
        assert_eq!(loaded.cfg.port, 8080);
        assert!(loaded.created_template.is_none());
        assert!(matches!(
            loaded.diagnostics.as_slice(),
            [ConfigError::Parse { .. }, ConfigError::InvalidPort { .. }]
        ));
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn diagnostics_reach_the_subscriber() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[server\nport = ").unwrap();

        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_max_level(tracing::Level::INFO)
            .with_writer(move || writer.clone())
            .finish();

        let loaded = load_config_from(&path, true, env_of(&[("STATUSBOARD_PORT", "eighty")]));
        tracing::subscriber::with_default(subscriber, || loaded.log_diagnostics());

        let logs = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(logs.contains("Using default configuration"), "{logs}");
        assert!(logs.contains("invalid config file"), "{logs}");
        assert!(logs.contains("ignoring invalid STATUSBOARD_PORT"), "{logs}");
        assert!(logs.contains("WARN"), "{logs}");
    }
}
