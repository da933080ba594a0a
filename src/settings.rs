use std::path::Path;
use std::time::Duration;

use catalog_audit_lib::{
    AuditError, Config, ReconcileOptions, RemoteTarget, ViewTypeFilter, WebDavCredentials,
};

use crate::cli::RemoteArgs;

pub const USERNAME_ENV: &str = "CATALOG_AUDIT_USERNAME";
pub const PASSWORD_ENV: &str = "CATALOG_AUDIT_PASSWORD";

/// Remote settings after merging CLI args, config file, and environment.
#[derive(Debug, Clone)]
pub struct ResolvedRemoteSettings {
    pub target: RemoteTarget,
    pub credentials: WebDavCredentials,
    pub base_path: Option<String>,
    pub timeout: Duration,
}

impl ResolvedRemoteSettings {
    pub fn base_path_to_strip(&self) -> &str {
        self.base_path
            .as_deref()
            .unwrap_or(self.target.remote_path.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedAuditSettings {
    pub remote: ResolvedRemoteSettings,
    pub options: ReconcileOptions,
    pub parse_concurrently: bool,
}

/// Audit flags as given on the command line.
#[derive(Debug, Clone, Default)]
pub struct AuditFlags {
    pub view_type: Option<String>,
    pub all_view_types: bool,
    pub site_id: Option<String>,
    pub online_only: bool,
    pub sequential: bool,
}

/// Merge remote flags with config and environment, preferring CLI values.
///
/// Fails before any I/O when the URL is unusable or credentials are missing.
pub fn resolve_remote_settings(
    args: &RemoteArgs,
    config: &Config,
    env: impl Fn(&str) -> Option<String>,
) -> Result<ResolvedRemoteSettings, AuditError> {
    let url = args
        .webdav_url
        .clone()
        .or_else(|| config.webdav.url.clone())
        .ok_or_else(|| AuditError::Config("WebDAV URL is required".to_string()))?;
    let target = RemoteTarget::parse(&url)?;

    let username = args
        .username
        .clone()
        .or_else(|| config.webdav.username.clone())
        .or_else(|| env(USERNAME_ENV))
        .filter(|u| !u.is_empty())
        .ok_or_else(|| AuditError::Config("WebDAV username is required".to_string()))?;
    let password = args
        .password
        .clone()
        .or_else(|| env(PASSWORD_ENV))
        .ok_or_else(|| AuditError::Config("WebDAV password is required".to_string()))?;

    if args.timeout == Some(0) {
        return Err(AuditError::Config(
            "--timeout must be greater than zero seconds".to_string(),
        ));
    }

    Ok(ResolvedRemoteSettings {
        target,
        credentials: WebDavCredentials::new(username, password),
        base_path: args
            .base_path
            .clone()
            .or_else(|| config.webdav.base_path.clone()),
        timeout: args
            .timeout
            .map(Duration::from_secs)
            .unwrap_or(config.webdav.timeout),
    })
}

pub fn resolve_audit_settings(
    flags: &AuditFlags,
    remote: &RemoteArgs,
    config: &Config,
    env: impl Fn(&str) -> Option<String>,
) -> Result<ResolvedAuditSettings, AuditError> {
    let remote = resolve_remote_settings(remote, config, env)?;
    let view_type = if flags.all_view_types {
        ViewTypeFilter::All
    } else {
        ViewTypeFilter::from_setting(
            flags
                .view_type
                .as_deref()
                .or(config.view_type.as_deref()),
        )
    };

    Ok(ResolvedAuditSettings {
        remote,
        options: ReconcileOptions {
            view_type,
            site_id: flags.site_id.clone().or_else(|| config.site_id.clone()),
            online_only: flags.online_only || config.online_only,
        },
        parse_concurrently: !flags.sequential && config.parse_concurrently,
    })
}

/// Process environment lookup used outside tests.
pub fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Load config from a TOML file, central config, or return defaults.
/// Priority: explicit path > ~/.config/catalog-audit/config.toml > defaults
pub fn load_config(path: Option<&Path>) -> Result<Config, AuditError> {
    let cfg = Config::load(path).map_err(|e| {
        let loc = path
            .map(|p| p.display().to_string())
            .or_else(|| Config::central_config_path().map(|p| p.display().to_string()))
            .unwrap_or_else(|| "defaults".to_string());
        AuditError::Config(format!("Failed to read config {}: {}", loc, e))
    })?;

    cfg.validate().map_err(|e| {
        let prefix = path
            .map(|p| format!("Invalid config ({}): {}", p.display(), e))
            .unwrap_or_else(|| format!("Invalid config: {}", e));
        AuditError::Config(prefix)
    })?;
    Ok(cfg)
}

/// Format effective settings as a single-line string (password omitted).
pub fn format_effective_config(
    settings: &ResolvedAuditSettings,
    config_source: Option<&Path>,
) -> String {
    let source = config_source
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "defaults".to_string());
    format!(
        "Effective config [{source}]: view-type={}, site-id={}, online-only={}, concurrent-parse={}, webdav={} (user {}, base-path {}, timeout {}s)",
        settings.options.view_type,
        settings.options.site_id.as_deref().unwrap_or("-"),
        settings.options.online_only,
        settings.parse_concurrently,
        settings.remote.target.url(),
        settings.remote.credentials.username,
        settings.remote.base_path_to_strip(),
        settings.remote.timeout.as_secs(),
    )
}
