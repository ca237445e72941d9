// SPDX-FileCopyrightText: 2026 Trustgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./trustgate.toml` > `~/.config/trustgate/trustgate.toml` >
//! `/etc/trustgate/trustgate.toml` with environment variable overrides via `TRUSTGATE_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::GatewayConfig;

/// System-wide config path.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/trustgate/trustgate.toml";

/// Local (working directory) config file name.
pub const LOCAL_CONFIG_FILE: &str = "trustgate.toml";

/// Path of the per-user config file, if a config directory exists.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("trustgate").join(LOCAL_CONFIG_FILE))
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/trustgate/trustgate.toml`
/// 3. `~/.config/trustgate/trustgate.toml`
/// 4. `./trustgate.toml`
/// 5. `TRUSTGATE_*` environment variables
pub fn load_config() -> Result<GatewayConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<GatewayConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(GatewayConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<GatewayConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(GatewayConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the layered Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(GatewayConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
}

/// Environment provider with explicit section mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `TRUSTGATE_ROUTER_HEALTH_TTL_SECS` must map to
/// `router.health_ttl_secs`, not `router.health.ttl.secs`.
fn env_provider() -> Env {
    Env::prefixed("TRUSTGATE_").map(|key| {
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("gateway_", "gateway.", 1)
            .replacen("policy_", "policy.", 1)
            .replacen("transform_", "transform.", 1)
            .replacen("router_", "router.", 1)
            .replacen("audit_", "audit.", 1)
            .replacen("storage_", "storage.", 1);
        mapped.into()
    })
}
