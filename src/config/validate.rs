// src/config/validate.rs

use std::time::Duration;

use globset::Glob;

use crate::config::model::{
    ConfigFile, RawConfigFile, ServiceConfig, TimingSection, Timings, WatchConfig,
};
use crate::errors::{HotReloadError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = HotReloadError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        let service = validate_service(&raw)?;
        let watch = validate_watch(&raw)?;
        let timing = validate_timing(&raw.timing)?;
        Ok(ConfigFile::new_unchecked(service, watch, timing))
    }
}

fn validate_service(cfg: &RawConfigFile) -> Result<ServiceConfig> {
    let cmd = cfg.service.cmd.trim();
    if cmd.is_empty() {
        return Err(HotReloadError::ConfigError(
            "[service].cmd must not be empty".to_string(),
        ));
    }

    if cfg.service.port == 0 {
        return Err(HotReloadError::ConfigError(
            "[service].port must be between 1 and 65535 (got 0)".to_string(),
        ));
    }

    Ok(ServiceConfig {
        cmd: cmd.to_string(),
        port: cfg.service.port,
        resolver: cfg.service.resolver,
    })
}

fn validate_watch(cfg: &RawConfigFile) -> Result<WatchConfig> {
    let mut extensions = Vec::new();
    for ext in cfg.watch.extensions.iter() {
        let ext = normalize_extension(ext).ok_or_else(|| {
            HotReloadError::ConfigError(format!(
                "[watch].extensions contains an empty extension ({:?})",
                ext
            ))
        })?;
        if !extensions.contains(&ext) {
            extensions.push(ext);
        }
    }

    if extensions.is_empty() {
        return Err(HotReloadError::ConfigError(
            "[watch].extensions must list at least one extension".to_string(),
        ));
    }

    for pattern in cfg.watch.exclude.iter() {
        Glob::new(pattern).map_err(|e| {
            HotReloadError::ConfigError(format!(
                "[watch].exclude has invalid glob '{}': {}",
                pattern, e
            ))
        })?;
    }

    let poll_interval = duration_field("[watch].poll_interval", &cfg.watch.poll_interval)?;
    if poll_interval.is_zero() {
        return Err(HotReloadError::ConfigError(
            "[watch].poll_interval must be greater than zero".to_string(),
        ));
    }

    Ok(WatchConfig {
        root: cfg.watch.root.clone(),
        extensions,
        exclude: cfg.watch.exclude.clone(),
        poll_interval,
    })
}

fn validate_timing(timing: &TimingSection) -> Result<Timings> {
    if timing.port_wait_attempts == 0 {
        return Err(HotReloadError::ConfigError(
            "[timing].port_wait_attempts must be >= 1 (got 0)".to_string(),
        ));
    }

    Ok(Timings {
        port_wait_attempts: timing.port_wait_attempts,
        port_wait_interval: duration_field(
            "[timing].port_wait_interval",
            &timing.port_wait_interval,
        )?,
        graceful_wait_attempts: timing.graceful_wait_attempts,
        graceful_wait_interval: duration_field(
            "[timing].graceful_wait_interval",
            &timing.graceful_wait_interval,
        )?,
        probe_timeout: duration_field("[timing].probe_timeout", &timing.probe_timeout)?,
    })
}

fn duration_field(field: &str, value: &str) -> Result<Duration> {
    parse_duration(value)
        .map_err(|e| HotReloadError::ConfigError(format!("{field}: {e}")))
}

/// Turn `"go"` / `".go"` / `" .go "` into `".go"`; `None` for blank input.
fn normalize_extension(ext: &str) -> Option<String> {
    let ext = ext.trim().trim_start_matches('.');
    if ext.is_empty() {
        None
    } else {
        Some(format!(".{ext}"))
    }
}

/// Parse a simple duration string like `"2s"`, `"250ms"`, `"1m"`, `"2h"`.
pub fn parse_duration(s: &str) -> std::result::Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    // Find the boundary between digits and suffix.
    let idx = s
        .chars()
        .position(|c| !c.is_ascii_digit())
        .ok_or_else(|| format!("duration '{s}' is missing a unit suffix"))?;

    let (num_part, unit_part) = s.split_at(idx);
    let value: u64 = num_part
        .parse()
        .map_err(|e| format!("invalid duration number '{}': {}", num_part, e))?;
    let unit = unit_part.trim().to_lowercase();

    let secs_per_unit = match unit.as_str() {
        "ms" => return Ok(Duration::from_millis(value)),
        "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        _ => {
            return Err(format!(
                "unsupported duration unit '{}'; expected ms, s, m, or h",
                unit
            ));
        }
    };

    value
        .checked_mul(secs_per_unit)
        .map(Duration::from_secs)
        .ok_or_else(|| format!("duration '{s}' is too large"))
}
