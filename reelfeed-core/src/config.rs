use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, anyhow};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable naming a TOML or JSON configuration file.
pub const CONFIG_PATH_ENV: &str = "REELFEED_CONFIG_PATH";
/// Environment variable carrying an inline JSON configuration.
pub const CONFIG_JSON_ENV: &str = "REELFEED_CONFIG_JSON";
/// File picked up from the working directory when no env override is set.
pub const DEFAULT_CONFIG_FILE: &str = "reelfeed.toml";

/// Source that produced the coordinator configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConfigSource {
    #[default]
    Default,
    EnvPath(PathBuf),
    EnvInline,
    File(PathBuf),
}

/// Tuning knobs for the playback coordinator.
///
/// Every field carries a default so partial files only need to name what
/// they change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    /// Quiet period after the last scroll event before the candidate is
    /// recomputed.
    pub debounce_window_ms: u64,
    /// Height of the visible feed area in content pixels.
    pub viewport_height: f32,
    /// Start the first video of a freshly delivered feed without waiting
    /// for a scroll.
    pub autoplay_first: bool,
    /// Mute every video as it becomes active.
    pub mute_on_activate: bool,
    /// Upper bound for a single native control call. Calls that exceed it
    /// count as failures.
    pub control_timeout_ms: u64,
    /// Capacity of the coordinator's command mailbox.
    pub mailbox_capacity: usize,
    /// Fixed-height layout heuristic.
    pub layout: LayoutConfig,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            debounce_window_ms: 150,
            viewport_height: 800.0,
            autoplay_first: true,
            mute_on_activate: true,
            control_timeout_ms: 3_000,
            mailbox_capacity: 256,
            layout: LayoutConfig::default(),
        }
    }
}

/// Estimated per-kind item heights used instead of measured layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub video_height: f32,
    pub image_height: f32,
    /// Vertical gap between consecutive items.
    pub item_spacing: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            video_height: 600.0,
            image_height: 400.0,
            item_spacing: 0.0,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigGuardRailError {
    #[error("debounce_window_ms must be at least 1")]
    ZeroDebounce,
    #[error("control_timeout_ms must be at least 1")]
    ZeroControlTimeout,
    #[error("mailbox_capacity must be at least 1")]
    ZeroMailbox,
    #[error("{field} must be a finite positive number (got {value})")]
    NonPositive { field: &'static str, value: f32 },
    #[error("layout.item_spacing must be finite and non-negative (got {0})")]
    NegativeSpacing(f32),
}

impl CoordinatorConfig {
    pub fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.debounce_window_ms)
    }

    pub fn control_timeout(&self) -> Duration {
        Duration::from_millis(self.control_timeout_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigGuardRailError> {
        if self.debounce_window_ms == 0 {
            return Err(ConfigGuardRailError::ZeroDebounce);
        }
        if self.control_timeout_ms == 0 {
            return Err(ConfigGuardRailError::ZeroControlTimeout);
        }
        if self.mailbox_capacity == 0 {
            return Err(ConfigGuardRailError::ZeroMailbox);
        }
        positive("viewport_height", self.viewport_height)?;
        positive("layout.video_height", self.layout.video_height)?;
        positive("layout.image_height", self.layout.image_height)?;
        let spacing = self.layout.item_spacing;
        if !spacing.is_finite() || spacing < 0.0 {
            return Err(ConfigGuardRailError::NegativeSpacing(spacing));
        }
        Ok(())
    }

    /// Load configuration overrides using environment variables.
    /// Evaluation order:
    /// 1) `$REELFEED_CONFIG_PATH` (TOML or JSON file),
    /// 2) `$REELFEED_CONFIG_JSON` (inline JSON),
    /// 3) `reelfeed.toml` in the working directory,
    /// 4) defaults.
    pub fn load_from_env() -> anyhow::Result<(Self, ConfigSource)> {
        if let Ok(path_str) = env::var(CONFIG_PATH_ENV)
            && !path_str.trim().is_empty()
        {
            let path = PathBuf::from(path_str);
            let config = Self::load_from_file(&path)?;
            return Ok((config, ConfigSource::EnvPath(path)));
        }

        if let Ok(raw) = env::var(CONFIG_JSON_ENV)
            && !raw.trim().is_empty()
        {
            let parsed = Self::parse_json(&raw)
                .with_context(|| format!("failed to parse {CONFIG_JSON_ENV}"))?;
            return Ok((parsed, ConfigSource::EnvInline));
        }

        let local = PathBuf::from(DEFAULT_CONFIG_FILE);
        if local.is_file() {
            let config = Self::load_from_file(&local)?;
            return Ok((config, ConfigSource::File(local)));
        }

        Ok((Self::default(), ConfigSource::Default))
    }

    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path).with_context(|| {
            format!("failed to read coordinator config from {}", path.display())
        })?;

        let config: Self = match path.extension().and_then(|ext| ext.to_str())
        {
            Some("json") => serde_json::from_str::<Self>(&contents).with_context(
                || format!("invalid coordinator config {}", path.display()),
            )?,
            Some("toml") | Some("tml") => toml::from_str::<Self>(&contents)
                .map_err(|err| {
                    anyhow!(
                        "invalid coordinator config {}: {}",
                        path.display(),
                        err
                    )
                })?,
            _ => Self::parse_unchecked(
                &contents,
                &path.display().to_string(),
            )?,
        };

        config.validate().with_context(|| {
            format!("coordinator config {} rejected", path.display())
        })?;
        Ok(config)
    }

    /// Parse TOML, falling back to JSON, then validate.
    pub fn parse_from_str(contents: &str, origin: &str) -> anyhow::Result<Self> {
        let config = Self::parse_unchecked(contents, origin)?;
        config.validate()?;
        Ok(config)
    }

    pub fn parse_json(raw: &str) -> anyhow::Result<Self> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    fn parse_unchecked(contents: &str, origin: &str) -> anyhow::Result<Self> {
        toml::from_str(contents).or_else(|toml_err| {
            serde_json::from_str(contents).map_err(|json_err| {
                anyhow!(
                    "invalid coordinator config {origin}: toml error: {toml_err}; json error: {json_err}"
                )
            })
        })
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigGuardRailError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigGuardRailError::NonPositive { field, value })
    }
}
