use std::{fs, io, path::Path, time::Duration};

use serde::Deserialize;
use shared::domain::Location;

use crate::{
    error::SettingsError,
    preview_cache::{DEFAULT_PREVIEW_BATCH_SIZE, DEFAULT_PREVIEW_CAPACITY},
};

pub const DEFAULT_SETTINGS_FILE: &str = "browser.toml";

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct PanelSettings {
    pub initial: f32,
    pub min: f32,
    pub max: f32,
}

impl PanelSettings {
    pub fn navigation_default() -> Self {
        Self {
            initial: 180.0,
            min: 180.0,
            max: 400.0,
        }
    }

    pub fn details_default() -> Self {
        Self {
            initial: 230.0,
            min: 230.0,
            max: 500.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    pub backend_url: String,
    pub initial_location: Option<Location>,
    pub preview_batch_size: usize,
    pub preview_cache_capacity: usize,
    pub system_stats_poll_ms: u64,
    pub navigation_panel: PanelSettings,
    pub details_panel: PanelSettings,
    pub activity_panel_width: f32,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            backend_url: "http://127.0.0.1:1420".into(),
            initial_location: None,
            preview_batch_size: DEFAULT_PREVIEW_BATCH_SIZE,
            preview_cache_capacity: DEFAULT_PREVIEW_CAPACITY,
            system_stats_poll_ms: 2000,
            navigation_panel: PanelSettings::navigation_default(),
            details_panel: PanelSettings::details_default(),
            activity_panel_width: 350.0,
        }
    }
}

impl SessionSettings {
    pub fn system_stats_poll_interval(&self) -> Duration {
        Duration::from_millis(self.system_stats_poll_ms)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.preview_batch_size == 0 {
            return Err(SettingsError::Invalid(
                "preview_batch_size must be at least 1".into(),
            ));
        }
        if self.preview_cache_capacity < self.preview_batch_size {
            return Err(SettingsError::Invalid(format!(
                "preview_cache_capacity ({}) must not be smaller than preview_batch_size ({})",
                self.preview_cache_capacity, self.preview_batch_size
            )));
        }
        if self.system_stats_poll_ms == 0 {
            return Err(SettingsError::Invalid(
                "system_stats_poll_ms must be positive".into(),
            ));
        }
        for (name, panel) in [
            ("navigation_panel", &self.navigation_panel),
            ("details_panel", &self.details_panel),
        ] {
            if !panel.min.is_finite() || !panel.max.is_finite() || panel.min > panel.max {
                return Err(SettingsError::Invalid(format!(
                    "{name} bounds must be finite with min <= max"
                )));
            }
        }
        if !self.activity_panel_width.is_finite() {
            return Err(SettingsError::Invalid(
                "activity_panel_width must be finite".into(),
            ));
        }
        Ok(())
    }
}

/// Defaults, then the optional TOML file, then `APP__*` environment overrides.
pub fn load_settings(path: Option<&Path>) -> Result<SessionSettings, SettingsError> {
    let path = path.unwrap_or_else(|| Path::new(DEFAULT_SETTINGS_FILE));
    let mut settings = match fs::read_to_string(path) {
        Ok(raw) => toml::from_str::<SessionSettings>(&raw).map_err(|source| {
            SettingsError::Parse {
                path: path.display().to_string(),
                source,
            }
        })?,
        Err(err) if err.kind() == io::ErrorKind::NotFound => SessionSettings::default(),
        Err(source) => {
            return Err(SettingsError::Read {
                path: path.display().to_string(),
                source,
            })
        }
    };

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok())?;
    settings.validate()?;
    Ok(settings)
}

fn apply_env_overrides(
    settings: &mut SessionSettings,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<(), SettingsError> {
    if let Some(v) = lookup("APP__BACKEND_URL") {
        settings.backend_url = v;
    }
    if let Some(v) = lookup("APP__INITIAL_LOCATION") {
        settings.initial_location = Some(Location::new(v));
    }
    if let Some(v) = lookup("APP__PREVIEW_BATCH_SIZE") {
        settings.preview_batch_size = parse_override("APP__PREVIEW_BATCH_SIZE", v)?;
    }
    if let Some(v) = lookup("APP__PREVIEW_CACHE_CAPACITY") {
        settings.preview_cache_capacity = parse_override("APP__PREVIEW_CACHE_CAPACITY", v)?;
    }
    if let Some(v) = lookup("APP__SYSTEM_STATS_POLL_MS") {
        settings.system_stats_poll_ms = parse_override("APP__SYSTEM_STATS_POLL_MS", v)?;
    }
    Ok(())
}

fn parse_override<T: std::str::FromStr>(key: &'static str, value: String) -> Result<T, SettingsError> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| SettingsError::InvalidOverride { key, value })
}
