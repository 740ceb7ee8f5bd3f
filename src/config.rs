//! # Configuration Management
//!
//! This module handles loading and parsing configuration from the
//! `paddle-config.toml` file. It describes the launch site, the two legs of the
//! route and which winds help or hinder each, the upstream data providers, and
//! the display window for the hourly table.
//!
//! The configuration is loaded once at startup and handed to the source
//! constructors and the forecast service. Nothing reads it from ambient state.

use crate::{CompassPoint, Leg};
use anyhow::Context;
use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Default configuration file name, looked up in the working directory
pub const CONFIG_FILE: &str = "paddle-config.toml";

/// Environment variable overriding the OpenWeatherMap API key
pub const OPENWEATHER_KEY_VAR: &str = "OPENWEATHER_API_KEY";
/// Environment variable overriding the NIWA API key
pub const NIWA_KEY_VAR: &str = "NIWA_API_KEY";

/// Application configuration loaded from paddle-config.toml
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Launch site location and timezone
    pub site: SiteConfig,
    /// Wind preferences for each leg of the route
    pub route: RouteProfile,
    /// Upstream weather and tide providers
    pub sources: SourcesConfig,
    /// Hourly table window
    pub display: DisplayConfig,
}

/// Launch site configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SiteConfig {
    /// Human-readable site name
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Fixed offset from UTC in hours used for all local times
    pub utc_offset_hours: i32,
}

impl SiteConfig {
    /// The site's UTC offset, or UTC if the configured value is out of range.
    pub fn offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_hours * 3600).unwrap_or_else(|| Utc.fix())
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        SiteConfig {
            name: "Ian Shaw Park".to_string(),
            latitude: -36.8485,
            longitude: 174.7633,
            utc_offset_hours: 12, // NZST
        }
    }
}

/// How the wind relates to a paddler on one leg.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WindRelation {
    Tailwind,
    Headwind,
    Crosswind,
    /// Not listed in any of the leg's sets
    Neutral,
}

/// Wind preferences for one leg.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LegProfile {
    /// Where this leg ends, used in recommendation text
    pub destination: String,
    pub tailwinds: Vec<CompassPoint>,
    pub headwinds: Vec<CompassPoint>,
    pub crosswinds: Vec<CompassPoint>,
}

impl LegProfile {
    /// Classify a wind direction for this leg.
    ///
    /// Sets are checked tailwind first, then headwind, then crosswind.
    pub fn wind_relation(&self, direction: CompassPoint) -> WindRelation {
        if self.tailwinds.contains(&direction) {
            WindRelation::Tailwind
        } else if self.headwinds.contains(&direction) {
            WindRelation::Headwind
        } else if self.crosswinds.contains(&direction) {
            WindRelation::Crosswind
        } else {
            WindRelation::Neutral
        }
    }
}

/// Both legs of the route.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RouteProfile {
    pub outgoing: LegProfile,
    pub incoming: LegProfile,
}

impl RouteProfile {
    pub fn leg(&self, leg: Leg) -> &LegProfile {
        match leg {
            Leg::Outgoing => &self.outgoing,
            Leg::Incoming => &self.incoming,
        }
    }

    /// The same route with the two legs' profiles exchanged.
    pub fn swapped(&self) -> RouteProfile {
        RouteProfile {
            outgoing: self.incoming.clone(),
            incoming: self.outgoing.clone(),
        }
    }
}

impl Default for RouteProfile {
    fn default() -> Self {
        use CompassPoint::*;
        // Ian Shaw Park sits south-west of Bucklands Beach across the channel
        let crosswinds = vec![N, S, SE, NW];
        let outbound = vec![NE, ENE, E];
        let inbound: Vec<CompassPoint> = outbound.iter().map(|p| p.opposite()).collect();
        RouteProfile {
            outgoing: LegProfile {
                destination: "Bucklands Beach".to_string(),
                tailwinds: outbound.clone(),
                headwinds: inbound.clone(),
                crosswinds: crosswinds.clone(),
            },
            incoming: LegProfile {
                destination: "Ian Shaw Park".to_string(),
                tailwinds: inbound,
                headwinds: outbound,
                crosswinds,
            },
        }
    }
}

/// Upstream provider configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SourcesConfig {
    /// Skip live providers and use synthetic data only
    pub offline: bool,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    pub openweathermap: ProviderConfig,
    pub niwa: ProviderConfig,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        SourcesConfig {
            offline: false,
            timeout_secs: 10,
            openweathermap: ProviderConfig {
                base_url: "https://api.openweathermap.org/data/2.5".to_string(),
                api_key: None,
            },
            niwa: ProviderConfig {
                base_url: "https://api.niwa.co.nz/tides".to_string(),
                api_key: None,
            },
        }
    }
}

/// One HTTP provider
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderConfig {
    pub base_url: String,
    /// Left out of the file when supplied through the environment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

/// Hourly table configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// First hour shown in the hourly table (inclusive)
    pub first_hour: u32,
    /// Last hour shown in the hourly table (inclusive)
    pub last_hour: u32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig {
            first_hour: 14,
            last_hour: 20,
        }
    }
}

impl Config {
    /// Load configuration from paddle-config.toml
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load() -> Self {
        Self::load_from_path(CONFIG_FILE)
    }

    /// Load configuration from specified path
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<Config>(&contents) {
                Ok(config) => {
                    info!(site = %config.site.name, path = %path.display(), "loaded configuration");
                    config
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "invalid config file, using defaults");
                    Self::default()
                }
            },
            Err(_) => {
                info!(path = %path.display(), "no config file found, using defaults");
                Self::default()
            }
        }
    }

    /// Apply API keys from `OPENWEATHER_API_KEY` and `NIWA_API_KEY`.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|name| std::env::var(name).ok())
    }

    /// Apply API keys from an arbitrary lookup; empty values are ignored.
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        if let Some(key) = non_empty(OPENWEATHER_KEY_VAR) {
            self.sources.openweathermap.api_key = Some(key);
        }
        if let Some(key) = non_empty(NIWA_KEY_VAR) {
            self.sources.niwa.api_key = Some(key);
        }
        self
    }

    /// Save current configuration to paddle-config.toml
    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to_path(CONFIG_FILE)
    }

    /// Save current configuration to the given path
    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let path = path.as_ref();
        let contents = toml::to_string_pretty(self).context("serialize configuration")?;
        fs::write(path, contents).with_context(|| format!("write {}", path.display()))?;
        info!(path = %path.display(), "configuration saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.site.name, "Ian Shaw Park");
        assert_eq!(config.site.utc_offset_hours, 12);
        assert_eq!(config.route.outgoing.destination, "Bucklands Beach");
        assert_eq!(
            config.route.incoming.tailwinds,
            vec![CompassPoint::SW, CompassPoint::WSW, CompassPoint::W]
        );
        assert_eq!(
            config.route.incoming.headwinds,
            config.route.outgoing.tailwinds
        );
        assert_eq!(config.display.first_hour, 14);
        assert_eq!(config.display.last_hour, 20);
        assert!(!config.sources.offline);
        assert!(config.sources.niwa.api_key.is_none());
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(config.site.name, parsed.site.name);
        assert_eq!(config.route, parsed.route);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let parsed: Config = toml::from_str(
            r#"
[site]
name = "Okahu Bay"
latitude = -36.85
longitude = 174.81
utc_offset_hours = 13
"#,
        )
        .unwrap();
        assert_eq!(parsed.site.name, "Okahu Bay");
        assert_eq!(parsed.site.offset().local_minus_utc(), 13 * 3600);
        assert_eq!(parsed.route, RouteProfile::default());
    }

    #[test]
    fn test_load_nonexistent_file() {
        let config = Config::load_from_path("/nonexistent/path");
        assert_eq!(config.site.name, "Ian Shaw Park");
    }

    #[test]
    fn test_load_invalid_file_falls_back() {
        let file = NamedTempFile::new().unwrap();
        fs::write(file.path(), "site = [not valid").unwrap();
        let config = Config::load_from_path(file.path());
        assert_eq!(config.site.name, "Ian Shaw Park");
    }

    #[test]
    fn test_save_then_load() {
        let file = NamedTempFile::new().unwrap();
        let mut config = Config::default();
        config.sources.offline = true;
        config.display.first_hour = 10;
        config.save_to_path(file.path()).unwrap();

        let loaded = Config::load_from_path(file.path());
        assert!(loaded.sources.offline);
        assert_eq!(loaded.display.first_hour, 10);
    }

    #[test]
    fn test_env_overrides_set_api_keys() {
        let config = Config::default().with_overrides_from(|name| match name {
            OPENWEATHER_KEY_VAR => Some("owm-key".to_string()),
            NIWA_KEY_VAR => Some("  ".to_string()),
            _ => None,
        });
        assert_eq!(
            config.sources.openweathermap.api_key.as_deref(),
            Some("owm-key")
        );
        assert!(config.sources.niwa.api_key.is_none());
    }

    #[test]
    fn test_out_of_range_offset_falls_back_to_utc() {
        let site = SiteConfig {
            utc_offset_hours: 48,
            ..SiteConfig::default()
        };
        assert_eq!(site.offset().local_minus_utc(), 0);
    }

    #[test]
    fn test_wind_relation() {
        let route = RouteProfile::default();
        assert_eq!(
            route.outgoing.wind_relation(CompassPoint::NE),
            WindRelation::Tailwind
        );
        assert_eq!(
            route.incoming.wind_relation(CompassPoint::NE),
            WindRelation::Headwind
        );
        assert_eq!(
            route.incoming.wind_relation(CompassPoint::SE),
            WindRelation::Crosswind
        );
        assert_eq!(
            route.outgoing.wind_relation(CompassPoint::NNE),
            WindRelation::Neutral
        );
        assert_eq!(route.swapped().outgoing, route.incoming);
    }
}
