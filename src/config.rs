use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::constants::{
    CHART_HEIGHT, CHART_WIDTH, DEFAULT_TOP_N, REQUEST_TIMEOUT_SECS, SYNTHETIC_SEED,
    YAHOO_CHART_BASE_URL,
};
use crate::error::ConfigError;
use crate::model::{jse_sectors, Period, Sector, SectorUniverse};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Yahoo,
    Synthetic,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AnalysisConfig {
    pub period: Period,
    pub top: usize,
    pub source: SourceKind,
    pub seed: u64,
    pub base_url: String,
    pub request_timeout: Duration,
    pub chart: ChartSettings,
    pub universe: SectorUniverse,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChartSettings {
    pub enabled: bool,
    pub width: u32,
    pub height: u32,
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            width: CHART_WIDTH,
            height: CHART_HEIGHT,
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            period: Period::default(),
            top: DEFAULT_TOP_N,
            source: SourceKind::Yahoo,
            seed: SYNTHETIC_SEED,
            base_url: YAHOO_CHART_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            chart: ChartSettings::default(),
            universe: jse_sectors(),
        }
    }
}

/// On-disk shape of the TOML config. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    period: Option<Period>,
    top: Option<usize>,
    source: Option<SourceKind>,
    seed: Option<u64>,
    base_url: Option<String>,
    request_timeout_secs: Option<u64>,
    chart: ChartFile,
    sectors: Vec<Sector>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ChartFile {
    enabled: Option<bool>,
    width: Option<u32>,
    height: Option<u32>,
}

impl AnalysisConfig {
    /// Defaults, overlaid with the TOML file at `path` when one is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml(&raw).with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(raw).context("failed to parse TOML")?;
        let defaults = Self::default();

        let universe = if file.sectors.is_empty() {
            defaults.universe
        } else {
            SectorUniverse::new(file.sectors)?
        };

        let config = Self {
            period: file.period.unwrap_or(defaults.period),
            top: file.top.unwrap_or(defaults.top),
            source: file.source.unwrap_or(defaults.source),
            seed: file.seed.unwrap_or(defaults.seed),
            base_url: file.base_url.unwrap_or(defaults.base_url),
            request_timeout: file
                .request_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
            chart: ChartSettings {
                enabled: file.chart.enabled.unwrap_or(defaults.chart.enabled),
                width: file.chart.width.unwrap_or(defaults.chart.width),
                height: file.chart.height.unwrap_or(defaults.chart.height),
            },
            universe,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.top == 0 {
            return Err(ConfigError::InvalidTop);
        }
        if self.universe.is_empty() {
            return Err(ConfigError::EmptyUniverse);
        }
        Ok(())
    }
}
