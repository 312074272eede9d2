use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

use super::errors::{Result, VolumeProfileError};

fn default_percent() -> f64 {
    0.7
}

fn default_nr_bins() -> usize {
    10
}

fn default_nr_volumes() -> usize {
    2
}

fn default_price_col() -> String {
    "close".to_string()
}

/// Per-symbol overrides of the profile parameters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileOverride {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nr_bins: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nr_volumes: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_col: Option<String>,
}

/// Volume profile configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolumeProfileConfig {
    /// Fraction of total volume the value area must capture, in (0, 1]
    #[serde(default = "default_percent")]
    pub percent: f64,
    /// Number of equal-width price bins, in (0, rows)
    #[serde(default = "default_nr_bins")]
    pub nr_bins: usize,
    /// Bins aggregated per growth step, in (0, nr_bins)
    #[serde(default = "default_nr_volumes")]
    pub nr_volumes: usize,
    /// Name of the price column in the observation table
    #[serde(default = "default_price_col")]
    pub price_col: String,
    #[serde(default)]
    pub symbol_overrides: HashMap<String, ProfileOverride>,
}

impl Default for VolumeProfileConfig {
    fn default() -> Self {
        Self {
            percent: default_percent(),
            nr_bins: default_nr_bins(),
            nr_volumes: default_nr_volumes(),
            price_col: default_price_col(),
            symbol_overrides: HashMap::new(),
        }
    }
}

impl VolumeProfileConfig {
    /// Parse from TOML, either a bare table or one nested under `[volume_profile]`
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let mut table: toml::Table = toml::from_str(content)?;
        let config: VolumeProfileConfig = match table.remove("volume_profile") {
            Some(section) => section.try_into()?,
            None => toml::Value::Table(table).try_into()?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading volume profile config from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Resolve configuration for a specific symbol, applying overrides if they exist
    pub fn resolve_for_symbol(&self, symbol: &str) -> VolumeProfileConfig {
        let symbol_override = self.symbol_overrides.get(symbol);

        VolumeProfileConfig {
            percent: symbol_override
                .and_then(|o| o.percent)
                .unwrap_or(self.percent),
            nr_bins: symbol_override
                .and_then(|o| o.nr_bins)
                .unwrap_or(self.nr_bins),
            nr_volumes: symbol_override
                .and_then(|o| o.nr_volumes)
                .unwrap_or(self.nr_volumes),
            price_col: symbol_override
                .and_then(|o| o.price_col.clone())
                .unwrap_or_else(|| self.price_col.clone()),
            symbol_overrides: HashMap::new(),
        }
    }

    /// Validate parameter domains that do not depend on the input size
    pub fn validate(&self) -> Result<()> {
        Self::validate_parameters(self.percent, self.nr_bins, self.nr_volumes, &self.price_col)?;

        for symbol in self.symbol_overrides.keys() {
            let resolved = self.resolve_for_symbol(symbol);
            Self::validate_parameters(resolved.percent, resolved.nr_bins, resolved.nr_volumes, &resolved.price_col)
                .map_err(|e| match e {
                    VolumeProfileError::InvalidArgument(msg) => {
                        VolumeProfileError::invalid(format!("Symbol {}: {}", symbol, msg))
                    }
                    other => other,
                })?;
        }

        Ok(())
    }

    /// Validate against the number of observations in the window
    pub fn validate_for_rows(&self, row_count: usize) -> Result<()> {
        self.validate()?;
        if self.nr_bins >= row_count {
            return Err(VolumeProfileError::invalid(format!(
                "nr_bins must be smaller than the number of observations, got nr_bins={} rows={}",
                self.nr_bins, row_count
            )));
        }
        Ok(())
    }

    fn validate_parameters(percent: f64, nr_bins: usize, nr_volumes: usize, price_col: &str) -> Result<()> {
        if !(percent > 0.0 && percent <= 1.0) {
            return Err(VolumeProfileError::invalid(format!(
                "percent must be greater than 0.0 and at most 1.0, got {}",
                percent
            )));
        }

        if nr_bins == 0 {
            return Err(VolumeProfileError::invalid("nr_bins must not be 0"));
        }

        if nr_volumes == 0 || nr_volumes > nr_bins - 1 {
            return Err(VolumeProfileError::invalid(format!(
                "nr_volumes must be greater than 0 and smaller than nr_bins, got nr_volumes={} nr_bins={}",
                nr_volumes, nr_bins
            )));
        }

        if price_col.is_empty() {
            return Err(VolumeProfileError::invalid("price_col must not be empty"));
        }

        Ok(())
    }
}
