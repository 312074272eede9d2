use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::volume_profile::errors::{Result, VolumeProfileError};

pub type TimestampMS = i64;

/// Name of the mandatory volume column
pub const VOLUME_COLUMN: &str = "volume";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OhlcvCandle {
    pub open_time: TimestampMS,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl OhlcvCandle {
    pub fn new(open_time: TimestampMS, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            open_time,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

/// Row-ordered table of named numeric columns.
///
/// Row order is the temporal order of the observations; it is only used to
/// derive the direction of each price change.
#[derive(Debug, Clone, Default)]
pub struct ObservationTable {
    columns: FxHashMap<String, Vec<f64>>,
    row_count: usize,
}

impl ObservationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a column. All columns must share the same length.
    pub fn with_column(mut self, name: impl Into<String>, values: Vec<f64>) -> Result<Self> {
        self.insert_column(name, values)?;
        Ok(self)
    }

    pub fn insert_column(&mut self, name: impl Into<String>, values: Vec<f64>) -> Result<()> {
        let name = name.into();
        if name.is_empty() {
            return Err(VolumeProfileError::invalid("Column name must not be empty"));
        }

        let replacing_only_column = self.columns.len() == 1 && self.columns.contains_key(&name);
        if !self.columns.is_empty() && !replacing_only_column && values.len() != self.row_count {
            return Err(VolumeProfileError::invalid(format!(
                "Column {} has {} rows, table has {}",
                name,
                values.len(),
                self.row_count
            )));
        }

        self.row_count = values.len();
        self.columns.insert(name, values);
        Ok(())
    }

    /// Build a two column table from a price column and the volume column
    pub fn from_price_volume(price_col: &str, prices: Vec<f64>, volumes: Vec<f64>) -> Result<Self> {
        Self::new()
            .with_column(price_col, prices)?
            .with_column(VOLUME_COLUMN, volumes)
    }

    /// Build a table with open/high/low/close/volume columns from candles
    pub fn from_candles(candles: &[OhlcvCandle]) -> Self {
        let mut columns = FxHashMap::default();
        columns.insert("open".to_string(), candles.iter().map(|c| c.open).collect());
        columns.insert("high".to_string(), candles.iter().map(|c| c.high).collect());
        columns.insert("low".to_string(), candles.iter().map(|c| c.low).collect());
        columns.insert("close".to_string(), candles.iter().map(|c| c.close).collect());
        columns.insert(VOLUME_COLUMN.to_string(), candles.iter().map(|c| c.volume).collect());

        Self {
            columns,
            row_count: candles.len(),
        }
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns.get(name).map(|values| values.as_slice())
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    /// Price column plus the volume column, validated for presence
    pub fn price_volume(&self, price_col: &str) -> Result<(&[f64], &[f64])> {
        if price_col.is_empty() {
            return Err(VolumeProfileError::invalid("Price column not set"));
        }

        match (self.column(price_col), self.column(VOLUME_COLUMN)) {
            (Some(prices), Some(volumes)) => Ok((prices, volumes)),
            _ => Err(VolumeProfileError::invalid(format!(
                "Table does not contain {} or {} column",
                price_col, VOLUME_COLUMN
            ))),
        }
    }
}
