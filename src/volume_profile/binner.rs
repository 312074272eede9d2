use tracing::debug;

use super::errors::{Result, VolumeProfileError};
use super::structs::Bin;
use crate::series::ObservationTable;

/// Direction of a price change versus the previous observation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceDirection {
    Up,
    Down,
    Unchanged,
}

impl PriceDirection {
    pub fn between(previous: f64, current: f64) -> Self {
        if current > previous {
            PriceDirection::Up
        } else if current < previous {
            PriceDirection::Down
        } else {
            PriceDirection::Unchanged
        }
    }
}

/// Direction of every observation; the first one has no predecessor
pub fn price_directions(prices: &[f64]) -> Vec<PriceDirection> {
    let mut directions = Vec::with_capacity(prices.len());
    if prices.is_empty() {
        return directions;
    }

    directions.push(PriceDirection::Unchanged);
    directions.extend(prices.windows(2).map(|w| PriceDirection::between(w[0], w[1])));
    directions
}

/// Partitions a price series into equal-width bins with directional volume
#[derive(Debug, Clone)]
pub struct Binner {
    nr_bins: usize,
}

impl Binner {
    pub fn new(nr_bins: usize) -> Self {
        Self { nr_bins }
    }

    /// Bin the `price_col` and volume columns of `table`
    pub fn bin_table(&self, table: &ObservationTable, price_col: &str) -> Result<Vec<Bin>> {
        let (prices, volumes) = table.price_volume(price_col)?;
        self.bin_series(prices, volumes)
    }

    pub fn bin_series(&self, prices: &[f64], volumes: &[f64]) -> Result<Vec<Bin>> {
        self.validate(prices, volumes)?;

        let (min_price, max_price) = price_range(prices);
        let edges = bin_edges(min_price, max_price, self.nr_bins);

        let mut bins: Vec<Bin> = edges
            .windows(2)
            .enumerate()
            .map(|(index, w)| Bin {
                index,
                lower_bound: w[0],
                upper_bound: w[1],
                mean_price: None,
                volume_positive: 0.0,
                volume_negative: 0.0,
                observation_count: 0,
            })
            .collect();

        let mut price_sums = vec![0.0; self.nr_bins];
        let directions = price_directions(prices);

        for ((&price, &volume), direction) in prices.iter().zip(volumes).zip(directions) {
            let index = locate_bin(&edges, price);
            let bin = &mut bins[index];

            bin.observation_count += 1;
            price_sums[index] += price;
            match direction {
                PriceDirection::Up => bin.volume_positive += volume,
                PriceDirection::Down => bin.volume_negative += volume,
                PriceDirection::Unchanged => {}
            }
        }

        for (bin, sum) in bins.iter_mut().zip(price_sums) {
            if bin.observation_count > 0 {
                bin.mean_price = Some(sum / bin.observation_count as f64);
            }
        }

        debug!(
            "Binned {} observations into {} bins over [{:.4}, {:.4}] (width {:.6})",
            prices.len(),
            self.nr_bins,
            min_price,
            max_price,
            (max_price - min_price) / self.nr_bins as f64
        );

        Ok(bins)
    }

    fn validate(&self, prices: &[f64], volumes: &[f64]) -> Result<()> {
        if prices.is_empty() {
            return Err(VolumeProfileError::invalid("Price series is empty"));
        }

        if prices.len() != volumes.len() {
            return Err(VolumeProfileError::invalid(format!(
                "Price and volume series differ in length: {} vs {}",
                prices.len(),
                volumes.len()
            )));
        }

        if self.nr_bins == 0 || self.nr_bins >= prices.len() {
            return Err(VolumeProfileError::invalid(format!(
                "nr_bins must be greater than 0 and smaller than the number of observations, got nr_bins={} rows={}",
                self.nr_bins,
                prices.len()
            )));
        }

        if let Some(i) = prices.iter().position(|p| !p.is_finite()) {
            return Err(VolumeProfileError::invalid(format!("Price at row {} is not finite", i)));
        }

        if let Some(i) = volumes.iter().position(|v| !v.is_finite() || *v < 0.0) {
            return Err(VolumeProfileError::invalid(format!(
                "Volume at row {} must be finite and non-negative, got {}",
                i, volumes[i]
            )));
        }

        let (min_price, max_price) = price_range(prices);
        if max_price <= min_price {
            return Err(VolumeProfileError::invalid(format!(
                "Price series has zero variance ({}), bins cannot be partitioned",
                min_price
            )));
        }

        if !(max_price - min_price).is_finite() {
            return Err(VolumeProfileError::invalid(format!(
                "Price range [{}, {}] overflows, bin edges would be undefined",
                min_price, max_price
            )));
        }

        Ok(())
    }
}

fn price_range(prices: &[f64]) -> (f64, f64) {
    prices
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &p| (lo.min(p), hi.max(p)))
}

/// `nr_bins + 1` shared edges; the outer edges are exactly min and max
fn bin_edges(min_price: f64, max_price: f64, nr_bins: usize) -> Vec<f64> {
    let width = (max_price - min_price) / nr_bins as f64;
    let mut edges: Vec<f64> = (0..nr_bins).map(|i| min_price + width * i as f64).collect();
    edges.push(max_price);
    edges
}

/// Right-closed lookup: first bin whose upper edge is >= price
fn locate_bin(edges: &[f64], price: f64) -> usize {
    let upper_edges = &edges[1..];
    upper_edges
        .partition_point(|&edge| edge < price)
        .min(upper_edges.len() - 1)
}
