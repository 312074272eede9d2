use tracing::{debug, info};

use super::binner::Binner;
use super::config::VolumeProfileConfig;
use super::errors::{Result, VolumeProfileError};
use super::grower::{GrowthOutcome, ValueAreaGrower};
use super::levels::annotate_levels;
use super::structs::{Bin, ProfileRow, SignificanceLevels, ValueArea, VolumeProfileTable};
use crate::series::{ObservationTable, OhlcvCandle};

/// Volume profile and value area calculator for one window of observations
#[derive(Debug, Clone)]
pub struct VolumeProfileCalculator {
    config: VolumeProfileConfig,
}

impl VolumeProfileCalculator {
    /// Create a calculator, validating the size-independent parameters
    pub fn new(config: VolumeProfileConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Calculator for a specific symbol, applying its overrides
    pub fn for_symbol(config: &VolumeProfileConfig, symbol: &str) -> Result<Self> {
        Self::new(config.resolve_for_symbol(symbol))
    }

    pub fn config(&self) -> &VolumeProfileConfig {
        &self.config
    }

    /// Compute the profile table for a window of observations
    pub fn calculate(&self, table: &ObservationTable) -> Result<VolumeProfileTable> {
        self.config.validate_for_rows(table.row_count())?;

        let bins = Binner::new(self.config.nr_bins).bin_table(table, &self.config.price_col)?;
        let volumes: Vec<f64> = bins.iter().map(Bin::volume_total).collect();

        let outcome = ValueAreaGrower::new(self.config.percent, self.config.nr_volumes).grow(&volumes)?;
        let levels = annotate_levels(&outcome.ranks)?;

        let profile = assemble_table(&bins, &outcome, &levels)?;

        info!(
            "Volume profile: {} rows -> {} bins, POC bin {} ({:.4}), value area [{:.4}, {:.4}] holding {:.2}% of volume",
            table.row_count(),
            bins.len(),
            outcome.point_of_control,
            profile.value_area.poc_price,
            profile.value_area.low,
            profile.value_area.high,
            profile.value_area.volume_percentage
        );

        Ok(profile)
    }

    pub fn calculate_candles(&self, candles: &[OhlcvCandle]) -> Result<VolumeProfileTable> {
        self.calculate(&ObservationTable::from_candles(candles))
    }
}

/// One-shot calculation with the given configuration
pub fn calculate_volume_profile(table: &ObservationTable, config: &VolumeProfileConfig) -> Result<VolumeProfileTable> {
    VolumeProfileCalculator::new(config.clone())?.calculate(table)
}

fn assemble_table(bins: &[Bin], outcome: &GrowthOutcome, levels: &SignificanceLevels) -> Result<VolumeProfileTable> {
    if bins.len() != outcome.ranks.len() || bins.len() != levels.len() {
        return Err(VolumeProfileError::internal(format!(
            "Stage outputs differ in length: bins={} ranks={} levels={}",
            bins.len(),
            outcome.ranks.len(),
            levels.len()
        )));
    }

    let flag = |markers: &[bool], i: usize| u8::from(markers[i]);

    let rows: Vec<ProfileRow> = bins
        .iter()
        .enumerate()
        .map(|(i, bin)| ProfileRow {
            price_low: bin.lower_bound,
            price_mean: bin.mean_price,
            price_high: bin.upper_bound,
            volume_total: bin.volume_total(),
            volume_neg: bin.volume_negative,
            volume_pos: bin.volume_positive,
            position: outcome.ranks.get(i),
            profile_low: flag(&levels.profile_low, i),
            profile_high: flag(&levels.profile_high, i),
            point_of_control: flag(&levels.point_of_control, i),
            value_area_low: flag(&levels.value_area_low, i),
            value_area_high: flag(&levels.value_area_high, i),
        })
        .collect();

    let value_area = summarize_value_area(bins, outcome)?;
    debug!("Value area summary: {:?}", value_area);

    Ok(VolumeProfileTable {
        rows,
        value_area,
        total_volume: outcome.total_volume,
    })
}

fn summarize_value_area(bins: &[Bin], outcome: &GrowthOutcome) -> Result<ValueArea> {
    let missing = || VolumeProfileError::internal("Value area has no ranked bins");
    let low_index = outcome.ranks.lowest_ranked().ok_or_else(missing)?;
    let high_index = outcome.ranks.highest_ranked().ok_or_else(missing)?;
    let poc = &bins[outcome.point_of_control];

    Ok(ValueArea {
        low: bins[low_index].lower_bound,
        high: bins[high_index].upper_bound,
        poc_price: poc.mean_price.unwrap_or_else(|| poc.midpoint()),
        volume: outcome.captured_volume,
        volume_percentage: if outcome.total_volume > 0.0 {
            (outcome.captured_volume / outcome.total_volume) * 100.0
        } else {
            0.0
        },
        target_volume: outcome.target_volume,
        target_reached: outcome.target_reached,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::volume_profile::structs::SignificanceLevel;

    fn create_test_config(nr_bins: usize, nr_volumes: usize) -> VolumeProfileConfig {
        VolumeProfileConfig {
            percent: 0.7,
            nr_bins,
            nr_volumes,
            ..VolumeProfileConfig::default()
        }
    }

    fn create_test_table() -> ObservationTable {
        // rising then falling; every row after the first changes price
        let prices = vec![100.0, 101.0, 102.0, 103.0, 102.5, 102.0, 101.5, 102.2, 104.0, 103.0, 102.1, 101.0];
        let volumes = vec![50.0, 10.0, 20.0, 15.0, 40.0, 60.0, 30.0, 35.0, 5.0, 10.0, 45.0, 20.0];
        ObservationTable::from_price_volume("close", prices, volumes).unwrap()
    }

    #[test]
    fn test_calculate_produces_one_row_per_bin() {
        let calculator = VolumeProfileCalculator::new(create_test_config(4, 2)).unwrap();
        let profile = calculator.calculate(&create_test_table()).unwrap();

        assert_eq!(profile.len(), 4);
        assert_eq!(profile.rows[0].price_low, 100.0);
        assert_eq!(profile.rows[3].price_high, 104.0);
        assert_eq!(profile.rows[0].profile_low, 1);
        assert_eq!(profile.rows[3].profile_high, 1);
    }

    #[test]
    fn test_volume_conserved_without_flat_moves() {
        let profile = VolumeProfileCalculator::new(create_test_config(4, 1))
            .unwrap()
            .calculate(&create_test_table())
            .unwrap();

        // first row has no direction, its 50.0 is not attributed
        let expected: f64 = 340.0 - 50.0;
        let total: f64 = profile.rows.iter().map(|r| r.volume_total).sum();
        assert!((total - expected).abs() < 1e-9);
        assert!((profile.total_volume - expected).abs() < 1e-9);
    }

    #[test]
    fn test_point_of_control_row_matches_max_volume() {
        let profile = VolumeProfileCalculator::new(create_test_config(4, 1))
            .unwrap()
            .calculate(&create_test_table())
            .unwrap();

        let poc = profile.point_of_control().unwrap();
        let max = profile.rows.iter().map(|r| r.volume_total).fold(f64::MIN, f64::max);
        assert_eq!(poc.volume_total, max);
        assert_eq!(poc.position, Some(1));
    }

    #[test]
    fn test_value_area_summary_bounds() {
        let profile = VolumeProfileCalculator::new(create_test_config(4, 1))
            .unwrap()
            .calculate(&create_test_table())
            .unwrap();

        let va = &profile.value_area;
        assert_eq!(va.low, profile.value_area_low().unwrap().price_low);
        assert_eq!(va.high, profile.value_area_high().unwrap().price_high);
        assert!(va.low <= va.poc_price && va.poc_price <= va.high);
        assert!(va.volume_percentage >= 70.0);
        assert!(va.target_reached);
    }

    #[test]
    fn test_rows_expose_level_flags() {
        let profile = VolumeProfileCalculator::new(create_test_config(4, 1))
            .unwrap()
            .calculate(&create_test_table())
            .unwrap();

        for level in SignificanceLevel::ALL {
            assert_eq!(profile.rows.iter().filter(|r| r.flag(level)).count(), 1, "{}", level);
        }
    }

    #[test]
    fn test_too_many_bins_rejected() {
        let calculator = VolumeProfileCalculator::new(create_test_config(12, 2)).unwrap();
        let err = calculator.calculate(&create_test_table()).unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_invalid_config_rejected_up_front() {
        assert!(VolumeProfileCalculator::new(create_test_config(4, 4)).is_err());
        assert!(VolumeProfileCalculator::new(create_test_config(0, 1)).is_err());
    }

    #[test]
    fn test_custom_price_column() {
        let table = ObservationTable::from_price_volume("high", vec![1.0, 2.0, 3.0, 4.0], vec![1.0, 2.0, 3.0, 4.0]).unwrap();

        let mut config = create_test_config(2, 1);
        config.price_col = "high".to_string();
        assert!(calculate_volume_profile(&table, &config).is_ok());

        config.price_col = "close".to_string();
        assert!(calculate_volume_profile(&table, &config).unwrap_err().is_invalid_argument());
    }

    #[test]
    fn test_calculate_candles_uses_close() {
        let candles: Vec<OhlcvCandle> = (0..8)
            .map(|i| {
                let close = 100.0 + (i % 4) as f64;
                OhlcvCandle::new(i * 60_000, close - 0.5, close + 1.0, close - 1.0, close, 10.0 + i as f64)
            })
            .collect();

        let profile = VolumeProfileCalculator::new(create_test_config(3, 1))
            .unwrap()
            .calculate_candles(&candles)
            .unwrap();

        assert_eq!(profile.rows[0].price_low, 100.0);
        assert_eq!(profile.rows[2].price_high, 103.0);
    }
}
