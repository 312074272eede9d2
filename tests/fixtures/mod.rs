use volume_profile_va::series::{ObservationTable, OhlcvCandle};
use volume_profile_va::volume_profile::VolumeProfileConfig;

/// Total volume per bin of the 10-bin reference profile
pub const REFERENCE_BIN_VOLUMES: [f64; 10] = [
    13_739_200.0,
    4_006_500.0,
    12_441_200.0,
    18_486_300.0,
    4_794_100.0,
    21_672_400.0,
    18_940_200.0,
    58_089_900.0,
    20_828_200.0,
    10_045_400.0,
];

/// Upper bounds of bins 0..9 for a window spanning [134.594, 143.844]
pub const REFERENCE_UPPER_BOUNDS: [f64; 10] = [
    135.519, 136.444, 137.369, 138.294, 139.219, 140.144, 141.069, 141.994, 142.919, 143.844,
];

/// Rising closes placing the reference volumes one observation per bin.
/// The first row sets the window minimum and carries no direction.
pub fn create_reference_table() -> ObservationTable {
    let prices = vec![
        134.594, 135.0, 136.0, 137.0, 138.0, 139.0, 140.0, 141.0, 141.5, 142.5, 143.844,
    ];
    let mut volumes = vec![5_000_000.0];
    volumes.extend_from_slice(&REFERENCE_BIN_VOLUMES);

    ObservationTable::from_price_volume("close", prices, volumes).unwrap()
}

pub fn create_reference_config(nr_volumes: usize) -> VolumeProfileConfig {
    VolumeProfileConfig {
        percent: 0.7,
        nr_bins: 10,
        nr_volumes,
        ..VolumeProfileConfig::default()
    }
}

/// Deterministic random walk of closes with varying volume
pub fn create_random_walk_candles(seed: u64, count: usize) -> Vec<OhlcvCandle> {
    let mut state = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
    let mut next = move || {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (state >> 33) as f64 / (1u64 << 31) as f64
    };

    let mut close = 100.0;
    (0..count)
        .map(|i| {
            let open = close;
            // quantised steps so that some closes repeat
            let step = ((next() - 0.5) * 8.0).round() * 0.25;
            close = (close + step).max(1.0);
            let volume = 100.0 + (next() * 10_000.0).round();
            OhlcvCandle::new(i as i64 * 60_000, open, open.max(close) + 0.5, open.min(close) - 0.5, close, volume)
        })
        .collect()
}
