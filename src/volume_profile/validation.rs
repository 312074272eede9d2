use tracing::warn;

use super::binner::{price_directions, PriceDirection};
use super::structs::{SignificanceLevel, VolumeProfileTable, VOLUME_TOLERANCE};

/// Custom error types for profile consistency validation
#[derive(Debug, Clone, PartialEq)]
pub enum ProfileValidationError {
    /// Binned volume differs from the directional input volume
    VolumeConservationViolation {
        expected: f64,
        actual: f64,
        difference: f64,
    },
    /// A bin's upper bound is not the next bin's lower bound
    GapBetweenBins { index: usize, upper: f64, next_lower: f64 },
    /// A significance marker does not flag exactly one bin
    MarkerCount { level: SignificanceLevel, count: usize },
}

impl std::fmt::Display for ProfileValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProfileValidationError::VolumeConservationViolation { expected, actual, difference } => {
                write!(f, "Volume conservation violated: expected={}, actual={}, difference={}",
                       expected, actual, difference)
            },
            ProfileValidationError::GapBetweenBins { index, upper, next_lower } => {
                write!(f, "Bin {} ends at {} but bin {} starts at {}", index, upper, index + 1, next_lower)
            },
            ProfileValidationError::MarkerCount { level, count } => {
                write!(f, "Marker {} flags {} bins, expected exactly 1", level, count)
            },
        }
    }
}

impl std::error::Error for ProfileValidationError {}

/// Validation result for one profile table
#[derive(Debug, Clone)]
pub struct ProfileValidationResult {
    pub is_valid: bool,
    pub expected_volume: f64,
    pub actual_volume: f64,
    pub errors: Vec<ProfileValidationError>,
}

impl ProfileValidationResult {
    pub fn details(&self) -> Vec<String> {
        self.errors.iter().map(|e| e.to_string()).collect()
    }
}

/// Checks a computed profile against the observations it was built from
#[derive(Debug, Clone)]
pub struct VolumeConservationValidator;

impl VolumeConservationValidator {
    /// Volume that the binner attributes to a side: every observation
    /// after the first whose price changed
    pub fn directional_volume(prices: &[f64], volumes: &[f64]) -> f64 {
        price_directions(prices)
            .iter()
            .zip(volumes)
            .filter(|(direction, _)| **direction != PriceDirection::Unchanged)
            .map(|(_, volume)| *volume)
            .sum()
    }

    pub fn validate_volume_conservation(
        expected_volume: f64,
        profile: &VolumeProfileTable,
    ) -> Result<f64, ProfileValidationError> {
        let actual: f64 = profile.rows.iter().map(|row| row.volume_total).sum();
        let difference = (expected_volume - actual).abs();
        let tolerance = VOLUME_TOLERANCE * expected_volume.abs().max(1.0);

        if difference > tolerance {
            return Err(ProfileValidationError::VolumeConservationViolation {
                expected: expected_volume,
                actual,
                difference,
            });
        }
        Ok(actual)
    }

    pub fn validate_contiguity(profile: &VolumeProfileTable) -> Vec<ProfileValidationError> {
        profile
            .rows
            .windows(2)
            .enumerate()
            .filter(|(_, pair)| pair[0].price_high != pair[1].price_low)
            .map(|(index, pair)| ProfileValidationError::GapBetweenBins {
                index,
                upper: pair[0].price_high,
                next_lower: pair[1].price_low,
            })
            .collect()
    }

    pub fn validate_markers(profile: &VolumeProfileTable) -> Vec<ProfileValidationError> {
        SignificanceLevel::ALL
            .iter()
            .filter_map(|&level| {
                let count = profile.rows.iter().filter(|row| row.flag(level)).count();
                (count != 1).then_some(ProfileValidationError::MarkerCount { level, count })
            })
            .collect()
    }

    /// Run every check and collect the failures
    pub fn validate_profile(prices: &[f64], volumes: &[f64], profile: &VolumeProfileTable) -> ProfileValidationResult {
        let expected_volume = Self::directional_volume(prices, volumes);
        let mut errors = Vec::new();

        let actual_volume = match Self::validate_volume_conservation(expected_volume, profile) {
            Ok(actual) => actual,
            Err(e) => {
                let actual = profile.rows.iter().map(|row| row.volume_total).sum();
                errors.push(e);
                actual
            }
        };
        errors.extend(Self::validate_contiguity(profile));
        errors.extend(Self::validate_markers(profile));

        for error in &errors {
            warn!("Profile validation failed: {}", error);
        }

        ProfileValidationResult {
            is_valid: errors.is_empty(),
            expected_volume,
            actual_volume,
            errors,
        }
    }
}
