/// Volume Profile Module
///
/// Builds a volume profile from a window of price/volume observations and
/// grows its value area outward from the Point of Control. Stages run in
/// order: binning, value area growth, level annotation.
pub mod binner;
pub mod calculator;
pub mod config;
pub mod errors;
pub mod grower;
pub mod levels;
pub mod neighbor;
pub mod structs;
pub mod validation;

pub use binner::{Binner, PriceDirection};
pub use calculator::{calculate_volume_profile, VolumeProfileCalculator};
pub use config::{ProfileOverride, VolumeProfileConfig};
pub use errors::{Result, VolumeProfileError};
pub use grower::{GrowthOutcome, ValueAreaGrower};
pub use levels::annotate_levels;
pub use neighbor::{find_neighbor_group, NeighborGroup, SearchDirection};
pub use structs::{
    Bin, ProfileRow, Rank, SignificanceLevel, SignificanceLevels, ValueArea,
    ValueAreaRanks, VolumeProfileTable
};
pub use validation::{ProfileValidationError, ProfileValidationResult, VolumeConservationValidator};
