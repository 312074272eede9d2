use super::errors::{Result, VolumeProfileError};
use super::structs::{SignificanceLevels, ValueAreaRanks};

/// Derive the significance marker arrays from the value area ranks
pub fn annotate_levels(ranks: &ValueAreaRanks) -> Result<SignificanceLevels> {
    if ranks.is_empty() {
        return Err(VolumeProfileError::invalid("Rank array must not be empty"));
    }

    let len = ranks.len();
    let poc = ranks
        .point_of_control()
        .ok_or_else(|| VolumeProfileError::internal("No bin holds the Point of Control rank"))?;
    // a POC exists, so both ends of the ranked region exist as well
    let value_area_low = ranks.lowest_ranked().unwrap_or(poc);
    let value_area_high = ranks.highest_ranked().unwrap_or(poc);

    Ok(SignificanceLevels {
        profile_low: single_marker(len, 0),
        profile_high: single_marker(len, len - 1),
        point_of_control: single_marker(len, poc),
        value_area_low: single_marker(len, value_area_low),
        value_area_high: single_marker(len, value_area_high),
    })
}

fn single_marker(len: usize, index: usize) -> Vec<bool> {
    let mut markers = vec![false; len];
    markers[index] = true;
    markers
}
