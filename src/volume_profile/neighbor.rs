use super::errors::{Result, VolumeProfileError};
use super::structs::Rank;

/// Side of the ranked region to search on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchDirection {
    /// Towards lower bin indices (lower prices)
    Lower,
    /// Towards higher bin indices (higher prices)
    Upper,
}

/// Result of one neighbor search
#[derive(Debug, Clone, PartialEq)]
pub enum NeighborGroup {
    /// `nr_volumes` unranked bins were collected
    Found { indices: Vec<usize>, volume: f64 },
    /// The profile edge was hit before `nr_volumes` bins were collected
    FoundAtBoundary { indices: Vec<usize>, volume: f64 },
    /// No unranked bin remains in this direction
    NoCandidate,
}

impl NeighborGroup {
    pub fn volume(&self) -> Option<f64> {
        match self {
            NeighborGroup::Found { volume, .. } | NeighborGroup::FoundAtBoundary { volume, .. } => Some(*volume),
            NeighborGroup::NoCandidate => None,
        }
    }

    pub fn indices(&self) -> &[usize] {
        match self {
            NeighborGroup::Found { indices, .. } | NeighborGroup::FoundAtBoundary { indices, .. } => indices,
            NeighborGroup::NoCandidate => &[],
        }
    }

    /// True when nothing further can be found beyond this group
    pub fn hits_boundary(&self) -> bool {
        !matches!(self, NeighborGroup::Found { .. })
    }
}

/// Index space seen by the scan. The upper direction is the lower
/// direction over the reversed array.
struct ScanSpace {
    len: usize,
    reversed: bool,
}

impl ScanSpace {
    fn new(len: usize, direction: SearchDirection) -> Self {
        Self {
            len,
            reversed: direction == SearchDirection::Upper,
        }
    }

    /// Maps in both directions; reversal is its own inverse
    fn map(&self, index: usize) -> usize {
        if self.reversed {
            self.len - 1 - index
        } else {
            index
        }
    }
}

/// Find the next group of unranked bins next to the ranked region around
/// `start_index` (the Point of Control), walking towards `direction`.
pub fn find_neighbor_group(
    volumes: &[f64],
    start_index: usize,
    ranks: &[Option<Rank>],
    direction: SearchDirection,
    nr_volumes: usize,
) -> Result<NeighborGroup> {
    if volumes.is_empty() {
        return Err(VolumeProfileError::invalid("Volume array must not be empty"));
    }
    if volumes.len() != ranks.len() {
        return Err(VolumeProfileError::invalid(format!(
            "Volume and rank arrays must be of same size, got {} and {}",
            volumes.len(),
            ranks.len()
        )));
    }
    if start_index >= volumes.len() {
        return Err(VolumeProfileError::invalid(format!(
            "Index of Point of Control {} not in boundaries [0, {})",
            start_index,
            volumes.len()
        )));
    }
    if nr_volumes == 0 || nr_volumes > volumes.len() - 1 {
        return Err(VolumeProfileError::invalid(format!(
            "Number of bins to aggregate must be in [1, {}], got {}",
            volumes.len() - 1,
            nr_volumes
        )));
    }

    let space = ScanSpace::new(volumes.len(), direction);
    let start = space.map(start_index);

    // Walk towards scan index 0, skipping bins already in the value area
    let first_free = (0..start).rev().find(|&i| ranks[space.map(i)].is_none());
    let Some(first_free) = first_free else {
        return Ok(NeighborGroup::NoCandidate);
    };

    let collected = nr_volumes.min(first_free + 1);
    let indices: Vec<usize> = (0..collected).map(|k| space.map(first_free - k)).collect();
    let volume = indices.iter().map(|&i| volumes[i]).sum();

    if collected < nr_volumes {
        Ok(NeighborGroup::FoundAtBoundary { indices, volume })
    } else {
        Ok(NeighborGroup::Found { indices, volume })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VOLUMES: [f64; 6] = [1.0, 2.0, 3.0, 10.0, 4.0, 5.0];

    fn poc_only() -> Vec<Option<Rank>> {
        vec![None, None, None, Some(1), None, None]
    }

    #[test]
    fn test_lower_search_collects_nr_volumes() {
        let group = find_neighbor_group(&VOLUMES, 3, &poc_only(), SearchDirection::Lower, 2).unwrap();
        assert_eq!(group, NeighborGroup::Found { indices: vec![2, 1], volume: 5.0 });
        assert!(!group.hits_boundary());
    }

    #[test]
    fn test_upper_search_mirrors_lower() {
        let group = find_neighbor_group(&VOLUMES, 3, &poc_only(), SearchDirection::Upper, 2).unwrap();
        // exactly reaches the edge with a full group: not flagged as boundary
        assert_eq!(group, NeighborGroup::Found { indices: vec![4, 5], volume: 9.0 });
    }

    #[test]
    fn test_boundary_reached_before_group_complete() {
        let group = find_neighbor_group(&VOLUMES, 3, &poc_only(), SearchDirection::Upper, 3).unwrap();
        assert_eq!(group, NeighborGroup::FoundAtBoundary { indices: vec![4, 5], volume: 9.0 });
        assert!(group.hits_boundary());
    }

    #[test]
    fn test_ranked_bins_are_skipped() {
        let ranks = vec![None, None, Some(2), Some(1), Some(3), None];

        let lower = find_neighbor_group(&VOLUMES, 3, &ranks, SearchDirection::Lower, 1).unwrap();
        assert_eq!(lower, NeighborGroup::Found { indices: vec![1], volume: 2.0 });

        let upper = find_neighbor_group(&VOLUMES, 3, &ranks, SearchDirection::Upper, 2).unwrap();
        assert_eq!(upper, NeighborGroup::FoundAtBoundary { indices: vec![5], volume: 5.0 });
    }

    #[test]
    fn test_no_candidate_when_side_fully_ranked() {
        let ranks = vec![Some(2), Some(2), Some(3), Some(1), None, None];
        let group = find_neighbor_group(&VOLUMES, 3, &ranks, SearchDirection::Lower, 2).unwrap();
        assert_eq!(group, NeighborGroup::NoCandidate);
        assert!(group.hits_boundary());
        assert_eq!(group.volume(), None);
        assert!(group.indices().is_empty());
    }

    #[test]
    fn test_poc_at_profile_edge() {
        let ranks = vec![Some(1), None, None];
        let volumes = [9.0, 1.0, 1.0];

        assert_eq!(
            find_neighbor_group(&volumes, 0, &ranks, SearchDirection::Lower, 1).unwrap(),
            NeighborGroup::NoCandidate
        );
        assert_eq!(
            find_neighbor_group(&volumes, 0, &ranks, SearchDirection::Upper, 2).unwrap(),
            NeighborGroup::Found { indices: vec![1, 2], volume: 2.0 }
        );
    }

    #[test]
    fn test_zero_volume_group_is_not_no_candidate() {
        let volumes = [0.0, 0.0, 5.0];
        let ranks = vec![None, None, Some(1)];
        let group = find_neighbor_group(&volumes, 2, &ranks, SearchDirection::Lower, 1).unwrap();
        assert_eq!(group.volume(), Some(0.0));
    }

    #[test]
    fn test_contract_violations() {
        let ranks = poc_only();
        assert!(find_neighbor_group(&VOLUMES, 6, &ranks, SearchDirection::Lower, 2).unwrap_err().is_invalid_argument());
        assert!(find_neighbor_group(&VOLUMES, 3, &ranks, SearchDirection::Lower, 6).is_err());
        assert!(find_neighbor_group(&VOLUMES, 3, &ranks, SearchDirection::Lower, 0).is_err());
        assert!(find_neighbor_group(&VOLUMES, 3, &ranks[..5], SearchDirection::Lower, 2).is_err());
        assert!(find_neighbor_group(&[], 0, &[], SearchDirection::Lower, 1).is_err());
    }
}
