use tracing::{debug, warn};

use super::errors::{Result, VolumeProfileError};
use super::neighbor::{find_neighbor_group, NeighborGroup, SearchDirection};
use super::structs::{volume_reaches, Rank, ValueAreaRanks, POINT_OF_CONTROL_RANK};

/// State of one side of the value area
#[derive(Debug, Clone, PartialEq)]
enum Frontier {
    /// Next group on this side; `at_boundary` means nothing lies beyond it
    Pending {
        indices: Vec<usize>,
        volume: f64,
        at_boundary: bool,
    },
    Exhausted,
}

impl Frontier {
    fn from_group(group: NeighborGroup) -> Self {
        match group {
            NeighborGroup::Found { indices, volume } => Frontier::Pending {
                indices,
                volume,
                at_boundary: false,
            },
            NeighborGroup::FoundAtBoundary { indices, volume } => Frontier::Pending {
                indices,
                volume,
                at_boundary: true,
            },
            NeighborGroup::NoCandidate => Frontier::Exhausted,
        }
    }

    fn volume(&self) -> Option<f64> {
        match self {
            Frontier::Pending { volume, .. } => Some(*volume),
            Frontier::Exhausted => None,
        }
    }
}

/// Result of growing the value area
#[derive(Debug, Clone, PartialEq)]
pub struct GrowthOutcome {
    pub ranks: ValueAreaRanks,
    pub point_of_control: usize,
    pub captured_volume: f64,
    pub target_volume: f64,
    pub total_volume: f64,
    /// Number of growth steps taken after ranking the Point of Control
    pub steps: usize,
    /// False when both sides ran out before the target was captured
    pub target_reached: bool,
}

/// Greedy bilateral growth of the value area around the Point of Control
#[derive(Debug, Clone)]
pub struct ValueAreaGrower {
    percent: f64,
    nr_volumes: usize,
}

impl ValueAreaGrower {
    pub fn new(percent: f64, nr_volumes: usize) -> Self {
        Self { percent, nr_volumes }
    }

    pub fn grow(&self, volumes: &[f64]) -> Result<GrowthOutcome> {
        self.validate(volumes)?;

        let total_volume: f64 = volumes.iter().sum();
        let target_volume = total_volume * self.percent;

        let poc = point_of_control(volumes);
        let mut ranks = ValueAreaRanks::unranked(volumes.len());
        ranks.assign(poc, POINT_OF_CONTROL_RANK);
        let mut captured_volume = volumes[poc];

        let mut lower = self.next_frontier(volumes, poc, &ranks, SearchDirection::Lower)?;
        let mut upper = self.next_frontier(volumes, poc, &ranks, SearchDirection::Upper)?;

        debug!(
            "Growing value area from POC bin {} (volume {:.2}), target {:.2} of {:.2}",
            poc, captured_volume, target_volume, total_volume
        );

        let mut next_rank: Rank = POINT_OF_CONTROL_RANK + 1;
        let mut steps = 0;

        while !volume_reaches(captured_volume, target_volume) {
            // Lower side wins ties and takes over once the upper side is exhausted
            let direction = match (lower.volume(), upper.volume()) {
                (None, None) => break,
                (Some(_), None) => SearchDirection::Lower,
                (None, Some(_)) => SearchDirection::Upper,
                (Some(l), Some(u)) if l >= u => SearchDirection::Lower,
                (Some(_), Some(_)) => SearchDirection::Upper,
            };

            let frontier = match direction {
                SearchDirection::Lower => &mut lower,
                SearchDirection::Upper => &mut upper,
            };
            let consumed = std::mem::replace(frontier, Frontier::Exhausted);
            let Frontier::Pending { indices, volume, at_boundary } = consumed else {
                return Err(VolumeProfileError::internal("Selected an exhausted value area side"));
            };

            for &index in &indices {
                ranks.assign(index, next_rank);
            }
            captured_volume += volume;
            steps += 1;

            debug!(
                "Value area step {}: {:?} bins {:?} (volume {:.2}) -> captured {:.2}",
                next_rank, direction, indices, volume, captured_volume
            );

            if !at_boundary {
                *frontier = self.next_frontier(volumes, poc, &ranks, direction)?;
            }
            next_rank += 1;

            if steps > volumes.len() {
                return Err(VolumeProfileError::internal(format!(
                    "Value area growth exceeded {} steps",
                    volumes.len()
                )));
            }
        }

        // a fully ranked profile holds all volume whatever the summation order
        let target_reached =
            volume_reaches(captured_volume, target_volume) || ranks.ranked_count() == volumes.len();
        if !target_reached {
            warn!(
                "Value area growth stopped at profile edges: captured {:.2} of target {:.2}",
                captured_volume, target_volume
            );
        }

        Ok(GrowthOutcome {
            ranks,
            point_of_control: poc,
            captured_volume,
            target_volume,
            total_volume,
            steps,
            target_reached,
        })
    }

    fn next_frontier(
        &self,
        volumes: &[f64],
        poc: usize,
        ranks: &ValueAreaRanks,
        direction: SearchDirection,
    ) -> Result<Frontier> {
        find_neighbor_group(volumes, poc, ranks.as_slice(), direction, self.nr_volumes).map(Frontier::from_group)
    }

    fn validate(&self, volumes: &[f64]) -> Result<()> {
        if volumes.is_empty() {
            return Err(VolumeProfileError::invalid("Volume array must not be empty"));
        }
        if !(self.percent > 0.0 && self.percent <= 1.0) {
            return Err(VolumeProfileError::invalid(format!(
                "percent must be greater than 0.0 and at most 1.0, got {}",
                self.percent
            )));
        }
        if self.nr_volumes == 0 || self.nr_volumes > volumes.len() - 1 {
            return Err(VolumeProfileError::invalid(format!(
                "nr_volumes must be greater than 0 and smaller than the number of bins, got nr_volumes={} bins={}",
                self.nr_volumes,
                volumes.len()
            )));
        }
        if let Some(i) = volumes.iter().position(|v| !v.is_finite() || *v < 0.0) {
            return Err(VolumeProfileError::invalid(format!("Bin volume at {} is invalid: {}", i, volumes[i])));
        }
        Ok(())
    }
}

/// Index of the highest volume bin, first occurrence on ties
pub fn point_of_control(volumes: &[f64]) -> usize {
    let mut best = 0;
    for (i, &volume) in volumes.iter().enumerate().skip(1) {
        if volume > volumes[best] {
            best = i;
        }
    }
    best
}
