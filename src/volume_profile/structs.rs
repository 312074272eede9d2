use serde::{Deserialize, Serialize};

/// Admission order of a bin into the value area (1 = Point of Control)
pub type Rank = u32;

/// Rank held by the Point of Control bin
pub const POINT_OF_CONTROL_RANK: Rank = 1;

/// Relative tolerance for comparing volume sums accumulated in different orders
pub const VOLUME_TOLERANCE: f64 = 1e-9;

/// True when `captured` reaches `target` up to summation rounding
pub fn volume_reaches(captured: f64, target: f64) -> bool {
    captured >= target - VOLUME_TOLERANCE * target.abs().max(1.0)
}

/// One equal-width price interval of the profile.
///
/// The interval is `(lower_bound, upper_bound]`, except for bin 0 which also
/// contains `lower_bound` (the series minimum).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bin {
    pub index: usize,
    pub lower_bound: f64,
    pub upper_bound: f64,
    /// Mean of member prices, `None` when no observation fell in the bin
    pub mean_price: Option<f64>,
    /// Volume of observations whose price rose versus the previous one
    pub volume_positive: f64,
    /// Volume of observations whose price fell versus the previous one
    pub volume_negative: f64,
    pub observation_count: usize,
}

impl Bin {
    pub fn volume_total(&self) -> f64 {
        self.volume_positive + self.volume_negative
    }

    pub fn width(&self) -> f64 {
        self.upper_bound - self.lower_bound
    }

    pub fn midpoint(&self) -> f64 {
        (self.lower_bound + self.upper_bound) / 2.0
    }

    pub fn is_empty(&self) -> bool {
        self.observation_count == 0
    }

    /// Interval membership, honouring the closed lower edge of bin 0
    pub fn contains(&self, price: f64) -> bool {
        if self.index == 0 && price == self.lower_bound {
            return true;
        }
        price > self.lower_bound && price <= self.upper_bound
    }
}

/// Per-bin value area ranks, indexed like the bin table
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValueAreaRanks {
    ranks: Vec<Option<Rank>>,
}

impl ValueAreaRanks {
    /// All bins unranked
    pub fn unranked(len: usize) -> Self {
        Self {
            ranks: vec![None; len],
        }
    }

    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Rank> {
        self.ranks.get(index).copied().flatten()
    }

    pub fn is_ranked(&self, index: usize) -> bool {
        self.get(index).is_some()
    }

    pub fn assign(&mut self, index: usize, rank: Rank) {
        if let Some(slot) = self.ranks.get_mut(index) {
            *slot = Some(rank);
        }
    }

    pub fn as_slice(&self) -> &[Option<Rank>] {
        &self.ranks
    }

    /// Index of the bin holding rank 1
    pub fn point_of_control(&self) -> Option<usize> {
        self.ranks.iter().position(|r| *r == Some(POINT_OF_CONTROL_RANK))
    }

    pub fn max_rank(&self) -> Option<Rank> {
        self.ranks.iter().flatten().copied().max()
    }

    pub fn ranked_count(&self) -> usize {
        self.ranks.iter().filter(|r| r.is_some()).count()
    }

    pub fn lowest_ranked(&self) -> Option<usize> {
        self.ranks.iter().position(|r| r.is_some())
    }

    pub fn highest_ranked(&self) -> Option<usize> {
        self.ranks.iter().rposition(|r| r.is_some())
    }

    pub fn into_inner(self) -> Vec<Option<Rank>> {
        self.ranks
    }
}

impl From<Vec<Option<Rank>>> for ValueAreaRanks {
    fn from(ranks: Vec<Option<Rank>>) -> Self {
        Self { ranks }
    }
}

/// Significant levels of a volume profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignificanceLevel {
    ProfileLow,
    ProfileHigh,
    PointOfControl,
    ValueAreaLow,
    ValueAreaHigh,
}

impl SignificanceLevel {
    pub const ALL: [SignificanceLevel; 5] = [
        SignificanceLevel::ProfileLow,
        SignificanceLevel::ProfileHigh,
        SignificanceLevel::PointOfControl,
        SignificanceLevel::ValueAreaLow,
        SignificanceLevel::ValueAreaHigh,
    ];

    pub fn column_name(&self) -> &'static str {
        match self {
            SignificanceLevel::ProfileLow => "profile_low",
            SignificanceLevel::ProfileHigh => "profile_high",
            SignificanceLevel::PointOfControl => "point_of_control",
            SignificanceLevel::ValueAreaLow => "value_area_low",
            SignificanceLevel::ValueAreaHigh => "value_area_high",
        }
    }
}

impl std::fmt::Display for SignificanceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.column_name())
    }
}

/// Five boolean marker arrays, one entry per bin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignificanceLevels {
    pub profile_low: Vec<bool>,
    pub profile_high: Vec<bool>,
    pub point_of_control: Vec<bool>,
    pub value_area_low: Vec<bool>,
    pub value_area_high: Vec<bool>,
}

impl SignificanceLevels {
    pub fn markers(&self, level: SignificanceLevel) -> &[bool] {
        match level {
            SignificanceLevel::ProfileLow => &self.profile_low,
            SignificanceLevel::ProfileHigh => &self.profile_high,
            SignificanceLevel::PointOfControl => &self.point_of_control,
            SignificanceLevel::ValueAreaLow => &self.value_area_low,
            SignificanceLevel::ValueAreaHigh => &self.value_area_high,
        }
    }

    /// Index of the first bin marked with `level`
    pub fn index_of(&self, level: SignificanceLevel) -> Option<usize> {
        self.markers(level).iter().position(|marked| *marked)
    }

    pub fn is_marked(&self, level: SignificanceLevel, index: usize) -> bool {
        self.markers(level).get(index).copied().unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.profile_low.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profile_low.is_empty()
    }
}

/// One output row per bin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileRow {
    pub price_low: f64,
    pub price_mean: Option<f64>,
    pub price_high: f64,
    pub volume_total: f64,
    pub volume_neg: f64,
    pub volume_pos: f64,
    pub position: Option<Rank>,
    pub profile_low: u8,
    pub profile_high: u8,
    pub point_of_control: u8,
    pub value_area_low: u8,
    pub value_area_high: u8,
}

impl ProfileRow {
    pub fn flag(&self, level: SignificanceLevel) -> bool {
        let value = match level {
            SignificanceLevel::ProfileLow => self.profile_low,
            SignificanceLevel::ProfileHigh => self.profile_high,
            SignificanceLevel::PointOfControl => self.point_of_control,
            SignificanceLevel::ValueAreaLow => self.value_area_low,
            SignificanceLevel::ValueAreaHigh => self.value_area_high,
        };
        value == 1
    }

    pub fn in_value_area(&self) -> bool {
        self.position.is_some()
    }
}

/// Value area summary derived from the ranked bins
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueArea {
    /// Lower price bound of the value area low bin
    pub low: f64,
    /// Upper price bound of the value area high bin
    pub high: f64,
    /// Mean price of the Point of Control bin (bin midpoint if empty)
    pub poc_price: f64,
    pub volume: f64,
    pub volume_percentage: f64,
    pub target_volume: f64,
    /// False when growth stopped at the profile edges before reaching the target
    pub target_reached: bool,
}

/// Complete output of one profile calculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeProfileTable {
    pub rows: Vec<ProfileRow>,
    pub value_area: ValueArea,
    pub total_volume: f64,
}

impl VolumeProfileTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First row flagged with `level`, with its bin index
    pub fn level_row(&self, level: SignificanceLevel) -> Option<(usize, &ProfileRow)> {
        self.rows.iter().enumerate().find(|(_, row)| row.flag(level))
    }

    pub fn point_of_control(&self) -> Option<&ProfileRow> {
        self.level_row(SignificanceLevel::PointOfControl).map(|(_, row)| row)
    }

    pub fn value_area_low(&self) -> Option<&ProfileRow> {
        self.level_row(SignificanceLevel::ValueAreaLow).map(|(_, row)| row)
    }

    pub fn value_area_high(&self) -> Option<&ProfileRow> {
        self.level_row(SignificanceLevel::ValueAreaHigh).map(|(_, row)| row)
    }

    pub fn positions(&self) -> Vec<Option<Rank>> {
        self.rows.iter().map(|row| row.position).collect()
    }
}
