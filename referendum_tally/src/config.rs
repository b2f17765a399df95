// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;
use std::ops::{Add, AddAssign};

/// A top-level administrative division, as read from the region reference table.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Region {
    pub code: String,
    pub name: String,
}

/// A sub-division of a region. The region is referenced by its code.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Department {
    pub code: String,
    pub region_code: String,
    pub name: String,
}

/// The ballot counts attached to a town, or summed over a region.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Default, Hash)]
pub struct BallotCounts {
    pub registered: u64,
    pub abstentions: u64,
    pub nulls: u64,
    pub choice_a: u64,
    pub choice_b: u64,
}

impl BallotCounts {
    pub const EMPTY: BallotCounts = BallotCounts {
        registered: 0,
        abstentions: 0,
        nulls: 0,
        choice_a: 0,
        choice_b: 0,
    };

    /// The ballots counted toward one of the two named choices, or `None` if
    /// the sum does not fit.
    pub fn expressed(&self) -> Option<u64> {
        self.choice_a.checked_add(self.choice_b)
    }

    /// The share of Choice A among the expressed ballots.
    ///
    /// Returns `None` when no ballot was expressed for either choice.
    pub fn ratio(&self) -> Option<f64> {
        if self.choice_a == 0 && self.choice_b == 0 {
            return None;
        }
        let a = self.choice_a as f64;
        Some(a / (a + self.choice_b as f64))
    }

    /// Field by field sum, `None` on overflow.
    pub fn checked_add(&self, rhs: &BallotCounts) -> Option<BallotCounts> {
        Some(BallotCounts {
            registered: self.registered.checked_add(rhs.registered)?,
            abstentions: self.abstentions.checked_add(rhs.abstentions)?,
            nulls: self.nulls.checked_add(rhs.nulls)?,
            choice_a: self.choice_a.checked_add(rhs.choice_a)?,
            choice_b: self.choice_b.checked_add(rhs.choice_b)?,
        })
    }
}

/// Panics on overflow, like the addition of integers. The tally itself sums
/// with `checked_add`.
impl AddAssign for BallotCounts {
    fn add_assign(&mut self, rhs: BallotCounts) {
        self.registered += rhs.registered;
        self.abstentions += rhs.abstentions;
        self.nulls += rhs.nulls;
        self.choice_a += rhs.choice_a;
        self.choice_b += rhs.choice_b;
    }
}

impl Add for BallotCounts {
    type Output = BallotCounts;
    fn add(self, rhs: BallotCounts) -> BallotCounts {
        let mut res = self;
        res += rhs;
        res
    }
}

impl std::iter::Sum for BallotCounts {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(BallotCounts::EMPTY, |acc, c| acc + c)
    }
}

/// One line of the referendum results, at the town level.
///
/// The department code is kept as found in the source: it may be zero-padded
/// (`01`), unpadded (`1`), alphanumeric (`2A`) or alphabetic (`ZZ`).
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct BallotRow {
    pub department_code: String,
    pub department_name: String,
    pub town_code: String,
    pub town_name: String,
    pub counts: BallotCounts,
}

/// A region and its geometry, as provided by the map layer.
///
/// The geometry type is left to the caller.
#[derive(PartialEq, Debug, Clone)]
pub struct RegionGeometry<G> {
    pub region_code: String,
    pub region_name: String,
    pub polygon: G,
}

// ******** Output data structures *********

/// A department with the name of its region resolved.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RegionDepartment {
    pub region_code: String,
    pub region_name: String,
    pub department_code: String,
    pub department_name: String,
}

/// A ballot row from the mainland, with its canonical department and region.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct EnrichedBallotRow {
    pub ballot: BallotRow,
    pub area: RegionDepartment,
}

/// The sums of the ballot counts over all the towns of a region.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RegionResult {
    pub region_code: String,
    pub region_name: String,
    pub counts: BallotCounts,
}

impl RegionResult {
    pub fn ratio(&self) -> Option<f64> {
        self.counts.ratio()
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct RenderedRegionResult<G> {
    pub result: RegionResult,
    pub polygon: G,
    /// Choice A over the expressed ballots. `None` if nothing was expressed.
    pub ratio: Option<f64>,
}

// ********* Errors **********

/// The join or aggregation step that failed.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum Stage {
    RegionDepartment,
    ReferendumArea,
    RegionAggregation,
    GeometryJoin,
}

impl Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::RegionDepartment => "region/department join",
            Stage::ReferendumArea => "referendum/area join",
            Stage::RegionAggregation => "region aggregation",
            Stage::GeometryJoin => "geometry join",
        };
        write!(f, "{}", name)
    }
}

/// Errors that prevent the tally from completing.
///
/// None of them is recovered: the reference data is expected to be consistent.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum TallyError {
    /// A record references a key that does not exist in the referenced table.
    UnresolvedReference {
        stage: Stage,
        key: String,
        missing: String,
    },
    /// More than one record of the referenced table matches the key.
    AmbiguousReference {
        stage: Stage,
        key: String,
        matches: usize,
    },
    /// Two records of a reference table share the same (normalized) key.
    DuplicateKey { stage: Stage, key: String },
    /// The region name groups rows with different region codes.
    InconsistentGroup {
        region_name: String,
        first_code: String,
        other_code: String,
    },
    /// The sum of the counts of a region does not fit in 64 bits.
    CountOverflow { region_name: String },
}

impl Error for TallyError {}

impl Display for TallyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TallyError::UnresolvedReference {
                stage,
                key,
                missing,
            } => write!(f, "{}: {} references unknown {}", stage, key, missing),
            TallyError::AmbiguousReference {
                stage,
                key,
                matches,
            } => write!(f, "{}: {} matches {} records", stage, key, matches),
            TallyError::DuplicateKey { stage, key } => {
                write!(f, "{}: duplicate key {}", stage, key)
            }
            TallyError::InconsistentGroup {
                region_name,
                first_code,
                other_code,
            } => write!(
                f,
                "{}: region {:?} has codes {:?} and {:?}",
                Stage::RegionAggregation,
                region_name,
                first_code,
                other_code
            ),
            TallyError::CountOverflow { region_name } => write!(
                f,
                "{}: ballot counts of region {:?} overflow",
                Stage::RegionAggregation,
                region_name
            ),
        }
    }
}
