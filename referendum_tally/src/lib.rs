mod config;
pub mod manual;

use log::{debug, info};

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt::Display;

pub use crate::config::*;

// **** Code normalization ****

/// The comparison key of a department or region code.
///
/// Codes that parse as integers compare by value, so `01` and `1` are the same
/// department. Anything else (`2A`, `COM`) compares as the exact string.
#[derive(Eq, PartialEq, Debug, Clone, Hash, Ord, PartialOrd)]
pub enum DepartmentKey {
    Numeric(u64),
    Verbatim(String),
}

impl DepartmentKey {
    pub fn parse(code: &str) -> DepartmentKey {
        let trimmed = code.trim();
        match trimmed.parse::<u64>() {
            Ok(n) => DepartmentKey::Numeric(n),
            Err(e) => {
                debug!(
                    "DepartmentKey::parse: {:?} is not an integer ({}), comparing as text",
                    trimmed, e
                );
                DepartmentKey::Verbatim(trimmed.to_string())
            }
        }
    }
}

impl Display for DepartmentKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DepartmentKey::Numeric(n) => write!(f, "{}", n),
            DepartmentKey::Verbatim(s) => write!(f, "{}", s),
        }
    }
}

/// Overseas territories and the French living abroad use purely alphabetic
/// codes (`ZA`, `ZZ`, ...). Mixed codes such as `2A` (Corsica) are mainland.
pub fn is_overseas_code(code: &str) -> bool {
    let trimmed = code.trim();
    !trimmed.is_empty() && trimmed.chars().all(|c| c.is_alphabetic())
}

// **** Joins ****

/// Resolves the region name of each department.
///
/// The output follows the order of the departments. A department pointing to a
/// region that does not exist is an error.
pub fn join_regions_and_departments(
    regions: &[Region],
    departments: &[Department],
) -> Result<Vec<RegionDepartment>, TallyError> {
    info!(
        "join_regions_and_departments: {} regions, {} departments",
        regions.len(),
        departments.len()
    );
    let mut regions_by_key: HashMap<DepartmentKey, &Region> = HashMap::new();
    for r in regions.iter() {
        if regions_by_key.insert(DepartmentKey::parse(&r.code), r).is_some() {
            return Err(TallyError::DuplicateKey {
                stage: Stage::RegionDepartment,
                key: format!("region {}", r.code),
            });
        }
    }

    departments
        .iter()
        .map(|d| {
            let region = regions_by_key
                .get(&DepartmentKey::parse(&d.region_code))
                .ok_or_else(|| TallyError::UnresolvedReference {
                    stage: Stage::RegionDepartment,
                    key: format!("department {}", d.code),
                    missing: format!("region {}", d.region_code),
                })?;
            // The code of the region table is canonical, whatever the padding
            // used by the department.
            Ok(RegionDepartment {
                region_code: region.code.clone(),
                region_name: region.name.clone(),
                department_code: d.code.clone(),
                department_name: d.name.clone(),
            })
        })
        .collect()
}

/// Attaches the department and region to each mainland ballot row.
///
/// Rows with an alphabetic department code are dropped. Every other row must
/// match exactly one department.
pub fn join_referendum_and_areas(
    ballots: &[BallotRow],
    areas: &[RegionDepartment],
) -> Result<Vec<EnrichedBallotRow>, TallyError> {
    let all_codes: BTreeSet<&str> = ballots.iter().map(|b| b.department_code.as_str()).collect();
    let (excluded, retained): (BTreeSet<&str>, BTreeSet<&str>) =
        all_codes.into_iter().partition(|c| is_overseas_code(c));
    info!(
        "join_referendum_and_areas: {} department codes retained, {} excluded: {:?}",
        retained.len(),
        excluded.len(),
        excluded
    );

    let mut areas_by_key: HashMap<DepartmentKey, &RegionDepartment> = HashMap::new();
    for a in areas.iter() {
        let key = DepartmentKey::parse(&a.department_code);
        if areas_by_key.insert(key.clone(), a).is_some() {
            return Err(TallyError::DuplicateKey {
                stage: Stage::ReferendumArea,
                key: format!("department {}", key),
            });
        }
    }

    let mut res: Vec<EnrichedBallotRow> = Vec::new();
    let mut dropped: usize = 0;
    for b in ballots.iter() {
        if !retained.contains(b.department_code.as_str()) {
            dropped += 1;
            continue;
        }
        let area = areas_by_key
            .get(&DepartmentKey::parse(&b.department_code))
            .ok_or_else(|| TallyError::UnresolvedReference {
                stage: Stage::ReferendumArea,
                key: format!("town {} ({})", b.town_code, b.town_name),
                missing: format!("department {}", b.department_code),
            })?;
        res.push(EnrichedBallotRow {
            ballot: b.clone(),
            area: (*area).clone(),
        });
    }
    info!(
        "join_referendum_and_areas: kept {} ballot rows, dropped {} overseas rows",
        res.len(),
        dropped
    );
    Ok(res)
}

// **** Aggregation ****

/// Sums the ballot counts of each region.
///
/// Rows are grouped by region name and the output is sorted by name. The region
/// code must be the same for all the rows of a group.
pub fn aggregate_by_region(rows: &[EnrichedBallotRow]) -> Result<Vec<RegionResult>, TallyError> {
    let mut groups: BTreeMap<&str, (&str, BallotCounts)> = BTreeMap::new();
    for row in rows.iter() {
        let entry = groups
            .entry(row.area.region_name.as_str())
            .or_insert((row.area.region_code.as_str(), BallotCounts::EMPTY));
        if entry.0 != row.area.region_code {
            return Err(TallyError::InconsistentGroup {
                region_name: row.area.region_name.clone(),
                first_code: entry.0.to_string(),
                other_code: row.area.region_code.clone(),
            });
        }
        entry.1 = entry
            .1
            .checked_add(&row.ballot.counts)
            .ok_or_else(|| TallyError::CountOverflow {
                region_name: row.area.region_name.clone(),
            })?;
    }

    let res: Vec<RegionResult> = groups
        .into_iter()
        .map(|(name, (code, counts))| RegionResult {
            region_code: code.to_string(),
            region_name: name.to_string(),
            counts,
        })
        .collect();
    for r in res.iter() {
        debug!("aggregate_by_region: {:?}", r);
    }
    info!(
        "aggregate_by_region: {} rows -> {} regions",
        rows.len(),
        res.len()
    );
    Ok(res)
}

/// Runs the region/department join, the referendum join and the aggregation.
pub fn run_region_tally(
    regions: &[Region],
    departments: &[Department],
    ballots: &[BallotRow],
) -> Result<Vec<RegionResult>, TallyError> {
    info!(
        "run_region_tally: Processing {} ballot rows",
        ballots.len()
    );
    let areas = join_regions_and_departments(regions, departments)?;
    let enriched = join_referendum_and_areas(ballots, &areas)?;
    aggregate_by_region(&enriched)
}

/// Attaches to each region result the geometry that has the same region name.
///
/// The map layer does not share codes with the reference tables, so the join
/// is on the display name. A missing or duplicated name is an error.
pub fn join_geometries<G: Clone>(
    results: &[RegionResult],
    geometries: &[RegionGeometry<G>],
) -> Result<Vec<RenderedRegionResult<G>>, TallyError> {
    let mut by_name: HashMap<&str, Vec<&RegionGeometry<G>>> = HashMap::new();
    for g in geometries.iter() {
        by_name.entry(g.region_name.as_str()).or_default().push(g);
    }

    results
        .iter()
        .map(|r| {
            let geometry = match by_name.get(r.region_name.as_str()).map(|v| v.as_slice()) {
                Some([g]) => *g,
                Some(gs) if !gs.is_empty() => {
                    return Err(TallyError::AmbiguousReference {
                        stage: Stage::GeometryJoin,
                        key: format!("region {:?}", r.region_name),
                        matches: gs.len(),
                    })
                }
                _ => {
                    return Err(TallyError::UnresolvedReference {
                        stage: Stage::GeometryJoin,
                        key: format!("region {:?}", r.region_name),
                        missing: "geometry".to_string(),
                    })
                }
            };
            debug!(
                "join_geometries: {:?} -> geometry {}",
                r.region_name, geometry.region_code
            );
            Ok(RenderedRegionResult {
                result: r.clone(),
                polygon: geometry.polygon.clone(),
                ratio: r.ratio(),
            })
        })
        .collect()
}
