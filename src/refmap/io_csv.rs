// Primitives for reading the CSV reference tables and the referendum results.

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::refmap::{
    io_common::{open_source, simplify_file_name},
    *,
};

#[derive(Debug, Clone, Deserialize)]
struct RegionRecord {
    code: String,
    name: String,
}

#[derive(Debug, Clone, Deserialize)]
struct DepartmentRecord {
    region_code: String,
    code: String,
    name: String,
}

#[derive(Debug, Clone, Deserialize)]
struct BallotRecord {
    #[serde(rename = "Department code")]
    department_code: String,
    #[serde(rename = "Department name")]
    department_name: String,
    #[serde(rename = "Town code")]
    town_code: String,
    #[serde(rename = "Town name")]
    town_name: String,
    #[serde(rename = "Registered")]
    registered: u64,
    #[serde(rename = "Abstentions")]
    abstentions: u64,
    #[serde(rename = "Null")]
    nulls: u64,
    #[serde(rename = "Choice A")]
    choice_a: u64,
    #[serde(rename = "Choice B")]
    choice_b: u64,
}

/// Reads all the records of a file with a header line.
///
/// Columns that are not part of the record are ignored.
fn read_records<T: DeserializeOwned>(path: &str, delimiter: u8) -> MapResult<Vec<T>> {
    let file = open_source(path)?;
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .from_reader(file);

    let mut res: Vec<T> = Vec::new();
    for (idx, record) in rdr.deserialize::<T>().enumerate() {
        // The header is the first line.
        let lineno = idx + 2;
        res.push(record.context(MalformedRecordSnafu { path, lineno })?);
    }
    info!("Read {} records from {}", res.len(), simplify_file_name(path));
    Ok(res)
}

pub fn read_regions(path: &str) -> MapResult<Vec<Region>> {
    let records: Vec<RegionRecord> = read_records(path, b',')?;
    Ok(records
        .into_iter()
        .map(|r| Region {
            code: r.code,
            name: r.name,
        })
        .collect())
}

pub fn read_departments(path: &str) -> MapResult<Vec<Department>> {
    let records: Vec<DepartmentRecord> = read_records(path, b',')?;
    Ok(records
        .into_iter()
        .map(|r| Department {
            code: r.code,
            region_code: r.region_code,
            name: r.name,
        })
        .collect())
}

/// Reads the referendum results. The file is separated by semicolons.
pub fn read_referendum(path: &str) -> MapResult<Vec<BallotRow>> {
    let records: Vec<BallotRecord> = read_records(path, b';')?;
    Ok(records
        .into_iter()
        .map(|r| BallotRow {
            department_code: r.department_code,
            department_name: r.department_name,
            town_code: r.town_code,
            town_name: r.town_name,
            counts: BallotCounts {
                registered: r.registered,
                abstentions: r.abstentions,
                nulls: r.nulls,
                choice_a: r.choice_a,
                choice_b: r.choice_b,
            },
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::refmap::tests::{DEPARTMENTS, REFERENDUM, REGIONS};

    fn write_tmp(dir: &tempfile::TempDir, name: &str, content: &str) -> String {
        let p = dir.path().join(name);
        fs::write(&p, content).unwrap();
        p.display().to_string()
    }

    #[test]
    fn regions_keep_their_padding() {
        let dir = tempfile::tempdir().unwrap();
        let regions = read_regions(&write_tmp(&dir, "regions.csv", REGIONS)).unwrap();
        assert_eq!(regions.len(), 4);
        assert_eq!(
            regions[0],
            Region {
                code: "01".to_string(),
                name: "Guadeloupe".to_string()
            }
        );
    }

    #[test]
    fn departments() {
        let dir = tempfile::tempdir().unwrap();
        let departments =
            read_departments(&write_tmp(&dir, "departments.csv", DEPARTMENTS)).unwrap();
        assert_eq!(departments.len(), 5);
        assert_eq!(departments[2].code, "2A");
        assert_eq!(departments[2].region_code, "94");
        assert_eq!(departments[2].name, "Corse-du-Sud");
    }

    #[test]
    fn referendum_rows() {
        let dir = tempfile::tempdir().unwrap();
        let rows = read_referendum(&write_tmp(&dir, "referendum.csv", REFERENDUM)).unwrap();
        assert_eq!(rows.len(), 6);
        assert_eq!(rows[0].department_code, "01");
        assert_eq!(rows[0].town_name, "L'Abergement-Clémenciat");
        assert_eq!(
            rows[0].counts,
            BallotCounts {
                registered: 100,
                abstentions: 20,
                nulls: 5,
                choice_a: 40,
                choice_b: 35,
            }
        );
        assert_eq!(rows[5].department_code, "ZZ");
    }

    #[test]
    fn malformed_count() {
        let dir = tempfile::tempdir().unwrap();
        let content = "\
Department code;Department name;Town code;Town name;Registered;Abstentions;Null;Choice A;Choice B
01;AIN;1;A;100;20;5;40;35
01;AIN;2;B;many;20;5;40;35
";
        let err = read_referendum(&write_tmp(&dir, "referendum.csv", content)).unwrap_err();
        match err {
            MapError::MalformedRecord { lineno, .. } => assert_eq!(lineno, 3),
            e => panic!("unexpected error {:?}", e),
        }
    }

    #[test]
    fn comma_separated_referendum_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let content = "Department code,Town code\n01,1\n";
        let err = read_referendum(&write_tmp(&dir, "referendum.csv", content)).unwrap_err();
        assert!(matches!(err, MapError::MalformedRecord { .. }), "{:?}", err);
    }
}
