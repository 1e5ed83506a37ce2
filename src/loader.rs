use crate::error::{Error, Result};
use crate::types::{InspectionRecord, RawRow, YearlyData};
use csv::ReaderBuilder;
use serde::de::DeserializeOwned;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::thread;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub loaded_rows: usize,
    pub parse_errors: usize,
    pub undated_rows: usize,
}

/// Deserializes every row of `reader`; rows that fail are counted and skipped.
pub(crate) fn read_rows<T, R>(reader: R, path: &Path) -> Result<(Vec<T>, usize)>
where
    T: DeserializeOwned,
    R: Read,
{
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);
    rdr.headers().map_err(|source| Error::Csv {
        path: path.to_path_buf(),
        source,
    })?;

    let mut rows = Vec::new();
    let mut parse_errors = 0usize;
    for (line, result) in rdr.deserialize::<T>().enumerate() {
        match result {
            Ok(row) => rows.push(row),
            Err(e) => {
                parse_errors += 1;
                debug!(
                    path = %path.display(),
                    row = line + 1,
                    error = %e,
                    "skipping malformed row"
                );
            }
        }
    }
    Ok((rows, parse_errors))
}

pub(crate) fn open(path: &Path) -> Result<std::fs::File> {
    std::fs::File::open(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse already-read CSV text into records. `path` only labels errors.
pub fn parse_records<R: Read>(
    reader: R,
    path: &Path,
) -> Result<(Vec<InspectionRecord>, LoadReport)> {
    let (rows, parse_errors) = read_rows::<RawRow, _>(reader, path)?;
    let records: Vec<InspectionRecord> = rows.iter().map(InspectionRecord::from_raw).collect();
    let undated_rows = records.iter().filter(|r| r.issue_date.is_none()).count();
    let report = LoadReport {
        total_rows: records.len() + parse_errors,
        loaded_rows: records.len(),
        parse_errors,
        undated_rows,
    };
    if parse_errors > 0 {
        warn!(path = %path.display(), parse_errors, "some rows could not be parsed");
    }
    Ok((records, report))
}

pub fn load_dataset(path: &Path) -> Result<(Vec<InspectionRecord>, LoadReport)> {
    let file = open(path)?;
    let (records, report) = parse_records(file, path)?;
    info!(
        path = %path.display(),
        rows = report.loaded_rows,
        undated = report.undated_rows,
        "dataset loaded"
    );
    Ok((records, report))
}

/// Loads the three yearly datasets concurrently, oldest first.
///
/// All three loads run to completion; if any of them failed, the first
/// failure in year order is returned and no data is.
pub fn load_yearly(paths: &[PathBuf; 3]) -> Result<(YearlyData, [LoadReport; 3])> {
    let results: Vec<Result<(Vec<InspectionRecord>, LoadReport)>> = thread::scope(|s| {
        let handles: Vec<_> = paths
            .iter()
            .map(|path| s.spawn(move || load_dataset(path)))
            .collect();
        handles
            .into_iter()
            .map(|h| {
                h.join().unwrap_or_else(|panic| {
                    let msg = panic
                        .downcast_ref::<&str>()
                        .map(|s| s.to_string())
                        .or_else(|| panic.downcast_ref::<String>().cloned())
                        .unwrap_or_else(|| "unknown panic".to_string());
                    Err(Error::LoaderPanicked(msg))
                })
            })
            .collect()
    });

    let mut loaded = results.into_iter().collect::<Result<Vec<_>>>()?.into_iter();
    let mut next = || loaded.next().unwrap_or_default();
    let (two_years_ago, r0) = next();
    let (last_year, r1) = next();
    let (current, r2) = next();
    let data = YearlyData::new(two_years_ago, last_year, current);
    info!(records = data.total_records(), "all yearly datasets loaded");
    Ok((data, [r0, r1, r2]))
}
