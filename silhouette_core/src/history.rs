//! Read-only loading of historical observations.
//!
//! Prior measurement sets for the same subject are kept by the profile
//! service, either as JSON Lines (one object per line) or as CSV with a
//! header row of field names. They are read under a shared lock so a
//! concurrent writer never hands us a half-written file.

use crate::types::{MeasurementSet, MeasurementValue};
use crate::{Error, Result};
use csv::ReaderBuilder;
use fs2::FileExt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// History file layouts
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HistoryFormat {
    JsonLines,
    Csv,
}

impl HistoryFormat {
    /// Infer format from the file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);

        match extension.as_deref() {
            Some("jsonl") | Some("ndjson") => Ok(HistoryFormat::JsonLines),
            Some("csv") => Ok(HistoryFormat::Csv),
            _ => Err(Error::History(format!(
                "Unsupported history file {:?} (expected .jsonl or .csv)",
                path
            ))),
        }
    }
}

/// Load prior observations from a history file
///
/// Returns an empty history if the file doesn't exist.
/// Malformed rows are skipped with a warning.
pub fn load_history(path: &Path) -> Result<Vec<MeasurementSet>> {
    let format = HistoryFormat::from_path(path)?;

    if !path.exists() {
        tracing::debug!("No history file found at {:?}", path);
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    file.lock_shared()?;

    let observations = match format {
        HistoryFormat::JsonLines => read_json_lines(&file),
        HistoryFormat::Csv => read_csv(&file),
    };

    file.unlock()?;

    let observations = observations?;
    tracing::info!("Loaded {} historical observations from {:?}", observations.len(), path);
    Ok(observations)
}

fn read_json_lines(file: &File) -> Result<Vec<MeasurementSet>> {
    let reader = BufReader::new(file);
    let mut observations = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<MeasurementSet>(&line) {
            Ok(observation) => observations.push(observation),
            Err(e) => {
                tracing::warn!("Failed to parse observation at line {}: {}", line_num + 1, e);
            }
        }
    }

    Ok(observations)
}

fn read_csv(file: &File) -> Result<Vec<MeasurementSet>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader.headers()?.clone();
    let mut observations = Vec::new();

    for (row_num, result) in reader.records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!("Failed to read CSV row {}: {}", row_num + 1, e);
                continue;
            }
        };

        let observation: MeasurementSet = headers
            .iter()
            .zip(record.iter())
            .filter(|(_, cell)| !cell.is_empty())
            .map(|(field, cell)| (field, parse_cell(cell)))
            .collect();

        if !observation.is_empty() {
            observations.push(observation);
        }
    }

    Ok(observations)
}

fn parse_cell(cell: &str) -> MeasurementValue {
    match cell.parse::<f64>() {
        Ok(n) if n.is_finite() => MeasurementValue::Number(n),
        _ => MeasurementValue::Text(cell.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_json_lines() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("history.jsonl");

        let contents = r#"{"waist": 70, "hips": 95}
{"waist": 71.5, "hips": 96, "body_type": "hourglass"}

{"waist": 69}
"#;
        std::fs::write(&path, contents).unwrap();

        let history = load_history(&path).unwrap();
        assert_eq!(history.len(), 3);
        assert_eq!(history[1].number("waist"), Some(71.5));
        assert_eq!(history[1].text("body_type"), Some("hourglass"));
    }

    #[test]
    fn test_malformed_lines_skipped() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("history.jsonl");

        std::fs::write(&path, "{ invalid json }\n{\"bust\": 90}\n[1, 2]\n").unwrap();

        let history = load_history(&path).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].number("bust"), Some(90.0));
    }

    #[test]
    fn test_load_csv() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("history.csv");

        let contents = "height,waist,hips,body_type\n170,70,95,pear\n171, 72 ,,\n,,,\n";
        std::fs::write(&path, contents).unwrap();

        let history = load_history(&path).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].text("body_type"), Some("pear"));
        assert_eq!(history[1].number("waist"), Some(72.0));
        assert!(!history[1].contains("hips"));
    }

    #[test]
    fn test_missing_file_is_empty_history() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nonexistent.jsonl");

        assert!(load_history(&path).unwrap().is_empty());
    }

    #[test]
    fn test_unsupported_extension() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("history.txt");
        std::fs::write(&path, "170").unwrap();

        assert!(matches!(load_history(&path), Err(Error::History(_))));
    }
}
