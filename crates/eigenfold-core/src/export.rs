//! Result export: JSON documents and CSV summary tables.

use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{FoldError, FoldResult};
use crate::estimator::FoldRecord;

/// Export configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Whether to pretty-print JSON output.
    pub pretty: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self { pretty: true }
    }
}

/// Serialize any result value to a JSON string.
pub fn to_json<T: Serialize + ?Sized>(value: &T, config: &ExportConfig) -> FoldResult<String> {
    if config.pretty {
        serde_json::to_string_pretty(value).map_err(FoldError::from)
    } else {
        serde_json::to_string(value).map_err(FoldError::from)
    }
}

/// Serialize any result value to a JSON file.
pub fn to_file<T: Serialize + ?Sized>(
    value: &T,
    path: &Path,
    config: &ExportConfig,
) -> FoldResult<()> {
    let json = to_json(value, config)?;
    create_parent(path)?;
    std::fs::write(path, json)
        .map_err(|e| FoldError::Io(format!("Failed to write {}: {}", path.display(), e)))
}

/// Summary table columns, in order.
pub const CSV_COLUMNS: [&str; 15] = [
    "lattice",
    "peptide",
    "R",
    "S",
    "n_qubits",
    "qubit_density",
    "n_stable",
    "dominant_state",
    "dominant_p",
    "entropy",
    "avg_p",
    "stable_states",
    "stable_p_sum",
    "energy",
    "time",
];

/// Flat CSV view of a [`FoldRecord`]; `stable_states` is a JSON array.
/// Field order must match [`CSV_COLUMNS`].
#[derive(Debug, Serialize, Deserialize)]
struct CsvRow {
    lattice: String,
    peptide: String,
    #[serde(rename = "R")]
    num_residues: usize,
    #[serde(rename = "S")]
    num_sites: usize,
    n_qubits: usize,
    qubit_density: f64,
    n_stable: usize,
    dominant_state: String,
    dominant_p: f64,
    entropy: f64,
    avg_p: f64,
    stable_states: String,
    stable_p_sum: f64,
    energy: f64,
    time: f64,
}

impl CsvRow {
    fn from_record(record: &FoldRecord) -> FoldResult<Self> {
        Ok(Self {
            lattice: record.lattice.clone(),
            peptide: record.peptide.clone(),
            num_residues: record.num_residues,
            num_sites: record.num_sites,
            n_qubits: record.n_qubits,
            qubit_density: record.qubit_density,
            n_stable: record.n_stable,
            dominant_state: record.dominant_state.clone(),
            dominant_p: record.dominant_p,
            entropy: record.entropy,
            avg_p: record.avg_p,
            stable_states: serde_json::to_string(&record.stable_states)?,
            stable_p_sum: record.stable_p_sum,
            energy: record.energy,
            time: record.time,
        })
    }

    fn into_record(self) -> FoldResult<FoldRecord> {
        Ok(FoldRecord {
            lattice: self.lattice,
            peptide: self.peptide,
            num_residues: self.num_residues,
            num_sites: self.num_sites,
            n_qubits: self.n_qubits,
            qubit_density: self.qubit_density,
            n_stable: self.n_stable,
            dominant_state: self.dominant_state,
            dominant_p: self.dominant_p,
            entropy: self.entropy,
            avg_p: self.avg_p,
            stable_states: serde_json::from_str(&self.stable_states)?,
            stable_p_sum: self.stable_p_sum,
            energy: self.energy,
            time: self.time,
        })
    }
}

/// Write records as CSV, header first, to any writer.
///
/// An empty slice still produces the header row.
pub fn write_csv<W: Write>(records: &[FoldRecord], writer: W) -> FoldResult<()> {
    let mut csv = csv::Writer::from_writer(writer);
    if records.is_empty() {
        csv.write_record(CSV_COLUMNS)?;
    }
    for record in records {
        csv.serialize(CsvRow::from_record(record)?)?;
    }
    csv.flush()
        .map_err(|e| FoldError::Io(format!("Failed to flush CSV: {e}")))
}

/// Write records as a CSV file, creating parent directories as needed.
pub fn write_csv_file(records: &[FoldRecord], path: &Path) -> FoldResult<()> {
    create_parent(path)?;
    let file = std::fs::File::create(path)
        .map_err(|e| FoldError::Io(format!("Failed to create {}: {}", path.display(), e)))?;
    write_csv(records, file)?;
    tracing::debug!(rows = records.len(), path = %path.display(), "wrote CSV summary");
    Ok(())
}

/// Read records back from a CSV file written by [`write_csv_file`].
pub fn read_csv_file(path: &Path) -> FoldResult<Vec<FoldRecord>> {
    let mut reader = csv::Reader::from_path(path)?;
    reader
        .deserialize::<CsvRow>()
        .map(|row| row.map_err(FoldError::from)?.into_record())
        .collect()
}

fn create_parent(path: &Path) -> FoldResult<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => std::fs::create_dir_all(dir)
            .map_err(|e| FoldError::Io(format!("Failed to create {}: {}", dir.display(), e))),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> FoldRecord {
        FoldRecord {
            lattice: "fcc".to_string(),
            peptide: "AVG".to_string(),
            num_residues: 3,
            num_sites: 4,
            n_qubits: 6,
            qubit_density: 2.0,
            n_stable: 2,
            dominant_state: "000110".to_string(),
            dominant_p: 0.5,
            entropy: 1.5,
            avg_p: 0.375,
            stable_states: vec![("000110".to_string(), 0.5), ("011000".to_string(), 0.25)],
            stable_p_sum: 0.75,
            energy: -5.0,
            time: 0.125,
        }
    }

    #[test]
    fn test_export_config_default() {
        let config = ExportConfig::default();
        assert!(config.pretty);
    }

    #[test]
    fn test_json_field_names() {
        let json = to_json(&record(), &ExportConfig { pretty: false }).unwrap();
        assert!(json.contains("\"R\":3"));
        assert!(json.contains("\"S\":4"));
        assert!(json.contains("\"stable_states\":[[\"000110\",0.5],[\"011000\",0.25]]"));
    }

    #[test]
    fn test_csv_header_order() {
        let mut buf = Vec::new();
        write_csv(&[record()], &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let header = text.lines().next().unwrap();
        assert_eq!(
            header,
            "lattice,peptide,R,S,n_qubits,qubit_density,n_stable,dominant_state,dominant_p,\
             entropy,avg_p,stable_states,stable_p_sum,energy,time"
        );
        assert_eq!(header, CSV_COLUMNS.join(","));
    }

    #[test]
    fn test_empty_csv_keeps_header() {
        let mut buf = Vec::new();
        write_csv(&[], &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.trim_end(), CSV_COLUMNS.join(","));
        assert_eq!(text.lines().count(), 1);
    }
}
