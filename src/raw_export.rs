use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use csv::ReaderBuilder;
use parquet::file::reader::{FileReader, SerializedFileReader};
use parquet::record::Field as ParquetField;

use crate::error::{DashboardError, Result};
use crate::schema::{EXPECTED_RAW_COLUMNS, RawColumn};

/// One participant line of a raw export, before any normalisation.
///
/// Values are stored by [`RawColumn`] index; empty cells are `None`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RawRow {
    values: Vec<Option<String>>,
}

impl RawRow {
    pub fn from_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = (RawColumn, S)>,
        S: AsRef<str>,
    {
        let mut row = Self::empty();
        for (col, value) in values {
            row.set(col, value.as_ref());
        }
        row
    }

    /// Replacement for a line whose field count is off: keep the first field,
    /// everything else is missing.
    pub fn recovered(first_field: &str) -> Self {
        let mut row = Self::empty();
        row.set(RawColumn::Timestamp, first_field);
        row
    }

    fn empty() -> Self {
        Self {
            values: vec![None; EXPECTED_RAW_COLUMNS],
        }
    }

    fn set(&mut self, col: RawColumn, value: &str) {
        let trimmed = value.trim();
        self.values[col.index()] = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        };
    }

    pub fn get(&self, col: RawColumn) -> Option<&str> {
        self.values.get(col.index()).and_then(|v| v.as_deref())
    }

    /// True when only the timestamp survived, i.e. the line went through recovery.
    pub fn is_recovered(&self) -> bool {
        self.values
            .iter()
            .enumerate()
            .all(|(idx, v)| idx == RawColumn::Timestamp.index() || v.is_none())
    }
}

#[derive(Debug, Clone, Default)]
pub struct RawHistory {
    pub rows: Vec<RawRow>,
    pub files: Vec<PathBuf>,
    pub recovered: usize,
}

/// Reads every `*.csv` export in `path` (or `path` itself when it is a file).
pub fn read_export_dir(path: &Path, expected_columns: usize) -> Result<RawHistory> {
    let files = list_exports(path)?;
    let mut history = RawHistory::default();
    for file in files {
        let handle = File::open(&file)
            .map_err(|err| DashboardError::data_load(&file, err.to_string()))?;
        let (rows, recovered) = read_export_csv(handle, expected_columns)
            .map_err(|err| match err {
                DashboardError::DataFormat(msg) => {
                    DashboardError::data_format(format!("{}: {msg}", file.display()))
                }
                other => other,
            })?;
        if recovered > 0 {
            log::warn!(
                "{}: {} malformed line(s) replaced by timestamp-only rows",
                file.display(),
                recovered
            );
        }
        history.rows.extend(rows);
        history.recovered += recovered;
        history.files.push(file);
    }
    log::info!(
        "read {} raw rows from {} export file(s)",
        history.rows.len(),
        history.files.len()
    );
    Ok(history)
}

pub fn list_exports(path: &Path) -> Result<Vec<PathBuf>> {
    if !path.exists() {
        return Err(DashboardError::data_load(path, "path does not exist"));
    }
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    let entries =
        fs::read_dir(path).map_err(|err| DashboardError::data_load(path, err.to_string()))?;
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|err| DashboardError::data_load(path, err.to_string()))?;
        let file = entry.path();
        let is_csv = file
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if is_csv && file.is_file() {
            files.push(file);
        }
    }
    if files.is_empty() {
        return Err(DashboardError::data_load(path, "no csv exports found"));
    }
    files.sort();
    Ok(files)
}

/// Parses one export. Returns the rows and how many of them were recovered.
pub fn read_export_csv<R: Read>(reader: R, expected_columns: usize) -> Result<(Vec<RawRow>, usize)> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|err| DashboardError::data_format(format!("unreadable header: {err}")))?
        .clone();
    if headers.len() != expected_columns {
        return Err(DashboardError::data_format(format!(
            "header has {} columns, expected {}",
            headers.len(),
            expected_columns
        )));
    }

    let mapping = headers
        .iter()
        .map(RawColumn::from_header)
        .collect::<Vec<_>>();
    for col in RawColumn::ALL {
        if col.is_optional() {
            continue;
        }
        if !mapping.contains(&Some(col)) {
            return Err(DashboardError::data_format(format!(
                "missing column {}",
                col.header()
            )));
        }
    }

    // Recovered lines keep the field under the Timestamp header, wherever it sits.
    let ts_idx = mapping
        .iter()
        .position(|col| *col == Some(RawColumn::Timestamp))
        .unwrap_or(0);

    let mut rows = Vec::new();
    let mut recovered = 0usize;
    for record in rdr.records() {
        let record = record
            .map_err(|err| DashboardError::data_format(format!("unreadable line: {err}")))?;
        if record.len() != expected_columns {
            recovered += 1;
            rows.push(RawRow::recovered(record.get(ts_idx).unwrap_or("")));
            continue;
        }
        let mut row = RawRow::empty();
        for (value, col) in record.iter().zip(mapping.iter()) {
            if let Some(col) = col {
                row.set(*col, value);
            }
        }
        rows.push(row);
    }
    Ok((rows, recovered))
}

/// Reads a pre-merged parquet snapshot carrying the raw export columns.
pub fn read_snapshot(path: &Path) -> Result<RawHistory> {
    let file = File::open(path).map_err(|err| DashboardError::data_load(path, err.to_string()))?;
    let reader = SerializedFileReader::new(file).map_err(|err| {
        DashboardError::data_format(format!("open parquet snapshot {}: {err}", path.display()))
    })?;

    let schema = reader.metadata().file_metadata().schema();
    let present = schema
        .get_fields()
        .iter()
        .filter_map(|field| RawColumn::from_header(field.name()))
        .collect::<Vec<_>>();
    for col in RawColumn::ALL {
        if !col.is_optional() && !present.contains(&col) {
            return Err(DashboardError::data_format(format!(
                "snapshot {} is missing column {}",
                path.display(),
                col.header()
            )));
        }
    }

    let iter = reader.get_row_iter(None).map_err(|err| {
        DashboardError::data_format(format!("iterate snapshot rows {}: {err}", path.display()))
    })?;

    let mut rows = Vec::new();
    for row in iter {
        let row = row.map_err(|err| {
            DashboardError::data_format(format!("snapshot row {}: {err}", path.display()))
        })?;
        let mut raw = RawRow::empty();
        for (name, value) in row.get_column_iter() {
            let Some(col) = RawColumn::from_header(name) else {
                continue;
            };
            if let Some(text) = parquet_value_text(value) {
                raw.set(col, &text);
            }
        }
        rows.push(raw);
    }
    if rows.is_empty() {
        return Err(DashboardError::data_load(path, "snapshot has no rows"));
    }

    log::info!("read {} raw rows from snapshot {}", rows.len(), path.display());
    Ok(RawHistory {
        rows,
        files: vec![path.to_path_buf()],
        recovered: 0,
    })
}

fn parquet_value_text(value: &ParquetField) -> Option<String> {
    let text = match value {
        ParquetField::Null => return None,
        ParquetField::Str(s) => s.clone(),
        ParquetField::Bool(v) => v.to_string(),
        ParquetField::Int(v) => v.to_string(),
        ParquetField::Long(v) => v.to_string(),
        ParquetField::Float(v) => v.to_string(),
        ParquetField::Double(v) => v.to_string(),
        other => other.to_string(),
    };
    Some(text)
}
