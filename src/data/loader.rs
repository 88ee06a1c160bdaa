//! Dataset loading
//!
//! Reads the historical table from a configured path. Format is picked from
//! the file extension; a file without one is read as CSV.

use super::schema::validate_schema;
use crate::error::{PriceError, Result};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use polars::prelude::*;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::io::Cursor;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// File formats the loader understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Tsv,
    Parquet,
    Json,
    JsonLines,
    Excel,
}

impl FileFormat {
    /// Pick the format from the path's extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "csv" | "" => Ok(Self::Csv),
            "tsv" | "tab" => Ok(Self::Tsv),
            "parquet" | "pq" => Ok(Self::Parquet),
            "json" => Ok(Self::Json),
            "jsonl" | "ndjson" => Ok(Self::JsonLines),
            "xlsx" | "xlsm" | "xls" | "ods" => Ok(Self::Excel),
            other => Err(PriceError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Data loader for the supported file formats.
///
/// Every format is parsed from an in-memory copy of the file, so the bytes
/// that were parsed are the bytes that get fingerprinted.
pub struct DataLoader {
    /// Rows used for CSV schema inference
    infer_schema_length: usize,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    /// Create a new data loader
    pub fn new() -> Self {
        Self {
            infer_schema_length: 1000,
        }
    }

    /// Parse delimited text
    pub fn load_csv(&self, bytes: &[u8], delimiter: u8) -> Result<DataFrame> {
        let parse_opts = CsvParseOptions::default().with_separator(delimiter);

        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(self.infer_schema_length))
            .with_parse_options(parse_opts)
            .into_reader_with_file_handle(Cursor::new(bytes))
            .finish()?;
        Ok(df)
    }

    /// Parse a Parquet file
    pub fn load_parquet(&self, bytes: &[u8]) -> Result<DataFrame> {
        Ok(ParquetReader::new(Cursor::new(bytes)).finish()?)
    }

    /// Parse a JSON array of records, or one record per line when `lines` is set
    pub fn load_json(&self, bytes: &[u8], lines: bool) -> Result<DataFrame> {
        let format = if lines { JsonFormat::JsonLines } else { JsonFormat::Json };
        Ok(JsonReader::new(Cursor::new(bytes)).with_json_format(format).finish()?)
    }

    /// Parse the first worksheet of an Excel or OpenDocument workbook.
    ///
    /// The first row is the header. A column whose cells are all numeric (or
    /// empty) becomes `Float64`; any other column becomes `String`.
    pub fn load_excel(&self, bytes: &[u8]) -> Result<DataFrame> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| PriceError::DataError("workbook has no worksheets".to_string()))??;

        let mut rows = range.rows();
        let header: Vec<String> = rows
            .next()
            .ok_or_else(|| PriceError::DataError("worksheet is empty".to_string()))?
            .iter()
            .map(|cell| cell.to_string().trim().to_string())
            .collect();
        let body: Vec<&[Data]> = rows.collect();

        let columns: Vec<Column> = header
            .iter()
            .enumerate()
            .map(|(idx, name)| {
                let cell = |row: &&[Data]| row.get(idx).cloned().unwrap_or(Data::Empty);
                let numeric = body
                    .iter()
                    .map(cell)
                    .all(|c| matches!(c, Data::Int(_) | Data::Float(_) | Data::Empty));

                if numeric {
                    let values: Vec<Option<f64>> = body
                        .iter()
                        .map(cell)
                        .map(|c| match c {
                            Data::Int(v) => Some(v as f64),
                            Data::Float(v) => Some(v),
                            _ => None,
                        })
                        .collect();
                    Series::new(name.as_str().into(), values).into()
                } else {
                    let values: Vec<Option<String>> = body
                        .iter()
                        .map(cell)
                        .map(|c| match c {
                            Data::Empty => None,
                            other => Some(other.to_string()),
                        })
                        .collect();
                    Series::new(name.as_str().into(), values).into()
                }
            })
            .collect();

        Ok(DataFrame::new(columns)?)
    }

    /// Parse `bytes` as `format`
    pub fn load_bytes(&self, bytes: &[u8], format: FileFormat) -> Result<DataFrame> {
        match format {
            FileFormat::Csv => self.load_csv(bytes, b','),
            FileFormat::Tsv => self.load_csv(bytes, b'\t'),
            FileFormat::Parquet => self.load_parquet(bytes),
            FileFormat::Json => self.load_json(bytes, false),
            FileFormat::JsonLines => self.load_json(bytes, true),
            FileFormat::Excel => self.load_excel(bytes),
        }
    }

    /// Detect file format from extension and load
    pub fn load_auto(&self, path: &Path) -> Result<DataFrame> {
        let format = FileFormat::from_path(path)?;
        let bytes = std::fs::read(path)?;
        self.load_bytes(&bytes, format)
    }
}

/// A loaded table together with the SHA-256 of the bytes it was parsed from
#[derive(Debug, Clone)]
pub struct LoadedDataset {
    pub frame: DataFrame,
    pub fingerprint: String,
}

/// Read the historical table once, fingerprint it, and check its schema.
///
/// Any failure here is fatal for the caller: there is no fallback dataset.
pub fn read_dataset(path: &Path) -> Result<LoadedDataset> {
    let start = Instant::now();
    let format = FileFormat::from_path(path)?;
    let bytes = std::fs::read(path)?;
    let fingerprint = fingerprint_bytes(&bytes);
    debug!(path = %path.display(), bytes = bytes.len(), %fingerprint, "Read dataset file");

    let frame = DataLoader::new().load_bytes(&bytes, format)?;
    validate_schema(&frame)?;
    info!(
        path = %path.display(),
        rows = frame.height(),
        columns = frame.width(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Loaded historical dataset"
    );
    Ok(LoadedDataset { frame, fingerprint })
}

/// Load the historical table and check its schema
pub fn load_dataset(path: &Path) -> Result<DataFrame> {
    Ok(read_dataset(path)?.frame)
}

/// SHA-256 of the dataset bytes, hex encoded
fn fingerprint_bytes(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Per-column overview used by the `info` command
#[derive(Debug, Clone, Serialize)]
pub struct ColumnSummary {
    pub name: String,
    pub dtype: String,
    pub null_count: usize,
    pub unique_count: usize,
}

/// Shape and column overview of a loaded table
#[derive(Debug, Clone, Serialize)]
pub struct DatasetSummary {
    pub rows: usize,
    pub columns: Vec<ColumnSummary>,
    pub estimated_size_bytes: usize,
}

impl DatasetSummary {
    pub fn from_frame(df: &DataFrame) -> Self {
        let columns = df
            .get_columns()
            .iter()
            .map(|col| ColumnSummary {
                name: col.name().to_string(),
                dtype: format!("{:?}", col.dtype()),
                null_count: col.null_count(),
                unique_count: col.n_unique().unwrap_or(0),
            })
            .collect();

        Self {
            rows: df.height(),
            columns,
            estimated_size_bytes: df.estimated_size(),
        }
    }
}
