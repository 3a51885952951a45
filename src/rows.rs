//! Row Source: the CSV input, read once and immutable afterwards.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use print_types::{PrintError, WorkRecord, UNKNOWN_LAYER};
use tracing::{debug, info};

/// All rows of one print job, in input order.
#[derive(Debug, Clone, Default)]
pub struct RowSource {
    headers: Vec<String>,
    records: Vec<WorkRecord>,
}

impl RowSource {
    /// Read and parse the CSV file at `path`.
    pub fn from_path(path: &Path) -> Result<Self, PrintError> {
        let input_error = |reason: String| PrintError::InputParse {
            path: path.to_path_buf(),
            reason,
        };

        let file = File::open(path).map_err(|err| input_error(err.to_string()))?;
        let source = Self::from_reader(file).map_err(input_error)?;
        info!(path = %path.display(), layers = source.len(), "loaded layer data");
        Ok(source)
    }

    /// Parse CSV from any reader. The first row is the header.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, String> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .trim(csv::Trim::Headers)
            .from_reader(reader);

        let headers: Vec<String> = reader
            .headers()
            .map_err(|err| err.to_string())?
            .iter()
            .map(str::to_string)
            .collect();
        if headers.iter().all(|header| header.is_empty()) {
            return Err("no columns to parse from file".to_string());
        }

        let mut records = Vec::new();
        for (index, row) in reader.records().enumerate() {
            let row = row.map_err(|err| err.to_string())?;
            let fields = headers
                .iter()
                .cloned()
                .zip(row.iter().map(str::to_string))
                .collect();
            let record = WorkRecord::from_fields(index, fields);
            if record.layer_number() == UNKNOWN_LAYER {
                debug!(index, "row has no layer number");
            }
            records.push(record);
        }

        Ok(Self { headers, records })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&WorkRecord> {
        self.records.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &WorkRecord> {
        self.records.iter()
    }

    /// Layer number of row `index`, or `"unknown"` past the end.
    pub fn layer_number(&self, index: usize) -> &str {
        self.get(index)
            .map(WorkRecord::layer_number)
            .unwrap_or(UNKNOWN_LAYER)
    }
}
