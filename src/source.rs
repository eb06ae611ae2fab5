use crate::errors::SourceError;
use calamine::{open_workbook_auto, Data, Reader};
use csv::Trim;
use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// One spreadsheet row, keyed by column name. Values are kept exactly as
/// the source rendered them so the encoder can still see the original
/// punctuation of every cell.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InputRecord {
    values: HashMap<String, String>,
}

impl InputRecord {
    pub fn new(values: HashMap<String, String>) -> Self {
        Self { values }
    }

    /// The raw value of `column`, or None when the row has no such column.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.values.get(column).map(String::as_str)
    }

    fn is_blank(&self) -> bool {
        self.values.values().all(|v| v.trim().is_empty())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for InputRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// The parsed contents of an uploaded file: its header row and the data
/// rows below it, in file order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Dataset {
    headers: Vec<String>,
    records: Vec<InputRecord>,
}

impl Dataset {
    pub fn new(headers: Vec<String>, records: Vec<InputRecord>) -> Self {
        Self { headers, records }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn records(&self) -> &[InputRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Reads CSV data with a header row from any reader.
    pub fn from_csv_reader<R: io::Read>(rdr: R) -> Result<Self, SourceError> {
        // Every value is decoded as a string; numeric parsing is never
        // wanted here.
        let mut iter = csv::ReaderBuilder::new()
            .flexible(true)
            .has_headers(true)
            .trim(Trim::All)
            .from_reader(rdr);

        let headers: Vec<String> = iter.headers()?.iter().map(String::from).collect();
        if headers.iter().all(|h| h.is_empty()) {
            return Err(SourceError::MissingHeader);
        }

        warn_duplicate_headers(&headers);

        // Rows are zipped with the header row rather than deserialized into
        // a map, so a row that stops short of trailing optional columns
        // simply lacks them.
        let mut records = Vec::new();
        for (idx, row) in iter.records().enumerate() {
            let row = row?;
            let record = zip_record(&headers, row.iter().map(String::from));
            if record.is_blank() {
                debug!(row = idx + 2, "skipping blank csv row");
                continue;
            }
            records.push(record);
        }

        Ok(Self { headers, records })
    }

    /// Reads the first worksheet of a spreadsheet, taking its first row as
    /// the header row.
    pub fn from_workbook(path: &Path) -> Result<Self, SourceError> {
        let mut workbook = open_workbook_auto(path)?;
        let sheet = match workbook.sheet_names().first() {
            Some(name) => name.clone(),
            None => return Err(SourceError::EmptyWorkbook),
        };
        debug!(sheet = %sheet, "reading worksheet");

        let range = workbook.worksheet_range(&sheet)?;
        let mut rows = range.rows();

        let headers: Vec<String> = match rows.next() {
            Some(row) => row.iter().map(|c| cell_text(c).trim().to_string()).collect(),
            None => return Err(SourceError::MissingHeader),
        };
        if headers.iter().all(|h| h.is_empty()) {
            return Err(SourceError::MissingHeader);
        }

        warn_duplicate_headers(&headers);

        let mut records = Vec::new();
        for (idx, row) in rows.enumerate() {
            let record = zip_record(
                &headers,
                row.iter().map(|cell| cell_text(cell).trim().to_string()),
            );

            if record.is_blank() {
                debug!(row = idx + 2, "skipping blank worksheet row");
                continue;
            }
            records.push(record);
        }

        Ok(Self { headers, records })
    }
}

impl TryFrom<PathBuf> for Dataset {
    type Error = SourceError;

    /// Loads the file at the provided path, choosing the reader from the
    /// file extension.
    fn try_from(path: PathBuf) -> Result<Self, Self::Error> {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .unwrap_or_default();

        let dataset = match ext.as_str() {
            "csv" => {
                let rdr = std::fs::File::open(&path).map_err(csv::Error::from)?;
                Self::from_csv_reader(rdr)?
            }
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Self::from_workbook(&path)?,
            _ => return Err(SourceError::UnsupportedFormat(ext)),
        };

        info!(
            path = %path.display(),
            records = dataset.len(),
            columns = dataset.headers.len(),
            "loaded input dataset"
        );
        Ok(dataset)
    }
}

/// Pairs a row's values with the header row. Cells beyond the header row's
/// width have no column to land in and are dropped, as are cells under an
/// empty header. Where a header name repeats, the rightmost column wins.
fn zip_record<I: Iterator<Item = String>>(headers: &[String], values: I) -> InputRecord {
    headers
        .iter()
        .zip(values)
        .filter(|(header, _)| !header.is_empty())
        .map(|(header, value)| (header.clone(), value))
        .collect()
}

/// Header names that appear more than once, in order of first repeat.
fn duplicate_headers(headers: &[String]) -> Vec<&str> {
    let mut seen = HashSet::new();
    let mut duplicates = Vec::new();
    for header in headers.iter().filter(|h| !h.is_empty()) {
        if !seen.insert(header.as_str()) && !duplicates.contains(&header.as_str()) {
            duplicates.push(header.as_str());
        }
    }
    duplicates
}

fn warn_duplicate_headers(headers: &[String]) {
    for header in duplicate_headers(headers) {
        warn!(column = %header, "column appears more than once, using its rightmost value");
    }
}

/// Renders a worksheet cell as the text a user would have typed.
///
/// Spreadsheets store every number as a float, so whole numbers are written
/// without a fractional part rather than as `"2500.0"`.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        other => other.to_string(),
    }
}
