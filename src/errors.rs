use std::error::Error;
use std::fmt;
use std::fmt::Formatter;
use std::io;

#[derive(Debug, PartialEq)]
pub struct MissingColumnsError {
    columns: Vec<String>,
}

impl MissingColumnsError {
    pub fn new(columns: Vec<String>) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}

#[derive(Debug, PartialEq)]
pub enum RunContextError {
    InvalidSequenceStart(u32),
}

#[derive(Debug)]
pub enum SourceError {
    UnsupportedFormat(String),
    Csv(csv::Error),
    Workbook(calamine::Error),
    EmptyWorkbook,
    MissingHeader,
}

#[derive(Debug, PartialEq)]
pub enum EncodeError {
    MissingColumns(MissingColumnsError),
    AmbiguousAmount { record: usize, raw: String },
}

#[derive(Debug)]
pub enum OutputError {
    Unencodable { line: usize },
    Io(io::Error),
}

#[derive(Debug)]
pub enum ReportError {
    SerializeError(csv::Error),
    Io(io::Error),
}

impl fmt::Display for MissingColumnsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "input is missing required columns: {}",
            self.columns.join(", ")
        )
    }
}

impl fmt::Display for RunContextError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            RunContextError::InvalidSequenceStart(start) => write!(
                f,
                "sequence numbers MUST start at 1 or greater, got {}",
                start
            ),
        }
    }
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::UnsupportedFormat(ext) => {
                write!(f, "unsupported input format: {:?}", ext)
            }
            SourceError::Csv(err) => write!(f, "failed to read csv input: {}", err),
            SourceError::Workbook(err) => write!(f, "failed to read spreadsheet: {}", err),
            SourceError::EmptyWorkbook => write!(f, "spreadsheet contains no worksheets"),
            SourceError::MissingHeader => {
                write!(f, "input has no header row to read column names from")
            }
        }
    }
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            EncodeError::MissingColumns(err) => write!(f, "unable to encode records: {}", err),
            EncodeError::AmbiguousAmount { record, raw } => write!(
                f,
                "record {} has an amount {:?} without exactly two decimal digits",
                record, raw
            ),
        }
    }
}

impl fmt::Display for OutputError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            OutputError::Unencodable { line } => write!(
                f,
                "line {} contains characters that cannot be encoded as windows-1252",
                line
            ),
            OutputError::Io(err) => write!(f, "failed to write hab file: {}", err),
        }
    }
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ReportError::SerializeError(err) => {
                write!(f, "failed to serialize run report: {}", err)
            }
            ReportError::Io(err) => write!(f, "failed to write run report: {}", err),
        }
    }
}

impl From<MissingColumnsError> for EncodeError {
    fn from(err: MissingColumnsError) -> Self {
        EncodeError::MissingColumns(err)
    }
}

impl From<csv::Error> for SourceError {
    fn from(err: csv::Error) -> Self {
        SourceError::Csv(err)
    }
}

impl From<calamine::Error> for SourceError {
    fn from(err: calamine::Error) -> Self {
        SourceError::Workbook(err)
    }
}

impl From<io::Error> for OutputError {
    fn from(err: io::Error) -> Self {
        OutputError::Io(err)
    }
}

impl From<csv::Error> for ReportError {
    fn from(err: csv::Error) -> Self {
        ReportError::SerializeError(err)
    }
}

impl From<io::Error> for ReportError {
    fn from(err: io::Error) -> Self {
        ReportError::Io(err)
    }
}

impl Error for MissingColumnsError {}
impl Error for RunContextError {}
impl Error for SourceError {}
impl Error for EncodeError {}
impl Error for OutputError {}
impl Error for ReportError {}
