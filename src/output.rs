//! Serialization of encoded lines into the bytes the settlement system
//! reads: windows-1252 text, one record per line.

use crate::engine::RunReport;
use crate::errors::{OutputError, ReportError};
use chrono::NaiveDate;
use encoding_rs::WINDOWS_1252;
use std::fs;
use std::path::Path;
use tracing::info;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LineEnding {
    #[default]
    CrLf,
    Lf,
}

impl LineEnding {
    pub fn as_bytes(&self) -> &'static [u8] {
        match self {
            LineEnding::CrLf => b"\r\n",
            LineEnding::Lf => b"\n",
        }
    }
}

/// Encodes each line as windows-1252 and terminates it with `ending`.
///
/// A character outside the code page fails the whole file, naming the
/// 1-based line it appeared on.
pub fn encode_lines<S: AsRef<str>>(lines: &[S], ending: LineEnding) -> Result<Vec<u8>, OutputError> {
    let terminator = ending.as_bytes();
    let mut buf = Vec::with_capacity(lines.iter().map(|l| l.as_ref().len() + terminator.len()).sum());

    for (idx, line) in lines.iter().enumerate() {
        let (bytes, _, had_errors) = WINDOWS_1252.encode(line.as_ref());
        if had_errors {
            return Err(OutputError::Unencodable { line: idx + 1 });
        }
        buf.extend_from_slice(&bytes);
        buf.extend_from_slice(terminator);
    }

    Ok(buf)
}

/// The name the downloadable file is given for a run date,
/// `liquidacion_YYYYMMDD.hab`.
pub fn hab_file_name(date: NaiveDate) -> String {
    format!("liquidacion_{}.hab", date.format("%Y%m%d"))
}

/// Writes the HAB bytes to `path`, creating parent directories as needed.
pub fn write_hab_file(path: &Path, contents: &[u8]) -> Result<(), OutputError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, contents)?;

    info!(path = %path.display(), bytes = contents.len(), "wrote hab file");
    Ok(())
}

/// Writes the run report as a single-row CSV file with a header.
pub fn write_report(path: &Path, report: &RunReport) -> Result<(), ReportError> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.serialize(report)?;
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_terminate_every_line_with_crlf() {
        let bytes = encode_lines(&["0001", "0002"], LineEnding::CrLf).unwrap();

        assert_eq!(bytes, b"0001\r\n0002\r\n".to_vec());
    }

    #[test]
    fn should_terminate_every_line_with_lf() {
        let bytes = encode_lines(&["0001", "0002"], LineEnding::Lf).unwrap();

        assert_eq!(bytes, b"0001\n0002\n".to_vec());
    }

    #[test]
    fn should_encode_accented_characters_as_single_bytes() {
        let bytes = encode_lines(&["0MUÑOZ"], LineEnding::Lf).unwrap();

        // Ñ is 0xD1 in windows-1252.
        assert_eq!(bytes, vec![b'0', b'M', b'U', 0xD1, b'O', b'Z', b'\n']);
    }

    #[test]
    fn should_fail_on_characters_outside_the_code_page() {
        let err = encode_lines(&["0001", "00\u{4e2d}"], LineEnding::CrLf).unwrap_err();

        assert!(matches!(err, OutputError::Unencodable { line: 2 }));
    }

    #[test]
    fn should_produce_no_bytes_for_no_lines() {
        let lines: Vec<String> = vec![];

        assert!(encode_lines(&lines, LineEnding::CrLf).unwrap().is_empty());
    }

    #[test]
    fn should_name_file_after_run_date() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();

        assert_eq!(hab_file_name(date), "liquidacion_20240315.hab");
    }

    #[test]
    fn should_write_hab_file_into_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("liquidacion_20240315.hab");

        write_hab_file(&path, b"0001\r\n").unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"0001\r\n".to_vec());
    }

    #[test]
    fn should_write_report_as_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.csv");
        let report = RunReport {
            date: "20240315".to_string(),
            records: 2,
            lines: 2,
            malformed_lines: 0,
            truncated_fields: 1,
            ambiguous_amounts: 0,
            first_sequence: Some(1),
            last_sequence: Some(2),
        };

        write_report(&path, &report).unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "date,records,lines,malformed_lines,truncated_fields,ambiguous_amounts,first_sequence,last_sequence\n\
             20240315,2,2,0,1,0,1,2\n"
        );
    }
}
