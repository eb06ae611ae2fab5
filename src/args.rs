use chrono::NaiveDate;
use clap::{App, Arg, ArgMatches};
use std::path::PathBuf;

pub const DEFAULT_PREVIEW_LINES: usize = 5;

pub struct Args {
    pub input_file: PathBuf,
    pub date: Option<NaiveDate>,
    pub sequence_start: u32,
    pub output_file: Option<PathBuf>,
    pub report_file: Option<PathBuf>,
    pub strict_amounts: bool,
    pub unix_newlines: bool,
    pub preview: usize,
}

impl Args {
    pub fn parse() -> Self {
        let matches = Self::app().get_matches();
        Self::from_matches(&matches)
    }

    fn app() -> App<'static, 'static> {
        App::new("hab-gen")
            .version("0.1.0")
            .about("Converts a settlement spreadsheet into a fixed-width HAB file")
            .arg(Arg::with_name("input_file")
                .takes_value(true).required(true)
                .help("path of the spreadsheet (xlsx, xls, ods) or CSV file to read from"))
            .arg(Arg::with_name("date")
                .long("date").takes_value(true)
                .validator(|v| parse_date(&v).map(|_| ()))
                .help("settlement date written into every line, as YYYY-MM-DD [default: today]"))
            .arg(Arg::with_name("sequence_start")
                .long("sequence-start").takes_value(true).default_value("1")
                .validator(|v| parse_sequence_start(&v).map(|_| ()))
                .help("voucher number assigned to the first record"))
            .arg(Arg::with_name("output")
                .short("o").long("output").takes_value(true)
                .help("path of the HAB file to write [default: liquidacion_YYYYMMDD.hab]"))
            .arg(Arg::with_name("report")
                .long("report").takes_value(true)
                .help("also write a CSV summary of the run to this path"))
            .arg(Arg::with_name("strict_amounts")
                .long("strict-amounts")
                .help("fail instead of warning on amounts without exactly two decimal digits"))
            .arg(Arg::with_name("lf")
                .long("lf")
                .help("terminate lines with LF instead of CRLF"))
            .arg(Arg::with_name("preview")
                .long("preview").takes_value(true)
                .validator(|v| v.parse::<usize>().map(|_| ()).map_err(|e| e.to_string()))
                .help("number of encoded lines to log once the run completes [default: 5]"))
    }

    fn from_matches(matches: &ArgMatches) -> Self {
        // Values were checked by their validators, so parsing cannot fail
        // here.
        Self {
            input_file: PathBuf::from(matches.value_of("input_file").unwrap_or_default()),
            date: matches.value_of("date").and_then(|v| parse_date(v).ok()),
            sequence_start: matches
                .value_of("sequence_start")
                .and_then(|v| parse_sequence_start(v).ok())
                .unwrap_or(1),
            output_file: matches.value_of("output").map(PathBuf::from),
            report_file: matches.value_of("report").map(PathBuf::from),
            strict_amounts: matches.is_present("strict_amounts"),
            unix_newlines: matches.is_present("lf"),
            preview: matches
                .value_of("preview")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_PREVIEW_LINES),
        }
    }
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| format!("invalid date {:?}, expected YYYY-MM-DD: {}", value, e))
}

fn parse_sequence_start(value: &str) -> Result<u32, String> {
    match value.parse::<u32>() {
        Ok(0) => Err("sequence numbers start at 1 or greater".to_string()),
        Ok(start) => Ok(start),
        Err(e) => Err(format!("invalid sequence start {:?}: {}", value, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_from(argv: &[&str]) -> Result<Args, clap::Error> {
        let matches = Args::app().get_matches_from_safe(argv)?;
        Ok(Args::from_matches(&matches))
    }

    #[test]
    fn should_apply_defaults() {
        let args = parse_from(&["hab-gen", "liquidacion.xlsx"]).unwrap();

        assert_eq!(args.input_file, PathBuf::from("liquidacion.xlsx"));
        assert_eq!(args.date, None);
        assert_eq!(args.sequence_start, 1);
        assert_eq!(args.output_file, None);
        assert_eq!(args.report_file, None);
        assert!(!args.strict_amounts);
        assert!(!args.unix_newlines);
        assert_eq!(args.preview, DEFAULT_PREVIEW_LINES);
    }

    #[test]
    fn should_parse_every_option() {
        let args = parse_from(&[
            "hab-gen",
            "liquidacion.csv",
            "--date",
            "2024-03-15",
            "--sequence-start",
            "40",
            "-o",
            "out/file.hab",
            "--report",
            "report.csv",
            "--strict-amounts",
            "--lf",
            "--preview",
            "0",
        ])
        .unwrap();

        assert_eq!(args.date, NaiveDate::from_ymd_opt(2024, 3, 15));
        assert_eq!(args.sequence_start, 40);
        assert_eq!(args.output_file, Some(PathBuf::from("out/file.hab")));
        assert_eq!(args.report_file, Some(PathBuf::from("report.csv")));
        assert!(args.strict_amounts);
        assert!(args.unix_newlines);
        assert_eq!(args.preview, 0);
    }

    #[test]
    fn should_reject_malformed_date() {
        assert!(parse_from(&["hab-gen", "in.csv", "--date", "15/03/2024"]).is_err());
    }

    #[test]
    fn should_reject_zero_sequence_start() {
        assert!(parse_from(&["hab-gen", "in.csv", "--sequence-start", "0"]).is_err());
    }

    #[test]
    fn should_require_input_file() {
        assert!(parse_from(&["hab-gen"]).is_err());
    }
}
