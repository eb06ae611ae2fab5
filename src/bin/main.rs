use chrono::Local;
use hab_generator::args::Args;
use hab_generator::engine::{AmountPolicy, Batch, RunContext};
use hab_generator::layout::Layout;
use hab_generator::output::{self, LineEnding};
use hab_generator::source::Dataset;
use std::path::PathBuf;
use std::process;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn main() {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let date = args.date.unwrap_or_else(|| Local::now().date_naive());
    let policy = if args.strict_amounts {
        AmountPolicy::Reject
    } else {
        AmountPolicy::Flag
    };
    let ctx = match RunContext::new(date, args.sequence_start) {
        Ok(ctx) => ctx.with_amount_policy(policy),
        Err(err) => {
            error!("invalid run settings: {}", err);
            process::exit(1);
        }
    };

    let dataset = match Dataset::try_from(args.input_file.clone()) {
        Ok(dataset) => dataset,
        Err(err) => {
            error!("failed to process input file: {}", err);
            process::exit(1);
        }
    };
    if dataset.is_empty() {
        warn!("input file contains no records");
    }

    let layout = Layout::hab();
    let batch = match Batch::assemble(&layout, &ctx, &dataset) {
        Ok(batch) => batch,
        Err(err) => {
            error!("failed to encode records: {}", err);
            process::exit(1);
        }
    };

    let ending = if args.unix_newlines {
        LineEnding::Lf
    } else {
        LineEnding::CrLf
    };
    let contents = match batch.generate_hab_file(ending) {
        Ok(contents) => contents,
        Err(err) => {
            error!("failed to generate hab file: {}", err);
            process::exit(1);
        }
    };

    let output_file = args
        .output_file
        .unwrap_or_else(|| PathBuf::from(output::hab_file_name(date)));
    if let Err(err) = output::write_hab_file(&output_file, &contents) {
        error!("{}", err);
        process::exit(1);
    }

    for line in batch.lines().iter().take(args.preview) {
        info!("preview: {}", line);
    }

    let report = batch.report();
    info!(
        "processed {} records into {}",
        report.records,
        output_file.display()
    );
    if report.malformed_lines > 0 {
        warn!(
            "found {} lines with incorrect length",
            report.malformed_lines
        );
    }
    if report.truncated_fields > 0 {
        warn!(
            "{} field values were too long and have been truncated",
            report.truncated_fields
        );
    }
    if report.ambiguous_amounts > 0 {
        warn!(
            "{} amounts did not have exactly two decimal digits",
            report.ambiguous_amounts
        );
    }

    if let Some(path) = args.report_file {
        if let Err(err) = output::write_report(&path, report) {
            error!("{}", err);
            process::exit(1);
        }
    }
}
