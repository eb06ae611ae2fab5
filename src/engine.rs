use crate::errors::{EncodeError, OutputError, RunContextError};
use crate::layout::{FieldRule, FieldSpec, Layout};
use crate::normalize::{is_ambiguous_amount, normalize, scale_to_cents};
use crate::output::{self, LineEnding};
use crate::source::{Dataset, InputRecord};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, warn};

const DATE_FORMAT: &str = "%Y%m%d";

/// What to do with an amount whose decimal part is not exactly two digits
/// long, such as `"10,5"` or `"1.500"`. Stripping the punctuation out of
/// those values does not yield a correct number of cents.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AmountPolicy {
    /// Render the amount with the punctuation stripped, count it in the run
    /// report and log a warning.
    #[default]
    Flag,

    /// Abort the run before any output is produced.
    Reject,
}

/// Per-run settings that stay fixed while records are encoded.
#[derive(Clone, Debug, PartialEq)]
pub struct RunContext {
    date: NaiveDate,
    sequence_start: u32,
    amount_policy: AmountPolicy,
}

impl RunContext {
    /// Creates a context for the given settlement date. Voucher numbers
    /// start at `sequence_start`, which MUST be at least 1.
    pub fn new(date: NaiveDate, sequence_start: u32) -> Result<Self, RunContextError> {
        if sequence_start == 0 {
            return Err(RunContextError::InvalidSequenceStart(sequence_start));
        }

        Ok(Self {
            date,
            sequence_start,
            amount_policy: AmountPolicy::default(),
        })
    }

    pub fn with_amount_policy(mut self, amount_policy: AmountPolicy) -> Self {
        self.amount_policy = amount_policy;
        self
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn sequence_start(&self) -> u32 {
        self.sequence_start
    }

    pub fn amount_policy(&self) -> AmountPolicy {
        self.amount_policy
    }

    /// The run date as written into the file, `YYYYMMDD`.
    pub fn date_stamp(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }
}

/// Hands out voucher numbers for one run. Owned by the run loop and never
/// reset while the run is in progress.
///
/// Starts are `u32` but the counter runs in `u64`, so a run starting at
/// `u32::MAX` keeps counting instead of overflowing. Numbers wider than the
/// voucher field are truncated like any other overlong value.
#[derive(Debug)]
pub struct SequenceCounter {
    next: u64,
}

impl SequenceCounter {
    pub fn new(start: u32) -> Self {
        Self {
            next: u64::from(start),
        }
    }

    /// The number the next call to `take` will return.
    pub fn peek(&self) -> u64 {
        self.next
    }

    /// Returns the current number and advances the counter by one.
    pub fn take(&mut self) -> u64 {
        let current = self.next;
        self.next += 1;
        current
    }
}

/// The text of one field, exactly as wide as its FieldSpec.
#[derive(Debug, PartialEq)]
pub struct RenderedField {
    pub text: String,

    /// Whether characters were dropped from the end of the value to make it
    /// fit.
    pub truncated: bool,
}

/// Left-pads `value` with `'0'` up to `width` characters, or keeps only its
/// first `width` characters when it is longer.
pub fn fit_to_width(value: &str, width: usize) -> RenderedField {
    let len = value.chars().count();
    if len > width {
        return RenderedField {
            text: value.chars().take(width).collect(),
            truncated: true,
        };
    }

    let mut text = "0".repeat(width - len);
    text.push_str(value);
    RenderedField {
        text,
        truncated: false,
    }
}

/// One record's encoded line together with what went wrong building it.
#[derive(Debug, PartialEq)]
pub struct EncodedLine {
    pub text: String,

    /// Whether the line is exactly as long as the layout demands.
    pub valid: bool,

    /// Names of the fields whose values were cut short.
    pub truncated: Vec<&'static str>,

    /// Whether the amount had to be scaled from an ambiguous decimal
    /// representation.
    pub ambiguous_amount: bool,
}

/// Turns records into fixed-width lines for a single layout and run.
pub struct Encoder<'a> {
    layout: &'a Layout,
    ctx: &'a RunContext,
}

impl<'a> Encoder<'a> {
    pub fn new(layout: &'a Layout, ctx: &'a RunContext) -> Self {
        Self { layout, ctx }
    }

    /// Render a single field of a record.
    ///
    /// The run date and the voucher number ignore whatever the record
    /// holds. Amounts are converted to cents. Every other field takes the
    /// cleaned record value, falling back to the field default when the
    /// column is missing or empty.
    ///
    /// Rendering a `Sequence` field consumes a number from `sequence`.
    pub fn render_field(
        &self,
        field: &FieldSpec,
        record: &InputRecord,
        sequence: &mut SequenceCounter,
    ) -> RenderedField {
        let value = match field.rule {
            FieldRule::RunDate => self.ctx.date_stamp(),
            FieldRule::Sequence => sequence.take().to_string(),
            FieldRule::Amount => {
                // The separator check has to look at the raw text, since
                // normalizing removes exactly the characters it looks for.
                let raw = record.get(field.name).unwrap_or_default();
                scale_to_cents(raw, &normalize(raw))
            }
            FieldRule::Plain => match record.get(field.name).map(normalize) {
                Some(value) if !value.is_empty() => value,
                _ => field.default.to_string(),
            },
        };

        fit_to_width(&value, field.width)
    }

    /// Encode a full record, rendering every field in layout order.
    ///
    /// `number` is the 1-based position of the record in its dataset and is
    /// only used for diagnostics. Under `AmountPolicy::Reject` an ambiguous
    /// amount fails the record before any voucher number is consumed.
    pub fn encode(
        &self,
        record: &InputRecord,
        number: usize,
        sequence: &mut SequenceCounter,
    ) -> Result<EncodedLine, EncodeError> {
        let mut ambiguous_amount = false;
        for field in self.layout.fields() {
            if field.rule != FieldRule::Amount {
                continue;
            }

            let raw = record.get(field.name).unwrap_or_default();
            if is_ambiguous_amount(raw) {
                if self.ctx.amount_policy() == AmountPolicy::Reject {
                    return Err(EncodeError::AmbiguousAmount {
                        record: number,
                        raw: raw.to_string(),
                    });
                }
                ambiguous_amount = true;
            }
        }

        let mut text = String::with_capacity(self.layout.line_width());
        let mut truncated = Vec::new();
        for field in self.layout.fields() {
            let rendered = self.render_field(field, record, sequence);
            if rendered.truncated {
                truncated.push(field.name);
            }
            text.push_str(&rendered.text);
        }

        let valid = text.chars().count() == self.layout.line_width();
        Ok(EncodedLine {
            text,
            valid,
            truncated,
            ambiguous_amount,
        })
    }
}

/// Summary of a finished run.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct RunReport {
    pub date: String,
    pub records: usize,
    pub lines: usize,
    pub malformed_lines: usize,
    pub truncated_fields: usize,
    pub ambiguous_amounts: usize,
    pub first_sequence: Option<u64>,
    pub last_sequence: Option<u64>,
}

impl RunReport {
    /// Whether anything in the run deserves the user's attention.
    pub fn has_warnings(&self) -> bool {
        self.malformed_lines > 0 || self.truncated_fields > 0 || self.ambiguous_amounts > 0
    }
}

/// A Batch holds the encoded lines of one conversion run, in input order,
/// along with the counters collected while producing them.
#[derive(Debug)]
pub struct Batch {
    lines: Vec<String>,
    report: RunReport,
}

impl Batch {
    /// Encodes every record of the dataset in order.
    ///
    /// The dataset MUST carry all of the layout's required columns;
    /// otherwise nothing is encoded and an error is returned. Lines that do
    /// not match the layout's width are kept but counted as malformed, so a
    /// bad record never stops the run.
    pub fn assemble(
        layout: &Layout,
        ctx: &RunContext,
        dataset: &Dataset,
    ) -> Result<Self, EncodeError> {
        layout.check_columns(dataset.headers())?;

        let encoder = Encoder::new(layout, ctx);
        let mut sequence = SequenceCounter::new(ctx.sequence_start());
        let mut lines = Vec::with_capacity(dataset.len());
        let mut report = RunReport {
            date: ctx.date_stamp(),
            records: dataset.len(),
            ..RunReport::default()
        };

        for (idx, record) in dataset.records().iter().enumerate() {
            let number = idx + 1;
            let line = encoder.encode(record, number, &mut sequence)?;

            if !line.valid {
                warn!(
                    record = number,
                    expected = layout.line_width(),
                    actual = line.text.chars().count(),
                    "encoded line has the wrong length"
                );
                report.malformed_lines += 1;
            }

            for field in line.truncated.iter() {
                warn!(record = number, field = %field, "value overflowed its field and was truncated");
            }
            report.truncated_fields += line.truncated.len();

            if line.ambiguous_amount {
                warn!(record = number, "amount does not have exactly two decimal digits");
                report.ambiguous_amounts += 1;
            }

            debug!(record = number, line = %line.text, "encoded record");
            lines.push(line.text);
        }

        report.lines = lines.len();
        let start = u64::from(ctx.sequence_start());
        if sequence.peek() != start {
            report.first_sequence = Some(start);
            report.last_sequence = Some(sequence.peek() - 1);
        }

        info!(
            records = report.records,
            malformed = report.malformed_lines,
            truncated = report.truncated_fields,
            ambiguous = report.ambiguous_amounts,
            "assembled batch"
        );
        Ok(Self { lines, report })
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn report(&self) -> &RunReport {
        &self.report
    }

    pub fn malformed_lines(&self) -> usize {
        self.report.malformed_lines
    }

    /// Produces the bytes of the HAB file: every line encoded as
    /// windows-1252 and followed by `ending`.
    pub fn generate_hab_file(&self, ending: LineEnding) -> Result<Vec<u8>, OutputError> {
        output::encode_lines(&self.lines, ending)
    }
}
