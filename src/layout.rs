use crate::errors::MissingColumnsError;

/// Selects which rendering branch applies to a field. Every field is
/// numeric and zero-padded; the rule only decides where its text comes
/// from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldRule {
    /// The cleaned record value, or the field default when the column is
    /// absent or empty.
    Plain,

    /// Always the run date as `YYYYMMDD`; the record value is ignored.
    RunDate,

    /// The run's voucher number. Each rendering consumes one number from
    /// the sequence counter.
    Sequence,

    /// A monetary amount, rendered in cents. Values written without a
    /// decimal separator are scaled by appending `"00"`.
    Amount,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub width: usize,
    pub default: &'static str,
    pub rule: FieldRule,
}

impl FieldSpec {
    pub const fn new(
        name: &'static str,
        width: usize,
        default: &'static str,
        rule: FieldRule,
    ) -> Self {
        Self {
            name,
            width,
            default,
            rule,
        }
    }
}

const HAB_FIELDS: [FieldSpec; 12] = [
    FieldSpec::new("TIPO DE CONVENIO", 3, "13", FieldRule::Plain),
    FieldSpec::new("SUCURSAL", 5, "", FieldRule::Plain),
    FieldSpec::new("MONEDA", 2, "1", FieldRule::Plain),
    FieldSpec::new("SISTEMA", 1, "3", FieldRule::Plain),
    FieldSpec::new("NRO CTA", 9, "", FieldRule::Plain),
    FieldSpec::new("IMPORTE", 18, "", FieldRule::Amount),
    FieldSpec::new("FECHA", 8, "", FieldRule::RunDate),
    FieldSpec::new("NRO CONVENIO CON LA EMPRESA", 5, "1137", FieldRule::Plain),
    FieldSpec::new("NRO COMPROBANTE", 6, "1", FieldRule::Sequence),
    FieldSpec::new("CBU", 22, "0", FieldRule::Plain),
    FieldSpec::new("CUOTA", 2, "0", FieldRule::Plain),
    FieldSpec::new("USUARIO", 22, "", FieldRule::Plain),
];

const HAB_REQUIRED_COLUMNS: [&str; 4] = ["USUARIO", "NRO CTA", "SUCURSAL", "IMPORTE"];

/// The ordered field table of a fixed-width file, together with the line
/// width every encoded record is checked against and the columns an input
/// dataset must carry.
///
/// A Layout is built once and only ever borrowed by the encoder, so a run
/// can never observe a schema change halfway through.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Layout {
    fields: Vec<FieldSpec>,
    line_width: usize,
    required_columns: Vec<&'static str>,
}

impl Layout {
    /// Builds a layout whose line width is the sum of its field widths.
    pub fn new(fields: Vec<FieldSpec>, required_columns: Vec<&'static str>) -> Self {
        let line_width = fields.iter().map(|field| field.width).sum();
        Self {
            fields,
            line_width,
            required_columns,
        }
    }

    /// Overrides the expected line width. Lines whose length differs from
    /// it are counted as malformed by the assembler.
    pub fn with_line_width(mut self, line_width: usize) -> Self {
        self.line_width = line_width;
        self
    }

    /// The 12-field layout of the HAB settlement file.
    pub fn hab() -> Self {
        Self::new(HAB_FIELDS.to_vec(), HAB_REQUIRED_COLUMNS.to_vec())
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn line_width(&self) -> usize {
        self.line_width
    }

    pub fn required_columns(&self) -> &[&'static str] {
        &self.required_columns
    }

    /// Verifies that every required column is present in `headers`,
    /// reporting all of the missing ones at once.
    pub fn check_columns<S: AsRef<str>>(&self, headers: &[S]) -> Result<(), MissingColumnsError> {
        let missing: Vec<String> = self
            .required_columns
            .iter()
            .filter(|required| !headers.iter().any(|h| h.as_ref() == **required))
            .map(|required| required.to_string())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(MissingColumnsError::new(missing))
        }
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self::hab()
    }
}
