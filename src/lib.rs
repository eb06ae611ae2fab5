//! Conversion of settlement spreadsheets into HAB files: fixed-width,
//! windows-1252 text with one line per record, consumed by a downstream
//! batch settlement system.
//!
//! ```
//! use chrono::NaiveDate;
//! use hab_generator::engine::{Batch, RunContext};
//! use hab_generator::layout::Layout;
//! use hab_generator::source::Dataset;
//!
//! let data = "USUARIO,NRO CTA,SUCURSAL,IMPORTE\nJUANPEREZ,123456789,00123,2500\n";
//! let dataset = Dataset::from_csv_reader(data.as_bytes()).unwrap();
//! let ctx = RunContext::new(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(), 1).unwrap();
//!
//! let batch = Batch::assemble(&Layout::hab(), &ctx, &dataset).unwrap();
//! assert_eq!(batch.lines()[0].len(), 103);
//! assert_eq!(batch.malformed_lines(), 0);
//! ```

pub mod args;
pub mod engine;
pub mod errors;
pub mod layout;
pub mod normalize;
pub mod output;
pub mod source;
