//! Final report: output fixups, total balance and CSV export

use crate::error::ReportError;
use crate::inventory::models::{NOT_AVAILABLE, ZERO_VALUE};
use crate::inventory::ValuationRecord;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Summary of one finished run
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// Lines read from the identifier file
    pub input_lines: usize,
    /// Records produced by the dispatcher
    pub records: usize,
    /// Records left after the output filter
    pub retained: usize,
    pub total_balance: f64,
}

impl RunSummary {
    pub fn new(input_lines: usize, records: &[ValuationRecord], retained: &[ValuationRecord]) -> Self {
        Self {
            input_lines,
            records: records.len(),
            retained: retained.len(),
            total_balance: total_balance(records),
        }
    }
}

/// Sum of all record totals, skipping placeholders and zero totals
pub fn total_balance(records: &[ValuationRecord]) -> f64 {
    records
        .iter()
        .filter(|r| r.total_value != NOT_AVAILABLE && r.total_value != ZERO_VALUE)
        .filter_map(ValuationRecord::numeric_value)
        .sum()
}

/// Apply the pre-serialization fixups, then the output filter
///
/// 1. `N/A` totals become `0.00$`, and every `0.00$` record loses its image.
/// 2. A record is kept when its total is non-zero or its image is absent.
pub fn finalize(mut records: Vec<ValuationRecord>) -> Vec<ValuationRecord> {
    for record in &mut records {
        if record.total_value == NOT_AVAILABLE {
            record.total_value = ZERO_VALUE.to_string();
        }
        if record.is_zero() {
            record.item_image = None;
        }
    }

    records.into_iter().filter(is_retained).collect()
}

/// Output filter: a zero-value record that still carries an image is dropped
pub fn is_retained(record: &ValuationRecord) -> bool {
    !record.is_zero() || record.item_image.is_none()
}

/// Write records as `;`-separated CSV with a header row
///
/// Nothing is written for an empty record list.
pub fn write_csv<W: Write>(records: &[ValuationRecord], writer: W) -> Result<(), ReportError> {
    if records.is_empty() {
        return Ok(());
    }

    let mut csv = csv::WriterBuilder::new()
        .delimiter(b';')
        .quote_style(csv::QuoteStyle::Necessary)
        .from_writer(writer);

    for record in records {
        csv.serialize(record)?;
    }
    csv.flush()?;
    Ok(())
}

/// Write records to `path`, creating or truncating it
///
/// Returns `false` without touching the file system when there is nothing to
/// write.
pub fn write_csv_file<P: AsRef<Path>>(records: &[ValuationRecord], path: P) -> Result<bool, ReportError> {
    if records.is_empty() {
        return Ok(false);
    }
    let file = File::create(path)?;
    write_csv(records, file)?;
    Ok(true)
}
