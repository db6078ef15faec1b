//! CSV and Excel export of report results.

use std::path::Path;

use chrono::NaiveDate;
use csv::{QuoteStyle, Terminator, WriterBuilder};
use rust_xlsxwriter::{Color, Format, FormatBorder, Workbook};
use tracing::info;

use crate::error::{AppError, Result};
use crate::models::{ClassifiedRecord, StatusFilter};
use crate::range::QuickRangeToken;

/// MIME type of [`export_csv`] output.
pub const CSV_MIME_TYPE: &str = "text/csv";

/// Export column headers, in order.
pub const HEADERS: [&str; 6] = ["Date", "Employee", "Entry Time", "Work Time", "Break Time", "Status"];

/// Export records as CSV, one row per record in the given order.
///
/// Fields containing a comma, quote or line break are quoted with doubled
/// inner quotes. Output depends only on the input records.
pub fn export_csv(records: &[ClassifiedRecord]) -> Result<Vec<u8>> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(HEADERS)?;

    for record in records {
        writer.write_record(row_fields(record))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::serialization(format!("Failed to flush CSV: {e}")))?;

    info!("Exported {} records to CSV ({} bytes)", records.len(), bytes.len());
    Ok(bytes)
}

fn row_fields(record: &ClassifiedRecord) -> [String; 6] {
    [
        record.record.date.format("%Y-%m-%d").to_string(),
        record.record.name.clone(),
        record.entry_time(),
        record.work_time.clone(),
        record.break_time.clone(),
        record.status.to_string(),
    ]
}

/// Build the export file name for a query, dated by the caller.
///
/// e.g. `attendance_last_7_days_Late_2024-03-15.csv`
pub fn export_filename(token: QuickRangeToken, status: StatusFilter, generated_on: NaiveDate) -> String {
    format!(
        "attendance_{token}_{status}_{date}.csv",
        date = generated_on.format("%Y-%m-%d")
    )
}

/// Export records to an Excel workbook with the same columns as the CSV.
pub fn export_xlsx(records: &[ClassifiedRecord], path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    worksheet.set_name("Attendance Report")?;

    // Header format
    let header_format = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0x4472C4))
        .set_font_color(Color::White)
        .set_border(FormatBorder::Thin);

    for (col, header) in HEADERS.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *header, &header_format)?;
    }

    // Column widths
    worksheet.set_column_width(0, 12)?; // Date
    worksheet.set_column_width(1, 30)?; // Employee
    worksheet.set_column_width(2, 12)?; // Entry Time
    worksheet.set_column_width(3, 12)?; // Work Time
    worksheet.set_column_width(4, 12)?; // Break Time
    worksheet.set_column_width(5, 10)?; // Status

    for (idx, record) in records.iter().enumerate() {
        let row = (idx + 1) as u32;
        for (col, value) in row_fields(record).iter().enumerate() {
            worksheet.write_string(row, col as u16, value)?;
        }
    }

    if !records.is_empty() {
        let last_row = records.len() as u32;
        worksheet.autofilter(0, 0, last_row, (HEADERS.len() - 1) as u16)?;
    }

    // Freeze top row
    worksheet.set_freeze_panes(1, 0)?;

    workbook.save(path)?;
    info!("Exported {} records to {}", records.len(), path.display());
    Ok(())
}
