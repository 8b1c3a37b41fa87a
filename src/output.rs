//! Output formatting and persistence for gradebook results.
//!
//! Supports JSON rendering of a single student's grade and CSV append of
//! course report rows.

use anyhow::Result;
use tracing::debug;

use crate::gradebook::CourseReportRow;
use crate::grading::GradeResult;
use csv::WriterBuilder;
use std::fs::OpenOptions;
use std::path::Path;

/// Renders a [`GradeResult`] as JSON, pretty-printed if requested.
pub fn render_json(result: &GradeResult, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };
    Ok(json)
}

/// Appends report rows to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_rows(path: &str, rows: &[CourseReportRow]) -> Result<()> {
    let file_exists = Path::new(path).exists();
    debug!(path, file_exists, rows = rows.len(), "Appending CSV rows");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists)
        .from_writer(file);

    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    Ok(())
}
