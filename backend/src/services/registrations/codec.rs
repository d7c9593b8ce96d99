//! Parsing and serialization of the registration CSV document.
//!
//! The layout is fixed: one header line of field labels followed by `Date`,
//! then one line per registration. Data values are always quoted with
//! embedded quotes doubled; the header is only quoted where a label needs it.

use common::model::csv::{CsvRow, DATE_COLUMN};
use common::model::field::FieldDefinition;
use common::model::registration::RegistrationRecord;
use csv::{QuoteStyle, ReaderBuilder, Terminator, WriterBuilder};
use log::warn;

/// Header cells for `fields`: every label in order, then `Date`.
pub fn header(fields: &[FieldDefinition]) -> Vec<String> {
    fields
        .iter()
        .map(|f| f.label.clone())
        .chain(std::iter::once(DATE_COLUMN.to_string()))
        .collect()
}

/// Parses a whole document into rows keyed by its own header line.
///
/// Records the parser rejects (for example a line with a different number of
/// cells than the header) are skipped with a warning instead of failing the
/// read. Cells under a `phone` header are trimmed.
pub fn parse_rows(content: &str) -> Vec<CsvRow> {
    if content.trim().is_empty() {
        return Vec::new();
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_reader(content.as_bytes());
    let headers = match reader.headers() {
        Ok(headers) => headers.clone(),
        Err(e) => {
            warn!("Unreadable CSV header, treating document as empty: {}", e);
            return Vec::new();
        }
    };

    let mut rows = Vec::new();
    for (index, result) in reader.records().enumerate() {
        match result {
            Ok(record) => rows.push(
                headers
                    .iter()
                    .zip(record.iter())
                    .map(|(h, v)| (h.to_string(), read_cell(h, v)))
                    .collect(),
            ),
            // +2: one for the header line, one for 1-based numbering
            Err(e) => warn!("Skipping malformed CSV row {}: {}", index + 2, e),
        }
    }
    rows
}

fn read_cell(header: &str, value: &str) -> String {
    if header.eq_ignore_ascii_case("phone") {
        value.trim().to_string()
    } else {
        value.to_string()
    }
}

/// Value of `field` in a previously stored row.
///
/// Historical documents were written with inconsistent column names, so the
/// cell is looked up by key, then by label, then by lower-cased label. The
/// first non-empty hit wins and a miss is an empty string. Do not tighten
/// this: rows that only match through a later step would silently lose data.
pub fn lookup<'a>(row: &'a CsvRow, field: &FieldDefinition) -> &'a str {
    non_empty(row, &field.key)
        .or_else(|| non_empty(row, &field.label))
        .or_else(|| non_empty(row, &field.label.to_lowercase()))
        .unwrap_or("")
}

/// Timestamp cell of a previously stored row (`Date`, then `date`).
pub fn row_date(row: &CsvRow) -> &str {
    non_empty(row, DATE_COLUMN)
        .or_else(|| non_empty(row, "date"))
        .unwrap_or("")
}

fn non_empty<'a>(row: &'a CsvRow, column: &str) -> Option<&'a str> {
    row.get(column)
        .map(String::as_str)
        .filter(|v| !v.is_empty())
}

/// Header-only document for `fields`.
pub fn header_document(fields: &[FieldDefinition]) -> Result<String, csv::Error> {
    render(fields, &[], &[])
}

/// Full document: header, then `existing` rows remapped onto `fields`, then
/// the `new` records in queue order.
pub fn render(
    fields: &[FieldDefinition],
    existing: &[CsvRow],
    new: &[RegistrationRecord],
) -> Result<String, csv::Error> {
    let mut out = write_lines(QuoteStyle::Necessary, std::iter::once(header(fields)))?;

    let existing_lines = existing.iter().map(|row| {
        fields
            .iter()
            .map(|f| lookup(row, f).to_string())
            .chain(std::iter::once(row_date(row).to_string()))
            .collect::<Vec<_>>()
    });
    let new_lines = new.iter().map(|record| {
        fields
            .iter()
            .map(|f| record.value(&f.key).to_string())
            .chain(std::iter::once(record.date.clone()))
            .collect::<Vec<_>>()
    });
    out.extend(write_lines(QuoteStyle::Always, existing_lines.chain(new_lines))?);

    Ok(String::from_utf8_lossy(&out).into_owned())
}

fn write_lines(
    style: QuoteStyle,
    lines: impl Iterator<Item = Vec<String>>,
) -> Result<Vec<u8>, csv::Error> {
    let mut writer = WriterBuilder::new()
        .quote_style(style)
        .terminator(Terminator::Any(b'\n'))
        .flexible(true)
        .from_writer(Vec::new());
    for line in lines {
        writer.write_record(&line)?;
    }
    writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}
