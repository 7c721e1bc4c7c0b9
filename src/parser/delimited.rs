//! Delimiter-separated text parser

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use rustc_hash::FxHashSet;

use crate::error::DiffError;
use crate::model::{CellValue, Column, Row, Table};

use super::{Parser, ReadOptions};

/// Parser for tab (or other delimiter) separated files
#[derive(Debug, Clone, Copy, Default)]
pub struct DelimitedParser;

impl Parser for DelimitedParser {
    fn parse(&self, path: &Path, options: &ReadOptions) -> Result<Table, DiffError> {
        let file = File::open(path).map_err(|e| DiffError::source_unavailable(path, e))?;
        let mut reader = BufReader::new(file);

        // Banner lines go before the csv reader sees anything
        let mut discard = Vec::new();
        for skipped in 0..options.skip_rows {
            discard.clear();
            let n = reader
                .read_until(b'\n', &mut discard)
                .map_err(|e| DiffError::source_unavailable(path, e))?;
            if n == 0 {
                return Err(DiffError::source_unavailable(
                    path,
                    format!("file ended after {} of {} skipped lines", skipped, options.skip_rows),
                ));
            }
        }

        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(options.delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers = csv_reader
            .headers()
            .map_err(|e| DiffError::source_unavailable(path, format!("failed to read header: {}", e)))?
            .clone();

        if headers.is_empty() {
            return Err(DiffError::source_unavailable(path, "no header row"));
        }

        let mut seen = FxHashSet::default();
        let mut columns = Vec::with_capacity(headers.len());
        for (i, name) in headers.iter().enumerate() {
            let name = name.trim();
            if !seen.insert(name.to_string()) {
                return Err(DiffError::source_unavailable(
                    path,
                    format!("duplicate column '{}' in header", name),
                ));
            }
            columns.push(Column::new(name, i));
        }

        let mut table = Table::new(path, columns);

        for result in csv_reader.records() {
            let record = result.map_err(|e| DiffError::source_unavailable(path, e))?;
            let line = record
                .position()
                .map(|p| p.line() as usize + options.skip_rows)
                .unwrap_or(0);

            if record.len() > table.column_count() {
                log::debug!(
                    "{}:{}: ignoring {} cells beyond the header",
                    path.display(),
                    line,
                    record.len() - table.column_count()
                );
            }

            // Short rows leave their trailing columns absent
            let mut row = Row::new(line);
            for (column, raw) in table.columns.iter().zip(record.iter()) {
                let value = if options.empty_as_absent && raw.is_empty() {
                    CellValue::Absent
                } else {
                    CellValue::from(raw)
                };
                row.insert(column.name.clone(), value);
            }
            table.add_row(row);
        }

        log::debug!(
            "loaded {} rows x {} columns from {}",
            table.row_count(),
            table.column_count(),
            path.display()
        );
        Ok(table)
    }
}
