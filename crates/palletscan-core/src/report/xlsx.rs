//! XLSX report export using rust_xlsxwriter.

use rust_xlsxwriter::{Format, Workbook, Worksheet};
use tracing::debug;

use super::Result;
use crate::error::ReportError;
use crate::models::config::ReportConfig;
use crate::models::table::{Cell, ReportTable};

/// Excel's column limit.
const MAX_COLS: usize = 16_384;

/// Excel's maximum column width in characters.
const MAX_WIDTH: usize = 255;

/// Writes a [`ReportTable`] as a single-sheet workbook.
///
/// Header row in bold, columns sized to their longest value plus a margin,
/// autofilter over the data, panes frozen below the header and right of the
/// first column.
#[derive(Debug, Clone)]
pub struct XlsxReportWriter {
    sheet_name: String,
    column_margin: usize,
}

impl XlsxReportWriter {
    pub fn new(sheet_name: impl Into<String>, column_margin: usize) -> Self {
        Self {
            sheet_name: sheet_name.into(),
            column_margin,
        }
    }

    pub fn from_config(config: &ReportConfig) -> Self {
        Self::new(config.sheet_name.clone(), config.column_margin)
    }

    /// Serialize the report into an in-memory `.xlsx` file.
    pub fn write(&self, table: &ReportTable) -> Result<Vec<u8>> {
        if table.columns.len() > MAX_COLS {
            return Err(ReportError::TooManyColumns(table.columns.len()));
        }

        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&self.sheet_name)?;

        let header_format = Format::new().set_bold();
        for (col, name) in table.columns.iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, name, &header_format)?;
        }

        for (row_idx, row) in table.rows.iter().enumerate() {
            let xl_row = row_idx as u32 + 1;
            for (col, cell) in row.iter().enumerate() {
                write_cell(worksheet, xl_row, col as u16, cell)?;
            }
        }

        for (col, width) in self.column_widths(table).into_iter().enumerate() {
            worksheet.set_column_width(col as u16, width as f64)?;
        }

        if !table.columns.is_empty() {
            let last_col = (table.columns.len() - 1) as u16;
            worksheet.autofilter(0, 0, table.rows.len() as u32, last_col)?;
        }
        worksheet.set_freeze_panes(1, 1)?;

        let buffer = workbook.save_to_buffer()?;
        debug!(
            "Wrote report sheet '{}' with {} rows ({} bytes)",
            self.sheet_name,
            table.rows.len(),
            buffer.len()
        );
        Ok(buffer)
    }

    /// Longest stringified value per column (header included) plus margin.
    pub fn column_widths(&self, table: &ReportTable) -> Vec<usize> {
        table
            .columns
            .iter()
            .enumerate()
            .map(|(idx, name)| {
                let longest = table
                    .column(idx)
                    .map(|cell| cell.to_string().chars().count())
                    .chain(std::iter::once(name.chars().count()))
                    .max()
                    .unwrap_or(0);
                (longest + self.column_margin).min(MAX_WIDTH)
            })
            .collect()
    }
}

impl Default for XlsxReportWriter {
    fn default() -> Self {
        Self::from_config(&ReportConfig::default())
    }
}

fn write_cell(worksheet: &mut Worksheet, row: u32, col: u16, cell: &Cell) -> Result<()> {
    match cell {
        Cell::Empty => {}
        Cell::Int(n) => {
            worksheet.write_number(row, col, *n as f64)?;
        }
        Cell::Float(n) if n.is_finite() => {
            worksheet.write_number(row, col, *n)?;
        }
        Cell::Float(n) => {
            worksheet.write_string(row, col, n.to_string())?;
        }
        Cell::Bool(b) => {
            worksheet.write_boolean(row, col, *b)?;
        }
        Cell::Text(s) => {
            worksheet.write_string(row, col, s)?;
        }
    }
    Ok(())
}
