//! Workbook (calamine) and CSV readers for the master dataset.

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use tracing::{debug, trace};

use super::{column_names, ColumnSelection, DatasetFormat, Result};
use crate::error::DatasetError;
use crate::models::table::{Cell, MasterTable};

/// Sheet name reported for CSV input.
const CSV_SHEET: &str = "Sheet1";

/// Reads a master dataset held in memory.
pub struct DatasetReader<'a> {
    bytes: &'a [u8],
    format: DatasetFormat,
    header_row: usize,
}

impl<'a> DatasetReader<'a> {
    /// Create a reader; `header_row` is the zero-based row holding column names.
    pub fn new(bytes: &'a [u8], format: DatasetFormat, header_row: usize) -> Self {
        Self {
            bytes,
            format,
            header_row,
        }
    }

    /// List available sheets.
    pub fn sheet_names(&self) -> Result<Vec<String>> {
        match self.format {
            DatasetFormat::Workbook => {
                let workbook = open_workbook_auto_from_rs(Cursor::new(self.bytes))
                    .map_err(|e| DatasetError::Open(e.to_string()))?;
                Ok(workbook.sheet_names().to_vec())
            }
            DatasetFormat::Csv => Ok(vec![CSV_SHEET.to_string()]),
        }
    }

    /// Phase 1: column names of a sheet.
    ///
    /// Only rows up to the header are converted, but workbook formats still
    /// decode the whole sheet range first; CSV input stops reading at the
    /// header row.
    pub fn read_columns(&self, sheet: Option<&str>) -> Result<Vec<String>> {
        let (sheet, rows) = self.load_rows(sheet, Some(self.header_row + 1))?;
        let header = self.header(&sheet, &rows)?;
        debug!("Sheet '{}' exposes {} columns", sheet, header.len());
        Ok(header)
    }

    /// Phase 2: full read keeping `key_column` plus the selected columns.
    pub fn read_table(
        &self,
        sheet: Option<&str>,
        key_column: &str,
        selection: &ColumnSelection,
    ) -> Result<MasterTable> {
        let (sheet, rows) = self.load_rows(sheet, None)?;
        let header = self.header(&sheet, &rows)?;

        let kept: Vec<usize> = header
            .iter()
            .enumerate()
            .filter(|(_, name)| name.as_str() == key_column || selection.keeps(name))
            .map(|(idx, _)| idx)
            .collect();

        let mut table = MasterTable::new(kept.iter().map(|&idx| header[idx].clone()).collect());

        for row in rows.into_iter().skip(self.header_row + 1) {
            if row.iter().all(Cell::is_empty) {
                continue;
            }
            let projected = kept
                .iter()
                .map(|&idx| row.get(idx).cloned().unwrap_or_default())
                .collect();
            table.push_row(projected);
        }

        debug!(
            "Read {} rows x {} columns from sheet '{}'",
            table.len(),
            table.columns.len(),
            sheet
        );
        Ok(table)
    }

    fn header(&self, sheet: &str, rows: &[Vec<Cell>]) -> Result<Vec<String>> {
        let labels: Vec<String> = rows
            .get(self.header_row)
            .ok_or_else(|| DatasetError::MissingHeader {
                sheet: sheet.to_string(),
                row: self.header_row,
            })?
            .iter()
            .map(|cell| cell.to_string())
            .collect();
        Ok(column_names(&labels))
    }

    /// Raw rows of a sheet, optionally stopping after `limit` rows.
    fn load_rows(&self, sheet: Option<&str>, limit: Option<usize>) -> Result<(String, Vec<Vec<Cell>>)> {
        match self.format {
            DatasetFormat::Workbook => self.load_workbook_rows(sheet, limit),
            DatasetFormat::Csv => {
                if let Some(name) = sheet {
                    if name != CSV_SHEET {
                        return Err(DatasetError::SheetNotFound(name.to_string()));
                    }
                }
                Ok((CSV_SHEET.to_string(), self.load_csv_rows(limit)?))
            }
        }
    }

    fn load_workbook_rows(
        &self,
        sheet: Option<&str>,
        limit: Option<usize>,
    ) -> Result<(String, Vec<Vec<Cell>>)> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(self.bytes))
            .map_err(|e| DatasetError::Open(e.to_string()))?;

        let sheet_names = workbook.sheet_names().to_vec();
        let sheet_name = match sheet {
            Some(name) if sheet_names.iter().any(|s| s == name) => name.to_string(),
            Some(name) => return Err(DatasetError::SheetNotFound(name.to_string())),
            None => sheet_names.first().cloned().ok_or(DatasetError::NoSheets)?,
        };

        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| DatasetError::Open(format!("failed to read sheet '{}': {}", sheet_name, e)))?;

        let (height, width) = range.get_size();
        let (start_row, start_col) = range
            .start()
            .map(|(row, col)| (row as usize, col as usize))
            .unwrap_or((0, 0));
        trace!(
            "Sheet '{}' range is {}x{} starting at ({}, {})",
            sheet_name, height, width, start_row, start_col
        );

        // The used range skips leading blank rows and columns; pad them back
        // so row and column indexes match the sheet.
        let limit = limit.unwrap_or(usize::MAX);
        let mut rows: Vec<Vec<Cell>> = std::iter::repeat_with(Vec::new)
            .take(start_row.min(limit))
            .collect();
        rows.extend(
            range
                .rows()
                .take(limit.saturating_sub(start_row))
                .map(|row| {
                    let mut cells = vec![Cell::Empty; start_col];
                    cells.extend(row.iter().map(convert_cell));
                    cells
                }),
        );

        Ok((sheet_name, rows))
    }

    fn load_csv_rows(&self, limit: Option<usize>) -> Result<Vec<Vec<Cell>>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(self.bytes);

        let mut rows = Vec::new();
        for record in reader.records().take(limit.unwrap_or(usize::MAX)) {
            let record = record?;
            rows.push(record.iter().map(parse_csv_field).collect());
        }
        Ok(rows)
    }
}

fn convert_cell(data: &Data) -> Cell {
    match data {
        Data::Empty | Data::Error(_) => Cell::Empty,
        Data::String(s) if s.is_empty() => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Int(n) => Cell::Int(*n),
        Data::Float(n) => Cell::Float(*n),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(datetime) => Cell::Text(datetime.to_string()),
            None => Cell::Float(dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
    }
}

/// Type a CSV field the way a spreadsheet would.
fn parse_csv_field(field: &str) -> Cell {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        return Cell::Empty;
    }
    if let Ok(n) = trimmed.parse::<i64>() {
        return Cell::Int(n);
    }
    if let Ok(n) = trimmed.parse::<f64>() {
        if n.is_finite() {
            return Cell::Float(n);
        }
    }
    Cell::Text(field.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const MASTER_CSV: &str = "Control de calidad,,\n\
                              Folio,Lote,Humidity\n\
                              100,L1,11.5\n\
                              ,,\n\
                              250,L2,\n";

    fn csv_reader() -> DatasetReader<'static> {
        DatasetReader::new(MASTER_CSV.as_bytes(), DatasetFormat::Csv, 1)
    }

    #[test]
    fn test_csv_columns_skip_title_row() {
        let reader = csv_reader();
        assert_eq!(reader.sheet_names().unwrap(), vec!["Sheet1"]);
        assert_eq!(
            reader.read_columns(None).unwrap(),
            vec!["Folio", "Lote", "Humidity"]
        );
    }

    #[test]
    fn test_csv_read_types_and_skips_blank_rows() {
        let table = csv_reader()
            .read_table(None, "Folio", &ColumnSelection::All)
            .unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.rows[0],
            vec![Cell::Int(100), Cell::from("L1"), Cell::Float(11.5)]
        );
        assert_eq!(table.rows[1][2], Cell::Empty);
    }

    #[test]
    fn test_selection_keeps_key_column() {
        let selection = ColumnSelection::Columns(vec!["Humidity".to_string()]);
        let table = csv_reader().read_table(None, "Folio", &selection).unwrap();
        assert_eq!(table.columns, vec!["Folio", "Humidity"]);
        assert_eq!(table.rows[0], vec![Cell::Int(100), Cell::Float(11.5)]);
    }

    #[test]
    fn test_csv_unknown_sheet() {
        let result = csv_reader().read_columns(Some("Other"));
        assert!(matches!(result, Err(DatasetError::SheetNotFound(_))));
    }

    #[test]
    fn test_missing_header_row() {
        let reader = DatasetReader::new(b"only a title\n", DatasetFormat::Csv, 1);
        assert!(matches!(
            reader.read_columns(None),
            Err(DatasetError::MissingHeader { row: 1, .. })
        ));
    }

    fn workbook(cells: &[(u32, u16, &str)], numbers: &[(u32, u16, f64)]) -> Vec<u8> {
        let mut workbook = rust_xlsxwriter::Workbook::new();
        let worksheet = workbook.add_worksheet();
        for &(row, col, text) in cells {
            worksheet.write_string(row, col, text).unwrap();
        }
        for &(row, col, number) in numbers {
            worksheet.write_number(row, col, number).unwrap();
        }
        workbook.save_to_buffer().unwrap()
    }

    #[test]
    fn test_header_row_counts_from_first_sheet_row() {
        // Row 1 left blank: the header still lives on row 2.
        let bytes = workbook(
            &[(1, 0, "Folio"), (1, 1, "Lote"), (2, 1, "L1")],
            &[(2, 0, 100.0)],
        );
        let reader = DatasetReader::new(&bytes, DatasetFormat::Workbook, 1);

        assert_eq!(reader.read_columns(None).unwrap(), vec!["Folio", "Lote"]);

        let table = reader
            .read_table(None, "Folio", &ColumnSelection::All)
            .unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows[0], vec![Cell::Float(100.0), Cell::from("L1")]);
    }

    #[test]
    fn test_leading_blank_column_keeps_positions() {
        let bytes = workbook(
            &[(0, 1, "Control"), (1, 1, "Folio"), (1, 2, "Lote"), (2, 2, "L7")],
            &[(2, 1, 7.0)],
        );
        let reader = DatasetReader::new(&bytes, DatasetFormat::Workbook, 1);

        assert_eq!(
            reader.read_columns(None).unwrap(),
            vec!["Unnamed: 0", "Folio", "Lote"]
        );

        let selection = ColumnSelection::Columns(vec!["Lote".to_string()]);
        let table = reader.read_table(None, "Folio", &selection).unwrap();
        assert_eq!(table.columns, vec!["Folio", "Lote"]);
        assert_eq!(table.rows[0], vec![Cell::Float(7.0), Cell::from("L7")]);
    }

    #[test]
    fn test_workbook_garbage_is_open_error() {
        let reader = DatasetReader::new(b"not a workbook", DatasetFormat::Workbook, 1);
        assert!(matches!(reader.sheet_names(), Err(DatasetError::Open(_))));
    }

    #[test]
    fn test_parse_csv_field() {
        assert_eq!(parse_csv_field(" 42 "), Cell::Int(42));
        assert_eq!(parse_csv_field("4.5"), Cell::Float(4.5));
        assert_eq!(parse_csv_field("NaN"), Cell::Text("NaN".to_string()));
        assert_eq!(parse_csv_field(""), Cell::Empty);
    }
}
