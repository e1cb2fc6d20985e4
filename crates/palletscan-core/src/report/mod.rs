//! Report projection and serialization.

mod xlsx;

pub use xlsx::XlsxReportWriter;

use crate::error::ReportError;
use crate::models::table::{Cell, ReportTable};
use crate::reconcile::Reconciliation;

/// Result type for report operations.
pub type Result<T> = std::result::Result<T, ReportError>;

/// Project matched rows onto the chosen columns.
///
/// `composite_column` selects the `"<shipment> - <code>"` value; names not
/// present in the dataset yield empty cells.
pub fn project(matched: &Reconciliation, columns: &[String], composite_column: &str) -> ReportTable {
    enum Source {
        Composite,
        Master(usize),
        Missing,
    }

    let sources: Vec<Source> = columns
        .iter()
        .map(|name| {
            if name == composite_column {
                Source::Composite
            } else if let Some(idx) = matched.columns.iter().position(|c| c == name) {
                Source::Master(idx)
            } else {
                Source::Missing
            }
        })
        .collect();

    let rows = matched
        .rows
        .iter()
        .map(|row| {
            sources
                .iter()
                .map(|source| match source {
                    Source::Composite => Cell::Text(row.composite.clone()),
                    Source::Master(idx) => row.cells.get(*idx).cloned().unwrap_or_default(),
                    Source::Missing => Cell::Empty,
                })
                .collect()
        })
        .collect();

    ReportTable {
        columns: columns.to_vec(),
        rows,
    }
}

/// Download name of the report for a shipment.
pub fn report_file_name(identifier: &str) -> String {
    format!("Pallets_{}.xlsx", identifier)
}

/// Render the report as CSV with a header row.
pub fn write_csv(table: &ReportTable) -> Result<Vec<u8>> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(&table.columns)?;
    for row in &table.rows {
        wtr.write_record(row.iter().map(|cell| cell.to_string()))?;
    }

    wtr.into_inner()
        .map_err(|e| ReportError::Csv(e.into_error().into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::MatchedRow;
    use pretty_assertions::assert_eq;

    fn matched() -> Reconciliation {
        Reconciliation {
            columns: vec!["Folio".into(), "Lote".into(), "Humedad".into()],
            rows: vec![
                MatchedRow {
                    code: 100,
                    composite: "MSCU1234567 - 100".into(),
                    cells: vec![Cell::Int(100), Cell::from("L1"), Cell::Float(11.5)],
                },
                MatchedRow {
                    code: 250,
                    composite: "MSCU1234567 - 250".into(),
                    cells: vec![Cell::Int(250), Cell::from("L2"), Cell::Empty],
                },
            ],
            matched: 2,
            attempted: 3,
        }
    }

    #[test]
    fn test_project_orders_and_fills_missing() {
        let columns: Vec<String> = ["Contenedor - Folio", "Humedad", "Color", "Folio"]
            .into_iter()
            .map(String::from)
            .collect();
        let table = project(&matched(), &columns, "Contenedor - Folio");

        assert_eq!(table.columns, columns);
        assert_eq!(
            table.rows[0],
            vec![
                Cell::from("MSCU1234567 - 100"),
                Cell::Float(11.5),
                Cell::Empty,
                Cell::Int(100)
            ]
        );
        assert_eq!(table.rows[1][1], Cell::Empty);
    }

    #[test]
    fn test_project_empty_reconciliation() {
        let table = project(&Reconciliation::default(), &["Folio".to_string()], "Contenedor - Folio");
        assert!(table.is_empty());
        assert_eq!(table.columns, vec!["Folio"]);
    }

    #[test]
    fn test_report_file_name() {
        assert_eq!(report_file_name("MSCU1234567"), "Pallets_MSCU1234567.xlsx");
    }

    #[test]
    fn test_write_csv() {
        let columns = vec!["Folio".to_string(), "Lote".to_string()];
        let table = project(&matched(), &columns, "Contenedor - Folio");
        let csv = String::from_utf8(write_csv(&table).unwrap()).unwrap();
        assert_eq!(csv, "Folio,Lote\n100,L1\n250,L2\n");
    }
}
