//! Reconciliation of extracted codes against the master dataset.
//!
//! Codes are looked up in ascending order, so report rows come out sorted
//! by folio. When several master rows share a folio only the first one is
//! used; a code printed twice is looked up twice.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, info, trace};

use crate::error::ReconcileError;
use crate::extraction::ShipmentId;
use crate::models::table::{Cell, MasterTable};

/// Result type for reconciliation operations.
pub type Result<T> = std::result::Result<T, ReconcileError>;

/// Receives one unit of progress per code processed.
pub trait ProgressSink {
    fn advance(&mut self, done: usize, total: usize);
}

impl<F: FnMut(usize, usize)> ProgressSink for F {
    fn advance(&mut self, done: usize, total: usize) {
        self(done, total)
    }
}

/// Discards progress.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn advance(&mut self, _done: usize, _total: usize) {}
}

/// A master row matched by an extracted code.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchedRow {
    /// Code that found the row.
    pub code: u64,
    /// `"<shipment> - <code>"`.
    pub composite: String,
    /// Copy of the master row, aligned with [`Reconciliation::columns`].
    pub cells: Vec<Cell>,
}

/// Matched rows plus counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Reconciliation {
    /// Master dataset columns.
    pub columns: Vec<String>,
    /// Matched rows in ascending code order.
    pub rows: Vec<MatchedRow>,
    /// Number of codes that found a row.
    pub matched: usize,
    /// Number of codes looked up.
    pub attempted: usize,
}

impl Reconciliation {
    /// "<matched> of <attempted>".
    pub fn ratio(&self) -> String {
        format!("{} of {}", self.matched, self.attempted)
    }

    pub fn unmatched(&self) -> usize {
        self.attempted - self.matched
    }
}

/// Composite identifier attached to a matched row.
pub fn composite_key(shipment: &str, code: u64) -> String {
    format!("{} - {}", shipment, code)
}

/// Joins codes against the key column of a master table.
#[derive(Debug, Clone)]
pub struct Reconciler {
    key_column: String,
}

impl Reconciler {
    pub fn new(key_column: impl Into<String>) -> Self {
        Self {
            key_column: key_column.into(),
        }
    }

    pub fn key_column(&self) -> &str {
        &self.key_column
    }

    /// Fail fast when the table lacks the key column.
    pub fn check(&self, table: &MasterTable) -> Result<usize> {
        table
            .column_index(&self.key_column)
            .ok_or_else(|| ReconcileError::MissingKeyColumn(self.key_column.clone()))
    }

    /// Look up every code, in ascending order, against `table`.
    pub fn reconcile(
        &self,
        codes: &[u64],
        shipment: &ShipmentId,
        table: &MasterTable,
        progress: &mut dyn ProgressSink,
    ) -> Result<Reconciliation> {
        let key_idx = self.check(table)?;
        let index = first_row_index(table, key_idx);

        let mut sorted = codes.to_vec();
        sorted.sort_unstable();

        let total = sorted.len();
        let mut result = Reconciliation {
            columns: table.columns.clone(),
            ..Default::default()
        };

        for (done, &code) in sorted.iter().enumerate() {
            result.attempted += 1;
            match index.get(&code) {
                Some(&row_idx) => {
                    trace!("Code {} matched row {}", code, row_idx);
                    result.rows.push(MatchedRow {
                        code,
                        composite: composite_key(&shipment.value, code),
                        cells: table.rows[row_idx].clone(),
                    });
                    result.matched += 1;
                }
                None => trace!("Code {} has no master row", code),
            }
            progress.advance(done + 1, total);
        }

        info!("Matched {} pallets for {}", result.ratio(), shipment);
        Ok(result)
    }
}

/// Map each folio to the first row carrying it.
fn first_row_index(table: &MasterTable, key_idx: usize) -> HashMap<u64, usize> {
    let mut index = HashMap::with_capacity(table.len());
    let mut duplicates = 0usize;

    for (row_idx, row) in table.rows.iter().enumerate() {
        if let Some(code) = row.get(key_idx).and_then(Cell::as_code) {
            if index.contains_key(&code) {
                duplicates += 1;
            } else {
                index.insert(code, row_idx);
            }
        }
    }

    if duplicates > 0 {
        debug!("{} master rows repeat an earlier folio and are ignored", duplicates);
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn master() -> MasterTable {
        let mut table = MasterTable::new(vec!["Folio".into(), "Lote".into()]);
        table.push_row(vec![Cell::Int(250), Cell::from("rowA")]);
        table.push_row(vec![Cell::Float(100.0), Cell::from("rowB")]);
        table.push_row(vec![Cell::Int(250), Cell::from("rowA-dup")]);
        table.push_row(vec![Cell::from("400"), Cell::from("rowC")]);
        table
    }

    fn lots(result: &Reconciliation) -> Vec<String> {
        result.rows.iter().map(|r| r.cells[1].to_string()).collect()
    }

    #[test]
    fn test_ascending_order_and_skips() {
        let shipment = ShipmentId::detected("MSCU1234567");
        let result = Reconciler::new("Folio")
            .reconcile(&[300, 250, 100], &shipment, &master(), &mut NoProgress)
            .unwrap();

        assert_eq!(lots(&result), vec!["rowB", "rowA"]);
        assert_eq!(result.rows[0].composite, "MSCU1234567 - 100");
        assert_eq!(result.rows[1].code, 250);
        assert_eq!(result.matched, 2);
        assert_eq!(result.attempted, 3);
        assert_eq!(result.unmatched(), 1);
    }

    #[test]
    fn test_match_counting_ratio() {
        let shipment = ShipmentId::unknown("UNKNOWN");
        let result = Reconciler::new("Folio")
            .reconcile(&[1, 100, 2, 250, 400], &shipment, &master(), &mut NoProgress)
            .unwrap();
        assert_eq!(result.matched, 3);
        assert_eq!(result.attempted, 5);
        assert_eq!(result.ratio(), "3 of 5");
        assert_eq!(result.rows[2].composite, "UNKNOWN - 400");
    }

    #[test]
    fn test_duplicate_codes_match_twice() {
        let shipment = ShipmentId::detected("MSCU1234567");
        let result = Reconciler::new("Folio")
            .reconcile(&[250, 250], &shipment, &master(), &mut NoProgress)
            .unwrap();
        assert_eq!(lots(&result), vec!["rowA", "rowA"]);
        assert_eq!(result.rows[0].composite, result.rows[1].composite);
        assert_eq!(result.attempted, 2);
    }

    #[test]
    fn test_missing_key_column_aborts() {
        let table = MasterTable::new(vec!["Lote".into()]);
        let mut calls = 0;
        let result = Reconciler::new("Folio").reconcile(
            &[1, 2],
            &ShipmentId::unknown("UNKNOWN"),
            &table,
            &mut |_: usize, _: usize| calls += 1,
        );
        assert!(matches!(result, Err(ReconcileError::MissingKeyColumn(ref c)) if c == "Folio"));
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_progress_one_unit_per_code() {
        let mut seen = Vec::new();
        Reconciler::new("Folio")
            .reconcile(
                &[5, 100, 7],
                &ShipmentId::unknown("UNKNOWN"),
                &master(),
                &mut |done: usize, total: usize| seen.push((done, total)),
            )
            .unwrap();
        assert_eq!(seen, vec![(1, 3), (2, 3), (3, 3)]);
    }

    #[test]
    fn test_no_codes() {
        let result = Reconciler::new("Folio")
            .reconcile(&[], &ShipmentId::unknown("UNKNOWN"), &master(), &mut NoProgress)
            .unwrap();
        assert_eq!(result.ratio(), "0 of 0");
        assert!(result.rows.is_empty());
    }
}
