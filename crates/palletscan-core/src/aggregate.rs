//! Column averages over the report.

use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::models::table::{Cell, ReportTable};

/// Mean per averaged column, in report column order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AverageSummary {
    pub averages: Vec<(String, f64)>,
}

impl AverageSummary {
    /// True when no column qualified ("nothing to average").
    pub fn is_empty(&self) -> bool {
        self.averages.is_empty()
    }

    pub fn get(&self, column: &str) -> Option<f64> {
        self.averages
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, mean)| *mean)
    }
}

impl fmt::Display for AverageSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("No numeric quality columns to average");
        }
        for (idx, (name, mean)) in self.averages.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{}: {:.2}", name, mean)?;
        }
        Ok(())
    }
}

/// Average numeric report columns whose name contains one of `keywords`.
///
/// A column is numeric when every present value is a number. Columns with
/// no values at all are left out.
pub fn average_columns<S: AsRef<str>>(table: &ReportTable, keywords: &[S]) -> AverageSummary {
    let mut summary = AverageSummary::default();

    for (idx, name) in table.columns.iter().enumerate() {
        if !keywords.iter().any(|k| name.contains(k.as_ref())) {
            continue;
        }
        if !table.column(idx).all(|cell| cell.is_empty() || cell.is_numeric()) {
            debug!("Column '{}' is not numeric, not averaged", name);
            continue;
        }

        let values: Vec<f64> = table.column(idx).filter_map(Cell::as_f64).collect();
        if values.is_empty() {
            continue;
        }
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        summary.averages.push((name.clone(), mean));
    }

    summary
}
