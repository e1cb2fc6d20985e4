//! Configuration structures for the extraction and report pipeline.

use serde::{Deserialize, Serialize};

use crate::extraction::UNKNOWN_IDENTIFIER;

/// Main configuration for the palletscan pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PalletConfig {
    /// Document extraction configuration.
    pub extraction: ExtractionConfig,

    /// Master dataset configuration.
    pub dataset: DatasetConfig,

    /// Report output configuration.
    pub report: ReportConfig,

    /// Averaging configuration.
    pub aggregate: AggregateConfig,
}

/// Document extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Identifier used when the document carries no container number.
    pub unknown_identifier: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            unknown_identifier: UNKNOWN_IDENTIFIER.to_string(),
        }
    }
}

/// Master dataset configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// Column holding the pallet folio.
    pub key_column: String,

    /// Zero-based row holding column names (rows above it are titles).
    pub header_row: usize,

    /// Sheet to read (first sheet when unset).
    pub sheet: Option<String>,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            key_column: "Folio".to_string(),
            header_row: 1,
            sheet: None,
        }
    }
}

/// Report output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Name of the "<container> - <folio>" column added to matched rows.
    pub composite_column: String,

    /// Worksheet name of the generated report.
    pub sheet_name: String,

    /// Characters added to the longest value when sizing columns.
    pub column_margin: usize,

    /// Columns offered as the default selection.
    pub suggested_fields: Vec<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            composite_column: "Contenedor - Folio".to_string(),
            sheet_name: "Pallets".to_string(),
            column_margin: 2,
            suggested_fields: default_suggested_fields(),
        }
    }
}

/// Averaging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregateConfig {
    /// Column name fragments selecting the averaged columns (case-sensitive).
    ///
    /// Defaults cover English and Spanish quality sheets.
    pub keywords: Vec<String>,
}

impl Default for AggregateConfig {
    fn default() -> Self {
        Self {
            keywords: ["Humidity", "Thickness", "Weight", "Humedad", "Espesor", "Peso"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

fn default_suggested_fields() -> Vec<String> {
    [
        "Contenedor - Folio",
        "Folio",
        "N° Semana",
        "Fecha Análisis",
        "Fecha Etiqueta",
        "Analista",
        "Turno",
        "Lote",
        "Cliente",
        "Tipo de producto",
        "Condición GF/convencional",
        "Espesor inferior",
        "Espesor superrior",
        "% Humedad inferior FT",
        "% Humedad superior FT",
        "Hora",
        "Cantidad sacos/maxisaco",
        "Peso saco/maxisaco",
        "Kilos producidos",
        "Humedad",
        "Temperatura producto",
        "Enzimática",
        "Peso hectolitro",
        "Filamentos",
        "Cáscaras",
        "Semillas Extrañas",
        "Gelatinas",
        "Quemadas",
        "Granos sin aplastar",
        "Granos Parcialmente Aplastados",
        "Trigos",
        "Cebada",
        "Centeno",
        "Materiales extraños",
        "Retención malla 7",
        "Bajo malla 25",
        "Espesor 1",
        "Espesor 2",
        "Espesor 3",
        "Espesor 4",
        "Espesor 5",
        "Espesor 6",
        "Espesor 7",
        "Espesor 8",
        "Espesor 9",
        "Espesor 10",
        "Promedio espesor",
        "Sacos detector de metales",
        "Verificación de patrones PCC",
        "ESTADO",
        "Motivo Retención",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

impl PalletConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }

    /// Suggested fields present among `available`, in suggestion order.
    pub fn suggested_columns(&self, available: &[String]) -> Vec<String> {
        self.report
            .suggested_fields
            .iter()
            .filter(|field| {
                *field == &self.report.composite_column || available.contains(*field)
            })
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PalletConfig::default();
        assert_eq!(config.dataset.key_column, "Folio");
        assert_eq!(config.dataset.header_row, 1);
        assert_eq!(config.extraction.unknown_identifier, "UNKNOWN");
        assert_eq!(config.report.column_margin, 2);
        assert_eq!(config.report.suggested_fields[0], config.report.composite_column);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: PalletConfig =
            serde_json::from_str(r#"{"aggregate": {"keywords": ["Humedad"]}}"#).unwrap();
        assert_eq!(config.aggregate.keywords, vec!["Humedad".to_string()]);
        assert_eq!(config.dataset.key_column, "Folio");
    }

    #[test]
    fn test_default_keywords_average_suggested_quality_columns() {
        use crate::aggregate::average_columns;
        use crate::models::table::{Cell, ReportTable};

        let config = PalletConfig::default();
        let report = ReportTable {
            columns: vec![
                "Humedad".into(),
                "Espesor 1".into(),
                "Peso saco/maxisaco".into(),
                "Humidity %".into(),
            ],
            rows: vec![vec![
                Cell::Float(11.0),
                Cell::Float(0.7),
                Cell::Int(25),
                Cell::Float(10.0),
            ]],
        };

        let summary = average_columns(&report, &config.aggregate.keywords);
        assert_eq!(summary.averages.len(), 4);
        assert_eq!(summary.get("Humedad"), Some(11.0));
        assert_eq!(summary.get("Peso saco/maxisaco"), Some(25.0));
    }

    #[test]
    fn test_suggested_columns_filters_unavailable() {
        let config = PalletConfig::default();
        let available = vec!["Folio".to_string(), "Lote".to_string(), "Color".to_string()];
        assert_eq!(
            config.suggested_columns(&available),
            vec![
                "Contenedor - Folio".to_string(),
                "Folio".to_string(),
                "Lote".to_string()
            ]
        );
    }
}
