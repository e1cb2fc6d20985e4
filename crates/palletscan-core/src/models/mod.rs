//! Data models shared across the pipeline.

pub mod config;
pub mod table;

pub use config::PalletConfig;
pub use table::{Cell, MasterTable, ReportTable};
