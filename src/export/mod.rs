//! Export functionality for analysis
//!
//! Currently supports CSV export of learned Q-tables.

mod q_table_csv;

pub use q_table_csv::{QTableCsvExporter, QTableRecord};
