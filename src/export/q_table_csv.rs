//! CSV export of a learned Q-table
//!
//! One row per state, sorted by state, with a column per action and the
//! greedy choice.

use std::{io::Write, path::Path};

use serde::Serialize;

use crate::{
    Result,
    q_learning::{ActionValues, QTable, State},
    types::Action,
};

/// A single row in the Q-table CSV export
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QTableRecord {
    pub bullet_dx: i64,
    pub bullet_dy: i64,
    pub enemy_dx: i64,
    pub enemy_dy: i64,
    pub up: f64,
    pub down: f64,
    pub left: f64,
    pub right: f64,
    pub avoid: f64,
    pub greedy: Action,
}

impl QTableRecord {
    pub fn new(state: &State, values: &ActionValues) -> Self {
        Self {
            bullet_dx: state.bullet_dx,
            bullet_dy: state.bullet_dy,
            enemy_dx: state.enemy_dx,
            enemy_dy: state.enemy_dy,
            up: values.get(Action::Up),
            down: values.get(Action::Down),
            left: values.get(Action::Left),
            right: values.get(Action::Right),
            avoid: values.get(Action::Avoid),
            greedy: values.best_action(),
        }
    }
}

/// Exporter for Q-table CSV files
pub struct QTableCsvExporter;

impl QTableCsvExporter {
    /// Rows in state order.
    pub fn records(table: &QTable) -> Vec<QTableRecord> {
        table
            .sorted_entries()
            .iter()
            .map(|(state, values)| QTableRecord::new(state, values))
            .collect()
    }

    /// Write the table to any writer; returns the number of rows.
    pub fn write<W: Write>(table: &QTable, writer: W) -> Result<usize> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        let records = Self::records(table);
        for record in &records {
            csv_writer.serialize(record)?;
        }
        csv_writer.flush()?;
        Ok(records.len())
    }

    /// Export the table to `path`; returns the number of rows.
    pub fn export(table: &QTable, path: &Path) -> Result<usize> {
        let file = std::fs::File::create(path)?;
        Self::write(table, std::io::BufWriter::new(file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_row_per_state_with_header() {
        let mut table = QTable::new();
        table.insert(
            State::new(0, 1, 0, 0),
            ActionValues::new([0.0, 2.5, 0.0, 0.0, -1.0]),
        );
        table.insert(State::new(0, 0, 0, 0), ActionValues::default());

        let mut buffer = Vec::new();
        let rows = QTableCsvExporter::write(&table, &mut buffer).unwrap();
        assert_eq!(rows, 2);

        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(
            lines[0],
            "bullet_dx,bullet_dy,enemy_dx,enemy_dy,up,down,left,right,avoid,greedy"
        );
        assert_eq!(lines[1], "0,0,0,0,0.0,0.0,0.0,0.0,0.0,up");
        assert_eq!(lines[2], "0,1,0,0,0.0,2.5,0.0,0.0,-1.0,down");
        assert_eq!(lines.len(), 3);
    }
}
