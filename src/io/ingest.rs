//! Row coercion and series building.
//!
//! This module turns a `RawTable` plus a resolved `ColumnMap` into a clean
//! `MetricSeries` that is safe to hand to a renderer.
//!
//! Design goals:
//! - **Cell-level tolerance** (a bad numeric cell only blanks that field)
//! - **Row-level validation** (rows without a date are skipped and reported)
//! - **Source order preserved** (no sorting, no date parsing)
//! - **Pure**: no I/O, no fetching here

use crate::data::RawTable;
use crate::domain::{Field, MetricSeries, ObservationRow};
use crate::error::LoadError;
use crate::io::normalize::ColumnMap;

/// A row skipped during coercion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedRow {
    /// 1-based line in the source, header included.
    pub line: usize,
    pub message: String,
}

/// Coercion output: the series plus what happened along the way.
#[derive(Debug, Clone)]
pub struct IngestedSeries {
    pub series: MetricSeries,
    pub dropped: Vec<DroppedRow>,
    pub rows_read: usize,
    /// Number of non-empty metric cells that failed numeric coercion.
    pub cells_rejected: usize,
}

impl IngestedSeries {
    pub fn rows_used(&self) -> usize {
        self.series.len()
    }
}

/// Walk rows in source order and coerce them into observations.
pub fn build_series(table: &RawTable, columns: &ColumnMap) -> Result<IngestedSeries, LoadError> {
    let mut rows = Vec::with_capacity(table.rows.len());
    let mut dropped = Vec::new();
    let mut cells_rejected = 0usize;

    for (idx, record) in table.rows.iter().enumerate() {
        // +2: 1-based, and the header occupies line 1.
        let line = idx + 2;

        let Some(date_label) = get_cell(record, columns.index(Field::Date)) else {
            tracing::debug!(line, "dropping row with empty date cell");
            dropped.push(DroppedRow {
                line,
                message: "Missing `date` value.".to_string(),
            });
            continue;
        };

        let mut row = ObservationRow::new(date_label);
        for field in Field::METRICS {
            let cell = get_cell(record, columns.index(field));
            let value = parse_opt_f64(cell);
            if let (Some(raw), None) = (cell, value) {
                tracing::debug!(line, %field, raw, "cell is not numeric; leaving it absent");
                cells_rejected += 1;
            }
            row.set_metric(field, value);
        }
        rows.push(row);
    }

    if !dropped.is_empty() {
        tracing::warn!(count = dropped.len(), "dropped rows without a date");
    }

    let rows_read = table.rows.len();
    let series = MetricSeries::new(rows).ok_or(LoadError::EmptySeries)?;

    Ok(IngestedSeries {
        series,
        dropped,
        rows_read,
        cells_rejected,
    })
}

/// Trimmed, non-empty cell at `idx`.
fn get_cell(record: &[String], idx: Option<usize>) -> Option<&str> {
    let idx = idx?;
    record.get(idx).map(|s| s.trim()).filter(|s| !s.is_empty())
}

fn parse_opt_f64(s: Option<&str>) -> Option<f64> {
    let s = s?;
    let v = s.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::parse_table;
    use crate::io::normalize::{resolve_columns, AliasTable};

    fn ingest(csv: &str) -> Result<IngestedSeries, LoadError> {
        let table = parse_table(csv).unwrap();
        let columns = resolve_columns(&table.headers, &AliasTable::default())?;
        build_series(&table, &columns)
    }

    #[test]
    fn scenario_row_with_partial_columns() {
        let out = ingest("Data, Peso, Agua, Proteinas, Fibras\n18/01, 69.90, 3210, 111.3, 12.5\n").unwrap();
        assert_eq!(out.series.len(), 1);
        assert_eq!(
            out.series.rows()[0],
            ObservationRow {
                date_label: "18/01".to_string(),
                weight_kg: Some(69.90),
                water_ml: Some(3210.0),
                protein_g: Some(111.3),
                fiber_g: Some(12.5),
                carbohydrate_g: None,
                calories_kcal: None,
            }
        );
    }

    #[test]
    fn non_numeric_cell_only_blanks_that_field() {
        let out = ingest("Data,Peso,Agua\n18/01,abc,3210\n").unwrap();
        let row = &out.series.rows()[0];
        assert_eq!(row.weight_kg, None);
        assert_eq!(row.water_ml, Some(3210.0));
        assert_eq!(out.cells_rejected, 1);
    }

    #[test]
    fn blank_and_non_finite_cells_are_absent() {
        let out = ingest("Data,Peso,Agua,Fibras\n18/01,  ,NaN,inf\n").unwrap();
        let row = &out.series.rows()[0];
        assert_eq!(row.weight_kg, None);
        assert_eq!(row.water_ml, None);
        assert_eq!(row.fiber_g, None);
        assert_eq!(out.cells_rejected, 2);
    }

    #[test]
    fn rows_without_date_are_dropped() {
        let out = ingest("Data,Peso\n17/01,70.1\n,70.0\n19/01,69.8\n").unwrap();
        let labels: Vec<&str> = out.series.rows().iter().map(|r| r.date_label.as_str()).collect();
        assert_eq!(labels, vec!["17/01", "19/01"]);
        assert_eq!(out.series.rows()[1].weight_kg, Some(69.8));
        assert_eq!(out.rows_read, 3);
        assert_eq!(
            out.dropped,
            vec![DroppedRow {
                line: 3,
                message: "Missing `date` value.".to_string()
            }]
        );
    }

    #[test]
    fn source_order_is_kept() {
        let out = ingest("Data,Peso\n20/01,69.0\n18/01,70.0\n").unwrap();
        assert_eq!(out.series.latest().date_label, "18/01");
    }

    #[test]
    fn only_dateless_rows_is_empty_series() {
        let err = ingest("Data,Peso\n,70.0\n  ,69.0\n").unwrap_err();
        assert!(matches!(err, LoadError::EmptySeries));
    }

    #[test]
    fn header_only_is_empty_series() {
        let err = ingest("Data,Peso\n").unwrap_err();
        assert!(matches!(err, LoadError::EmptySeries));
    }

    #[test]
    fn unmapped_column_does_not_disturb_rows() {
        let out = ingest("Data,Peso,Notas\n18/01,69.9,bebeu pouco\n").unwrap();
        assert_eq!(out.series.rows()[0].weight_kg, Some(69.9));
        assert_eq!(out.cells_rejected, 0);
    }
}
