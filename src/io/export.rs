//! Export the normalized series to CSV or JSON.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts:
//! English column names, absent values as empty cells (CSV) or `null` (JSON).

use std::fs::File;
use std::path::Path;

use crate::domain::{ExportFormat, Field, MetricSeries};
use crate::error::AppError;

pub fn write_series(path: &Path, series: &MetricSeries, format: ExportFormat) -> Result<(), AppError> {
    match format {
        ExportFormat::Csv => write_series_csv(path, series),
        ExportFormat::Json => write_series_json(path, series),
    }
}

/// Write one row per observation, metric columns in display order.
pub fn write_series_csv(path: &Path, series: &MetricSeries) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::output(format!("Failed to create export CSV '{}': {e}", path.display())))?;

    let mut header = vec![Field::Date.name().to_string()];
    header.extend(Field::METRICS.iter().map(|f| format!("{}_{}", f.name(), f.unit())));
    writer
        .write_record(&header)
        .map_err(|e| AppError::output(format!("Failed to write export CSV header: {e}")))?;

    for row in series.rows() {
        let mut record = vec![row.date_label.clone()];
        record.extend(
            Field::METRICS
                .iter()
                .map(|&f| row.metric(f).map(|v| v.to_string()).unwrap_or_default()),
        );
        writer
            .write_record(&record)
            .map_err(|e| AppError::output(format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::output(format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}

pub fn write_series_json(path: &Path, series: &MetricSeries) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::output(format!("Failed to create export JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, series)
        .map_err(|e| AppError::output(format!("Failed to write export JSON: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ObservationRow;

    fn series() -> MetricSeries {
        let mut a = ObservationRow::new("17/01");
        a.weight_kg = Some(70.35);
        a.water_ml = Some(2950.0);
        let mut b = ObservationRow::new("18/01");
        b.weight_kg = Some(69.9);
        MetricSeries::new(vec![a, b]).unwrap()
    }

    #[test]
    fn csv_export_leaves_absent_cells_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("series.csv");
        write_series_csv(&path, &series()).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "date,weight_kg,water_ml,protein_g,fiber_g,carbohydrate_g,calories_kcal"
        );
        assert_eq!(lines[1], "17/01,70.35,2950,,,,");
        assert_eq!(lines[2], "18/01,69.9,,,,,");
    }

    #[test]
    fn json_export_is_an_array_of_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("series.json");
        write_series(&path, &series(), ExportFormat::Json).unwrap();

        let value: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let rows = value.as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1]["date_label"], "18/01");
        assert!(rows[1]["water_ml"].is_null());
    }
}
