//! Formatted terminal output.
//!
//! We keep formatting code in one place so the ingest code stays free of
//! presentation concerns and output changes stay localized.

use crate::domain::{Field, GoalTable, MetricSeries, StatusSnapshot};
use crate::io::ingest::IngestedSeries;

/// Status cards for the latest observation.
pub fn format_status(status: &StatusSnapshot, goals: &GoalTable) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== Status for {} ===\n", status.latest.date_label));
    for field in Field::METRICS {
        let Some(value) = status.latest.metric(field) else {
            continue;
        };
        let label = field.display_name();
        let value = fmt_value(field, value);
        match status.deltas.get(&field) {
            Some(delta) => {
                let marker = if delta.on_track { "on track" } else { "off track" };
                out.push_str(&format!(
                    "{label:<13} {value:>9} {unit:<4} goal {goal:>7} | delta {delta:>8} ({marker})\n",
                    unit = field.unit(),
                    goal = fmt_value(field, delta.goal),
                    delta = fmt_signed(field, delta.delta),
                ));
            }
            None => {
                out.push_str(&format!("{label:<13} {value:>9} {unit}\n", unit = field.unit()));
            }
        }
    }

    let missing: Vec<&str> = goals
        .iter()
        .filter(|(field, _)| status.latest.metric(*field).is_none())
        .map(|(field, _)| field.display_name())
        .collect();
    if !missing.is_empty() {
        out.push_str(&format!("(no entry today: {})\n", missing.join(", ")));
    }

    out
}

/// Full series as a table; absent values print as `-`.
pub fn format_series(series: &MetricSeries) -> String {
    let mut out = String::new();

    out.push_str(&format!("{:<10}", "Date"));
    for field in Field::METRICS {
        let head = format!("{} ({})", field.display_name(), field.unit());
        out.push_str(&format!(" {head:>18}"));
    }
    out.push('\n');

    for row in series.rows() {
        out.push_str(&format!("{:<10}", row.date_label));
        for field in Field::METRICS {
            let cell = row.metric(field).map(|v| fmt_value(field, v)).unwrap_or_else(|| "-".to_string());
            out.push_str(&format!(" {cell:>18}"));
        }
        out.push('\n');
    }

    out
}

/// One-line load summary (rows read/used/dropped).
pub fn format_load_summary(ingest: &IngestedSeries, source: &str, cached: bool) -> String {
    format!(
        "source={source}{} | rows read={} used={} dropped={} | rejected cells={}",
        if cached { " (cached)" } else { "" },
        ingest.rows_read,
        ingest.rows_used(),
        ingest.dropped.len(),
        ingest.cells_rejected,
    )
}

fn fmt_value(field: Field, value: f64) -> String {
    format!("{value:.prec$}", prec = field.precision())
}

fn fmt_signed(field: Field, value: f64) -> String {
    format!("{value:+.prec$}", prec = field.precision())
}
