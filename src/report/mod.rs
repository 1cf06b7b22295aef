//! Reporting utilities: latest-record status and formatted terminal output.

use std::collections::BTreeMap;

use crate::domain::{Field, GoalDelta, GoalTable, MetricSeries, StatusSnapshot};

pub mod format;

pub use format::*;

/// Snapshot the last observation and compare it against the goals.
///
/// Only metrics present in both the latest row and the goal table get a delta;
/// nothing is defaulted to zero.
pub fn latest_status(series: &MetricSeries, goals: &GoalTable) -> StatusSnapshot {
    let latest = series.latest().clone();

    let deltas: BTreeMap<Field, GoalDelta> = goals
        .iter()
        .filter_map(|(field, goal)| {
            let value = latest.metric(field)?;
            Some((
                field,
                GoalDelta {
                    value,
                    goal: goal.target,
                    delta: value - goal.target,
                    on_track: goal.direction.is_met(value, goal.target),
                },
            ))
        })
        .collect();

    StatusSnapshot { latest, deltas }
}
