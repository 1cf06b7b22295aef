//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - built once per load by the ingest pipeline
//! - handed read-only to the terminal front-end
//! - exported to JSON/CSV

use std::collections::BTreeMap;
use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Internal column vocabulary every source is normalized onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Date,
    Weight,
    Water,
    Protein,
    Fiber,
    Carbohydrate,
    Calories,
}

impl Field {
    pub const ALL: [Field; 7] = [
        Field::Date,
        Field::Weight,
        Field::Water,
        Field::Protein,
        Field::Fiber,
        Field::Carbohydrate,
        Field::Calories,
    ];

    /// Numeric fields, in display order.
    pub const METRICS: [Field; 6] = [
        Field::Weight,
        Field::Water,
        Field::Protein,
        Field::Fiber,
        Field::Carbohydrate,
        Field::Calories,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Field::Date => "date",
            Field::Weight => "weight",
            Field::Water => "water",
            Field::Protein => "protein",
            Field::Fiber => "fiber",
            Field::Carbohydrate => "carbohydrate",
            Field::Calories => "calories",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Field::Date => "Date",
            Field::Weight => "Weight",
            Field::Water => "Water",
            Field::Protein => "Protein",
            Field::Fiber => "Fiber",
            Field::Carbohydrate => "Carbohydrate",
            Field::Calories => "Calories",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Field::Date => "",
            Field::Weight => "kg",
            Field::Water => "ml",
            Field::Protein | Field::Fiber | Field::Carbohydrate => "g",
            Field::Calories => "kcal",
        }
    }

    /// Decimal places used when printing values of this metric.
    pub fn precision(self) -> usize {
        match self {
            Field::Weight => 2,
            Field::Protein | Field::Fiber | Field::Carbohydrate => 1,
            Field::Date | Field::Water | Field::Calories => 0,
        }
    }

    pub fn is_metric(self) -> bool {
        self != Field::Date
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One normalized day's worth of tracked metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObservationRow {
    pub date_label: String,
    pub weight_kg: Option<f64>,
    pub water_ml: Option<f64>,
    pub protein_g: Option<f64>,
    pub fiber_g: Option<f64>,
    pub carbohydrate_g: Option<f64>,
    pub calories_kcal: Option<f64>,
}

impl ObservationRow {
    pub fn new(date_label: impl Into<String>) -> Self {
        Self {
            date_label: date_label.into(),
            ..Default::default()
        }
    }

    /// Value of a numeric metric; always `None` for `Field::Date`.
    pub fn metric(&self, field: Field) -> Option<f64> {
        match field {
            Field::Date => None,
            Field::Weight => self.weight_kg,
            Field::Water => self.water_ml,
            Field::Protein => self.protein_g,
            Field::Fiber => self.fiber_g,
            Field::Carbohydrate => self.carbohydrate_g,
            Field::Calories => self.calories_kcal,
        }
    }

    pub fn set_metric(&mut self, field: Field, value: Option<f64>) {
        match field {
            Field::Date => {}
            Field::Weight => self.weight_kg = value,
            Field::Water => self.water_ml = value,
            Field::Protein => self.protein_g = value,
            Field::Fiber => self.fiber_g = value,
            Field::Carbohydrate => self.carbohydrate_g = value,
            Field::Calories => self.calories_kcal = value,
        }
    }
}

/// Ordered, non-empty collection of observations for one load.
///
/// Rows keep source order; nothing here sorts or parses dates.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MetricSeries {
    rows: Vec<ObservationRow>,
}

impl MetricSeries {
    /// Returns `None` for an empty row list.
    pub fn new(rows: Vec<ObservationRow>) -> Option<Self> {
        if rows.is_empty() { None } else { Some(Self { rows }) }
    }

    pub fn rows(&self) -> &[ObservationRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the series has no rows; never true for a constructed series.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Last row by sequence position.
    pub fn latest(&self) -> &ObservationRow {
        // Non-empty by construction.
        &self.rows[self.rows.len() - 1]
    }

    /// `(date_label, value)` pairs for one metric, skipping absent cells.
    pub fn points(&self, field: Field) -> Vec<(&str, f64)> {
        self.rows
            .iter()
            .filter_map(|r| r.metric(field).map(|v| (r.date_label.as_str(), v)))
            .collect()
    }
}

/// Whether a goal is a ceiling or a floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalDirection {
    /// Lower is better (weight, calories, carbohydrate).
    AtMost,
    /// Higher is better (water, protein, fiber).
    AtLeast,
}

impl GoalDirection {
    pub fn default_for(field: Field) -> Self {
        match field {
            Field::Weight | Field::Calories | Field::Carbohydrate | Field::Date => GoalDirection::AtMost,
            Field::Water | Field::Protein | Field::Fiber => GoalDirection::AtLeast,
        }
    }

    pub fn is_met(self, value: f64, goal: f64) -> bool {
        match self {
            GoalDirection::AtMost => value <= goal,
            GoalDirection::AtLeast => value >= goal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub target: f64,
    pub direction: GoalDirection,
}

/// Target values per metric. Built once at startup and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct GoalTable {
    goals: BTreeMap<Field, Goal>,
}

impl GoalTable {
    pub fn new(goals: BTreeMap<Field, Goal>) -> Self {
        Self { goals }
    }

    /// Copy of this table with the given targets replaced.
    ///
    /// Directions of overridden metrics are kept (or defaulted for new ones).
    pub fn with_targets(&self, targets: &BTreeMap<Field, f64>) -> Self {
        let mut goals = self.goals.clone();
        for (&field, &target) in targets {
            let direction = goals
                .get(&field)
                .map(|g| g.direction)
                .unwrap_or_else(|| GoalDirection::default_for(field));
            goals.insert(field, Goal { target, direction });
        }
        Self { goals }
    }

    pub fn get(&self, field: Field) -> Option<&Goal> {
        self.goals.get(&field)
    }

    pub fn target(&self, field: Field) -> Option<f64> {
        self.goals.get(&field).map(|g| g.target)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &Goal)> {
        self.goals.iter().map(|(f, g)| (*f, g))
    }
}

impl Default for GoalTable {
    fn default() -> Self {
        let targets = [
            (Field::Weight, 67.0),
            (Field::Calories, 1650.0),
            (Field::Protein, 130.0),
            (Field::Water, 3000.0),
            (Field::Fiber, 30.0),
            (Field::Carbohydrate, 150.0),
        ];
        let goals = targets
            .into_iter()
            .map(|(field, target)| {
                (
                    field,
                    Goal {
                        target,
                        direction: GoalDirection::default_for(field),
                    },
                )
            })
            .collect();
        Self { goals }
    }
}

/// Latest value of one metric compared against its goal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GoalDelta {
    pub value: f64,
    pub goal: f64,
    /// `value - goal`.
    pub delta: f64,
    pub on_track: bool,
}

/// "Current status": the last observation plus per-metric goal deltas.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusSnapshot {
    pub latest: ObservationRow,
    pub deltas: BTreeMap<Field, GoalDelta>,
}

/// Output encoding for the `export` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Json,
}
