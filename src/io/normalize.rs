//! Column normalization.
//!
//! Maps free-text spreadsheet headers onto the internal `Field` vocabulary
//! through a declarative alias table. Labels have drifted across dataset
//! revisions ("Agua" vs "Água", "Carbos" vs "Carboidratos"), so every accepted
//! spelling lives in the table rather than in lookup code.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::domain::Field;
use crate::error::{LoadError, MissingRequirement};

/// Invalid alias table configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AliasError {
    #[error("alias '{alias}' is listed for both `{first}` and `{second}`")]
    Conflict { alias: String, first: Field, second: Field },

    #[error("blank alias listed for `{field}`")]
    Blank { field: Field },
}

/// Accepted source labels per internal field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasTable {
    aliases: BTreeMap<Field, Vec<String>>,
    case_insensitive: bool,
}

impl AliasTable {
    /// Build a validated table. Aliases are stored trimmed.
    pub fn new(aliases: BTreeMap<Field, Vec<String>>, case_insensitive: bool) -> Result<Self, AliasError> {
        let aliases: BTreeMap<Field, Vec<String>> = aliases
            .into_iter()
            .map(|(field, labels)| (field, labels.iter().map(|l| l.trim().to_string()).collect()))
            .collect();

        let mut seen: BTreeMap<String, Field> = BTreeMap::new();
        for (&field, labels) in &aliases {
            for label in labels {
                if label.is_empty() {
                    return Err(AliasError::Blank { field });
                }
                if let Some(first) = seen.insert(fold(label, case_insensitive), field) {
                    if first != field {
                        return Err(AliasError::Conflict {
                            alias: label.clone(),
                            first,
                            second: field,
                        });
                    }
                }
            }
        }

        Ok(Self {
            aliases,
            case_insensitive,
        })
    }

    /// Copy of this table with the alias lists of the given fields replaced.
    pub fn with_overrides(
        &self,
        overrides: BTreeMap<Field, Vec<String>>,
        case_insensitive: bool,
    ) -> Result<Self, AliasError> {
        let mut aliases = self.aliases.clone();
        aliases.extend(overrides);
        Self::new(aliases, case_insensitive)
    }

    pub fn aliases(&self, field: Field) -> &[String] {
        self.aliases.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_case_insensitive(&self) -> bool {
        self.case_insensitive
    }

    /// Field a cleaned header label belongs to, if any.
    pub fn field_for(&self, label: &str) -> Option<Field> {
        let label = fold(label, self.case_insensitive);
        self.aliases.iter().find_map(|(&field, labels)| {
            labels
                .iter()
                .any(|alias| fold(alias, self.case_insensitive) == label)
                .then_some(field)
        })
    }
}

impl Default for AliasTable {
    fn default() -> Self {
        let table: [(Field, &[&str]); 7] = [
            (Field::Date, &["Data", "Date"]),
            (Field::Weight, &["Peso", "Weight"]),
            (Field::Water, &["Agua", "Água", "Water"]),
            (Field::Protein, &["Proteinas", "Proteínas", "Protein"]),
            (Field::Fiber, &["Fibras", "Fiber"]),
            (Field::Carbohydrate, &["Carbos", "Carboidratos", "Carbohydrate"]),
            (Field::Calories, &["Calorias", "Calories", "Kcal"]),
        ];
        let aliases = table
            .into_iter()
            .map(|(field, labels)| (field, labels.iter().map(|l| (*l).to_string()).collect()))
            .collect();
        Self {
            aliases,
            case_insensitive: false,
        }
    }
}

fn fold(label: &str, case_insensitive: bool) -> String {
    if case_insensitive {
        label.to_lowercase()
    } else {
        label.to_string()
    }
}

/// Header cleanup applied before matching.
pub fn clean_label(label: &str) -> &str {
    // Spreadsheet exports sometimes prefix the first header with a UTF-8 BOM.
    label.trim().trim_start_matches('\u{feff}').trim()
}

/// Resolved header: internal field → source column index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    columns: BTreeMap<Field, usize>,
    /// Later columns that matched an already-resolved field (ignored).
    duplicates: Vec<(Field, usize)>,
}

impl ColumnMap {
    pub fn index(&self, field: Field) -> Option<usize> {
        self.columns.get(&field).copied()
    }

    pub fn resolved(&self) -> impl Iterator<Item = (Field, usize)> + '_ {
        self.columns.iter().map(|(f, i)| (*f, *i))
    }

    pub fn resolved_metrics(&self) -> Vec<Field> {
        self.columns.keys().copied().filter(|f| f.is_metric()).collect()
    }

    pub fn duplicates(&self) -> &[(Field, usize)] {
        &self.duplicates
    }
}

/// Resolve header labels against the alias table.
///
/// The first matching column wins for each field; unmapped columns are
/// ignored. Fails with `SchemaMismatch` unless `date` and at least one metric
/// resolve.
pub fn resolve_columns<S: AsRef<str>>(headers: &[S], aliases: &AliasTable) -> Result<ColumnMap, LoadError> {
    let mut map = ColumnMap::default();

    for (idx, raw) in headers.iter().enumerate() {
        let label = clean_label(raw.as_ref());
        let Some(field) = aliases.field_for(label) else {
            tracing::trace!(column = idx, label, "ignoring unmapped column");
            continue;
        };
        if map.columns.contains_key(&field) {
            tracing::warn!(%field, column = idx, label, "duplicate column for field; keeping the first");
            map.duplicates.push((field, idx));
        } else {
            map.columns.insert(field, idx);
        }
    }

    let mut missing = Vec::new();
    if !map.columns.contains_key(&Field::Date) {
        missing.push(MissingRequirement::Field(Field::Date));
    }
    if map.resolved_metrics().is_empty() {
        missing.push(MissingRequirement::AnyMetric);
    }
    if !missing.is_empty() {
        return Err(LoadError::SchemaMismatch { missing });
    }

    tracing::debug!(columns = ?map.columns, "resolved column map");
    Ok(map)
}
