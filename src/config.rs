//! Runtime settings.
//!
//! Assembled once at startup from `.env`/environment and an optional JSON
//! profile, then passed by reference into the pipeline and the front-end.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::domain::{Field, GoalTable};
use crate::error::AppError;
use crate::io::normalize::AliasTable;

pub const ENV_SHEET_URL: &str = "HEALTH_SHEET_URL";
pub const ENV_CACHE_TTL: &str = "HEALTH_CACHE_TTL_SECS";
pub const ENV_FETCH_TIMEOUT: &str = "HEALTH_FETCH_TIMEOUT_SECS";

const DEFAULT_CACHE_TTL_SECS: u64 = 60;
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 15;
const CACHE_TTL_RANGE: (u64, u64) = (1, 600);
const FETCH_TIMEOUT_RANGE: (u64, u64) = (1, 120);

#[derive(Debug, Clone)]
pub struct Settings {
    /// Default spreadsheet link when no source is given on the command line.
    pub sheet_url: Option<String>,
    pub cache_ttl: Duration,
    pub fetch_timeout: Duration,
    pub goals: GoalTable,
    pub aliases: AliasTable,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sheet_url: None,
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            goals: GoalTable::default(),
            aliases: AliasTable::default(),
        }
    }
}

/// Optional JSON profile (`--config`).
///
/// ```json
/// { "goals": { "weight": 65.0 },
///   "aliases": { "water": ["Agua (ml)"] },
///   "case_insensitive": true }
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Profile {
    #[serde(default)]
    pub goals: BTreeMap<Field, f64>,
    #[serde(default)]
    pub aliases: BTreeMap<Field, Vec<String>>,
    #[serde(default)]
    pub case_insensitive: bool,
}

impl Settings {
    /// Load `.env`, read the environment, then apply the optional profile.
    pub fn load(profile: Option<&Path>) -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let mut settings = Self::from_lookup(|key| std::env::var(key).ok())?;
        if let Some(path) = profile {
            settings = settings.with_profile(read_profile(path)?)?;
        }
        Ok(settings)
    }

    /// Build from an environment lookup function.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let defaults = Self::default();

        let sheet_url = lookup(ENV_SHEET_URL)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        let cache_ttl = match lookup(ENV_CACHE_TTL) {
            Some(raw) => Duration::from_secs(parse_secs(ENV_CACHE_TTL, &raw, CACHE_TTL_RANGE)?),
            None => defaults.cache_ttl,
        };
        let fetch_timeout = match lookup(ENV_FETCH_TIMEOUT) {
            Some(raw) => Duration::from_secs(parse_secs(ENV_FETCH_TIMEOUT, &raw, FETCH_TIMEOUT_RANGE)?),
            None => defaults.fetch_timeout,
        };

        Ok(Self {
            sheet_url,
            cache_ttl,
            fetch_timeout,
            ..defaults
        })
    }

    pub fn with_profile(self, profile: Profile) -> Result<Self, AppError> {
        for (field, target) in &profile.goals {
            if *field == Field::Date {
                return Err(AppError::config("goals.date", "date has no goal"));
            }
            if !target.is_finite() {
                return Err(AppError::config(format!("goals.{field}"), "goal must be a finite number"));
            }
        }

        let aliases = self
            .aliases
            .with_overrides(profile.aliases, profile.case_insensitive)
            .map_err(|e| AppError::config("aliases", e.to_string()))?;

        Ok(Self {
            goals: self.goals.with_targets(&profile.goals),
            aliases,
            ..self
        })
    }
}

pub fn read_profile(path: &Path) -> Result<Profile, AppError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| AppError::config(path.display().to_string(), format!("failed to read profile: {e}")))?;
    serde_json::from_str(&text)
        .map_err(|e| AppError::config(path.display().to_string(), format!("invalid profile JSON: {e}")))
}

fn parse_secs(key: &str, raw: &str, (min, max): (u64, u64)) -> Result<u64, AppError> {
    let secs: u64 = raw
        .trim()
        .parse()
        .map_err(|_| AppError::config(key, format!("expected whole seconds, got '{raw}'")))?;
    if !(min..=max).contains(&secs) {
        return Err(AppError::config(key, format!("must be between {min} and {max} seconds")));
    }
    Ok(secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        let settings = Settings::from_lookup(lookup(&[])).unwrap();
        assert_eq!(settings.sheet_url, None);
        assert_eq!(settings.cache_ttl, Duration::from_secs(60));
        assert_eq!(settings.fetch_timeout, Duration::from_secs(15));
        assert_eq!(settings.goals, GoalTable::default());
    }

    #[test]
    fn environment_overrides() {
        let settings = Settings::from_lookup(lookup(&[
            (ENV_SHEET_URL, " https://example.test/d/x/edit?usp=sharing "),
            (ENV_CACHE_TTL, "300"),
            (ENV_FETCH_TIMEOUT, "30"),
        ]))
        .unwrap();
        assert_eq!(settings.sheet_url.as_deref(), Some("https://example.test/d/x/edit?usp=sharing"));
        assert_eq!(settings.cache_ttl, Duration::from_secs(300));
        assert_eq!(settings.fetch_timeout, Duration::from_secs(30));
    }

    #[test]
    fn out_of_range_ttl_is_rejected() {
        let err = Settings::from_lookup(lookup(&[(ENV_CACHE_TTL, "3600")])).unwrap_err();
        assert!(matches!(err, AppError::Config { ref key, .. } if key == ENV_CACHE_TTL));
        assert!(Settings::from_lookup(lookup(&[(ENV_FETCH_TIMEOUT, "soon")])).is_err());
    }

    #[test]
    fn profile_overrides_goals_and_aliases() {
        let profile: Profile = serde_json::from_str(
            r#"{ "goals": { "weight": 65.0 }, "aliases": { "water": ["Agua (ml)"] }, "case_insensitive": true }"#,
        )
        .unwrap();
        let settings = Settings::default().with_profile(profile).unwrap();

        assert_eq!(settings.goals.target(Field::Weight), Some(65.0));
        assert_eq!(settings.goals.target(Field::Protein), Some(130.0));
        assert_eq!(settings.aliases.aliases(Field::Water), ["Agua (ml)".to_string()]);
        assert_eq!(settings.aliases.aliases(Field::Weight), ["Peso".to_string(), "Weight".to_string()]);
        assert!(settings.aliases.is_case_insensitive());
    }

    #[test]
    fn profile_with_conflicting_alias_is_a_config_error() {
        let profile: Profile = serde_json::from_str(r#"{ "aliases": { "calories": ["Carbos"] } }"#).unwrap();
        let err = Settings::default().with_profile(profile).unwrap_err();
        assert!(matches!(err, AppError::Config { ref key, .. } if key == "aliases"));
    }

    #[test]
    fn unknown_profile_keys_are_rejected() {
        assert!(serde_json::from_str::<Profile>(r#"{ "colors": {} }"#).is_err());
    }
}
