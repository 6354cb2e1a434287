//! Availability plan files
//!
//! A plan is a TOML description of the week that the CLI replays through the editor's
//! own operations:
//!
//! ```toml
//! [[day]]
//! day = "Lunes"
//! enabled = true
//! intervals = [{ from = "09:00", to = "12:00" }, { from = "15:00", to = "18:00" }]
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::editor::{AvailabilityEditor, Weekday};
use super::error::EditorError;
use super::time::{IntervalField, TimeOfDay};

/// Parsed plan file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AvailabilityPlan {
    #[serde(default, rename = "day")]
    pub days: Vec<DayPlan>,
}

/// Plan for a single weekday
#[derive(Debug, Clone, Deserialize)]
pub struct DayPlan {
    pub day: Weekday,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub intervals: Vec<IntervalPlan>,
}

/// Interval bounds as written in the plan; either may be left out
#[derive(Debug, Clone, Deserialize)]
pub struct IntervalPlan {
    pub from: Option<TimeOfDay>,
    pub to: Option<TimeOfDay>,
}

/// Errors loading or applying a plan
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("Failed to read plan {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse plan {path:?}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error("{0} appears more than once in the plan")]
    DuplicateDay(Weekday),

    #[error(transparent)]
    Editor(#[from] EditorError),
}

impl AvailabilityPlan {
    /// Load a plan from a TOML file
    pub fn load(path: &Path) -> Result<Self, PlanError> {
        let content = std::fs::read_to_string(path).map_err(|e| PlanError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| PlanError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
    }

    /// Build an editor holding this plan
    ///
    /// Days not named in the plan stay disabled with one empty interval.
    pub fn to_editor(&self) -> Result<AvailabilityEditor, PlanError> {
        let mut editor = AvailabilityEditor::new();
        let mut seen = Vec::new();

        for day_plan in &self.days {
            if seen.contains(&day_plan.day) {
                return Err(PlanError::DuplicateDay(day_plan.day));
            }
            seen.push(day_plan.day);

            let day = day_plan.day;
            if day_plan.enabled {
                editor.toggle_day(day);
            }

            for (index, interval) in day_plan.intervals.iter().enumerate() {
                if index > 0 {
                    editor.add_interval(day);
                }
                if let Some(from) = interval.from {
                    editor.set_time(day, index, IntervalField::From, from)?;
                }
                if let Some(to) = interval.to {
                    editor.set_time(day, index, IntervalField::To, to)?;
                }
            }
        }

        Ok(editor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::time::Interval;
    use std::io::Write;

    const PLAN: &str = r#"
[[day]]
day = "Lunes"
enabled = true
intervals = [{ from = "09:00", to = "12:00" }, { from = "15:00", to = "18:00" }]

[[day]]
day = "Miércoles"
intervals = [{ to = "10:00" }]
"#;

    #[test]
    fn test_plan_to_editor() {
        let plan: AvailabilityPlan = toml::from_str(PLAN).unwrap();
        let editor = plan.to_editor().unwrap();

        let lunes = editor.row(Weekday::Lunes);
        assert!(lunes.enabled());
        assert_eq!(
            lunes.intervals(),
            &[
                Interval::new("09:00".parse().unwrap(), "12:00".parse().unwrap()),
                Interval::new("15:00".parse().unwrap(), "18:00".parse().unwrap()),
            ]
        );

        let miercoles = editor.row(Weekday::Miercoles);
        assert!(!miercoles.enabled());
        assert_eq!(miercoles.intervals()[0].from, None);
        assert_eq!(miercoles.intervals()[0].to, Some("10:00".parse().unwrap()));

        assert!(!editor.row(Weekday::Viernes).enabled());
        assert_eq!(editor.validate().unwrap().len(), 2);
    }

    #[test]
    fn test_plan_rejects_duplicate_day() {
        let plan: AvailabilityPlan = toml::from_str(
            r#"
[[day]]
day = "Jueves"
[[day]]
day = "Jueves"
"#,
        )
        .unwrap();
        assert!(matches!(plan.to_editor(), Err(PlanError::DuplicateDay(Weekday::Jueves))));
    }

    #[test]
    fn test_plan_rejects_bad_time() {
        let result: Result<AvailabilityPlan, _> = toml::from_str(
            r#"
[[day]]
day = "Lunes"
intervals = [{ from = "25:00", to = "26:00" }]
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(PLAN.as_bytes()).unwrap();

        let plan = AvailabilityPlan::load(file.path()).unwrap();
        assert_eq!(plan.days.len(), 2);

        let missing = AvailabilityPlan::load(Path::new("/nonexistent/plan.toml"));
        assert!(matches!(missing, Err(PlanError::Io { .. })));
    }
}
