//! Weekly availability editor
//!
//! Holds one [`DayRow`] per weekday, each with an enabled flag, an expanded flag, and
//! an ordered list of intervals that never drops below one entry. Interval bounds are
//! written through the time dial: the editor remembers which bound the open dial
//! targets and applies the dial's outcome when it closes.
//!
//! `commit_all` validates every enabled day before the first request goes out, then
//! persists intervals one at a time, in day and list order.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::dial::{DialOutcome, TimeDial};
use super::error::{EditorError, ScheduleError, ValidationError};
use super::store::{TimeslotRequest, TimeslotStore};
use super::time::{Interval, IntervalField, TimeOfDay};

/// Working days covered by the editor, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Weekday {
    Lunes,
    Martes,
    #[serde(rename = "Miércoles", alias = "Miercoles")]
    Miercoles,
    Jueves,
    Viernes,
}

impl Weekday {
    pub const ALL: [Weekday; 5] = [
        Weekday::Lunes,
        Weekday::Martes,
        Weekday::Miercoles,
        Weekday::Jueves,
        Weekday::Viernes,
    ];

    /// Position of the day in [`Weekday::ALL`]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Result<Self, EditorError> {
        Self::ALL
            .get(index)
            .copied()
            .ok_or(EditorError::DayOutOfRange(index))
    }

    /// Display name, as sent to the persistence endpoint
    pub fn name(self) -> &'static str {
        match self {
            Weekday::Lunes => "Lunes",
            Weekday::Martes => "Martes",
            Weekday::Miercoles => "Miércoles",
            Weekday::Jueves => "Jueves",
            Weekday::Viernes => "Viernes",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Editing state for a single weekday
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayRow {
    day: Weekday,
    enabled: bool,
    expanded: bool,
    intervals: Vec<Interval>,
}

impl DayRow {
    fn new(day: Weekday) -> Self {
        Self {
            day,
            enabled: false,
            expanded: false,
            intervals: vec![Interval::empty()],
        }
    }

    pub fn day(&self) -> Weekday {
        self.day
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn expanded(&self) -> bool {
        self.expanded
    }

    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    fn interval_mut(&mut self, index: usize) -> Result<&mut Interval, EditorError> {
        let len = self.intervals.len();
        let day = self.day;
        self.intervals
            .get_mut(index)
            .ok_or(EditorError::IntervalOutOfRange { day, index, len })
    }
}

/// The interval bound an open dial writes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialTarget {
    pub day: Weekday,
    pub interval: usize,
    pub field: IntervalField,
}

/// Severity of a user-facing notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

/// A message for the user describing how an action ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            message: message.into(),
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

const SAVED_MESSAGE: &str = "Horarios guardados";
const SAVE_FAILED_MESSAGE: &str = "No se pudieron guardar los horarios";

/// Summary of a successful commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitReport {
    /// Intervals persisted, in the order they were sent
    pub persisted: Vec<TimeslotRequest>,
}

impl CommitReport {
    pub fn notification(&self) -> Notification {
        Notification::success(SAVED_MESSAGE)
    }
}

impl ScheduleError {
    /// The single notification a failed commit reports
    pub fn notification(&self) -> Notification {
        match self {
            ScheduleError::Validation(e) => Notification::error(e.to_string()),
            ScheduleError::Persistence { .. } => Notification::error(SAVE_FAILED_MESSAGE),
        }
    }
}

/// In-memory weekly availability model
#[derive(Debug, Clone)]
pub struct AvailabilityEditor {
    rows: [DayRow; 5],
    dial_target: Option<DialTarget>,
}

impl Default for AvailabilityEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl AvailabilityEditor {
    /// Every day disabled, collapsed, with one empty interval
    pub fn new() -> Self {
        Self {
            rows: Weekday::ALL.map(DayRow::new),
            dial_target: None,
        }
    }

    pub fn rows(&self) -> &[DayRow] {
        &self.rows
    }

    pub fn row(&self, day: Weekday) -> &DayRow {
        &self.rows[day.index()]
    }

    fn row_mut(&mut self, day: Weekday) -> &mut DayRow {
        &mut self.rows[day.index()]
    }

    /// Flip whether the day takes part in the commit; intervals are kept as they are
    pub fn toggle_day(&mut self, day: Weekday) {
        let row = self.row_mut(day);
        row.enabled = !row.enabled;
        tracing::trace!(day = %day, enabled = row.enabled, "Toggled day");
    }

    /// Flip whether the day's intervals are shown for editing
    pub fn toggle_expanded(&mut self, day: Weekday) {
        let row = self.row_mut(day);
        row.expanded = !row.expanded;
    }

    /// Append an empty interval and return its position
    pub fn add_interval(&mut self, day: Weekday) -> usize {
        let row = self.row_mut(day);
        row.intervals.push(Interval::empty());
        row.intervals.len() - 1
    }

    /// Remove the interval at `index`
    ///
    /// Removing the last remaining interval leaves a fresh empty one in its place.
    pub fn remove_interval(&mut self, day: Weekday, index: usize) -> Result<Interval, EditorError> {
        let row = self.row_mut(day);
        if index >= row.intervals.len() {
            return Err(EditorError::IntervalOutOfRange {
                day,
                index,
                len: row.intervals.len(),
            });
        }

        let removed = row.intervals.remove(index);
        if row.intervals.is_empty() {
            row.intervals.push(Interval::empty());
        }
        Ok(removed)
    }

    /// Overwrite one bound of an interval
    pub fn set_time(
        &mut self,
        day: Weekday,
        index: usize,
        field: IntervalField,
        value: TimeOfDay,
    ) -> Result<(), EditorError> {
        self.row_mut(day).interval_mut(index)?.set(field, value);
        tracing::trace!(day = %day, index, field = %field, value = %value, "Set interval bound");
        Ok(())
    }

    /// Open a time dial on one interval bound
    ///
    /// The dial starts from the bound's current value, or noon when it is unset.
    /// Opening another dial replaces the previous target.
    pub fn open_dial(
        &mut self,
        day: Weekday,
        index: usize,
        field: IntervalField,
    ) -> Result<TimeDial, EditorError> {
        let current = self.row_mut(day).interval_mut(index)?.get(field);
        self.dial_target = Some(DialTarget {
            day,
            interval: index,
            field,
        });
        let initial = current.map(|t| t.to_string());
        Ok(TimeDial::open(initial.as_deref()))
    }

    /// Bound the open dial writes to, if a dial is open
    pub fn dial_target(&self) -> Option<DialTarget> {
        self.dial_target
    }

    /// Close the open dial, writing its value when it was accepted
    pub fn close_dial(&mut self, outcome: DialOutcome) -> Result<(), EditorError> {
        let target = self.dial_target.take().ok_or(EditorError::NoDialTarget)?;
        match outcome {
            DialOutcome::Accepted(value) => {
                self.set_time(target.day, target.interval, target.field, value)
            }
            DialOutcome::Cancelled => Ok(()),
        }
    }

    /// Check every enabled day and collect the requests a commit would send
    pub fn validate(&self) -> Result<Vec<TimeslotRequest>, ValidationError> {
        let mut requests = Vec::new();

        for row in self.rows.iter().filter(|r| r.enabled) {
            for (index, interval) in row.intervals.iter().enumerate() {
                let (Some(start), Some(end)) = (interval.from, interval.to) else {
                    return Err(ValidationError::Incomplete {
                        day: row.day,
                        index,
                    });
                };
                if end <= start {
                    return Err(ValidationError::Inverted {
                        day: row.day,
                        index,
                    });
                }
                requests.push(TimeslotRequest {
                    day_of_week: row.day,
                    start_time: start,
                    end_time: end,
                });
            }
        }

        Ok(requests)
    }

    /// Validate everything, then persist each interval in order
    ///
    /// A validation failure sends nothing. A store failure stops at the failing
    /// interval; the ones before it stay stored.
    pub async fn commit_all(&self, store: &dyn TimeslotStore) -> Result<CommitReport, ScheduleError> {
        let requests = self.validate().map_err(|e| {
            tracing::warn!(day = %e.day(), error = %e, "Availability failed validation");
            e
        })?;

        tracing::info!(intervals = requests.len(), "Committing availability");

        let mut persisted = Vec::with_capacity(requests.len());
        for request in requests {
            if let Err(source) = store.create(&request).await {
                tracing::error!(
                    day = %request.day_of_week,
                    persisted = persisted.len(),
                    error = %source,
                    "Failed to persist timeslot"
                );
                return Err(ScheduleError::Persistence {
                    persisted: persisted.len(),
                    source,
                });
            }
            persisted.push(request);
        }

        tracing::info!(intervals = persisted.len(), "Availability committed");
        Ok(CommitReport { persisted })
    }
}
