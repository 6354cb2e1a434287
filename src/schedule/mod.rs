//! Weekly Availability
//!
//! Editing and committing the weekly availability schedule.
//!
//! ## Architecture
//!
//! - **time**: `HH:MM` values and intervals with optional bounds
//! - **dial**: Circular time dial turning pointer positions into hours and minutes
//! - **editor**: Per-day rows, interval list operations, validation and commit
//! - **store**: Persistence seam and the HTTP `POST /timeslots` store
//! - **plan**: TOML plan files replayed through the editor
//!
//! ## Data Flow
//!
//! 1. The editor opens a dial on one interval bound
//! 2. The dial closes with an outcome; an accepted value is written to that bound
//! 3. `commit_all` validates every enabled day
//! 4. Each valid interval is sent to the store, one request at a time

mod dial;
mod editor;
mod error;
mod plan;
mod store;
mod time;

pub use dial::{
    hour_for_angle, minute_for_angle, parse_initial, pointer_angle, DialOutcome, DialUnit, Point,
    TimeDial,
};
pub use editor::{
    AvailabilityEditor, CommitReport, DayRow, DialTarget, Notification, NotificationKind, Weekday,
};
pub use error::{EditorError, ScheduleError, StoreError, ValidationError};
pub use plan::{AvailabilityPlan, DayPlan, IntervalPlan, PlanError};
pub use store::{HttpTimeslotStore, TimeslotRequest, TimeslotStore};
pub use time::{Interval, IntervalField, TimeOfDay, TimeParseError};
