//! Wall-clock time values
//!
//! `TimeOfDay` is the `HH:MM` value every interval bound holds. `Interval` pairs two
//! optional bounds, where `None` is the unset state (distinct from `00:00`).

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A wall-clock time with minute precision
///
/// Ordering matches the lexicographic order of the zero-padded `HH:MM` form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay {
    hour: u8,
    minute: u8,
}

impl TimeOfDay {
    /// Noon, the value a dial opens with when nothing usable was given
    pub const NOON: TimeOfDay = TimeOfDay { hour: 12, minute: 0 };

    /// Create a time, returning `None` when a component is out of range
    pub fn new(hour: u8, minute: u8) -> Option<Self> {
        if hour > 23 || minute > 59 {
            return None;
        }
        Some(Self { hour, minute })
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    /// Minutes elapsed since midnight
    pub fn minutes_since_midnight(&self) -> u16 {
        self.hour as u16 * 60 + self.minute as u16
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// Errors from strict `HH:MM` parsing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeParseError {
    #[error("expected HH:MM, got {0:?}")]
    Format(String),

    #[error("hour out of range: {0}")]
    HourOutOfRange(u32),

    #[error("minute out of range: {0}")]
    MinuteOutOfRange(u32),
}

impl FromStr for TimeOfDay {
    type Err = TimeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (h, m) = trimmed
            .split_once(':')
            .ok_or_else(|| TimeParseError::Format(s.to_string()))?;

        let valid_part = |p: &str| (1..=2).contains(&p.len()) && p.bytes().all(|b| b.is_ascii_digit());
        if !valid_part(h) || m.len() != 2 || !valid_part(m) {
            return Err(TimeParseError::Format(s.to_string()));
        }

        let hour: u32 = h.parse().map_err(|_| TimeParseError::Format(s.to_string()))?;
        let minute: u32 = m.parse().map_err(|_| TimeParseError::Format(s.to_string()))?;

        if hour > 23 {
            return Err(TimeParseError::HourOutOfRange(hour));
        }
        if minute > 59 {
            return Err(TimeParseError::MinuteOutOfRange(minute));
        }

        Ok(Self {
            hour: hour as u8,
            minute: minute as u8,
        })
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Which bound of an interval a value targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntervalField {
    From,
    To,
}

impl fmt::Display for IntervalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntervalField::From => write!(f, "from"),
            IntervalField::To => write!(f, "to"),
        }
    }
}

/// A time range whose bounds may still be unset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    #[serde(default)]
    pub from: Option<TimeOfDay>,
    #[serde(default)]
    pub to: Option<TimeOfDay>,
}

impl Interval {
    /// An interval with both bounds unset
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(from: TimeOfDay, to: TimeOfDay) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
        }
    }

    pub fn get(&self, field: IntervalField) -> Option<TimeOfDay> {
        match field {
            IntervalField::From => self.from,
            IntervalField::To => self.to,
        }
    }

    pub fn set(&mut self, field: IntervalField, value: TimeOfDay) {
        match field {
            IntervalField::From => self.from = Some(value),
            IntervalField::To => self.to = Some(value),
        }
    }

    /// True when both bounds are set
    pub fn is_complete(&self) -> bool {
        self.from.is_some() && self.to.is_some()
    }
}
