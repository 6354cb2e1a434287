//! Schedule error types

use thiserror::Error;

use super::editor::Weekday;

/// Errors from editing operations that address a day or interval
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditorError {
    /// Interval index past the end of the day's list
    #[error("{day} has no interval at position {index} (it has {len})")]
    IntervalOutOfRange { day: Weekday, index: usize, len: usize },

    /// Day index outside the five weekdays
    #[error("No weekday at position {0}")]
    DayOutOfRange(usize),

    /// A dial result arrived while no dial was open
    #[error("No time dial is open")]
    NoDialTarget,
}

/// Validation failures found before any interval is persisted
///
/// The display strings are the messages shown to the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// An enabled day has an interval with an unset bound
    #[error("Completa todos los horarios de {day}")]
    Incomplete { day: Weekday, index: usize },

    /// An enabled day has an interval whose end is not after its start
    #[error("La hora final debe ser mayor que la inicial en {day}")]
    Inverted { day: Weekday, index: usize },
}

impl ValidationError {
    /// The day the failure belongs to
    pub fn day(&self) -> Weekday {
        match self {
            ValidationError::Incomplete { day, .. } | ValidationError::Inverted { day, .. } => *day,
        }
    }
}

/// Errors from the timeslot persistence endpoint
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Timeslot service unavailable")]
    Unavailable,

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Request timeout")]
    Timeout,
}

impl StoreError {
    pub(crate) fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            StoreError::Timeout
        } else if e.is_connect() {
            StoreError::Unavailable
        } else {
            StoreError::Request(e)
        }
    }
}

/// Errors from a bulk commit
#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Persisting failed after `persisted` intervals had already been stored
    #[error("Persisting failed after {persisted} interval(s): {source}")]
    Persistence {
        persisted: usize,
        #[source]
        source: StoreError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_messages() {
        let err = ValidationError::Incomplete {
            day: Weekday::Martes,
            index: 0,
        };
        assert_eq!(err.to_string(), "Completa todos los horarios de Martes");
        assert_eq!(err.day(), Weekday::Martes);

        let err = ValidationError::Inverted {
            day: Weekday::Lunes,
            index: 2,
        };
        assert_eq!(
            err.to_string(),
            "La hora final debe ser mayor que la inicial en Lunes"
        );
    }

    #[test]
    fn test_editor_error_display() {
        let err = EditorError::IntervalOutOfRange {
            day: Weekday::Viernes,
            index: 3,
            len: 1,
        };
        assert_eq!(err.to_string(), "Viernes has no interval at position 3 (it has 1)");
    }
}
