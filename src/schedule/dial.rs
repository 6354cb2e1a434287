//! Circular time dial
//!
//! The modal clock-face input used to pick interval bounds. A pointer position on the
//! face is turned into an angle measured clockwise from 12 o'clock, and the angle into
//! an hour (30° steps, 12-hour face) or a minute (6° steps).
//!
//! The dial owns only its live value and active unit. It is opened fresh for every
//! target and consumed by [`TimeDial::accept`] or [`TimeDial::cancel`], so nothing
//! carries over between openings.

use serde::{Deserialize, Serialize};

use super::time::TimeOfDay;

const DEFAULT_HOUR: u8 = 12;
const DEFAULT_MINUTE: u8 = 0;

/// Degrees per hour mark on a 12-hour face
const DEGREES_PER_HOUR: f64 = 30.0;
/// Degrees per minute mark
const DEGREES_PER_MINUTE: f64 = 6.0;

/// Which component the next pointer press selects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialUnit {
    Hour,
    Minute,
}

/// A position in screen coordinates (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// How a dial session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialOutcome {
    Accepted(TimeOfDay),
    Cancelled,
}

/// Angle of a pointer offset from the dial center, in degrees within `[0, 360)`
///
/// Straight up is 0°, increasing clockwise.
pub fn pointer_angle(dx: f64, dy: f64) -> f64 {
    let deg = dx.atan2(-dy).to_degrees();
    let normalized = (deg + 360.0) % 360.0;
    // (-ε + 360) can round up to exactly 360.0
    if normalized >= 360.0 {
        0.0
    } else {
        normalized
    }
}

/// Hour mark nearest to `angle`, on a 1..=12 face
pub fn hour_for_angle(angle: f64) -> u8 {
    let mark = (angle / DEGREES_PER_HOUR).round() as u8;
    if mark == 0 {
        12
    } else {
        mark.min(12)
    }
}

/// Minute mark nearest to `angle`, wrapping 360° back to 0
pub fn minute_for_angle(angle: f64) -> u8 {
    ((angle / DEGREES_PER_MINUTE).round() as u32 % 60) as u8
}

/// Lenient `HH:MM` parsing for the dial's starting value
///
/// Missing, non-numeric, or out-of-range components fall back to noon's hour or
/// zero minutes independently. Hour 0 is shown as 12, the face has no zero mark.
pub fn parse_initial(initial: Option<&str>) -> (u8, u8) {
    let Some(text) = initial.map(str::trim).filter(|s| !s.is_empty()) else {
        return (DEFAULT_HOUR, DEFAULT_MINUTE);
    };

    let mut parts = text.split(':');
    let hour = parts
        .next()
        .and_then(|h| h.trim().parse::<u8>().ok())
        .filter(|h| *h <= 23)
        .unwrap_or(DEFAULT_HOUR);
    let minute = parts
        .next()
        .and_then(|m| m.trim().parse::<u8>().ok())
        .filter(|m| *m <= 59)
        .unwrap_or(DEFAULT_MINUTE);

    let hour = if hour == 0 { DEFAULT_HOUR } else { hour };
    (hour, minute)
}

/// Live state of an open time dial
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeDial {
    hour: u8,
    minute: u8,
    unit: DialUnit,
}

impl TimeDial {
    /// Open a dial on `initial`, selecting hours first
    pub fn open(initial: Option<&str>) -> Self {
        let (hour, minute) = parse_initial(initial);
        Self {
            hour,
            minute,
            unit: DialUnit::Hour,
        }
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    pub fn unit(&self) -> DialUnit {
        self.unit
    }

    /// Switch the active unit explicitly
    pub fn select_unit(&mut self, unit: DialUnit) {
        self.unit = unit;
    }

    /// Handle a pointer press at `pointer` on a face centered at `center`
    ///
    /// A press exactly on the center has no direction and is ignored.
    pub fn press(&mut self, pointer: Point, center: Point) {
        let dx = pointer.x - center.x;
        let dy = pointer.y - center.y;
        if dx == 0.0 && dy == 0.0 {
            return;
        }
        self.select_angle(pointer_angle(dx, dy));
    }

    /// Apply an already-normalized angle to the active unit
    ///
    /// Picking an hour moves the dial on to minutes.
    pub fn select_angle(&mut self, angle: f64) {
        match self.unit {
            DialUnit::Hour => {
                self.hour = hour_for_angle(angle);
                self.unit = DialUnit::Minute;
            }
            DialUnit::Minute => {
                self.minute = minute_for_angle(angle);
            }
        }
    }

    /// Rotation of the dial hand for the active unit, in degrees
    pub fn hand_angle(&self) -> f64 {
        match self.unit {
            DialUnit::Hour => (self.hour % 12) as f64 * DEGREES_PER_HOUR,
            DialUnit::Minute => self.minute as f64 * DEGREES_PER_MINUTE,
        }
    }

    /// Current value as shown above the face
    pub fn value(&self) -> TimeOfDay {
        TimeOfDay::new(self.hour, self.minute).unwrap_or(TimeOfDay::NOON)
    }

    /// Close the dial, emitting the current value
    pub fn accept(self) -> DialOutcome {
        DialOutcome::Accepted(self.value())
    }

    /// Close the dial without emitting anything
    pub fn cancel(self) -> DialOutcome {
        DialOutcome::Cancelled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CENTER: Point = Point { x: 120.0, y: 120.0 };

    /// Point at `angle` degrees clockwise from 12 o'clock, `radius` from the center
    fn at(angle: f64, radius: f64) -> Point {
        let rad = angle.to_radians();
        Point::new(CENTER.x + rad.sin() * radius, CENTER.y - rad.cos() * radius)
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_angle_cardinal_directions() {
        assert!(approx(pointer_angle(0.0, -10.0), 0.0));
        assert!(approx(pointer_angle(10.0, 0.0), 90.0));
        assert!(approx(pointer_angle(0.0, 10.0), 180.0));
        assert!(approx(pointer_angle(-10.0, 0.0), 270.0));
    }

    #[test]
    fn test_angle_range_and_monotonic() {
        let mut previous = -1.0;
        for step in 0..720 {
            let expected = step as f64 * 0.5;
            let p = at(expected, 80.0);
            let angle = pointer_angle(p.x - CENTER.x, p.y - CENTER.y);
            assert!((0.0..360.0).contains(&angle), "angle {angle} out of range");
            assert!((angle - expected).abs() < 1e-6, "{angle} != {expected}");
            assert!(angle > previous);
            previous = angle;
        }
    }

    #[test]
    fn test_angle_just_left_of_top_stays_in_range() {
        let angle = pointer_angle(-1e-18, -100.0);
        assert!((0.0..360.0).contains(&angle));
    }

    #[test]
    fn test_hour_mapping() {
        assert_eq!(hour_for_angle(0.0), 12);
        for h in 1..12u8 {
            assert_eq!(hour_for_angle(h as f64 * 30.0), h);
        }
        assert_eq!(hour_for_angle(14.9), 12);
        assert_eq!(hour_for_angle(15.1), 1);
        assert_eq!(hour_for_angle(350.0), 12);
        assert_eq!(hour_for_angle(360.0), 12);
    }

    #[test]
    fn test_minute_mapping() {
        for m in 0..60u8 {
            assert_eq!(minute_for_angle(m as f64 * 6.0), m);
        }
        assert_eq!(minute_for_angle(357.5), 0);
        assert_eq!(minute_for_angle(360.0), 0);
        assert_eq!(minute_for_angle(2.9), 0);
        assert_eq!(minute_for_angle(3.1), 1);
    }

    #[test]
    fn test_parse_initial_defaults() {
        assert_eq!(parse_initial(None), (12, 0));
        assert_eq!(parse_initial(Some("")), (12, 0));
        assert_eq!(parse_initial(Some("abc")), (12, 0));
        assert_eq!(parse_initial(Some("xx:30")), (12, 30));
        assert_eq!(parse_initial(Some("09:yy")), (9, 0));
        assert_eq!(parse_initial(Some("7")), (7, 0));
        assert_eq!(parse_initial(Some("99:99")), (12, 0));
        assert_eq!(parse_initial(Some("00:15")), (12, 15));
        assert_eq!(parse_initial(Some("17:45")), (17, 45));
    }

    #[test]
    fn test_open_resets_to_hour_unit() {
        let dial = TimeDial::open(Some("08:30"));
        assert_eq!(dial.unit(), DialUnit::Hour);
        assert_eq!(dial.value().to_string(), "08:30");
    }

    #[test]
    fn test_hour_press_advances_to_minutes() {
        let mut dial = TimeDial::open(None);
        dial.press(at(90.0, 80.0), CENTER);
        assert_eq!(dial.hour(), 3);
        assert_eq!(dial.unit(), DialUnit::Minute);

        dial.press(at(180.0, 80.0), CENTER);
        assert_eq!(dial.minute(), 30);
        assert_eq!(dial.unit(), DialUnit::Minute);
        assert_eq!(dial.hour(), 3);
    }

    #[test]
    fn test_manual_unit_switch() {
        let mut dial = TimeDial::open(Some("10:10"));
        dial.select_unit(DialUnit::Minute);
        dial.press(at(270.0, 50.0), CENTER);
        assert_eq!(dial.minute(), 45);
        assert_eq!(dial.hour(), 10);

        dial.select_unit(DialUnit::Hour);
        dial.press(at(300.0, 50.0), CENTER);
        assert_eq!(dial.hour(), 10);
        assert_eq!(dial.unit(), DialUnit::Minute);
    }

    #[test]
    fn test_center_press_ignored() {
        let mut dial = TimeDial::open(Some("04:20"));
        dial.press(CENTER, CENTER);
        assert_eq!(dial.value().to_string(), "04:20");
        assert_eq!(dial.unit(), DialUnit::Hour);
    }

    #[test]
    fn test_hand_angle() {
        let mut dial = TimeDial::open(Some("15:20"));
        assert!(approx(dial.hand_angle(), 90.0));
        dial.select_unit(DialUnit::Minute);
        assert!(approx(dial.hand_angle(), 120.0));
    }

    #[test]
    fn test_accept_and_cancel() {
        let dial = TimeDial::open(Some("6:05"));
        match dial.accept() {
            DialOutcome::Accepted(t) => assert_eq!(t.to_string(), "06:05"),
            DialOutcome::Cancelled => panic!("Expected Accepted"),
        }
        assert_eq!(TimeDial::open(None).cancel(), DialOutcome::Cancelled);
    }

    #[test]
    fn test_accept_round_trip_for_every_dial_value() {
        for h in 1..=12u8 {
            for m in 0..60u8 {
                let mut dial = TimeDial::open(None);
                dial.select_angle(if h == 12 { 0.0 } else { h as f64 * 30.0 });
                dial.select_angle(m as f64 * 6.0);

                let DialOutcome::Accepted(time) = dial.accept() else {
                    panic!("Expected Accepted");
                };
                let formatted = time.to_string();
                assert_eq!(parse_initial(Some(&formatted)), (h, m));
                let strict: TimeOfDay = formatted.parse().unwrap();
                assert_eq!((strict.hour(), strict.minute()), (h, m));
            }
        }
    }
}
