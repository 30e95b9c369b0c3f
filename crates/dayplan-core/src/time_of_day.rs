//! Local time-of-day values.
//!
//! Every time at the crate boundary is a zero-padded 24-hour `HH:MM` string.
//! Internally a [`TimeOfDay`] is the number of minutes since midnight, so the
//! conversion `HH:MM <-> minutes` is exact for the whole `00:00..=23:59` range.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Minutes in a day; `24:00` itself is not a valid time of day.
pub const MINUTES_PER_DAY: u16 = 24 * 60;

/// A minute-resolution wall-clock time within a single local day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    pub const MIDNIGHT: TimeOfDay = TimeOfDay(0);
    pub const LAST_MINUTE: TimeOfDay = TimeOfDay(MINUTES_PER_DAY - 1);

    /// Build from minutes since midnight. Returns `None` at or past 24:00.
    pub fn from_minutes(minutes: u16) -> Option<Self> {
        (minutes < MINUTES_PER_DAY).then_some(Self(minutes))
    }

    /// Build from hour and minute components.
    pub fn from_hm(hours: u16, minutes: u16) -> Option<Self> {
        if hours >= 24 || minutes >= 60 {
            return None;
        }
        Some(Self(hours * 60 + minutes))
    }

    /// Minutes since midnight.
    pub fn minutes(self) -> u16 {
        self.0
    }

    pub fn hour(self) -> u16 {
        self.0 / 60
    }

    pub fn minute(self) -> u16 {
        self.0 % 60
    }

    /// `self + minutes`, or `None` if the result would leave the day.
    pub fn checked_add(self, minutes: u16) -> Option<Self> {
        self.0.checked_add(minutes).and_then(Self::from_minutes)
    }

    /// Whole minutes from `self` forward to `later`; zero if `later` is not after `self`.
    pub fn minutes_until(self, later: TimeOfDay) -> u16 {
        later.0.saturating_sub(self.0)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for TimeOfDay {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |message: &str| ValidationError::InvalidTimeOfDay {
            input: s.to_string(),
            message: message.to_string(),
        };

        let (h, m) = s
            .split_once(':')
            .ok_or_else(|| invalid("expected HH:MM"))?;
        if h.len() != 2 || m.len() != 2 {
            return Err(invalid("hours and minutes must be two digits each"));
        }
        if !h.bytes().chain(m.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid("expected digits"));
        }

        // Both halves are two ASCII digits, so these parses cannot fail.
        let hours: u16 = h.parse().map_err(|_| invalid("expected digits"))?;
        let minutes: u16 = m.parse().map_err(|_| invalid("expected digits"))?;

        Self::from_hm(hours, minutes).ok_or_else(|| invalid("out of range 00:00-23:59"))
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(value: TimeOfDay) -> Self {
        value.to_string()
    }
}

/// Truncates seconds, so 10:29:59 becomes 10:29.
impl From<NaiveTime> for TimeOfDay {
    fn from(time: NaiveTime) -> Self {
        Self((time.hour() * 60 + time.minute()) as u16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn t(s: &str) -> TimeOfDay {
        s.parse().unwrap()
    }

    #[test]
    fn parses_zero_padded_times() {
        assert_eq!(t("00:00").minutes(), 0);
        assert_eq!(t("09:00").minutes(), 540);
        assert_eq!(t("17:30").minutes(), 1050);
        assert_eq!(t("23:59").minutes(), 1439);
    }

    #[test]
    fn rejects_malformed_input() {
        for bad in ["24:00", "9:00", "09:0", "0900", "ab:cd", "12:60", "", "09:00:00", "+9:00", "-1:00"] {
            assert!(bad.parse::<TimeOfDay>().is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn formats_with_padding() {
        assert_eq!(TimeOfDay::from_minutes(65).unwrap().to_string(), "01:05");
        assert_eq!(TimeOfDay::LAST_MINUTE.to_string(), "23:59");
    }

    #[test]
    fn checked_add_stops_at_midnight() {
        assert_eq!(t("23:00").checked_add(59), Some(t("23:59")));
        assert_eq!(t("23:00").checked_add(60), None);
    }

    #[test]
    fn minutes_until_saturates() {
        assert_eq!(t("09:00").minutes_until(t("10:30")), 90);
        assert_eq!(t("10:30").minutes_until(t("09:00")), 0);
    }

    #[test]
    fn serde_uses_hh_mm_strings() {
        let json = serde_json::to_string(&t("07:05")).unwrap();
        assert_eq!(json, "\"07:05\"");
        let back: TimeOfDay = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t("07:05"));
        assert!(serde_json::from_str::<TimeOfDay>("\"25:00\"").is_err());
    }

    #[test]
    fn from_naive_time_drops_seconds() {
        let time = NaiveTime::from_hms_opt(10, 29, 59).unwrap();
        assert_eq!(TimeOfDay::from(time), t("10:29"));
    }

    proptest! {
        #[test]
        fn minutes_round_trip_through_text(minutes in 0u16..MINUTES_PER_DAY) {
            let time = TimeOfDay::from_minutes(minutes).unwrap();
            let parsed: TimeOfDay = time.to_string().parse().unwrap();
            prop_assert_eq!(parsed.minutes(), minutes);
        }
    }
}
