//! CF-convention time units (`"hours since 2017-11-01 00:00:00"`).

use std::str::FromStr;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::error::DatasetError;

/// Unit of a numeric time coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl TimeUnit {
    pub fn seconds(&self) -> f64 {
        match self {
            Self::Seconds => 1.0,
            Self::Minutes => 60.0,
            Self::Hours => 3600.0,
            Self::Days => 86400.0,
        }
    }
}

impl FromStr for TimeUnit {
    type Err = DatasetError;

    /// Parse a UDUNITS-style unit word.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "s" | "sec" | "secs" | "second" | "seconds" => Ok(Self::Seconds),
            "min" | "mins" | "minute" | "minutes" => Ok(Self::Minutes),
            "h" | "hr" | "hrs" | "hour" | "hours" => Ok(Self::Hours),
            "d" | "day" | "days" => Ok(Self::Days),
            _ => Err(DatasetError::incompatible(format!("unrecognised time unit: {}", s))),
        }
    }
}

/// Parsed `<unit> since <epoch>` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeUnits {
    pub unit: TimeUnit,
    pub epoch: DateTime<Utc>,
}

impl TimeUnits {
    /// Parse a CF time-units string.
    ///
    /// Trailing `UTC`/`Z` markers are accepted; the epoch is always taken as
    /// UTC. Returns `None` if the string does not follow the convention.
    pub fn parse(s: &str) -> Option<Self> {
        // ASCII lowercasing keeps byte offsets valid for slicing `s`
        let lower = s.to_ascii_lowercase();
        let idx = lower.find(" since ")?;
        let unit = s[..idx].trim().parse().ok()?;
        let epoch = parse_epoch(s[idx + " since ".len()..].trim())?;
        Some(Self { unit, epoch })
    }

    /// Convert a raw coordinate value to a datetime.
    ///
    /// Returns `None` for non-finite values and for results outside the
    /// representable datetime range.
    pub fn to_datetime(&self, value: f64) -> Option<DateTime<Utc>> {
        let millis = (value * self.unit.seconds() * 1000.0).round();
        if !millis.is_finite() || millis.abs() >= i64::MAX as f64 {
            return None;
        }
        let delta = Duration::try_milliseconds(millis as i64)?;
        self.epoch.checked_add_signed(delta)
    }
}

fn parse_epoch(s: &str) -> Option<DateTime<Utc>> {
    let s = s
        .trim_end_matches("UTC")
        .trim_end_matches("utc")
        .trim_end_matches('Z')
        .trim();

    const FORMATS: [&str; 5] = [
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M",
    ];

    for format in FORMATS {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(Utc.from_utc_datetime(&ndt));
        }
    }

    // Date only
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?;
    Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?))
}
