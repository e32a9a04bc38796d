use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use thiserror::Error;

// YYYY-MM-DDTHH:MM followed by `Z` or a `±HH:MM` offset, nothing else
static ISO_8601_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^([0-9]{4})-([0-9]{2})-([0-9]{2})T([0-9]{2}):([0-9]{2})(?:(Z)|([+-])([0-9]{2}):([0-9]{2}))$",
    )
    .unwrap()
});

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimestampError {
    #[error("{0:?} is not YYYY-MM-DDTHH:MMZ or YYYY-MM-DDTHH:MM±HH:MM")]
    Format(String),
    #[error("{0:?} is not a valid date, time or offset")]
    OutOfRange(String),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Clock {
    TwelveHour,
    TwentyFourHour,
}

/// A wall clock time together with the offset it was written in.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Timestamp(DateTime<FixedOffset>);

impl Timestamp {
    /// `DD Mon YYYY` of the date as written, without converting to UTC.
    pub fn date(&self) -> String {
        self.0.format("%d %b %Y").to_string()
    }

    /// `hh:mmAM (±HH:MM)` or `HH:MM (±HH:MM)`. A `Z` offset renders as `+00:00`.
    pub fn time(&self, clock: Clock) -> String {
        let pattern = match clock {
            Clock::TwelveHour => "%I:%M%p (%:z)",
            Clock::TwentyFourHour => "%H:%M (%:z)",
        };
        self.0.format(pattern).to_string()
    }
}

fn number(caps: &Captures, group: usize) -> u32 {
    // groups only ever hold ASCII digits
    caps.get(group)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or_default()
}

impl FromStr for Timestamp {
    type Err = TimestampError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = ISO_8601_RE
            .captures(s)
            .ok_or_else(|| TimestampError::Format(s.to_string()))?;
        let out_of_range = || TimestampError::OutOfRange(s.to_string());

        let year = i32::try_from(number(&caps, 1)).map_err(|_| out_of_range())?;
        let date = NaiveDate::from_ymd_opt(year, number(&caps, 2), number(&caps, 3))
            .ok_or_else(out_of_range)?;
        let time =
            NaiveTime::from_hms_opt(number(&caps, 4), number(&caps, 5), 0).ok_or_else(out_of_range)?;

        let offset = if caps.get(6).is_some() {
            FixedOffset::east_opt(0)
        } else {
            let (hours, minutes) = (number(&caps, 8), number(&caps, 9));
            if minutes >= 60 {
                return Err(out_of_range());
            }
            let seconds = i32::try_from(hours * 3600 + minutes * 60).map_err(|_| out_of_range())?;
            match &caps[7] {
                "-" => FixedOffset::west_opt(seconds),
                _ => FixedOffset::east_opt(seconds),
            }
        }
        .ok_or_else(out_of_range)?;

        offset
            .from_local_datetime(&date.and_time(time))
            .single()
            .map(Self)
            .ok_or_else(out_of_range)
    }
}

#[cfg(test)]
mod test {
    use super::{Clock, Timestamp, TimestampError};

    fn render(iso: &str) -> (String, String, String) {
        let timestamp = iso.parse::<Timestamp>().unwrap();
        (
            timestamp.date(),
            timestamp.time(Clock::TwelveHour),
            timestamp.time(Clock::TwentyFourHour),
        )
    }

    #[test]
    fn test_offsets() {
        let cases = [
            ("2024-02-01T08:00-08:00", "01 Feb 2024", "08:00AM (-08:00)", "08:00 (-08:00)"),
            ("2024-02-01T16:30-05:00", "01 Feb 2024", "04:30PM (-05:00)", "16:30 (-05:00)"),
            ("2024-02-02T22:00+00:00", "02 Feb 2024", "10:00PM (+00:00)", "22:00 (+00:00)"),
            ("2024-02-03T23:45+04:00", "03 Feb 2024", "11:45PM (+04:00)", "23:45 (+04:00)"),
            ("2024-02-05T09:15+11:00", "05 Feb 2024", "09:15AM (+11:00)", "09:15 (+11:00)"),
            ("2023-12-31T00:05+05:30", "31 Dec 2023", "12:05AM (+05:30)", "00:05 (+05:30)"),
            ("2023-07-14T12:00-00:00", "14 Jul 2023", "12:00PM (+00:00)", "12:00 (+00:00)"),
        ];

        for (iso, date, t12, t24) in cases {
            assert_eq!(
                render(iso),
                (date.to_string(), t12.to_string(), t24.to_string()),
                "{iso}"
            );
        }
    }

    #[test]
    fn test_zulu() {
        assert_eq!(
            render("2022-05-09T08:07Z"),
            (
                "09 May 2022".to_string(),
                "08:07AM (+00:00)".to_string(),
                "08:07 (+00:00)".to_string()
            )
        );
    }

    #[test]
    fn test_date_is_not_converted_to_utc() {
        // 23:30 at -08:00 is already the next day in UTC
        assert_eq!(render("2024-02-29T23:30-08:00").0, "29 Feb 2024");
    }

    #[test]
    fn test_malformed() {
        for iso in [
            "",
            "2024-02-01",
            "2024-02-01T08:00",
            "2024-02-01T08:00z",
            "2024-02-01T08:00:00Z",
            "2024-02-01T08:00+0800",
            "2024-2-01T08:00Z",
            "24-02-01T08:00Z",
            "2024-02-01 08:00Z",
            " 2024-02-01T08:00Z",
        ] {
            assert_eq!(
                iso.parse::<Timestamp>(),
                Err(TimestampError::Format(iso.to_string())),
                "{iso}"
            );
        }
    }

    #[test]
    fn test_out_of_range() {
        for iso in [
            "2024-13-01T08:00Z",
            "2023-02-29T08:00Z",
            "2024-02-01T24:00Z",
            "2024-02-01T08:60Z",
            "2024-02-01T08:00+01:60",
            "2024-02-01T08:00+24:00",
        ] {
            assert_eq!(
                iso.parse::<Timestamp>(),
                Err(TimestampError::OutOfRange(iso.to_string())),
                "{iso}"
            );
        }
    }
}
