//! Time zone handling for backend timestamps and displayed clock times.

use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, TimeZone, Utc};

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

/// The time zone times are shown in.
///
/// It's also the zone naive timestamps from the backend are read in, the
/// same way a browser treats a date-time string without an offset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DisplayTimeZone {
    /// The zone of the machine running the widget.
    #[default]
    Local,
    /// A fixed offset, e.g. the cinema's zone.
    Fixed(FixedOffset),
}

impl DisplayTimeZone {
    /// Parses an RFC 3339 or naive date-time.
    pub fn parse(&self, raw: &str) -> Option<DateTime<FixedOffset>> {
        let raw = raw.trim();
        if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
            return Some(t);
        }
        let naive = NAIVE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())?;
        match self {
            DisplayTimeZone::Local => Local
                .from_local_datetime(&naive)
                .earliest()
                .map(|t| t.fixed_offset()),
            DisplayTimeZone::Fixed(offset) => {
                offset.from_local_datetime(&naive).single()
            }
        }
    }

    /// Formats an instant as `HH:MM` in this zone.
    pub fn format_clock(&self, t: DateTime<Utc>) -> String {
        let clock = match self {
            DisplayTimeZone::Local => t.with_timezone(&Local).format("%H:%M"),
            DisplayTimeZone::Fixed(offset) => {
                t.with_timezone(offset).format("%H:%M")
            }
        };
        clock.to_string()
    }
}
