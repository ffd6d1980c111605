//! Messages shown in the widget.

use std::fmt::{self, Display};

use chrono::{DateTime, Utc};
use cinebot_protocol::HistoryRecord;
pub use cinebot_protocol::Sender;
use serde_json::{Map, Value};

use crate::time::DisplayTimeZone;

/// Identifies a message within one widget instance.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(String);

impl MessageId {
    #[inline]
    pub(crate) fn new<S: Into<String>>(id: S) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An entry in the message log.
///
/// Messages are never changed after they are created. The log only grows,
/// or gets replaced as a whole.
#[derive(Clone, Debug, PartialEq)]
pub struct Message {
    id: MessageId,
    text: String,
    sender: Sender,
    timestamp: DateTime<Utc>,
    booking: Option<BookingPayload>,
}

impl Message {
    pub(crate) fn new(
        id: MessageId,
        text: String,
        sender: Sender,
        timestamp: DateTime<Utc>,
        booking: Option<BookingPayload>,
    ) -> Self {
        Self {
            id,
            text,
            sender,
            timestamp,
            booking,
        }
    }

    /// Builds a message from a record stored by the backend.
    ///
    /// The server's row id is prefixed so it cannot collide with locally
    /// created ids. `loaded_at` stands in for timestamps that cannot be
    /// parsed.
    pub(crate) fn from_record(
        record: HistoryRecord,
        time_zone: &DisplayTimeZone,
        loaded_at: DateTime<Utc>,
    ) -> Self {
        let HistoryRecord {
            id,
            text,
            sender,
            timestamp,
            mut extra,
        } = record;

        let id = match id {
            Value::String(s) => format!("db-{s}"),
            other => format!("db-{other}"),
        };
        let timestamp = match timestamp {
            None | Some(Value::Null) => loaded_at,
            Some(raw) => match parse_record_time(&raw, time_zone) {
                Some(t) => t,
                None => {
                    warn!("unparsable timestamp in history: {raw}");
                    loaded_at
                }
            },
        };
        // Replies are stored together with the showtime they suggested.
        let booking = match extra.remove("bookingData") {
            Some(Value::Object(map)) => Some(BookingPayload(map)),
            _ => None,
        };

        Self {
            id: MessageId(id),
            text,
            sender,
            timestamp,
            booking,
        }
    }

    /// Returns the identifier.
    #[inline]
    pub fn id(&self) -> &MessageId {
        &self.id
    }

    /// Returns the displayed text, markdown for assistant messages.
    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the author.
    #[inline]
    pub fn sender(&self) -> Sender {
        self.sender
    }

    /// Returns the creation time.
    #[inline]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Returns the attached showtime suggestion.
    #[inline]
    pub fn booking(&self) -> Option<&BookingPayload> {
        self.booking.as_ref()
    }

    /// Whether the host should offer the "continue to seat selection"
    /// action next to this message.
    #[inline]
    pub fn offers_booking(&self) -> bool {
        self.sender == Sender::Assistant && self.booking.is_some()
    }

    /// Formats the creation time as `HH:MM` in `time_zone`.
    #[inline]
    pub fn display_time(&self, time_zone: &DisplayTimeZone) -> String {
        time_zone.format_clock(self.timestamp)
    }
}

/// A showtime record the backend suggested.
///
/// The widget doesn't own this schema. Apart from the identifiers checked
/// before navigating, fields are forwarded as they came.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BookingPayload(pub(crate) Map<String, Value>);

impl BookingPayload {
    /// Returns a raw field.
    #[inline]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns the movie identifier, if present and usable.
    #[inline]
    pub fn movie_id(&self) -> Option<&Value> {
        self.get("movie_id").filter(|v| is_truthy(v))
    }

    /// Returns the showtime identifier, if present and usable.
    #[inline]
    pub fn showtime_id(&self) -> Option<&Value> {
        self.get("showtime_id").filter(|v| is_truthy(v))
    }

    /// Returns the movie title.
    #[inline]
    pub fn title(&self) -> Option<&str> {
        self.non_empty_str("title")
    }

    /// Returns the cinema name.
    #[inline]
    pub fn cinema_name(&self) -> Option<&str> {
        self.non_empty_str("cinema_name")
    }

    /// Returns the start time as sent by the backend.
    #[inline]
    pub fn start_time(&self) -> Option<&str> {
        self.non_empty_str("start_time")
    }

    /// Returns the ticket price.
    #[inline]
    pub fn ticket_price(&self) -> Option<&Value> {
        self.get("ticket_price")
    }

    /// Returns the first feature tag (e.g. `IMAX`), if any.
    #[inline]
    pub fn primary_feature(&self) -> Option<&str> {
        match self.get("features") {
            Some(Value::Array(features)) => features
                .first()
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty()),
            _ => None,
        }
    }

    /// Returns the payload as a JSON object.
    #[inline]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    fn non_empty_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
    }
}

impl BookingPayload {
    /// Builds a payload from a JSON value, if it's an object.
    #[inline]
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self::from(map)),
            _ => None,
        }
    }

    /// Returns the payload as a JSON value.
    #[inline]
    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

impl From<Map<String, Value>> for BookingPayload {
    #[inline]
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

// Strings are date-times, numbers are epoch milliseconds.
fn parse_record_time(
    raw: &Value,
    time_zone: &DisplayTimeZone,
) -> Option<DateTime<Utc>> {
    match raw {
        Value::String(s) => time_zone.parse(s).map(|t| t.with_timezone(&Utc)),
        Value::Number(n) => {
            n.as_i64().and_then(DateTime::from_timestamp_millis)
        }
        _ => None,
    }
}

/// Whether a backend value counts as "set".
///
/// The backend is loose about types: identifiers may be numbers or
/// strings, and unset fields may be `null`, `""` or `0`.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, TimeZone};
    use serde_json::json;

    use super::*;

    fn record(value: Value) -> HistoryRecord {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_from_record() {
        let tz = DisplayTimeZone::Fixed(FixedOffset::east_opt(7 * 3600).unwrap());
        let loaded_at = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();

        let msg = Message::from_record(
            record(json!({
                "id": 12,
                "text": "Dune tonight?",
                "sender": "user",
                "timestamp": "2024-04-30T13:05:00Z"
            })),
            &tz,
            loaded_at,
        );
        assert_eq!(msg.id().as_str(), "db-12");
        assert_eq!(msg.sender(), Sender::User);
        assert_eq!(
            msg.timestamp(),
            Utc.with_ymd_and_hms(2024, 4, 30, 13, 5, 0).unwrap()
        );
        assert_eq!(msg.display_time(&tz), "20:05");
        assert!(!msg.offers_booking());

        // Naive timestamps are wall-clock times of the display zone.
        let msg = Message::from_record(
            record(json!({
                "id": "a1",
                "text": "Sure.",
                "sender": "bot",
                "timestamp": "2024-04-30 20:06:00",
                "bookingData": { "movie_id": 1, "showtime_id": 2 }
            })),
            &tz,
            loaded_at,
        );
        assert_eq!(msg.id().as_str(), "db-a1");
        assert_eq!(
            msg.timestamp(),
            Utc.with_ymd_and_hms(2024, 4, 30, 13, 6, 0).unwrap()
        );
        assert!(msg.offers_booking());
    }

    #[test]
    fn test_unparsable_timestamp() {
        let loaded_at = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let msg = Message::from_record(
            record(json!({
                "id": 1,
                "text": "Hi",
                "sender": "user",
                "timestamp": "yesterday"
            })),
            &DisplayTimeZone::Local,
            loaded_at,
        );
        assert_eq!(msg.timestamp(), loaded_at);

        let msg = Message::from_record(
            record(json!({
                "id": 2,
                "text": "Hi",
                "sender": "user",
                "timestamp": { "seconds": 1 }
            })),
            &DisplayTimeZone::Local,
            loaded_at,
        );
        assert_eq!(msg.timestamp(), loaded_at);
    }

    #[test]
    fn test_epoch_timestamp() {
        let loaded_at = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let msg = Message::from_record(
            record(json!({
                "id": 3,
                "text": null,
                "sender": "bot",
                "timestamp": 1704135600000u64
            })),
            &DisplayTimeZone::Local,
            loaded_at,
        );
        assert_eq!(msg.text(), "");
        assert_eq!(
            msg.timestamp(),
            Utc.with_ymd_and_hms(2024, 1, 1, 19, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_booking_accessors() {
        let Value::Object(map) = json!({
            "movie_id": 0,
            "showtime_id": "st-9",
            "title": "",
            "cinema_name": "Riverside",
            "features": ["IMAX", "3D"]
        }) else {
            unreachable!()
        };
        let payload = BookingPayload::from(map);
        assert_eq!(payload.movie_id(), None);
        assert_eq!(payload.showtime_id(), Some(&json!("st-9")));
        assert_eq!(payload.title(), None);
        assert_eq!(payload.cinema_name(), Some("Riverside"));
        assert_eq!(payload.primary_feature(), Some("IMAX"));
        assert_eq!(payload.ticket_price(), None);
    }

    #[test]
    fn test_truthiness() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!(false)));
        assert!(is_truthy(&json!(42)));
        assert!(is_truthy(&json!("0")));
        assert!(is_truthy(&json!([])));
    }

    #[test]
    fn test_payload_value() {
        let payload = BookingPayload::from_value(json!({ "showtime_id": 1 }));
        assert_eq!(
            payload.map(|p| p.to_value()),
            Some(json!({ "showtime_id": 1 }))
        );
        assert_eq!(BookingPayload::from_value(json!([1])), None);
    }
}
