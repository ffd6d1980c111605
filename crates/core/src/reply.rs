//! Interpretation of assistant replies.
//!
//! The backend returns a single `reply` string. When it wants to suggest a
//! showtime it embeds a JSON array or object somewhere in that string,
//! possibly surrounded by prose. [`parse_reply`] is the only place that
//! knows about this convention, so moving to a dedicated response field
//! later only touches this module.

use std::sync::LazyLock;

use chrono::Utc;
use regex::Regex;
use serde_json::Value;

use crate::message::{BookingPayload, is_truthy};
use crate::time::DisplayTimeZone;

// Leftmost bracket or brace, greedy up to the last matching closer.
static FRAGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)(\[.*\]|\{.*\})").expect("fragment pattern is valid")
});

const MOVIE_FALLBACK: &str = "the movie";
const CINEMA_FALLBACK: &str = "the cinema";
const CLOCK_FALLBACK: &str = "--:--";

/// What the widget shows for a reply.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParsedReply {
    /// The displayed markdown.
    pub text: String,
    /// The suggested showtime, if the reply carried one.
    pub booking: Option<BookingPayload>,
}

/// Splits a raw reply into display text and an optional showtime.
///
/// - No fragment, or a fragment that isn't valid JSON: the raw reply is
///   shown as is.
/// - A non-empty array: its first object is the suggestion.
/// - An object with a `showtime_id`: the object is the suggestion.
/// - An object with a `message`: that message replaces the text.
///
/// A suggestion replaces the text with a confirmation naming the movie,
/// start time and cinema.
pub fn parse_reply(reply: &str, time_zone: &DisplayTimeZone) -> ParsedReply {
    let Some(fragment) = FRAGMENT.find(reply) else {
        return ParsedReply {
            text: reply.to_owned(),
            booking: None,
        };
    };
    let parsed = match serde_json::from_str::<Value>(fragment.as_str()) {
        Ok(parsed) => parsed,
        Err(err) => {
            trace!("reply fragment is not JSON: {err}");
            return ParsedReply {
                text: reply.to_owned(),
                booking: None,
            };
        }
    };

    let surrounding = format!(
        "{}{}",
        &reply[..fragment.start()],
        &reply[fragment.end()..]
    );
    let surrounding = surrounding.trim();
    let mut text = if surrounding.is_empty() {
        reply.to_owned()
    } else {
        surrounding.to_owned()
    };

    let candidate = match parsed {
        Value::Array(items) => match items.into_iter().next() {
            Some(Value::Object(first)) => Some(first),
            _ => None,
        },
        Value::Object(object)
            if object.get("showtime_id").is_some_and(is_truthy) =>
        {
            Some(object)
        }
        Value::Object(object) => {
            if let Some(Value::String(message)) = object.get("message") {
                if !message.is_empty() {
                    text = message.clone();
                }
            }
            None
        }
        _ => None,
    };

    let Some(candidate) = candidate else {
        return ParsedReply {
            text,
            booking: None,
        };
    };
    debug!("reply suggests a showtime: {:?}", candidate.get("showtime_id"));
    let booking = BookingPayload::from(candidate);
    ParsedReply {
        text: confirmation_text(&booking, time_zone),
        booking: Some(booking),
    }
}

fn confirmation_text(
    booking: &BookingPayload,
    time_zone: &DisplayTimeZone,
) -> String {
    let title = booking.title().unwrap_or(MOVIE_FALLBACK);
    let cinema = booking.cinema_name().unwrap_or(CINEMA_FALLBACK);
    let clock = booking
        .start_time()
        .and_then(|raw| time_zone.parse(raw))
        .map(|t| time_zone.format_clock(t.with_timezone(&Utc)))
        .unwrap_or_else(|| CLOCK_FALLBACK.to_owned());
    format!(
        "OK! You picked **{title}** at **{clock}** in **{cinema}**.\n\n\
         Press the button below to continue to seat selection."
    )
}

#[cfg(test)]
mod tests {
    use chrono::FixedOffset;
    use serde_json::json;

    use super::*;

    fn utc() -> DisplayTimeZone {
        DisplayTimeZone::Fixed(FixedOffset::east_opt(0).unwrap())
    }

    #[test]
    fn test_plain_reply() {
        let parsed = parse_reply("We have 3 showtimes today.", &utc());
        assert_eq!(parsed.text, "We have 3 showtimes today.");
        assert_eq!(parsed.booking, None);
    }

    #[test]
    fn test_showtime_array() {
        let reply = r#"OK [{"showtime_id":42,"title":"X","start_time":"2024-01-01T20:00:00Z","cinema_name":"Y"}]"#;
        let parsed = parse_reply(reply, &utc());
        assert_eq!(
            parsed.text,
            "OK! You picked **X** at **20:00** in **Y**.\n\n\
             Press the button below to continue to seat selection."
        );
        let booking = parsed.booking.unwrap();
        assert_eq!(booking.showtime_id(), Some(&json!(42)));
        assert_eq!(booking.title(), Some("X"));
    }

    #[test]
    fn test_showtime_object() {
        let reply = "Here you go:\n{\"showtime_id\": \"s-1\", \"movie_id\": 7}\nEnjoy!";
        let parsed = parse_reply(reply, &utc());
        assert!(parsed.text.contains("**the movie**"));
        assert!(parsed.text.contains("**--:--**"));
        assert!(parsed.text.contains("**the cinema**"));
        assert_eq!(parsed.booking.unwrap().movie_id(), Some(&json!(7)));
    }

    #[test]
    fn test_unparsable_fragment() {
        let parsed = parse_reply("Hello [not json", &utc());
        assert_eq!(parsed.text, "Hello [not json");
        assert_eq!(parsed.booking, None);

        let parsed = parse_reply("Rows [A-F] are free", &utc());
        assert_eq!(parsed.text, "Rows [A-F] are free");
        assert_eq!(parsed.booking, None);
    }

    #[test]
    fn test_message_override() {
        let parsed = parse_reply(
            r#"{"message": "No showtimes left for tonight."}"#,
            &utc(),
        );
        assert_eq!(parsed.text, "No showtimes left for tonight.");
        assert_eq!(parsed.booking, None);
    }

    #[test]
    fn test_fragment_without_suggestion() {
        // The fragment is dropped from the prose.
        let parsed = parse_reply("Nothing matched. []", &utc());
        assert_eq!(parsed.text, "Nothing matched.");
        assert_eq!(parsed.booking, None);

        // With no prose around it, the raw reply stays.
        let parsed = parse_reply("[1, 2]", &utc());
        assert_eq!(parsed.text, "[1, 2]");
        assert_eq!(parsed.booking, None);

        // A falsy showtime id is not a suggestion.
        let parsed = parse_reply(r#"See {"showtime_id": 0}"#, &utc());
        assert_eq!(parsed.text, "See");
        assert_eq!(parsed.booking, None);
    }
}
