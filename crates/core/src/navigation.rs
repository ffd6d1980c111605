//! Hand-off from a suggested showtime to the host's seat selection screen.

mod error;

use serde::Serialize;
use serde_json::Value;

pub use error::{Error, ErrorKind};

use crate::message::BookingPayload;

/// Screening format used when the showtime lists no features.
pub const DEFAULT_FORMAT: &str = "2D";

/// The movie part of [`NavigationState`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MovieRef {
    /// The movie identifier.
    pub movie_id: Value,
    /// The title, if the backend sent one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<Value>,
}

/// The showtime part of [`NavigationState`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ShowtimeRef {
    /// The showtime identifier.
    pub showtime_id: Value,
    /// The cinema name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cinema_name: Option<Value>,
    /// The start time as sent by the backend.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<Value>,
    /// The ticket price.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket_price: Option<Value>,
}

/// Route state handed to the seat selection screen.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NavigationState {
    /// The selected movie.
    pub movie: MovieRef,
    /// The selected showtime.
    pub showtime: ShowtimeRef,
    /// Screening format, e.g. `2D` or `IMAX`.
    pub format: String,
}

/// A complete navigation request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BookingNavigation {
    /// The route path, `/movie-detail/{movie_id}/seat-selection`.
    pub route: String,
    /// State attached to the route.
    pub state: NavigationState,
}

impl BookingNavigation {
    /// Builds the navigation request for a suggested showtime.
    ///
    /// Fails when the movie or showtime identifier is missing, since the
    /// seat selection screen cannot be reached without both.
    pub fn from_payload(payload: &BookingPayload) -> Result<Self, Error> {
        let (Some(movie_id), Some(showtime_id)) =
            (payload.movie_id(), payload.showtime_id())
        else {
            return Err(Error::new(ErrorKind::MissingIdentifiers).with_reason(
                format!(
                    "movie_id: {:?}, showtime_id: {:?}",
                    payload.get("movie_id"),
                    payload.get("showtime_id")
                ),
            ));
        };

        let route = format!("/movie-detail/{}/seat-selection", segment(movie_id));
        let state = NavigationState {
            movie: MovieRef {
                movie_id: movie_id.clone(),
                title: payload.get("title").cloned(),
            },
            showtime: ShowtimeRef {
                showtime_id: showtime_id.clone(),
                cinema_name: payload.get("cinema_name").cloned(),
                start_time: payload.get("start_time").cloned(),
                ticket_price: payload.ticket_price().cloned(),
            },
            format: payload
                .primary_feature()
                .unwrap_or(DEFAULT_FORMAT)
                .to_owned(),
        };
        Ok(Self { route, state })
    }
}

fn segment(id: &Value) -> String {
    match id {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// The host's router.
///
/// Implementations usually forward to whatever navigation mechanism the
/// host application has. The call happens on the widget's event loop, so
/// it should return quickly.
pub trait Navigator: Send + Sync + 'static {
    /// Navigates to `route` with `state` attached.
    fn navigate(&self, route: &str, state: &NavigationState);
}

impl<F> Navigator for F
where
    F: Fn(&str, &NavigationState) + Send + Sync + 'static,
{
    #[inline]
    fn navigate(&self, route: &str, state: &NavigationState) {
        self(route, state)
    }
}
