use tracing::warn;

use crate::{state::FetchState, time_format::to_12_hour, timings::PrayerTimings};

pub const HEADING: &str = "Prayer Timings:";
pub const LOADING_TEXT: &str = "Loading...";
pub const NO_DATA_TEXT: &str = "No data fetched or incomplete data received";

/// How many events to list for a successful fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Listing {
    /// The eight events of the timings screen
    #[default]
    Displayed,
    /// Adds Imsak, Firstthird and Lastthird
    All,
}

/// Renders a fetch state as plain text, one event per line.
pub fn render(state: &FetchState, listing: Listing) -> String {
    match state {
        FetchState::Loading => LOADING_TEXT.to_string(),
        FetchState::Success(timings) => render_timings(timings, listing),
        FetchState::MissingTimings => NO_DATA_TEXT.to_string(),
        FetchState::Failure(reason) => format!("{}\n{}", NO_DATA_TEXT, reason),
    }
}

fn render_timings(timings: &PrayerTimings, listing: Listing) -> String {
    let events: Vec<(&str, &str)> = match listing {
        Listing::Displayed => timings.displayed().to_vec(),
        Listing::All => timings.all().to_vec(),
    };

    let mut out = String::from(HEADING);
    for (name, time) in events {
        let shown = match to_12_hour(time) {
            Ok(formatted) => formatted,
            Err(e) => {
                // keep the raw upstream value visible
                warn!("{}: {}", name, e);
                time.to_string()
            }
        };
        out.push_str(&format!("\n{}: {}", name, shown));
    }
    out
}
