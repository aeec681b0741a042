use crate::{error::AppError, timings::PrayerTimings};

/// What a consumer sees for one activation.
///
/// `Loading` is left exactly once, for one of the three terminal states.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FetchState {
    #[default]
    Loading,
    Success(PrayerTimings),
    /// The request succeeded but the body had no usable `data.timings`
    MissingTimings,
    Failure(String),
}

impl FetchState {
    /// Applies a fetch outcome. Terminal states ignore further outcomes.
    pub fn transition(self, outcome: Result<Option<PrayerTimings>, AppError>) -> FetchState {
        match self {
            FetchState::Loading => match outcome {
                Ok(Some(timings)) => FetchState::Success(timings),
                Ok(None) => FetchState::MissingTimings,
                Err(e) => FetchState::Failure(e.to_string()),
            },
            terminal => terminal,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, FetchState::Loading)
    }
}
