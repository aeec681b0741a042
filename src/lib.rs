//! Daily prayer timings for a geocoded address, fetched from the AlAdhan API
//! and shown as 12-hour times.

pub mod config;
pub mod error;
pub mod fetcher;
pub mod render;
pub mod state;
pub mod time_format;
pub mod timings;

pub use config::{Config, Overrides};
pub use error::AppError;
pub use fetcher::TimingsFetcher;
pub use render::{Listing, render};
pub use state::FetchState;
pub use time_format::to_12_hour;
pub use timings::{PrayerTimings, TimingsClient};
