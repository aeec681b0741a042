use serde::{Deserialize, Serialize};

/// Response envelope for the AlAdhan `timingsByAddress` endpoint
/// Only `data.timings` is consumed; `data` and `timings` may be absent
#[derive(Deserialize, Debug)]
pub struct ApiResponse {
    /// Mirrors the HTTP status (e.g. 200)
    pub code: Option<i64>,
    /// Textual status (e.g. "OK")
    pub status: Option<String>,
    pub data: Option<TimingsData>,
}

#[derive(Deserialize, Debug)]
pub struct TimingsData {
    pub timings: Option<PrayerTimings>,
}

impl ApiResponse {
    /// The one place where the optional envelope is unwrapped.
    pub fn into_timings(self) -> Option<PrayerTimings> {
        self.data.and_then(|data| data.timings)
    }
}

/// Named prayer and solar events for one day, each as a 24-hour `HH:MM` string.
/// Field names are fixed by the upstream API. An absent event is left empty.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "PascalCase", default)]
pub struct PrayerTimings {
    pub fajr: String,
    pub sunrise: String,
    pub dhuhr: String,
    pub asr: String,
    pub sunset: String,
    pub maghrib: String,
    pub isha: String,
    pub imsak: String,
    pub midnight: String,
    /// Not returned by older API revisions
    pub firstthird: String,
    pub lastthird: String,
}

impl PrayerTimings {
    /// The eight events shown on the timings screen, in display order.
    pub fn displayed(&self) -> [(&'static str, &str); 8] {
        [
            ("Fajr", self.fajr.as_str()),
            ("Dhuhr", self.dhuhr.as_str()),
            ("Asr", self.asr.as_str()),
            ("Maghrib", self.maghrib.as_str()),
            ("Isha", self.isha.as_str()),
            ("Sunrise", self.sunrise.as_str()),
            ("Sunset", self.sunset.as_str()),
            ("Midnight", self.midnight.as_str()),
        ]
    }

    /// Every event the API returns, displayed ones first.
    pub fn all(&self) -> [(&'static str, &str); 11] {
        let [a, b, c, d, e, f, g, h] = self.displayed();
        [
            a,
            b,
            c,
            d,
            e,
            f,
            g,
            h,
            ("Imsak", self.imsak.as_str()),
            ("Firstthird", self.firstthird.as_str()),
            ("Lastthird", self.lastthird.as_str()),
        ]
    }
}
