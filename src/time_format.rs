use crate::error::AppError;

/// Converts a 24-hour `HH:MM` time of day into a 12-hour `H:MM AM/PM` string.
///
/// An empty input yields an empty string. Only the hour is parsed; the minute
/// text is carried over as-is, without re-padding. Fields after the second `:`
/// are ignored.
///
/// # Errors
/// * `AppError::MalformedTime` if the hour is not an integer in `0..=23`, or
///   if the minute field is missing or empty
pub fn to_12_hour(time: &str) -> Result<String, AppError> {
    if time.is_empty() {
        return Ok(String::new());
    }

    let mut fields = time.split(':');
    let hour = fields
        .next()
        .and_then(|h| h.trim().parse::<u8>().ok())
        .filter(|h| *h < 24)
        .ok_or_else(|| AppError::MalformedTime(time.to_string()))?;
    let minutes = fields
        .next()
        .filter(|m| !m.is_empty())
        .ok_or_else(|| AppError::MalformedTime(time.to_string()))?;

    let suffix = if hour < 12 { "AM" } else { "PM" };
    let display_hour = match hour % 12 {
        0 => 12,
        h => h,
    };

    Ok(format!("{}:{} {}", display_hour, minutes, suffix))
}
