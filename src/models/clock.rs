//! Clock-time helpers. All times in this crate are minutes from midnight.

/// Parses an `HH:MM` string into minutes from midnight.
///
/// Returns `None` for empty or malformed input, or out-of-range fields.
///
/// # Examples
///
/// ```
/// use u_lastmile::models::parse_clock_time;
///
/// assert_eq!(parse_clock_time("08:30"), Some(510));
/// assert_eq!(parse_clock_time("8:30"), Some(510));
/// assert_eq!(parse_clock_time("25:00"), None);
/// assert_eq!(parse_clock_time(""), None);
/// ```
pub fn parse_clock_time(text: &str) -> Option<u32> {
    let (hours, minutes) = text.trim().split_once(':')?;
    let hours: u32 = hours.parse().ok()?;
    let minutes: u32 = minutes.parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    Some(hours * 60 + minutes)
}

/// Formats minutes from midnight as `HH:MM`.
///
/// Fractional minutes are truncated.
pub fn format_clock_time(minutes: f64) -> String {
    let total = minutes.max(0.0) as u32;
    format!("{:02}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!(parse_clock_time("00:00"), Some(0));
        assert_eq!(parse_clock_time("20:00"), Some(1200));
        assert_eq!(parse_clock_time(" 09:15 "), Some(555));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert_eq!(parse_clock_time("0900"), None);
        assert_eq!(parse_clock_time("09:60"), None);
        assert_eq!(parse_clock_time("ab:cd"), None);
        assert_eq!(parse_clock_time("09:00:00"), None);
    }

    #[test]
    fn test_format() {
        assert_eq!(format_clock_time(510.0), "08:30");
        assert_eq!(format_clock_time(1380.9), "23:00");
    }
}
