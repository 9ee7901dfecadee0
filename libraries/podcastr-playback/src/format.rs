//! Time display helpers

/// Format whole seconds as `MM:SS`
///
/// Minutes are zero-padded to two digits and grow past 99 instead of
/// wrapping into hours.
pub fn format_duration(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_zero() {
        assert_eq!(format_duration(0), "00:00");
    }

    #[test]
    fn pads_minutes_and_seconds() {
        assert_eq!(format_duration(65), "01:05");
        assert_eq!(format_duration(59), "00:59");
        assert_eq!(format_duration(600), "10:00");
    }

    #[test]
    fn long_episodes_keep_counting_minutes() {
        assert_eq!(format_duration(3981), "66:21");
        assert_eq!(format_duration(6000), "100:00");
    }
}
