//! Human readable positions for placement results

/// Format a position in seconds for display
///
/// With a frame rate the result is `HH:MM:SS:FF`, otherwise
/// `HH:MM:SS.mmm`. Negative and non-finite input renders as zero.
pub fn format_position(seconds: f64, frame_rate: Option<f64>) -> String {
    let seconds = if seconds.is_finite() { seconds.max(0.0) } else { 0.0 };
    let whole = seconds.floor() as u64;
    let hours = whole / 3600;
    let minutes = (whole % 3600) / 60;
    let secs = whole % 60;
    let fraction = seconds - whole as f64;

    match frame_rate.filter(|fps| fps.is_finite() && *fps > 0.0) {
        Some(fps) => {
            let max_frame = fps.ceil() as u64 - 1;
            let frame = ((fraction * fps).floor() as u64).min(max_frame);
            format!("{:02}:{:02}:{:02}:{:02}", hours, minutes, secs, frame)
        }
        None => {
            let millis = ((fraction * 1000.0).round() as u64).min(999);
            format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, secs, millis)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(0.0, None, "00:00:00.000" ; "zero")]
    #[test_case(61.25, None, "00:01:01.250" ; "millis")]
    #[test_case(3723.5, Some(25.0), "01:02:03:12" ; "pal frames")]
    #[test_case(10.999, Some(29.97), "00:00:10:29" ; "fractional rate clamps frame")]
    #[test_case(-4.0, Some(30.0), "00:00:00:00" ; "negative")]
    fn test_format_position(seconds: f64, fps: Option<f64>, expected: &str) {
        assert_eq!(format_position(seconds, fps), expected);
    }
}
