// Human readable durations for "power on/off for ..." labels

const MINUTES_PER_DAY: f64 = 1440.0;

/// Bucket the interval between two timestamps into a short label.
///
/// The hour bucket pluralises on the half-hour count, not the rendered value:
/// only a count of exactly 2 ("1 hr") is singular, so "1.5 hrs" and "2 hrs"
/// are plural. The day bucket pluralises each unit when it is above one, which
/// gives "1 day 0 hr" for exactly a day.
pub fn format_duration(start_ms: i64, end_ms: i64) -> String {
    let minutes = (end_ms - start_ms).max(0) as f64 / 60_000.0;

    if minutes < 5.0 {
        "< 5 mins".to_string()
    } else if minutes <= 15.0 {
        format!("{} mins", round_down(minutes, 5.0))
    } else if minutes < 60.0 {
        format!("{} mins", round_down(minutes, 15.0))
    } else if minutes < MINUTES_PER_DAY {
        let half_hours = (minutes / 30.0).floor() as i64;
        let hours = if half_hours % 2 == 1 {
            format!("{:.1}", half_hours as f64 / 2.0)
        } else {
            (half_hours / 2).to_string()
        };
        format!("{} hr{}", hours, if half_hours != 2 { "s" } else { "" })
    } else {
        let days = (minutes / MINUTES_PER_DAY).floor() as i64;
        let hours = ((minutes - days as f64 * MINUTES_PER_DAY) / 60.0).floor() as i64;
        format!(
            "{} day{} {} hr{}",
            days,
            if days > 1 { "s" } else { "" },
            hours,
            if hours > 1 { "s" } else { "" }
        )
    }
}

fn round_down(minutes: f64, step: f64) -> i64 {
    ((minutes / step).floor() * step) as i64
}
