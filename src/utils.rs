use chrono::{DateTime, Local, TimeZone, Utc};

/// `M/D/YYYY` in the local zone, the way a US-locale browser prints dates.
pub fn format_creation_date(timestamp: i64) -> String {
    format_date_in(timestamp, &Local)
}

pub fn format_date_in<Tz: TimeZone>(timestamp: i64, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    match tz.timestamp_opt(timestamp, 0).single() {
        Some(date) => date.format("%-m/%-d/%Y").to_string(),
        None => "unknown date".to_string(),
    }
}

pub fn timestamp_to_elapsed(timestamp: i64) -> String {
    elapsed_since(timestamp, Utc::now())
}

pub fn elapsed_since(timestamp: i64, now: DateTime<Utc>) -> String {
    let Some(then) = Utc.timestamp_opt(timestamp, 0).single() else {
        return String::new();
    };
    let duration = now.signed_duration_since(then);

    let plural = |n: i64| if n == 1 { "" } else { "s" };
    if duration.num_seconds() < 60 {
        "just now".to_string()
    } else if duration.num_minutes() < 60 {
        format!("{} minute{} ago", duration.num_minutes(), plural(duration.num_minutes()))
    } else if duration.num_hours() < 24 {
        format!("{} hour{} ago", duration.num_hours(), plural(duration.num_hours()))
    } else if duration.num_days() < 30 {
        format!("{} day{} ago", duration.num_days(), plural(duration.num_days()))
    } else if duration.num_days() < 365 {
        let months = duration.num_days() / 30;
        format!("{} month{} ago", months, plural(months))
    } else {
        let years = duration.num_days() / 365;
        format!("{} year{} ago", years, plural(years))
    }
}
