use chrono::{DateTime, Utc};

/// Long US-style date, e.g. "January 5, 2024".
#[must_use]
pub fn format_long_date(value: DateTime<Utc>) -> String {
    value.format("%B %-d, %Y").to_string()
}
