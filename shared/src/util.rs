use chrono::NaiveDate;

/// Current UTC timestamp in milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// UTC calendar day containing the given millisecond timestamp
pub fn utc_day(millis: i64) -> NaiveDate {
    chrono::DateTime::from_timestamp_millis(millis)
        .unwrap_or_default()
        .date_naive()
}
