use chrono::{DateTime, NaiveDateTime, Utc};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalyticsError {
    #[error("Invalid window: end {end} is not after start {start}")]
    InvalidWindow {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("Delivered order {order_id} has no delivery timestamp")]
    MissingTimestamp { order_id: String },

    #[error("Year {0} is outside the supported calendar range")]
    YearOutOfRange(i32),

    #[error("Local time {0} does not exist in the analytics timezone")]
    NonexistentLocalTime(NaiveDateTime),
}
