//! Calendar bucketing of delivered orders for dashboard charts.
//!
//! Every operation builds a fresh, zero-filled bucket array sized by its
//! granularity and fills it from the orders it is handed. Calendar fields
//! (hour, weekday, month) are read in the timezone the aggregator was built
//! with; day offsets inside a trailing window are elapsed time from the window
//! start and do not depend on it.

mod error;
mod window;

use chrono::{DateTime, Datelike, Timelike, Utc};
use chrono_tz::Tz;
use serde::Serialize;

pub use error::AnalyticsError;
pub use window::{current_week, trailing_days, trailing_hours, year_window, Window};

pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

pub const WEEKDAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// What the aggregator needs to know about an order.
pub trait DeliveredOrder {
    fn order_id(&self) -> &str;
    fn delivered_at(&self) -> Option<DateTime<Utc>>;
    fn total_cents(&self) -> i64;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    HourOfDay,
    DayOfWeek,
    /// One bucket per elapsed day of a window that is `days` long.
    DayOfMonth { days: usize },
    MonthOfYear,
}

impl Granularity {
    pub fn len(&self) -> usize {
        match self {
            Granularity::HourOfDay => 24,
            Granularity::DayOfWeek => 7,
            Granularity::DayOfMonth { days } => *days,
            Granularity::MonthOfYear => 12,
        }
    }

    pub fn label(&self, index: usize) -> String {
        match self {
            Granularity::HourOfDay => index.to_string(),
            Granularity::DayOfWeek => WEEKDAY_NAMES[index].to_string(),
            Granularity::DayOfMonth { .. } => (index + 1).to_string(),
            Granularity::MonthOfYear => MONTH_NAMES[index].to_string(),
        }
    }

    fn empty_buckets(&self) -> Vec<Bucket> {
        (0..self.len())
            .map(|index| Bucket {
                label: self.label(index),
                index,
                count: 0,
                revenue_cents: 0,
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bucket {
    pub label: String,
    pub index: usize,
    pub count: u64,
    pub revenue_cents: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BucketSeries {
    pub buckets: Vec<Bucket>,
    /// Orders handed in whose delivery fell outside the window.
    pub out_of_window: usize,
}

impl BucketSeries {
    pub fn total_count(&self) -> u64 {
        self.buckets.iter().map(|b| b.count).sum()
    }

    pub fn total_revenue_cents(&self) -> i64 {
        self.buckets.iter().map(|b| b.revenue_cents).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthComparison {
    pub month: String,
    pub current_year: i64,
    pub previous_year: i64,
}

/// Position of `at` in the bucket array for `granularity`.
///
/// `at` is expected to lie inside `window`; day offsets are clamped to the
/// array bounds regardless.
pub fn bucket_index(at: DateTime<Utc>, granularity: Granularity, window: &Window, tz: Tz) -> usize {
    let local = at.with_timezone(&tz);
    match granularity {
        Granularity::HourOfDay => local.hour() as usize,
        Granularity::DayOfWeek => local.weekday().num_days_from_sunday() as usize,
        Granularity::DayOfMonth { days } => {
            let last = days.saturating_sub(1) as i64;
            window.day_offset(at).clamp(0, last) as usize
        }
        Granularity::MonthOfYear => local.month0() as usize,
    }
}

#[derive(Debug, Clone, Copy)]
pub struct OrderAnalytics {
    tz: Tz,
}

impl OrderAnalytics {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    pub fn bucket_by_hour_of_day<O: DeliveredOrder>(
        &self,
        orders: &[O],
        window: Window,
    ) -> Result<BucketSeries, AnalyticsError> {
        self.aggregate(orders, window, Granularity::HourOfDay)
    }

    pub fn bucket_by_day_of_month<O: DeliveredOrder>(
        &self,
        orders: &[O],
        window: Window,
    ) -> Result<BucketSeries, AnalyticsError> {
        let days = window.day_count();
        self.aggregate(orders, window, Granularity::DayOfMonth { days })
    }

    pub fn bucket_by_day_of_week<O: DeliveredOrder>(
        &self,
        orders: &[O],
        window: Window,
    ) -> Result<BucketSeries, AnalyticsError> {
        self.aggregate(orders, window, Granularity::DayOfWeek)
    }

    pub fn bucket_by_month_for_year<O: DeliveredOrder>(
        &self,
        orders: &[O],
        year: i32,
    ) -> Result<BucketSeries, AnalyticsError> {
        let window = year_window(year, self.tz)?;
        self.aggregate(orders, window, Granularity::MonthOfYear)
    }

    /// Monthly revenue of `current_year` next to `previous_year`.
    pub fn year_over_year_revenue<A: DeliveredOrder, B: DeliveredOrder>(
        &self,
        current: &[A],
        previous: &[B],
        current_year: i32,
        previous_year: i32,
    ) -> Result<Vec<MonthComparison>, AnalyticsError> {
        let current = self.bucket_by_month_for_year(current, current_year)?;
        let previous = self.bucket_by_month_for_year(previous, previous_year)?;

        Ok(current
            .buckets
            .into_iter()
            .zip(previous.buckets)
            .map(|(cur, prev)| MonthComparison {
                month: cur.label,
                current_year: cur.revenue_cents,
                previous_year: prev.revenue_cents,
            })
            .collect())
    }

    fn aggregate<O: DeliveredOrder>(
        &self,
        orders: &[O],
        window: Window,
        granularity: Granularity,
    ) -> Result<BucketSeries, AnalyticsError> {
        let mut buckets = granularity.empty_buckets();
        let mut out_of_window = 0;

        for order in orders {
            let delivered_at = order
                .delivered_at()
                .ok_or_else(|| AnalyticsError::MissingTimestamp {
                    order_id: order.order_id().to_string(),
                })?;

            if !window.contains(delivered_at) {
                out_of_window += 1;
                continue;
            }

            let bucket = &mut buckets[bucket_index(delivered_at, granularity, &window, self.tz)];
            bucket.count += 1;
            bucket.revenue_cents += order.total_cents();
        }

        if out_of_window > 0 {
            tracing::warn!(
                out_of_window,
                start = %window.start(),
                end = %window.end(),
                "Dropped orders delivered outside the aggregation window"
            );
        }

        Ok(BucketSeries {
            buckets,
            out_of_window,
        })
    }
}

impl Default for OrderAnalytics {
    fn default() -> Self {
        Self::new(Tz::UTC)
    }
}
