use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use super::AnalyticsError;

pub(crate) const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// Half-open time range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Window {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl Window {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, AnalyticsError> {
        if end <= start {
            return Err(AnalyticsError::InvalidWindow { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && at < self.end
    }

    /// Number of started days in the window, never less than one.
    pub fn day_count(&self) -> usize {
        let span = (self.end - self.start).num_milliseconds();
        ((span + DAY_MS - 1) / DAY_MS) as usize
    }

    /// Whole days elapsed between the window start and `at`.
    pub(crate) fn day_offset(&self, at: DateTime<Utc>) -> i64 {
        (at - self.start).num_milliseconds().div_euclid(DAY_MS)
    }
}

/// The `hours` leading up to `now`.
pub fn trailing_hours(now: DateTime<Utc>, hours: i64) -> Result<Window, AnalyticsError> {
    Window::new(now - Duration::hours(hours), now)
}

/// The `days` leading up to `now`.
pub fn trailing_days(now: DateTime<Utc>, days: i64) -> Result<Window, AnalyticsError> {
    Window::new(now - Duration::days(days), now)
}

/// Sunday 00:00 through the following Sunday 00:00 of the local week that
/// contains `now`. Days after `now` are part of the window.
pub fn current_week(now: DateTime<Utc>, tz: Tz) -> Result<Window, AnalyticsError> {
    let today = now.with_timezone(&tz).date_naive();
    let sunday = today - Duration::days(i64::from(today.weekday().num_days_from_sunday()));

    Window::new(
        local_midnight(sunday, tz)?,
        local_midnight(sunday + Duration::days(7), tz)?,
    )
}

/// Jan 1 00:00 of `year` through Jan 1 00:00 of the next year, local time.
pub fn year_window(year: i32, tz: Tz) -> Result<Window, AnalyticsError> {
    let first = NaiveDate::from_ymd_opt(year, 1, 1);
    let next = year.checked_add(1).and_then(|y| NaiveDate::from_ymd_opt(y, 1, 1));

    match (first, next) {
        (Some(first), Some(next)) => Window::new(local_midnight(first, tz)?, local_midnight(next, tz)?),
        _ => Err(AnalyticsError::YearOutOfRange(year)),
    }
}

/// Granularity used to find the end of a daylight-saving gap.
const GAP_STEP_MINUTES: i64 = 15;

/// Start of `date` in `tz`. When local midnight falls in a daylight-saving
/// gap the day starts at the first local time that exists after it.
fn local_midnight(date: NaiveDate, tz: Tz) -> Result<DateTime<Utc>, AnalyticsError> {
    let midnight = date.and_time(chrono::NaiveTime::MIN);

    (0..24 * 60 / GAP_STEP_MINUTES)
        .map(|step| midnight + Duration::minutes(step * GAP_STEP_MINUTES))
        .find_map(|local| tz.from_local_datetime(&local).earliest())
        .map(|local| local.with_timezone(&Utc))
        .ok_or(AnalyticsError::NonexistentLocalTime(midnight))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(y: i32, m: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, mi, 0).unwrap()
    }

    #[test]
    fn rejects_empty_and_inverted_windows() {
        let at = utc(2024, 1, 1, 0, 0);
        assert!(matches!(
            Window::new(at, at),
            Err(AnalyticsError::InvalidWindow { .. })
        ));
        assert!(Window::new(at, at - Duration::seconds(1)).is_err());
    }

    #[test]
    fn window_is_half_open() {
        let window = Window::new(utc(2024, 1, 1, 0, 0), utc(2024, 1, 2, 0, 0)).unwrap();
        assert!(window.contains(window.start()));
        assert!(!window.contains(window.end()));
        assert!(!window.contains(window.start() - Duration::milliseconds(1)));
    }

    #[test]
    fn day_count_rounds_partial_days_up() {
        let start = utc(2024, 3, 1, 0, 0);
        assert_eq!(Window::new(start, start + Duration::days(30)).unwrap().day_count(), 30);
        assert_eq!(Window::new(start, start + Duration::hours(12)).unwrap().day_count(), 1);
        assert_eq!(
            Window::new(start, start + Duration::days(30) + Duration::hours(1))
                .unwrap()
                .day_count(),
            31
        );
    }

    #[test]
    fn current_week_runs_sunday_to_sunday() {
        // Wednesday
        let now = utc(2024, 1, 3, 12, 0);
        let week = current_week(now, Tz::UTC).unwrap();
        assert_eq!(week.start(), utc(2023, 12, 31, 0, 0));
        assert_eq!(week.end(), utc(2024, 1, 7, 0, 0));
    }

    #[test]
    fn current_week_on_sunday_starts_today() {
        let now = utc(2024, 1, 7, 0, 0);
        let week = current_week(now, Tz::UTC).unwrap();
        assert_eq!(week.start(), now);
    }

    #[test]
    fn current_week_follows_local_calendar() {
        // 2024-01-07 02:00 UTC is still Saturday evening in New York.
        let now = utc(2024, 1, 7, 2, 0);
        let week = current_week(now, chrono_tz::America::New_York).unwrap();
        assert_eq!(week.start(), utc(2023, 12, 31, 5, 0));
        assert_eq!(week.end(), utc(2024, 1, 7, 5, 0));
    }

    #[test]
    fn year_window_uses_local_new_year() {
        let window = year_window(2024, chrono_tz::Asia::Tokyo).unwrap();
        assert_eq!(window.start(), utc(2023, 12, 31, 15, 0));
        assert_eq!(window.end(), utc(2024, 12, 31, 15, 0));

        let window = year_window(2024, Tz::UTC).unwrap();
        assert_eq!(window.start(), utc(2024, 1, 1, 0, 0));
        assert_eq!(window.end(), utc(2025, 1, 1, 0, 0));
    }

    #[test]
    fn year_window_rejects_years_chrono_cannot_represent() {
        assert_eq!(year_window(i32::MAX, Tz::UTC), Err(AnalyticsError::YearOutOfRange(i32::MAX)));
        assert_eq!(year_window(i32::MIN, Tz::UTC), Err(AnalyticsError::YearOutOfRange(i32::MIN)));
        assert_eq!(year_window(300_000, Tz::UTC), Err(AnalyticsError::YearOutOfRange(300_000)));
    }

    #[test]
    fn week_starting_in_a_midnight_gap_begins_after_the_gap() {
        // Santiago skips 2024-09-08 00:00..01:00 (-04 to -03).
        let week = current_week(utc(2024, 9, 10, 15, 0), chrono_tz::America::Santiago).unwrap();
        assert_eq!(week.start(), utc(2024, 9, 8, 4, 0));
        assert_eq!(week.end(), utc(2024, 9, 15, 3, 0));

        // Havana skips 2024-03-10 00:00..01:00 (-05 to -04).
        let week = current_week(utc(2024, 3, 12, 15, 0), chrono_tz::America::Havana).unwrap();
        assert_eq!(week.start(), utc(2024, 3, 10, 5, 0));
        assert_eq!(week.end(), utc(2024, 3, 17, 4, 0));
    }

    #[test]
    fn trailing_windows_end_now() {
        let now = utc(2024, 5, 10, 8, 30);
        let day = trailing_hours(now, 24).unwrap();
        assert_eq!(day.start(), utc(2024, 5, 9, 8, 30));
        assert_eq!(day.end(), now);

        let month = trailing_days(now, 30).unwrap();
        assert_eq!(month.day_count(), 30);
        assert!(trailing_days(now, 0).is_err());
    }
}
