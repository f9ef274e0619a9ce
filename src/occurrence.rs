use crate::models::{Frequency, ReminderSettings};
use chrono::{Datelike, Duration, NaiveDateTime};

/// Computes the next concrete fire time for the reminder, strictly after
/// `now`. Pure: recovery relies on re-deriving the same answer for the same
/// `(settings, now)` pair to detect drift.
pub fn next_occurrence(settings: &ReminderSettings, now: NaiveDateTime) -> NaiveDateTime {
    let mut candidate = now.date().and_time(settings.time);
    if candidate <= now {
        candidate += Duration::days(1);
    }

    if settings.frequency == Frequency::Weekly && !settings.days_of_week.is_empty() {
        // Non-empty set guarantees a match within a week.
        for _ in 0..7 {
            if settings.days_of_week.contains(&weekday_index(candidate)) {
                break;
            }
            candidate += Duration::days(1);
        }
    }

    candidate
}

fn weekday_index(at: NaiveDateTime) -> u8 {
    at.weekday().num_days_from_sunday() as u8
}
