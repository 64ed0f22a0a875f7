use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Supplies a presentation-ready label for notifications or logs.
pub trait Displayable {
    fn display_label(&self) -> String;
}

/// End date carried by the open (current) assignment.
pub fn sentinel_end() -> NaiveDate {
    NaiveDate::from_ymd_opt(9999, 12, 30).unwrap_or(NaiveDate::MAX)
}

/// Horizon used when a caller has no knowledge of previously worked days.
pub fn epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// Sunday on or before `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_sunday() as i64)
}

/// Saturday on or after `date`.
pub fn week_end(date: NaiveDate) -> NaiveDate {
    date + Duration::days((Weekday::Sat.num_days_from_sunday()
        - date.weekday().num_days_from_sunday()) as i64)
}

/// Position of `date` inside its Sunday-anchored week.
pub fn day_of_week(date: NaiveDate) -> usize {
    date.weekday().num_days_from_sunday() as usize
}

/// Inclusive calendar range used by every dated record in the engine.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Expands the range outward to whole Sunday–Saturday weeks.
    pub fn week_aligned(&self) -> Self {
        Self {
            start: week_start(self.start),
            end: week_end(self.end),
        }
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |day| *day <= end)
    }

    pub fn len_days(&self) -> usize {
        if self.end < self.start {
            0
        } else {
            (self.end - self.start).num_days() as usize + 1
        }
    }
}
