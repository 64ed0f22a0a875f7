use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::common::{day_of_week, week_start, DateRange, Displayable};
use crate::domain::schedule::{Schedule, Workday};

/// Date-ranged override of the assignment schedule.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Variation {
    pub id: u32,
    pub site: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub is_mids: bool,
    /// Created by approving a schedule-modification leave request.
    #[serde(default)]
    pub is_mod: bool,
    #[serde(default)]
    pub schedule: Schedule,
}

/// Days in the blank schedule of a new variation. Longer templates are
/// opt-in through `VariationEdit::ResizeSchedule`.
pub const BLANK_SCHEDULE_DAYS: usize = 7;

impl Variation {
    pub fn new(id: u32, site: impl Into<String>, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            id,
            site: site.into(),
            start_date,
            end_date,
            is_mids: false,
            is_mod: false,
            schedule: Schedule::blank(BLANK_SCHEDULE_DAYS),
        }
    }

    pub fn range(&self) -> DateRange {
        DateRange::new(self.start_date, self.end_date)
    }

    pub fn covers(&self, date: NaiveDate) -> bool {
        self.range().contains(date)
    }

    pub fn matches_mod(&self, range: DateRange) -> bool {
        self.is_mod && self.start_date == range.start && self.end_date == range.end
    }

    /// Offset of `date` from the Sunday that anchors this variation's
    /// schedule.
    pub fn offset_of(&self, date: NaiveDate) -> i64 {
        (date - week_start(self.start_date)).num_days()
    }

    /// Schedule slot holding `date`.
    ///
    /// Modification variations key their slots on the weekday of `date`
    /// shifted by the weekday of `start_date`; other variations count days
    /// from the Sunday of the start week. Both wrap on the schedule length.
    pub fn slot_of(&self, date: NaiveDate) -> Option<usize> {
        let len = self.schedule.len();
        if len == 0 {
            return None;
        }
        let slot = if self.is_mod {
            (day_of_week(date) + day_of_week(self.start_date)) % len
        } else {
            self.offset_of(date).rem_euclid(len as i64) as usize
        };
        Some(slot)
    }

    /// Scheduled workday for `date`; `None` outside the variation.
    pub fn workday(&self, date: NaiveDate) -> Option<Workday> {
        if !self.covers(date) {
            return None;
        }
        let slot = self.slot_of(date)?;
        self.schedule.workdays.get(slot).cloned()
    }
}

impl Displayable for Variation {
    fn display_label(&self) -> String {
        let kind = if self.is_mod {
            "mod"
        } else if self.is_mids {
            "mids"
        } else {
            "variation"
        };
        format!("{} {} {} - {}", kind, self.site, self.start_date, self.end_date)
    }
}

/// Closed set of edits accepted by a variation.
#[derive(Debug, Clone, PartialEq)]
pub enum VariationEdit {
    SetSite(String),
    SetDates { start: NaiveDate, end: NaiveDate },
    SetMids(bool),
    ResizeSchedule(usize),
    SetWorkday {
        index: usize,
        code: String,
        workcenter: String,
        hours: f64,
    },
}
