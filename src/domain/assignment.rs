use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::common::{epoch, sentinel_end, week_start, DateRange, Displayable};
use crate::domain::schedule::{Schedule, Workday};

/// Charge number / extension pair an employee books time against.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EmployeeLaborCode {
    pub charge_number: String,
    pub extension: String,
}

impl EmployeeLaborCode {
    pub fn new(charge_number: impl Into<String>, extension: impl Into<String>) -> Self {
        Self {
            charge_number: charge_number.into(),
            extension: extension.into(),
        }
    }

    pub fn matches(&self, charge_number: &str, extension: &str) -> bool {
        self.charge_number.eq_ignore_ascii_case(charge_number)
            && self.extension.eq_ignore_ascii_case(extension)
    }
}

/// One tenure at a site/workcenter with its weekly schedule.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Assignment {
    pub id: u32,
    pub site: String,
    pub workcenter: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub rotation_date: NaiveDate,
    #[serde(default)]
    pub rotation_days: u32,
    #[serde(default)]
    pub labor_codes: Vec<EmployeeLaborCode>,
    #[serde(default)]
    pub schedule: Schedule,
}

impl Assignment {
    /// Creates an open-ended assignment with the default Monday–Friday day
    /// shift.
    pub fn new(
        id: u32,
        site: impl Into<String>,
        workcenter: impl Into<String>,
        start_date: NaiveDate,
        default_code: &str,
        default_hours: f64,
    ) -> Self {
        let workcenter = workcenter.into();
        let schedule = Schedule::weekdays(default_code, &workcenter, default_hours);
        Self {
            id,
            site: site.into(),
            workcenter,
            start_date,
            end_date: sentinel_end(),
            rotation_date: epoch(),
            rotation_days: 0,
            labor_codes: Vec::new(),
            schedule,
        }
    }

    pub fn range(&self) -> DateRange {
        DateRange::new(self.start_date, self.end_date)
    }

    pub fn covers(&self, date: NaiveDate) -> bool {
        self.range().contains(date)
    }

    pub fn is_open(&self) -> bool {
        self.end_date == sentinel_end()
    }

    /// True when this assignment is at `site` and covers `date`.
    pub fn applies_at(&self, site: &str, date: NaiveDate) -> bool {
        self.site.eq_ignore_ascii_case(site) && self.covers(date)
    }

    /// Schedule positions are counted from the Sunday of the rotation anchor
    /// when rotating, otherwise from the Sunday of the start week.
    fn anchor(&self) -> NaiveDate {
        if self.rotation_days > 0 {
            week_start(self.rotation_date)
        } else {
            week_start(self.start_date)
        }
    }

    /// Scheduled workday for `date`; `None` outside the tenure.
    pub fn workday(&self, date: NaiveDate) -> Option<Workday> {
        if !self.covers(date) {
            return None;
        }
        let offset = (date - self.anchor()).num_days();
        self.schedule.workday_at(offset).cloned()
    }

    pub fn has_labor_code(&self, charge_number: &str, extension: &str) -> bool {
        self.labor_codes
            .iter()
            .any(|code| code.matches(charge_number, extension))
    }
}

impl Displayable for Assignment {
    fn display_label(&self) -> String {
        format!(
            "{}/{} {} - {}",
            self.site, self.workcenter, self.start_date, self.end_date
        )
    }
}

/// Closed set of edits accepted by an assignment.
#[derive(Debug, Clone, PartialEq)]
pub enum AssignmentEdit {
    SetSite(String),
    SetWorkcenter(String),
    SetStart(NaiveDate),
    SetRotation { date: NaiveDate, days: u32 },
    ResizeSchedule(usize),
    SetWorkday {
        index: usize,
        code: String,
        workcenter: String,
        hours: f64,
    },
    AddLaborCode(EmployeeLaborCode),
    RemoveLaborCode(EmployeeLaborCode),
}
