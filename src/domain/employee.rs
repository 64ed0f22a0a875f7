use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    assignment::Assignment,
    balance::AnnualLeave,
    common::{epoch, Displayable},
    leave::LeaveDay,
    request::LeaveRequest,
    variation::Variation,
    work::Work,
};

pub const CURRENT_SCHEMA_VERSION: u8 = 1;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct EmployeeName {
    pub first: String,
    #[serde(default)]
    pub middle: String,
    pub last: String,
    #[serde(default)]
    pub suffix: String,
}

impl EmployeeName {
    pub fn new(first: impl Into<String>, last: impl Into<String>) -> Self {
        Self {
            first: first.into(),
            last: last.into(),
            ..Self::default()
        }
    }

    pub fn last_first(&self) -> String {
        format!("{}, {}", self.last, self.first)
    }

    pub fn last_first_mi(&self) -> String {
        match self.middle.chars().next() {
            Some(initial) => format!("{}, {} {}", self.last, self.first, initial),
            None => self.last_first(),
        }
    }
}

/// Aggregate root owning every dated record of one employee.
///
/// The engine mutates one aggregate at a time; persistence is all or
/// nothing through [`crate::storage::EmployeeStore`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Employee {
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_id: Option<Uuid>,
    pub site_id: String,
    #[serde(default)]
    pub email: String,
    pub name: EmployeeName,
    #[serde(default)]
    pub assignments: Vec<Assignment>,
    #[serde(default)]
    pub variations: Vec<Variation>,
    #[serde(default)]
    pub balances: Vec<AnnualLeave>,
    #[serde(default)]
    pub leaves: Vec<LeaveDay>,
    #[serde(default)]
    pub requests: Vec<LeaveRequest>,
    #[serde(default)]
    pub work: Vec<Work>,
    /// Optimistic concurrency token, bumped by the store on every save.
    #[serde(default)]
    pub version: u64,
    pub updated_at: DateTime<Utc>,
    #[serde(default = "Employee::schema_version_default")]
    pub schema_version: u8,
}

impl Employee {
    pub fn new(name: EmployeeName, site_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            team_id: None,
            site_id: site_id.into(),
            email: String::new(),
            name,
            assignments: Vec::new(),
            variations: Vec::new(),
            balances: Vec::new(),
            leaves: Vec::new(),
            requests: Vec::new(),
            work: Vec::new(),
            version: 0,
            updated_at: Utc::now(),
            schema_version: CURRENT_SCHEMA_VERSION,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn schema_version_default() -> u8 {
        CURRENT_SCHEMA_VERSION
    }

    pub fn assignment(&self, id: u32) -> Option<&Assignment> {
        self.assignments.iter().find(|asgmt| asgmt.id == id)
    }

    pub fn variation(&self, id: u32) -> Option<&Variation> {
        self.variations.iter().find(|vari| vari.id == id)
    }

    pub fn variation_mut(&mut self, id: u32) -> Option<&mut Variation> {
        self.variations.iter_mut().find(|vari| vari.id == id)
    }

    pub fn leave(&self, id: u32) -> Option<&LeaveDay> {
        self.leaves.iter().find(|lv| lv.id == id)
    }

    pub fn request(&self, id: Uuid) -> Option<&LeaveRequest> {
        self.requests.iter().find(|req| req.id == id)
    }

    pub fn balance(&self, year: i32) -> Option<&AnnualLeave> {
        self.balances.iter().find(|bal| bal.year == year)
    }

    pub fn next_assignment_id(&self) -> u32 {
        self.assignments.iter().map(|a| a.id).max().unwrap_or(0) + 1
    }

    pub fn next_variation_id(&self) -> u32 {
        self.variations.iter().map(|v| v.id).max().unwrap_or(0) + 1
    }

    pub fn next_leave_id(&self) -> u32 {
        self.leaves.iter().map(|lv| lv.id).max().unwrap_or(0) + 1
    }

    pub fn sort_assignments(&mut self) {
        self.assignments
            .sort_by(|a, b| a.start_date.cmp(&b.start_date).then(a.id.cmp(&b.id)));
    }

    pub fn sort_variations(&mut self) {
        self.variations
            .sort_by(|a, b| a.start_date.cmp(&b.start_date).then(a.id.cmp(&b.id)));
    }

    pub fn sort_leaves(&mut self) {
        self.leaves
            .sort_by(|a, b| a.leave_date.cmp(&b.leave_date).then(a.id.cmp(&b.id)));
    }

    pub fn sort_requests(&mut self) {
        self.requests.sort_by(|a, b| {
            a.start_date
                .cmp(&b.start_date)
                .then(a.end_date.cmp(&b.end_date))
        });
    }

    pub fn sort_balances(&mut self) {
        self.balances.sort_by_key(|bal| bal.year);
    }

    /// Sorts the leave ledger by date and recompacts ids to `1..=N`.
    pub fn renumber_leaves(&mut self) {
        self.sort_leaves();
        for (idx, leave) in self.leaves.iter_mut().enumerate() {
            leave.id = idx as u32 + 1;
        }
    }

    /// Date of the most recent recorded work, or the epoch when none exists.
    pub fn last_workday(&self) -> NaiveDate {
        self.work
            .iter()
            .map(|wk| wk.date_worked)
            .max()
            .unwrap_or_else(epoch)
    }

    /// True when an assignment at the employee's site covers `date`.
    pub fn is_active(&self, date: NaiveDate) -> bool {
        self.assignments
            .iter()
            .any(|asgmt| asgmt.applies_at(&self.site_id, date))
    }
}

impl Displayable for Employee {
    fn display_label(&self) -> String {
        self.name.last_first()
    }
}

/// Orders employees by last, first, then middle name.
pub fn cmp_by_last_name(a: &Employee, b: &Employee) -> Ordering {
    a.name
        .last
        .cmp(&b.name.last)
        .then_with(|| a.name.first.cmp(&b.name.first))
        .then_with(|| a.name.middle.cmp(&b.name.middle))
}

/// Orders employees by first, last, then middle name.
pub fn cmp_by_first_name(a: &Employee, b: &Employee) -> Ordering {
    a.name
        .first
        .cmp(&b.name.first)
        .then_with(|| a.name.last.cmp(&b.name.last))
        .then_with(|| a.name.middle.cmp(&b.name.middle))
}
