use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Catalog entry describing a work or leave code.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Workcode {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub is_leave: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub alt_code: String,
}

impl Workcode {
    pub fn new(id: impl Into<String>, is_leave: bool) -> Self {
        Self {
            id: id.into(),
            title: String::new(),
            is_leave,
            alt_code: String::new(),
        }
    }

    pub fn matches(&self, code: &str) -> bool {
        self.id.eq_ignore_ascii_case(code)
    }
}

/// True when the catalog flags `code` as a leave code.
pub fn is_leave_code(catalog: &[Workcode], code: &str) -> bool {
    catalog.iter().any(|wc| wc.matches(code) && wc.is_leave)
}

/// True when the catalog knows `code` as a work (non-leave) code.
pub fn is_work_code(catalog: &[Workcode], code: &str) -> bool {
    catalog.iter().any(|wc| wc.matches(code) && !wc.is_leave)
}

/// Contract charge code with its period of performance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LaborCode {
    pub charge_number: String,
    pub extension: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl LaborCode {
    pub fn new(
        charge_number: impl Into<String>,
        extension: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        Self {
            charge_number: charge_number.into(),
            extension: extension.into(),
            start_date,
            end_date,
        }
    }

    pub fn is_active(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }
}
