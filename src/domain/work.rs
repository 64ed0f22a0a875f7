use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Hours recorded through time capture for one charge code on one day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Work {
    pub date_worked: NaiveDate,
    #[serde(default)]
    pub charge_number: String,
    #[serde(default)]
    pub extension: String,
    pub hours: f64,
    /// Manual correction; not counted as normally worked hours.
    #[serde(default)]
    pub modified_time: bool,
}

impl Work {
    pub fn new(
        date_worked: NaiveDate,
        charge_number: impl Into<String>,
        extension: impl Into<String>,
        hours: f64,
    ) -> Self {
        Self {
            date_worked,
            charge_number: charge_number.into(),
            extension: extension.into(),
            hours,
            modified_time: false,
        }
    }

    pub fn modified(mut self) -> Self {
        self.modified_time = true;
        self
    }

    pub fn is_for(&self, charge_number: &str, extension: &str) -> bool {
        self.charge_number.eq_ignore_ascii_case(charge_number)
            && self.extension.eq_ignore_ascii_case(extension)
    }
}
