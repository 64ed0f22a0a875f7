use serde::{Deserialize, Serialize};

/// Leave bank for one calendar year.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnnualLeave {
    pub year: i32,
    pub annual: f64,
    #[serde(default)]
    pub carryover: f64,
}

impl AnnualLeave {
    pub fn new(year: i32, annual: f64, carryover: f64) -> Self {
        Self {
            year,
            annual,
            carryover,
        }
    }

    /// Hours available for the year before any leave is taken.
    pub fn available(&self) -> f64 {
        self.annual + self.carryover
    }
}
