use serde::{Deserialize, Serialize};

/// One day's resolved work definition. An empty `code` means the day is not
/// scheduled.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Workday {
    pub id: u32,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub workcenter: String,
    #[serde(default)]
    pub hours: f64,
}

impl Workday {
    pub fn new(code: impl Into<String>, workcenter: impl Into<String>, hours: f64) -> Self {
        Self {
            id: 0,
            code: code.into(),
            workcenter: workcenter.into(),
            hours,
        }
    }

    pub fn is_scheduled(&self) -> bool {
        !self.code.is_empty()
    }
}

/// Ordered template of workdays indexed by position from the anchoring
/// Sunday.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Schedule {
    #[serde(default)]
    pub workdays: Vec<Workday>,
}

impl Schedule {
    /// Creates a schedule of `days` unscheduled workdays.
    pub fn blank(days: usize) -> Self {
        Self {
            workdays: (0..days)
                .map(|idx| Workday {
                    id: idx as u32,
                    ..Workday::default()
                })
                .collect(),
        }
    }

    /// Standard Monday through Friday week; Sunday and Saturday stay empty.
    pub fn weekdays(code: &str, workcenter: &str, hours: f64) -> Self {
        let mut schedule = Self::blank(7);
        for (idx, day) in schedule.workdays.iter_mut().enumerate() {
            if idx != 0 && idx != 6 {
                day.code = code.to_string();
                day.workcenter = workcenter.to_string();
                day.hours = hours;
            }
        }
        schedule
    }

    pub fn len(&self) -> usize {
        self.workdays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workdays.is_empty()
    }

    /// Looks up the workday at `offset` days past the anchor, wrapping around
    /// the schedule length.
    pub fn workday_at(&self, offset: i64) -> Option<&Workday> {
        if self.workdays.is_empty() {
            return None;
        }
        let idx = offset.rem_euclid(self.workdays.len() as i64) as usize;
        self.workdays.get(idx)
    }

    /// Writes a workday at `index`, growing the schedule with blank days when
    /// needed.
    pub fn set_workday(&mut self, index: usize, code: &str, workcenter: &str, hours: f64) {
        if index >= self.workdays.len() {
            self.resize(index + 1);
        }
        let day = &mut self.workdays[index];
        day.code = code.to_string();
        day.workcenter = workcenter.to_string();
        day.hours = if code.is_empty() { 0.0 } else { hours };
    }

    /// Grows or truncates the schedule, keeping ids equal to positions.
    pub fn resize(&mut self, days: usize) {
        let current = self.workdays.len();
        if days < current {
            self.workdays.truncate(days);
        } else {
            self.workdays.extend((current..days).map(|idx| Workday {
                id: idx as u32,
                ..Workday::default()
            }));
        }
    }

    /// Average number of scheduled days per seven-day block.
    pub fn scheduled_days_per_week(&self) -> usize {
        if self.workdays.is_empty() {
            return 0;
        }
        let scheduled = self.workdays.iter().filter(|day| day.is_scheduled()).count();
        let weeks = self.workdays.len().div_ceil(7);
        scheduled / weeks.max(1)
    }
}
