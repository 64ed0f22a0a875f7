use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::config::LeavePolicy;
use crate::domain::{
    assignment::{Assignment, EmployeeLaborCode},
    common::{epoch, week_end, week_start, DateRange},
    employee::Employee,
    schedule::Workday,
};

/// Computes the effective workday of an employee for any date from
/// assignments, variations, recorded work and the leave ledger.
///
/// Resolution never mutates the employee and is deterministic for a given
/// aggregate and policy.
#[derive(Debug, Clone, Copy)]
pub struct WorkdayResolver<'a> {
    employee: &'a Employee,
    policy: &'a LeavePolicy,
}

impl<'a> WorkdayResolver<'a> {
    pub fn new(employee: &'a Employee, policy: &'a LeavePolicy) -> Self {
        Self { employee, policy }
    }

    /// Effective workday for `date`.
    ///
    /// `last_known_worked` bounds the lookback used when work was recorded on
    /// a day the schedule leaves empty; pass [`epoch`] when nothing is known.
    pub fn resolve(&self, date: NaiveDate, last_known_worked: NaiveDate) -> Option<Workday> {
        let nominal = self.scheduled(date);
        let worked = self.worked_hours_on(date);
        if worked > 0.0 {
            if nominal.as_ref().is_some_and(Workday::is_scheduled) {
                return nominal;
            }
            return self.look_back(date, last_known_worked);
        }

        let threshold = self.assignment_standard(date) / 2.0;
        let replacement = self
            .employee
            .leaves
            .iter()
            .rev()
            .find(|lv| lv.leave_date == date && (lv.hours > threshold || lv.is_actual()));
        match replacement {
            Some(lv) => Some(Workday::new(lv.code.clone(), "", lv.hours)),
            None => nominal,
        }
    }

    /// Assignment and variation lookup only; recorded work and leave are
    /// ignored.
    pub fn resolve_without_leave(&self, date: NaiveDate) -> Option<Workday> {
        self.scheduled(date)
    }

    /// Scheduled workday overlaid with actual leave taken on `date`.
    ///
    /// Leave is only folded in when `labor` is empty or the covering
    /// assignment carries one of the given labor codes. Additional actual
    /// entries add their hours; a larger entry takes over the code.
    pub fn resolve_actual(
        &self,
        date: NaiveDate,
        labor: &[EmployeeLaborCode],
    ) -> Option<Workday> {
        let mut workday = self.scheduled(date);
        let primary = labor.is_empty()
            || self.covering_assignment(date).is_some_and(|asgmt| {
                labor
                    .iter()
                    .any(|lc| asgmt.has_labor_code(&lc.charge_number, &lc.extension))
            });
        if !primary {
            return workday;
        }

        let mut replaced = false;
        for lv in self
            .employee
            .leaves
            .iter()
            .filter(|lv| lv.leave_date == date && lv.is_actual())
        {
            if let Some(day) = workday.as_mut().filter(|_| replaced) {
                if lv.hours > day.hours {
                    day.code = lv.code.clone();
                }
                day.hours += lv.hours;
            } else {
                workday = Some(Workday::new(lv.code.clone(), "", lv.hours));
                replaced = true;
            }
        }
        workday
    }

    /// Standard shift length for the week containing `date`.
    ///
    /// Weeks resolving to fewer than the policy's minimum number of scheduled
    /// days are treated as compressed.
    pub fn standard_workday(&self, date: NaiveDate) -> f64 {
        let standard = self.assignment_standard(date);
        let week = DateRange::new(week_start(date), week_end(date));
        let scheduled = week
            .days()
            .filter(|day| {
                self.resolve(*day, epoch())
                    .is_some_and(|wd| wd.is_scheduled())
            })
            .count();
        if scheduled < self.policy.min_weekly_workdays {
            standard.max(self.policy.compressed_hours)
        } else {
            standard
        }
    }

    /// Most frequent `(workcenter, code)` pair scheduled in `[start, end)`.
    ///
    /// Ties resolve to the lexically smallest pair.
    pub fn primary_assignment(&self, start: NaiveDate, end: NaiveDate) -> Option<(String, String)> {
        let mut counts: BTreeMap<(String, String), usize> = BTreeMap::new();
        for day in start.iter_days().take_while(|day| *day < end) {
            if let Some(wd) = self.scheduled(day).filter(Workday::is_scheduled) {
                *counts.entry((wd.workcenter, wd.code)).or_default() += 1;
            }
        }
        let best = counts.values().copied().max()?;
        counts
            .into_iter()
            .find(|(_, count)| *count == best)
            .map(|(pair, _)| pair)
    }

    /// Shift length implied by the covering assignment's schedule.
    pub fn assignment_standard(&self, date: NaiveDate) -> f64 {
        match self.covering_assignment(date) {
            Some(asgmt)
                if asgmt.schedule.scheduled_days_per_week() < self.policy.min_weekly_workdays =>
            {
                self.policy.compressed_hours
            }
            _ => self.policy.standard_hours,
        }
    }

    fn covering_assignment(&self, date: NaiveDate) -> Option<&'a Assignment> {
        self.employee
            .assignments
            .iter()
            .rev()
            .find(|asgmt| asgmt.covers(date))
    }

    /// Assignment lookup followed by variation override.
    fn scheduled(&self, date: NaiveDate) -> Option<Workday> {
        let mut workday = self
            .covering_assignment(date)
            .and_then(|asgmt| asgmt.workday(date));
        for vari in self.employee.variations.iter().filter(|v| v.covers(date)) {
            workday = vari.workday(date);
        }
        workday
    }

    fn worked_hours_on(&self, date: NaiveDate) -> f64 {
        self.employee
            .work
            .iter()
            .filter(|wk| wk.date_worked == date && !wk.modified_time)
            .map(|wk| wk.hours)
            .sum()
    }

    /// Walks backward from `date` to the nearest scheduled day, stopping at
    /// the horizon or the start of the earliest assignment.
    fn look_back(&self, date: NaiveDate, horizon: NaiveDate) -> Option<Workday> {
        let floor = self
            .employee
            .assignments
            .iter()
            .map(|asgmt| asgmt.start_date)
            .min()?;
        let mut cursor = date.pred_opt()?;
        while cursor > horizon && cursor >= floor {
            if let Some(day) = self.scheduled(cursor).filter(Workday::is_scheduled) {
                return Some(day);
            }
            cursor = cursor.pred_opt()?;
        }
        None
    }
}
