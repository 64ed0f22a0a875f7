use chrono::NaiveDate;

use crate::config::LeavePolicy;
use crate::domain::{
    employee::Employee,
    labor::{is_work_code, LaborCode, Workcode},
    work::Work,
};

use super::WorkdayResolver;

/// Read-only queries over recorded work and forecast labor.
pub struct TimesheetService;

impl TimesheetService {
    /// Normally worked hours in `[start, end)`; modified time is excluded.
    pub fn worked_hours(employee: &Employee, start: NaiveDate, end: NaiveDate) -> f64 {
        Self::work_between(employee, start, end)
            .filter(|wk| !wk.modified_time)
            .map(|wk| wk.hours)
            .sum()
    }

    /// Hours charged to one labor code in `[start, end)`, modified time
    /// included.
    pub fn worked_hours_for_labor(
        employee: &Employee,
        charge_number: &str,
        extension: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> f64 {
        Self::work_between(employee, start, end)
            .filter(|wk| wk.is_for(charge_number, extension))
            .map(|wk| wk.hours)
            .sum()
    }

    /// True when modified time was recorded in the inclusive range.
    pub fn has_mod_time(employee: &Employee, start: NaiveDate, end: NaiveDate) -> bool {
        employee
            .work
            .iter()
            .any(|wk| wk.modified_time && wk.date_worked >= start && wk.date_worked <= end)
    }

    /// Modified hours recorded in the inclusive range.
    pub fn mod_time(employee: &Employee, start: NaiveDate, end: NaiveDate) -> f64 {
        employee
            .work
            .iter()
            .filter(|wk| wk.modified_time && wk.date_worked >= start && wk.date_worked <= end)
            .map(|wk| wk.hours)
            .sum()
    }

    /// Hours still expected to be charged to `labor` in `[start, end)`.
    ///
    /// Only days after the last recorded work or actual leave count, and only
    /// when the resolved code is a catalog work code and the covering
    /// assignment carries the labor code.
    pub fn forecast_hours(
        employee: &Employee,
        policy: &LeavePolicy,
        labor: &LaborCode,
        start: NaiveDate,
        end: NaiveDate,
        workcodes: &[Workcode],
    ) -> f64 {
        let assigned = employee
            .assignments
            .iter()
            .any(|asgmt| asgmt.has_labor_code(&labor.charge_number, &labor.extension));
        if !assigned || labor.end_date < start || labor.start_date > end {
            return 0.0;
        }

        let last_actual_leave = employee
            .leaves
            .iter()
            .filter(|lv| lv.is_actual())
            .map(|lv| lv.leave_date)
            .max();
        let last_work = match last_actual_leave {
            Some(date) => employee.last_workday().max(date),
            None => employee.last_workday(),
        };

        let resolver = WorkdayResolver::new(employee, policy);
        let mut total = 0.0;
        for day in start.iter_days().take_while(|day| *day < end) {
            if day <= last_work || !labor.is_active(day) {
                continue;
            }
            let Some(next) = day.succ_opt() else {
                break;
            };
            if Self::worked_hours(employee, day, next) > 0.0 {
                continue;
            }
            let Some(workday) = resolver.resolve(day, last_work) else {
                continue;
            };
            if !workday.is_scheduled() || !is_work_code(workcodes, &workday.code) {
                continue;
            }
            let charged = employee.assignments.iter().any(|asgmt| {
                asgmt.covers(day) && asgmt.has_labor_code(&labor.charge_number, &labor.extension)
            });
            if charged {
                total += resolver.standard_workday(day);
            }
        }
        total
    }

    fn work_between(
        employee: &Employee,
        start: NaiveDate,
        end: NaiveDate,
    ) -> impl Iterator<Item = &Work> {
        employee
            .work
            .iter()
            .filter(move |wk| wk.date_worked >= start && wk.date_worked < end)
    }
}
