use chrono::NaiveDate;
use uuid::Uuid;

use crate::config::LeavePolicy;
use crate::domain::{
    common::DateRange,
    employee::Employee,
    leave::{LeaveDay, LeaveEdit, LeaveStatus},
    request::LeaveRequest,
};

use super::{ServiceError, ServiceResult};

/// Maintains the authoritative leave ledger of an employee.
pub struct LeaveService;

impl LeaveService {
    /// Inserts a ledger entry, or updates the entry with the same id or the
    /// same date and code. Returns the id of the written entry.
    pub fn add(
        employee: &mut Employee,
        id: Option<u32>,
        date: NaiveDate,
        code: &str,
        status: LeaveStatus,
        hours: f64,
        request_id: Option<Uuid>,
    ) -> u32 {
        let existing = employee.leaves.iter_mut().find(|lv| {
            (lv.leave_date == date && lv.code.eq_ignore_ascii_case(code)) || Some(lv.id) == id
        });
        let written = match existing {
            Some(lv) => {
                lv.leave_date = date;
                lv.code = code.to_string();
                lv.status = status;
                lv.hours = hours;
                lv.request_id = request_id;
                lv.id
            }
            None => {
                let next = employee.next_leave_id();
                let mut leave = LeaveDay::new(next, date, code, hours, status);
                leave.request_id = request_id;
                employee.leaves.push(leave);
                next
            }
        };
        employee.sort_leaves();
        employee.touch();
        written
    }

    /// Applies `edit` to entry `id` and returns the entry as it was before.
    pub fn update(employee: &mut Employee, id: u32, edit: LeaveEdit) -> ServiceResult<LeaveDay> {
        let leave = employee
            .leaves
            .iter_mut()
            .find(|lv| lv.id == id)
            .ok_or_else(|| ServiceError::NotFound(format!("Leave {id}")))?;
        let previous = leave.clone();
        edit.apply(leave);
        employee.sort_leaves();
        employee.touch();
        Ok(previous)
    }

    /// Removes entry `id`. Actual leave can only be changed through
    /// [`LeaveService::update`].
    pub fn delete(employee: &mut Employee, id: u32) -> ServiceResult<LeaveDay> {
        let pos = employee
            .leaves
            .iter()
            .position(|lv| lv.id == id)
            .ok_or_else(|| ServiceError::NotFound(format!("Leave {id}")))?;
        if employee.leaves[pos].is_actual() {
            return Err(ServiceError::StateConflict(format!(
                "Leave {id} is actual and cannot be deleted"
            )));
        }
        let removed = employee.leaves.remove(pos);
        employee.renumber_leaves();
        employee.touch();
        Ok(removed)
    }

    /// Removes every non-actual entry dated inside `range`.
    pub fn delete_between(employee: &mut Employee, range: DateRange) -> usize {
        let removed = Self::remove_where(employee, |lv| range.contains(lv.leave_date));
        if removed > 0 {
            employee.touch();
        }
        removed
    }

    /// Actual leave hours dated in `[start, end)`.
    pub fn leave_hours(employee: &Employee, start: NaiveDate, end: NaiveDate) -> f64 {
        employee
            .leaves
            .iter()
            .filter(|lv| lv.is_actual() && lv.leave_date >= start && lv.leave_date < end)
            .map(|lv| lv.hours)
            .sum()
    }

    /// Actual vacation hours dated in `[start, end)`.
    pub fn pto_hours(
        employee: &Employee,
        policy: &LeavePolicy,
        start: NaiveDate,
        end: NaiveDate,
    ) -> f64 {
        employee
            .leaves
            .iter()
            .filter(|lv| {
                lv.is_actual()
                    && policy.is_vacation(&lv.code)
                    && lv.leave_date >= start
                    && lv.leave_date < end
            })
            .map(|lv| lv.hours)
            .sum()
    }

    /// Drops the non-actual entries owned by `request_id`.
    pub(crate) fn remove_for_request(employee: &mut Employee, request_id: Uuid) -> usize {
        Self::remove_where(employee, |lv| lv.belongs_to(request_id))
    }

    /// Drops the non-actual entries owned by the request or dated inside its
    /// range.
    pub(crate) fn clear_for_request(employee: &mut Employee, request: &LeaveRequest) -> usize {
        let range = request.range();
        Self::remove_where(employee, |lv| {
            lv.belongs_to(request.id) || range.contains(lv.leave_date)
        })
    }

    /// Copies the request's positive-hour days into the ledger as approved
    /// entries owned by the request.
    pub(crate) fn merge_approved(employee: &mut Employee, request: &LeaveRequest) -> usize {
        let mut next = employee.next_leave_id();
        let mut merged = 0;
        for day in request.requested_days.iter().filter(|day| day.hours > 0.0) {
            let leave = LeaveDay::new(
                next,
                day.leave_date,
                day.code.clone(),
                day.hours,
                LeaveStatus::Approved,
            )
            .for_request(request.id);
            employee.leaves.push(leave);
            next += 1;
            merged += 1;
        }
        employee.sort_leaves();
        merged
    }

    /// Mirrors a single edited day of an approved request into the ledger.
    /// An empty code or zero hours clears the day.
    pub(crate) fn sync_approved_day(
        employee: &mut Employee,
        request_id: Uuid,
        date: NaiveDate,
        code: &str,
        hours: f64,
    ) {
        if code.is_empty() || hours <= 0.0 {
            Self::remove_where(employee, |lv| lv.leave_date == date);
            return;
        }
        let mut found = false;
        for lv in employee
            .leaves
            .iter_mut()
            .filter(|lv| lv.leave_date == date && !lv.is_actual())
        {
            lv.code = code.to_string();
            lv.hours = hours;
            lv.status = LeaveStatus::Approved;
            lv.request_id = Some(request_id);
            found = true;
        }
        if !found {
            let next = employee.next_leave_id();
            employee.leaves.push(
                LeaveDay::new(next, date, code, hours, LeaveStatus::Approved)
                    .for_request(request_id),
            );
            employee.sort_leaves();
        }
    }

    /// Removes matching non-actual entries and renumbers the ledger when
    /// anything was dropped.
    fn remove_where(employee: &mut Employee, predicate: impl Fn(&LeaveDay) -> bool) -> usize {
        let before = employee.leaves.len();
        employee
            .leaves
            .retain(|lv| lv.is_actual() || !predicate(lv));
        let removed = before - employee.leaves.len();
        if removed > 0 {
            employee.renumber_leaves();
        }
        removed
    }
}
