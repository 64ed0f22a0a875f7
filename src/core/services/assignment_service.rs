use chrono::NaiveDate;
use tracing::debug;

use crate::config::LeavePolicy;
use crate::domain::{
    assignment::{Assignment, AssignmentEdit, EmployeeLaborCode},
    common::Displayable,
    employee::Employee,
};

use super::{ServiceError, ServiceResult};

/// Keeps the assignment timeline contiguous while it is extended, shortened
/// and edited.
pub struct AssignmentService;

impl AssignmentService {
    /// Starts a new open-ended assignment on `start`, closing the current
    /// one the day before. Returns the new assignment id.
    pub fn add(
        employee: &mut Employee,
        policy: &LeavePolicy,
        site: &str,
        workcenter: &str,
        start: NaiveDate,
    ) -> ServiceResult<u32> {
        employee.sort_assignments();
        if let Some(last) = employee.assignments.last_mut() {
            if start <= last.start_date {
                return Err(ServiceError::Validation(format!(
                    "Assignment start {start} must follow the current assignment start {}",
                    last.start_date
                )));
            }
            last.end_date = start.pred_opt().ok_or_else(|| {
                ServiceError::Validation(format!("Assignment start {start} is out of range"))
            })?;
        }
        let id = employee.next_assignment_id();
        employee.assignments.push(Assignment::new(
            id,
            site,
            workcenter,
            start,
            &policy.default_workday_code,
            policy.standard_hours,
        ));
        employee.touch();
        debug!(employee = %employee.id, assignment = id, %start, "assignment added");
        Ok(id)
    }

    /// Removes assignment `id`; its predecessor absorbs the freed range.
    pub fn remove(employee: &mut Employee, id: u32) -> ServiceResult<Assignment> {
        employee.sort_assignments();
        let pos = employee
            .assignments
            .iter()
            .position(|asgmt| asgmt.id == id)
            .ok_or_else(|| ServiceError::NotFound(format!("Assignment {id}")))?;
        if id <= 1 || pos == 0 {
            return Err(ServiceError::StateConflict(
                "The first assignment cannot be removed".into(),
            ));
        }
        let removed = employee.assignments.remove(pos);
        employee.assignments[pos - 1].end_date = removed.end_date;
        employee.touch();
        debug!(
            employee = %employee.id,
            assignment = %removed.display_label(),
            "assignment removed"
        );
        Ok(removed)
    }

    pub fn edit(employee: &mut Employee, id: u32, edit: AssignmentEdit) -> ServiceResult<()> {
        employee.sort_assignments();
        let pos = employee
            .assignments
            .iter()
            .position(|asgmt| asgmt.id == id)
            .ok_or_else(|| ServiceError::NotFound(format!("Assignment {id}")))?;
        match edit {
            AssignmentEdit::SetStart(start) => Self::move_start(employee, pos, start)?,
            AssignmentEdit::SetSite(site) => employee.assignments[pos].site = site,
            AssignmentEdit::SetWorkcenter(workcenter) => {
                employee.assignments[pos].workcenter = workcenter
            }
            AssignmentEdit::SetRotation { date, days } => {
                let asgmt = &mut employee.assignments[pos];
                asgmt.rotation_date = date;
                asgmt.rotation_days = days;
            }
            AssignmentEdit::ResizeSchedule(days) => {
                if days == 0 {
                    return Err(ServiceError::Validation(
                        "Schedule must keep at least one day".into(),
                    ));
                }
                employee.assignments[pos].schedule.resize(days);
            }
            AssignmentEdit::SetWorkday {
                index,
                code,
                workcenter,
                hours,
            } => {
                let schedule = &mut employee.assignments[pos].schedule;
                if index >= schedule.len() {
                    return Err(ServiceError::Validation(format!(
                        "Workday {index} is outside a {} day schedule",
                        schedule.len()
                    )));
                }
                schedule.set_workday(index, &code, &workcenter, hours);
            }
            AssignmentEdit::AddLaborCode(labor) => {
                let asgmt = &mut employee.assignments[pos];
                if !asgmt.has_labor_code(&labor.charge_number, &labor.extension) {
                    asgmt.labor_codes.push(labor);
                }
            }
            AssignmentEdit::RemoveLaborCode(labor) => {
                let asgmt = &mut employee.assignments[pos];
                let before = asgmt.labor_codes.len();
                asgmt
                    .labor_codes
                    .retain(|lc| !lc.matches(&labor.charge_number, &labor.extension));
                if asgmt.labor_codes.len() == before {
                    return Err(ServiceError::NotFound(format!(
                        "Labor code {}-{}",
                        labor.charge_number, labor.extension
                    )));
                }
            }
        }
        employee.touch();
        Ok(())
    }

    /// True when the assignment covering `date` at the employee's site
    /// carries the labor code.
    pub fn is_primary_code(
        employee: &Employee,
        date: NaiveDate,
        charge_number: &str,
        extension: &str,
    ) -> bool {
        employee
            .assignments
            .iter()
            .filter(|asgmt| asgmt.applies_at(&employee.site_id, date))
            .any(|asgmt| asgmt.has_labor_code(charge_number, extension))
    }

    pub fn has_labor_code(employee: &Employee, charge_number: &str, extension: &str) -> bool {
        employee
            .assignments
            .iter()
            .any(|asgmt| asgmt.has_labor_code(charge_number, extension))
    }

    /// Strips the labor code from every assignment. Returns whether anything
    /// was removed.
    pub fn delete_labor_code(employee: &mut Employee, charge_number: &str, extension: &str) -> bool {
        let mut removed = false;
        for asgmt in employee.assignments.iter_mut() {
            let before = asgmt.labor_codes.len();
            asgmt
                .labor_codes
                .retain(|lc: &EmployeeLaborCode| !lc.matches(charge_number, extension));
            removed |= asgmt.labor_codes.len() != before;
        }
        if removed {
            employee.touch();
        }
        removed
    }

    /// Moves the start of the assignment at `pos`, keeping the predecessor
    /// ending the day before.
    fn move_start(employee: &mut Employee, pos: usize, start: NaiveDate) -> ServiceResult<()> {
        if start > employee.assignments[pos].end_date {
            return Err(ServiceError::Validation(format!(
                "Assignment start {start} is after its end {}",
                employee.assignments[pos].end_date
            )));
        }
        if pos > 0 {
            let previous = &employee.assignments[pos - 1];
            if start <= previous.start_date {
                return Err(ServiceError::Validation(format!(
                    "Assignment start {start} must follow the previous assignment start {}",
                    previous.start_date
                )));
            }
            let previous_end = start.pred_opt().ok_or_else(|| {
                ServiceError::Validation(format!("Assignment start {start} is out of range"))
            })?;
            employee.assignments[pos - 1].end_date = previous_end;
        }
        employee.assignments[pos].start_date = start;
        Ok(())
    }
}
