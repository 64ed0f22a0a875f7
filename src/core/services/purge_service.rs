use chrono::{Datelike, NaiveDate};
use tracing::info;

use crate::domain::employee::Employee;

/// Retention pass over an employee's dated history.
pub struct PurgeService;

impl PurgeService {
    /// Drops variations, leave entries and requests ending before `date`,
    /// and balances for earlier years. Assignments and recorded work are
    /// kept.
    ///
    /// Returns whether the employee's last assignment ended before `date`.
    pub fn purge_before(employee: &mut Employee, date: NaiveDate) -> bool {
        employee.variations.retain(|vari| vari.end_date >= date);
        employee.leaves.retain(|lv| lv.leave_date >= date);
        employee.requests.retain(|req| req.end_date >= date);
        employee.balances.retain(|bal| bal.year >= date.year());
        employee.renumber_leaves();
        employee.touch();

        employee.sort_assignments();
        let departed = employee
            .assignments
            .last()
            .is_some_and(|asgmt| asgmt.end_date < date);
        info!(employee = %employee.id, %date, departed, "purged history");
        departed
    }
}
