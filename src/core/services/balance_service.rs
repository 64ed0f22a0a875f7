use chrono::Datelike;
use tracing::debug;

use crate::config::LeavePolicy;
use crate::domain::{balance::AnnualLeave, employee::Employee};

use super::{ServiceError, ServiceResult};

/// Annual leave allotments and carryover.
pub struct BalanceService;

impl BalanceService {
    /// Opens the balance for `year` unless one exists.
    ///
    /// The allotment repeats the prior year's (or the policy default when
    /// there is none); carryover is whatever the prior year left unused after
    /// actual vacation. Returns whether a balance was created.
    pub fn create_leave_balance(employee: &mut Employee, policy: &LeavePolicy, year: i32) -> bool {
        if employee.balance(year).is_some() {
            return false;
        }
        let (annual, carryover) = match employee.balance(year - 1) {
            Some(prior) => {
                let used: f64 = employee
                    .leaves
                    .iter()
                    .filter(|lv| {
                        lv.is_actual()
                            && policy.is_vacation(&lv.code)
                            && lv.leave_date.year() == year - 1
                    })
                    .map(|lv| lv.hours)
                    .sum();
                (prior.annual, prior.annual + prior.carryover - used)
            }
            None => (policy.default_annual_leave, 0.0),
        };
        employee
            .balances
            .push(AnnualLeave::new(year, annual, carryover));
        employee.sort_balances();
        employee.touch();
        debug!(employee = %employee.id, year, annual, carryover, "leave balance created");
        true
    }

    /// Overwrites the balance for `year`, creating it when missing.
    pub fn update_annual_leave(
        employee: &mut Employee,
        year: i32,
        annual: f64,
        carryover: f64,
    ) -> ServiceResult<()> {
        if annual < 0.0 {
            return Err(ServiceError::Validation(format!(
                "Annual leave for {year} cannot be negative"
            )));
        }
        match employee.balances.iter_mut().find(|bal| bal.year == year) {
            Some(balance) => {
                balance.annual = annual;
                balance.carryover = carryover;
            }
            None => {
                employee
                    .balances
                    .push(AnnualLeave::new(year, annual, carryover));
                employee.sort_balances();
            }
        }
        employee.touch();
        Ok(())
    }
}
