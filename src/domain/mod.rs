//! Pure domain models for the employee timeline: schedules, assignments,
//! variations, recorded work, the leave ledger, leave requests and balances.

pub mod assignment;
pub mod balance;
pub mod common;
pub mod employee;
pub mod labor;
pub mod leave;
pub mod request;
pub mod schedule;
pub mod variation;
pub mod work;

pub use assignment::{Assignment, AssignmentEdit, EmployeeLaborCode};
pub use balance::AnnualLeave;
pub use common::{day_of_week, epoch, sentinel_end, week_end, week_start, DateRange, Displayable};
pub use employee::{cmp_by_first_name, cmp_by_last_name, Employee, EmployeeName};
pub use labor::{is_leave_code, is_work_code, LaborCode, Workcode};
pub use leave::{LeaveDay, LeaveEdit, LeaveStatus};
pub use request::{LeaveRequest, LeaveRequestEdit, RequestComment, RequestStatus, RequestedDay};
pub use schedule::{Schedule, Workday};
pub use variation::{Variation, VariationEdit};
pub use work::Work;
