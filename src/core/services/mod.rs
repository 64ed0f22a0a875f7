pub mod assignment_service;
pub mod balance_service;
pub mod leave_service;
pub mod purge_service;
pub mod request_service;
pub mod timesheet_service;
pub mod variation_service;
pub mod workday_resolver;

pub use assignment_service::AssignmentService;
pub use balance_service::BalanceService;
pub use leave_service::LeaveService;
pub use purge_service::PurgeService;
pub use request_service::{RequestChange, RequestService};
pub use timesheet_service::TimesheetService;
pub use variation_service::VariationService;
pub use workday_resolver::WorkdayResolver;

use crate::errors::StorageError;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    /// Malformed or out-of-order input.
    #[error("{0}")]
    Validation(String),
    #[error("{0} not found")]
    NotFound(String),
    /// Operation illegal in the record's current state.
    #[error("{0}")]
    StateConflict(String),
}

#[cfg(test)]
mod tests;
