//! Engine services and the persistence-facing employee manager.

pub mod context;
pub mod employee_manager;
pub mod services;
pub mod time;

pub use context::ServiceContext;
pub use employee_manager::EmployeeManager;
pub use time::{Clock, FixedClock, SystemClock};
