use chrono::NaiveDate;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::core::context::ServiceContext;
use crate::core::services::{
    AssignmentService, BalanceService, RequestChange, RequestService, ServiceError, ServiceResult,
    WorkdayResolver,
};
use crate::domain::{
    common::Displayable,
    employee::{Employee, CURRENT_SCHEMA_VERSION},
    labor::Workcode,
    request::{LeaveRequest, LeaveRequestEdit},
    schedule::Workday,
};
use crate::errors::StorageError;
use crate::storage::{EmployeeStore, JsonStorage};

/// Facade that runs engine operations against persisted employees.
///
/// Every mutation loads the aggregate, applies the operation to a working
/// copy and saves it with an optimistic version check. Conflicting saves are
/// retried from a fresh load up to `max_retries` times; failed operations
/// never reach the store.
pub struct EmployeeManager {
    storage: Box<dyn EmployeeStore>,
    context: ServiceContext,
    max_retries: u32,
}

impl EmployeeManager {
    pub fn new(storage: Box<dyn EmployeeStore>, context: ServiceContext, max_retries: u32) -> Self {
        Self {
            storage,
            context,
            max_retries,
        }
    }

    pub fn from_config(config: &EngineConfig) -> ServiceResult<Self> {
        let storage = JsonStorage::from_config(config)?;
        Ok(Self::new(
            Box::new(storage),
            ServiceContext::from_config(config),
            config.max_retries,
        ))
    }

    pub fn storage(&self) -> &dyn EmployeeStore {
        self.storage.as_ref()
    }

    pub fn context(&self) -> &ServiceContext {
        &self.context
    }

    /// Stores a new employee and returns it with its persisted version.
    pub fn register(&self, mut employee: Employee) -> ServiceResult<Employee> {
        self.storage.save(&mut employee)?;
        debug!(employee = %employee.id, name = %employee.display_label(), "employee registered");
        Ok(employee)
    }

    pub fn load(&self, id: Uuid) -> ServiceResult<Employee> {
        let employee = self.storage.load(id)?;
        Self::ensure_schema_support(&employee)?;
        Ok(employee)
    }

    pub fn list(&self) -> ServiceResult<Vec<Uuid>> {
        Ok(self.storage.list()?)
    }

    pub fn remove(&self, id: Uuid) -> ServiceResult<()> {
        Ok(self.storage.delete(id)?)
    }

    /// Applies `op` to employee `id` and persists the result.
    pub fn update<T, F>(&self, id: Uuid, mut op: F) -> ServiceResult<T>
    where
        F: FnMut(&mut Employee, &ServiceContext) -> ServiceResult<T>,
    {
        let mut attempt = 0;
        loop {
            let mut working = self.load(id)?;
            let outcome = op(&mut working, &self.context)?;
            match self.storage.save(&mut working) {
                Ok(()) => return Ok(outcome),
                Err(StorageError::Conflict {
                    expected, found, ..
                }) if attempt < self.max_retries => {
                    attempt += 1;
                    warn!(
                        employee = %id,
                        attempt,
                        expected,
                        found,
                        "version conflict, retrying"
                    );
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    pub fn resolve_workday(
        &self,
        id: Uuid,
        date: NaiveDate,
        last_known_worked: NaiveDate,
    ) -> ServiceResult<Option<Workday>> {
        let employee = self.load(id)?;
        Ok(WorkdayResolver::new(&employee, &self.context.policy).resolve(date, last_known_worked))
    }

    pub fn create_leave_request(
        &self,
        id: Uuid,
        code: &str,
        start: NaiveDate,
        end: NaiveDate,
        utc_offset: f64,
        comment: &str,
    ) -> ServiceResult<LeaveRequest> {
        self.update(id, |employee, ctx| {
            RequestService::create(employee, ctx, code, start, end, utc_offset, comment)
        })
    }

    pub fn edit_leave_request(
        &self,
        id: Uuid,
        request_id: Uuid,
        edit: LeaveRequestEdit,
    ) -> ServiceResult<RequestChange> {
        self.update(id, |employee, ctx| {
            RequestService::edit(employee, ctx, request_id, edit.clone())
        })
    }

    pub fn submit_leave_request(&self, id: Uuid, request_id: Uuid) -> ServiceResult<RequestChange> {
        self.update(id, |employee, _| RequestService::submit(employee, request_id))
    }

    pub fn approve_leave_request(
        &self,
        id: Uuid,
        request_id: Uuid,
        approver: &str,
        catalog: &[Workcode],
    ) -> ServiceResult<RequestChange> {
        self.update(id, |employee, ctx| {
            RequestService::approve(employee, ctx, request_id, approver, catalog)
        })
    }

    pub fn unapprove_leave_request(
        &self,
        id: Uuid,
        request_id: Uuid,
        comment: &str,
    ) -> ServiceResult<RequestChange> {
        self.update(id, |employee, ctx| {
            RequestService::unapprove(employee, ctx, request_id, comment)
        })
    }

    pub fn delete_leave_request(&self, id: Uuid, request_id: Uuid) -> ServiceResult<String> {
        self.update(id, |employee, ctx| {
            RequestService::delete(employee, ctx, request_id)
        })
    }

    pub fn add_assignment(
        &self,
        id: Uuid,
        site: &str,
        workcenter: &str,
        start: NaiveDate,
    ) -> ServiceResult<u32> {
        self.update(id, |employee, ctx| {
            AssignmentService::add(employee, &ctx.policy, site, workcenter, start)
        })
    }

    pub fn remove_assignment(&self, id: Uuid, assignment_id: u32) -> ServiceResult<()> {
        self.update(id, |employee, _| {
            AssignmentService::remove(employee, assignment_id).map(|_| ())
        })
    }

    pub fn create_leave_balance(&self, id: Uuid, year: i32) -> ServiceResult<bool> {
        self.update(id, |employee, ctx| {
            Ok(BalanceService::create_leave_balance(employee, &ctx.policy, year))
        })
    }

    fn ensure_schema_support(employee: &Employee) -> ServiceResult<()> {
        if employee.schema_version > CURRENT_SCHEMA_VERSION {
            return Err(ServiceError::StateConflict(format!(
                "employee schema v{} is newer than supported v{}",
                employee.schema_version, CURRENT_SCHEMA_VERSION
            )));
        }
        Ok(())
    }
}
