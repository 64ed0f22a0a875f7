#![allow(dead_code)]

use std::sync::{
    atomic::{AtomicU32, Ordering},
    Arc, Mutex,
};

use chrono::{NaiveDate, TimeZone, Utc};
use once_cell::sync::Lazy;
use tempfile::TempDir;
use uuid::Uuid;
use workforce_core::{
    config::{ConfigManager, EngineConfig},
    core::{EmployeeManager, FixedClock, ServiceContext},
    domain::{Assignment, Employee, EmployeeName, Workcode},
    errors::StorageError,
    storage::{EmployeeStore, JsonStorage},
};

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub fn fixed_context() -> ServiceContext {
    let now = Utc
        .with_ymd_and_hms(2024, 3, 1, 9, 30, 0)
        .single()
        .expect("valid timestamp");
    ServiceContext::default().with_clock(Arc::new(FixedClock(now)))
}

pub fn catalog() -> Vec<Workcode> {
    vec![Workcode::new("D", false), Workcode::new("V", true)]
}

/// Employee with one open Monday-Friday day shift starting 2024-01-01.
pub fn sample_employee() -> Employee {
    let mut employee = Employee::new(EmployeeName::new("Grace", "Hopper"), "DGS");
    employee
        .assignments
        .push(Assignment::new(1, "DGS", "OPS", date(2024, 1, 1), "D", 8.0));
    employee
}

/// Creates an isolated manager backed by a unique directory for each test.
pub fn setup_test_env() -> (EmployeeManager, ConfigManager, JsonStorage) {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);

    let storage = JsonStorage::new(base.join("employees")).expect("create json storage backend");
    let config_manager =
        ConfigManager::with_base_dir(base).expect("create config manager for temp dir");
    let config = EngineConfig::default();
    let manager = EmployeeManager::new(
        Box::new(storage.clone()),
        fixed_context(),
        config.max_retries,
    );
    (manager, config_manager, storage)
}

/// Store wrapper that lets another writer win the first `conflicts` saves.
pub struct ContendedStore {
    inner: JsonStorage,
    remaining: AtomicU32,
    pub attempts: Arc<AtomicU32>,
}

impl ContendedStore {
    pub fn new(inner: JsonStorage, conflicts: u32) -> Self {
        Self {
            inner,
            remaining: AtomicU32::new(conflicts),
            attempts: Arc::new(AtomicU32::new(0)),
        }
    }
}

impl EmployeeStore for ContendedStore {
    fn load(&self, id: Uuid) -> Result<Employee, StorageError> {
        self.inner.load(id)
    }

    fn save(&self, employee: &mut Employee) -> Result<(), StorageError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let pending = self.remaining.load(Ordering::SeqCst);
        if pending > 0 {
            self.remaining.store(pending - 1, Ordering::SeqCst);
            // a concurrent writer bumps the stored version first
            let mut other = self.inner.load(employee.id)?;
            self.inner.save(&mut other)?;
        }
        self.inner.save(employee)
    }

    fn list(&self) -> Result<Vec<Uuid>, StorageError> {
        self.inner.list()
    }

    fn delete(&self, id: Uuid) -> Result<(), StorageError> {
        self.inner.delete(id)
    }
}
