pub mod json_backend;

use uuid::Uuid;

use crate::{domain::employee::Employee, errors::StorageError};

pub type Result<T> = std::result::Result<T, StorageError>;

/// Persistence collaborator storing whole employee aggregates.
///
/// `save` must reject a document whose `version` no longer matches the stored
/// one with [`StorageError::Conflict`], and bump the version on success.
pub trait EmployeeStore: Send + Sync {
    fn load(&self, id: Uuid) -> Result<Employee>;
    fn save(&self, employee: &mut Employee) -> Result<()>;
    fn list(&self) -> Result<Vec<Uuid>>;
    fn delete(&self, id: Uuid) -> Result<()>;
}

pub use json_backend::JsonStorage;
