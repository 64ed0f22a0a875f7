use serde::Deserialize;
use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};
use tracing::debug;
use uuid::Uuid;

use crate::{config::EngineConfig, domain::employee::Employee, errors::StorageError};

use super::{EmployeeStore, Result};

const DOCUMENT_EXTENSION: &str = "json";
const TMP_SUFFIX: &str = "tmp";

/// One pretty-printed JSON document per employee under a root directory.
#[derive(Clone)]
pub struct JsonStorage {
    root: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

#[derive(Deserialize)]
struct VersionProbe {
    #[serde(default)]
    version: u64,
}

impl JsonStorage {
    pub fn new(root: PathBuf) -> Result<Self> {
        fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        Self::new(config.resolve_data_root())
    }

    pub fn base_dir(&self) -> &Path {
        &self.root
    }

    pub fn employee_path(&self, id: Uuid) -> PathBuf {
        self.root.join(format!("{}.{}", id, DOCUMENT_EXTENSION))
    }

    fn stored_version(path: &Path) -> Result<Option<u64>> {
        if !path.exists() {
            return Ok(None);
        }
        let data = fs::read_to_string(path)?;
        let probe: VersionProbe = serde_json::from_str(&data)?;
        Ok(Some(probe.version))
    }
}

impl EmployeeStore for JsonStorage {
    fn load(&self, id: Uuid) -> Result<Employee> {
        let path = self.employee_path(id);
        if !path.exists() {
            return Err(StorageError::NotFound(id.to_string()));
        }
        load_employee_from_path(&path)
    }

    fn save(&self, employee: &mut Employee) -> Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| StorageError::Io(std::io::Error::other("storage lock poisoned")))?;
        let path = self.employee_path(employee.id);
        if let Some(found) = Self::stored_version(&path)? {
            if found != employee.version {
                return Err(StorageError::Conflict {
                    id: employee.id.to_string(),
                    expected: employee.version,
                    found,
                });
            }
        }
        let previous = employee.version;
        employee.version += 1;
        if let Err(err) = save_employee_to_path(employee, &path) {
            employee.version = previous;
            return Err(err);
        }
        debug!(employee = %employee.id, version = employee.version, "employee saved");
        Ok(())
    }

    fn list(&self) -> Result<Vec<Uuid>> {
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(DOCUMENT_EXTENSION) {
                continue;
            }
            if let Some(id) = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .and_then(|stem| Uuid::parse_str(stem).ok())
            {
                ids.push(id);
            }
        }
        ids.sort();
        Ok(ids)
    }

    fn delete(&self, id: Uuid) -> Result<()> {
        let path = self.employee_path(id);
        if !path.exists() {
            return Err(StorageError::NotFound(id.to_string()));
        }
        fs::remove_file(path)?;
        Ok(())
    }
}

pub fn save_employee_to_path(employee: &Employee, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(employee)?;
    let tmp = tmp_path(path);
    write_atomic(&tmp, &json)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

pub fn load_employee_from_path(path: &Path) -> Result<Employee> {
    let data = fs::read_to_string(path)?;
    let employee: Employee = serde_json::from_str(&data)?;
    Ok(employee)
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}
