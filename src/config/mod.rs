//! Engine configuration: leave policy constants and storage settings,
//! persisted as JSON.

use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

const TMP_SUFFIX: &str = "tmp";
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Leave and scheduling rules applied by the services.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LeavePolicy {
    #[serde(default = "LeavePolicy::default_standard_hours")]
    pub standard_hours: f64,
    /// Shift length inferred for compressed (e.g. 4x10) weeks.
    #[serde(default = "LeavePolicy::default_compressed_hours")]
    pub compressed_hours: f64,
    #[serde(default = "LeavePolicy::default_min_weekly_workdays")]
    pub min_weekly_workdays: usize,
    #[serde(default = "LeavePolicy::default_annual_leave")]
    pub default_annual_leave: f64,
    #[serde(default = "LeavePolicy::default_workday_code")]
    pub default_workday_code: String,
    #[serde(default = "LeavePolicy::default_holiday_code")]
    pub holiday_code: String,
    #[serde(default = "LeavePolicy::default_holiday_hours")]
    pub holiday_hours: f64,
    #[serde(default = "LeavePolicy::default_vacation_code")]
    pub vacation_code: String,
    #[serde(default = "LeavePolicy::default_mod_code")]
    pub mod_code: String,
}

impl Default for LeavePolicy {
    fn default() -> Self {
        Self {
            standard_hours: Self::default_standard_hours(),
            compressed_hours: Self::default_compressed_hours(),
            min_weekly_workdays: Self::default_min_weekly_workdays(),
            default_annual_leave: Self::default_annual_leave(),
            default_workday_code: Self::default_workday_code(),
            holiday_code: Self::default_holiday_code(),
            holiday_hours: Self::default_holiday_hours(),
            vacation_code: Self::default_vacation_code(),
            mod_code: Self::default_mod_code(),
        }
    }
}

impl LeavePolicy {
    pub fn default_standard_hours() -> f64 {
        8.0
    }

    pub fn default_compressed_hours() -> f64 {
        10.0
    }

    pub fn default_min_weekly_workdays() -> usize {
        5
    }

    pub fn default_annual_leave() -> f64 {
        120.0
    }

    pub fn default_workday_code() -> String {
        "D".into()
    }

    pub fn default_holiday_code() -> String {
        "H".into()
    }

    pub fn default_holiday_hours() -> f64 {
        8.0
    }

    pub fn default_vacation_code() -> String {
        "V".into()
    }

    pub fn default_mod_code() -> String {
        "mod".into()
    }

    pub fn is_mod(&self, code: &str) -> bool {
        code.eq_ignore_ascii_case(&self.mod_code)
    }

    pub fn is_holiday(&self, code: &str) -> bool {
        code.eq_ignore_ascii_case(&self.holiday_code)
    }

    pub fn is_vacation(&self, code: &str) -> bool {
        code.eq_ignore_ascii_case(&self.vacation_code)
    }
}

/// Top-level configuration handed to the service layer at startup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineConfig {
    #[serde(default)]
    pub policy: LeavePolicy,
    #[serde(default = "EngineConfig::default_max_retries")]
    pub max_retries: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Optional custom directory for employee documents.
    pub data_root: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            policy: LeavePolicy::default(),
            max_retries: Self::default_max_retries(),
            data_root: None,
        }
    }
}

impl EngineConfig {
    pub fn default_max_retries() -> u32 {
        3
    }

    pub fn resolve_data_root(&self) -> PathBuf {
        if let Some(path) = &self.data_root {
            return path.clone();
        }
        dirs::data_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("workforce")
            .join("employees")
    }
}

/// Loads and saves [`EngineConfig`] under a base directory.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self, ConfigError> {
        fs::create_dir_all(&base)?;
        Ok(Self::new(base.join(CONFIG_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<EngineConfig, ConfigError> {
        if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            Ok(serde_json::from_str(&data)?)
        } else {
            Ok(EngineConfig::default())
        }
    }

    pub fn save(&self, config: &EngineConfig) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(config)?;
        let tmp = tmp_path(&self.path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
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

fn write_atomic(path: &Path, data: &str) -> Result<(), ConfigError> {
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}
