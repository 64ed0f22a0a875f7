use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::services::{ServiceError, ServiceResult};

/// Lifecycle state of a leave ledger entry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum LeaveStatus {
    Draft,
    Requested,
    Approved,
    /// Already taken and verified; never rewritten by automated paths.
    Actual,
}

impl LeaveStatus {
    pub fn is_actual(self) -> bool {
        matches!(self, LeaveStatus::Actual)
    }
}

impl fmt::Display for LeaveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LeaveStatus::Draft => "DRAFT",
            LeaveStatus::Requested => "REQUESTED",
            LeaveStatus::Approved => "APPROVED",
            LeaveStatus::Actual => "ACTUAL",
        };
        f.write_str(label)
    }
}

impl FromStr for LeaveStatus {
    type Err = ServiceError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "draft" => Ok(LeaveStatus::Draft),
            "requested" => Ok(LeaveStatus::Requested),
            "approved" => Ok(LeaveStatus::Approved),
            "actual" => Ok(LeaveStatus::Actual),
            other => Err(ServiceError::Validation(format!(
                "unknown leave status `{other}`"
            ))),
        }
    }
}

/// One entry of the authoritative leave ledger.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LeaveDay {
    pub id: u32,
    pub leave_date: NaiveDate,
    pub code: String,
    pub hours: f64,
    pub status: LeaveStatus,
    /// Owning leave request, if any. Non-owning: either side may be deleted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_day: Option<String>,
}

impl LeaveDay {
    pub fn new(
        id: u32,
        leave_date: NaiveDate,
        code: impl Into<String>,
        hours: f64,
        status: LeaveStatus,
    ) -> Self {
        Self {
            id,
            leave_date,
            code: code.into(),
            hours,
            status,
            request_id: None,
            tag_day: None,
        }
    }

    pub fn for_request(mut self, request_id: Uuid) -> Self {
        self.request_id = Some(request_id);
        self
    }

    pub fn is_actual(&self) -> bool {
        self.status.is_actual()
    }

    pub fn belongs_to(&self, request_id: Uuid) -> bool {
        self.request_id == Some(request_id)
    }
}

/// Closed set of edits accepted by a ledger entry.
#[derive(Debug, Clone, PartialEq)]
pub enum LeaveEdit {
    SetDate(NaiveDate),
    SetCode(String),
    SetHours(f64),
    SetStatus(LeaveStatus),
    SetRequest(Option<Uuid>),
    SetTagDay(Option<String>),
}

impl LeaveEdit {
    /// Builds an edit from a field name and its textual value. Dates use the
    /// `MM/DD/YYYY` form.
    pub fn parse(field: &str, value: &str) -> ServiceResult<Self> {
        match field.trim().to_ascii_lowercase().as_str() {
            "date" => NaiveDate::parse_from_str(value.trim(), "%m/%d/%Y")
                .map(LeaveEdit::SetDate)
                .map_err(|err| ServiceError::Validation(format!("invalid date `{value}`: {err}"))),
            "code" => Ok(LeaveEdit::SetCode(value.trim().to_string())),
            "hours" => value
                .trim()
                .parse::<f64>()
                .map(LeaveEdit::SetHours)
                .map_err(|err| ServiceError::Validation(format!("invalid hours `{value}`: {err}"))),
            "status" => value.parse().map(LeaveEdit::SetStatus),
            "requestid" => {
                let trimmed = value.trim();
                if trimmed.is_empty() {
                    Ok(LeaveEdit::SetRequest(None))
                } else {
                    Uuid::parse_str(trimmed)
                        .map(|id| LeaveEdit::SetRequest(Some(id)))
                        .map_err(|err| {
                            ServiceError::Validation(format!("invalid request id `{value}`: {err}"))
                        })
                }
            }
            "tagday" => {
                let trimmed = value.trim();
                Ok(LeaveEdit::SetTagDay(
                    (!trimmed.is_empty()).then(|| trimmed.to_string()),
                ))
            }
            other => Err(ServiceError::Validation(format!(
                "unsupported leave field `{other}`"
            ))),
        }
    }

    pub fn apply(&self, leave: &mut LeaveDay) {
        match self {
            LeaveEdit::SetDate(date) => leave.leave_date = *date,
            LeaveEdit::SetCode(code) => leave.code = code.clone(),
            LeaveEdit::SetHours(hours) => leave.hours = *hours,
            LeaveEdit::SetStatus(status) => leave.status = *status,
            LeaveEdit::SetRequest(request_id) => leave.request_id = *request_id,
            LeaveEdit::SetTagDay(tag) => leave.tag_day = tag.clone(),
        }
    }
}
