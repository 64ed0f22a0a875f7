use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::services::{ServiceError, ServiceResult};
use crate::domain::common::{DateRange, Displayable};
use crate::domain::leave::LeaveStatus;

const REQUEST_DATE_FORMAT: &str = "%Y-%m-%d";

/// Approval workflow state of a leave request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum RequestStatus {
    Draft,
    Requested,
    Approved,
}

impl RequestStatus {
    /// Status stamped on regenerated breakdown rows.
    pub fn day_status(self) -> Option<LeaveStatus> {
        match self {
            RequestStatus::Draft => None,
            RequestStatus::Requested => Some(LeaveStatus::Requested),
            RequestStatus::Approved => Some(LeaveStatus::Approved),
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RequestStatus::Draft => "DRAFT",
            RequestStatus::Requested => "REQUESTED",
            RequestStatus::Approved => "APPROVED",
        };
        f.write_str(label)
    }
}

/// One calendar day of a request's breakdown.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RequestedDay {
    pub leave_date: NaiveDate,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub hours: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<LeaveStatus>,
    /// Only populated for schedule-modification rows.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub workcenter: String,
}

impl RequestedDay {
    pub fn new(leave_date: NaiveDate, code: impl Into<String>, hours: f64) -> Self {
        Self {
            leave_date,
            code: code.into(),
            hours,
            status: None,
            workcenter: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RequestComment {
    pub comment_date: DateTime<Utc>,
    pub comment: String,
}

/// Applied-for leave period and its approval metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LeaveRequest {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub request_date: DateTime<Utc>,
    pub primary_code: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: RequestStatus,
    #[serde(default)]
    pub requested_days: Vec<RequestedDay>,
    #[serde(default)]
    pub comments: Vec<RequestComment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approval_date: Option<DateTime<Utc>>,
}

impl LeaveRequest {
    pub fn new(
        employee_id: Uuid,
        primary_code: impl Into<String>,
        range: DateRange,
        request_date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            employee_id,
            request_date,
            primary_code: primary_code.into(),
            start_date: range.start,
            end_date: range.end,
            status: RequestStatus::Draft,
            requested_days: Vec::new(),
            comments: Vec::new(),
            approved_by: None,
            approval_date: None,
        }
    }

    pub fn range(&self) -> DateRange {
        DateRange::new(self.start_date, self.end_date)
    }

    pub fn has_code(&self, code: &str) -> bool {
        self.primary_code.eq_ignore_ascii_case(code)
    }

    pub fn add_comment(&mut self, comment: impl Into<String>, at: DateTime<Utc>) {
        let comment = comment.into();
        if comment.is_empty() {
            return;
        }
        self.comments.push(RequestComment {
            comment_date: at,
            comment,
        });
    }

    pub fn clear_approval(&mut self) {
        self.approved_by = None;
        self.approval_date = None;
    }

    pub fn requested_day(&self, date: NaiveDate) -> Option<&RequestedDay> {
        self.requested_days.iter().find(|day| day.leave_date == date)
    }
}

impl Displayable for LeaveRequest {
    fn display_label(&self) -> String {
        format!(
            "{} {} - {} [{}]",
            self.primary_code, self.start_date, self.end_date, self.status
        )
    }
}

/// Closed set of edits accepted by a leave request.
#[derive(Debug, Clone, PartialEq)]
pub enum LeaveRequestEdit {
    SetStart(NaiveDate),
    SetEnd(NaiveDate),
    SetDates { start: NaiveDate, end: NaiveDate },
    SetCode(String),
    SetDay {
        date: NaiveDate,
        code: String,
        hours: f64,
        workcenter: String,
    },
    AddComment(String),
}

impl LeaveRequestEdit {
    /// Builds an edit from the field/value pairs used by request forms.
    ///
    /// `dates` takes `start|end`; `day` takes `date|code|hours[|workcenter]`.
    pub fn parse(field: &str, value: &str) -> ServiceResult<Self> {
        match field.trim().to_ascii_lowercase().as_str() {
            "startdate" | "start" => parse_date(value).map(LeaveRequestEdit::SetStart),
            "enddate" | "end" => parse_date(value).map(LeaveRequestEdit::SetEnd),
            "dates" => {
                let (start, end) = value.split_once('|').ok_or_else(|| {
                    ServiceError::Validation(format!("expected `start|end`, got `{value}`"))
                })?;
                Ok(LeaveRequestEdit::SetDates {
                    start: parse_date(start)?,
                    end: parse_date(end)?,
                })
            }
            "code" | "primarycode" => Ok(LeaveRequestEdit::SetCode(value.trim().to_string())),
            "day" | "requestday" => {
                let parts: Vec<&str> = value.split('|').collect();
                if parts.len() < 3 {
                    return Err(ServiceError::Validation(format!(
                        "expected `date|code|hours[|workcenter]`, got `{value}`"
                    )));
                }
                let hours = parts[2].trim().parse::<f64>().map_err(|err| {
                    ServiceError::Validation(format!("invalid hours `{}`: {err}", parts[2]))
                })?;
                Ok(LeaveRequestEdit::SetDay {
                    date: parse_date(parts[0])?,
                    code: parts[1].trim().to_string(),
                    hours,
                    workcenter: parts.get(3).map(|wc| wc.trim().to_string()).unwrap_or_default(),
                })
            }
            "comment" | "addcomment" => Ok(LeaveRequestEdit::AddComment(value.to_string())),
            other => Err(ServiceError::Validation(format!(
                "unsupported leave request field `{other}`"
            ))),
        }
    }
}

fn parse_date(value: &str) -> ServiceResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), REQUEST_DATE_FORMAT)
        .map_err(|err| ServiceError::Validation(format!("invalid date `{value}`: {err}")))
}
