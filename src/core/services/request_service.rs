use chrono::NaiveDate;
use tracing::debug;
use uuid::Uuid;

use crate::config::LeavePolicy;
use crate::core::context::ServiceContext;
use crate::domain::{
    common::{DateRange, Displayable},
    employee::Employee,
    labor::{is_leave_code, Workcode},
    leave::{LeaveDay, LeaveStatus},
    request::{LeaveRequest, LeaveRequestEdit, RequestStatus, RequestedDay},
    variation::Variation,
};

use super::{LeaveService, ServiceError, ServiceResult, WorkdayResolver};

const MAX_UTC_OFFSET: f64 = 14.0;

/// Outcome of a lifecycle transition: the updated request plus the
/// notification text to deliver, if the transition produces one.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestChange {
    pub request: LeaveRequest,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy)]
enum DateChange {
    Start,
    End,
    Both,
}

impl DateChange {
    fn needs_reapproval(self, name: &str) -> String {
        match self {
            DateChange::Start => {
                format!("Leave Request from {name}: Starting date changed needs reapproval")
            }
            DateChange::End => {
                format!("Leave Request from {name}: Ending date changed needs reapproval")
            }
            DateChange::Both => {
                format!("Leave Request from {name}: Dates changed needs reapproval")
            }
        }
    }

    fn moved(self, name: &str, range: DateRange) -> String {
        match self {
            DateChange::Start => format!(
                "Leave Request from {name}: Starting date changed to {}",
                range.start
            ),
            DateChange::End => format!(
                "Leave Request from {name}: Ending date changed to {}",
                range.end
            ),
            DateChange::Both => format!(
                "Leave Request from {name}: Dates changed to {} - {}",
                range.start, range.end
            ),
        }
    }
}

/// Drives leave requests through `Draft -> Requested -> Approved` and keeps
/// the leave ledger and schedule-modification variations in step with them.
pub struct RequestService;

impl RequestService {
    /// Opens a draft request for `code` over `[start, end]`.
    ///
    /// A request with the same dates is reused: it receives the comment and
    /// is returned unchanged otherwise.
    pub fn create(
        employee: &mut Employee,
        ctx: &ServiceContext,
        code: &str,
        start: NaiveDate,
        end: NaiveDate,
        utc_offset: f64,
        comment: &str,
    ) -> ServiceResult<LeaveRequest> {
        if start > end {
            return Err(ServiceError::Validation(format!(
                "Leave request start {start} is after its end {end}"
            )));
        }
        if !(-MAX_UTC_OFFSET..=MAX_UTC_OFFSET).contains(&utc_offset) {
            return Err(ServiceError::Validation(format!(
                "UTC offset {utc_offset} is out of range"
            )));
        }
        let now = ctx.now();
        if let Some(existing) = employee
            .requests
            .iter_mut()
            .find(|req| req.start_date == start && req.end_date == end)
        {
            existing.add_comment(comment, now);
            let request = existing.clone();
            employee.touch();
            return Ok(request);
        }

        let range = DateRange::new(start, end);
        let mut request = LeaveRequest::new(employee.id, code, range, now);
        request.add_comment(comment, now);
        request.requested_days = Self::build_days(employee, &ctx.policy, code, range, None);
        employee.requests.push(request.clone());
        employee.sort_requests();
        employee.touch();
        debug!(employee = %employee.id, request = %request.id, %start, %end, "leave request created");
        Ok(request)
    }

    pub fn edit(
        employee: &mut Employee,
        ctx: &ServiceContext,
        id: Uuid,
        edit: LeaveRequestEdit,
    ) -> ServiceResult<RequestChange> {
        let idx = Self::position(employee, id)?;
        let current = employee.requests[idx].range();
        let message = match edit {
            LeaveRequestEdit::SetStart(start) => {
                let range = DateRange::new(start, current.end.max(start));
                Self::change_dates(
                    employee,
                    &ctx.policy,
                    idx,
                    range,
                    !current.contains(start),
                    DateChange::Start,
                )
            }
            LeaveRequestEdit::SetEnd(end) => {
                let range = DateRange::new(current.start.min(end), end);
                Self::change_dates(
                    employee,
                    &ctx.policy,
                    idx,
                    range,
                    !current.contains(end),
                    DateChange::End,
                )
            }
            LeaveRequestEdit::SetDates { start, end } => {
                if start > end {
                    return Err(ServiceError::Validation(format!(
                        "Leave request start {start} is after its end {end}"
                    )));
                }
                let outside = !current.contains(start) || !current.contains(end);
                Self::change_dates(
                    employee,
                    &ctx.policy,
                    idx,
                    DateRange::new(start, end),
                    outside,
                    DateChange::Both,
                )
            }
            LeaveRequestEdit::SetCode(code) => {
                let request = &mut employee.requests[idx];
                // only a re-entry of the current code rebuilds the breakdown
                let regenerate = request.has_code(&code);
                request.primary_code = code;
                if regenerate {
                    Self::regenerate(employee, &ctx.policy, idx);
                }
                None
            }
            LeaveRequestEdit::SetDay {
                date,
                code,
                hours,
                workcenter,
            } => {
                Self::set_day(employee, &ctx.policy, idx, date, code, hours, workcenter);
                None
            }
            LeaveRequestEdit::AddComment(comment) => {
                employee.requests[idx].add_comment(comment, ctx.now());
                None
            }
        };
        let request = employee.requests[idx].clone();
        employee.sort_requests();
        employee.touch();
        Ok(RequestChange { request, message })
    }

    /// Sends a draft (or already requested) request for approval.
    pub fn submit(employee: &mut Employee, id: Uuid) -> ServiceResult<RequestChange> {
        let idx = Self::position(employee, id)?;
        let name = employee.name.last_first();
        let request = &mut employee.requests[idx];
        if request.status == RequestStatus::Approved {
            return Err(ServiceError::StateConflict(
                "Approved leave requests cannot be resubmitted".into(),
            ));
        }
        request.status = RequestStatus::Requested;
        for day in request
            .requested_days
            .iter_mut()
            .filter(|day| day.status.is_none() && !day.code.is_empty())
        {
            day.status = Some(LeaveStatus::Requested);
        }
        let message = format!(
            "Leave Request: Leave Request from {name} submitted for approval.  \
             Requested Leave Date: {} - {}.",
            request.start_date.format("%d %b %y"),
            request.end_date.format("%d %b %y")
        );
        let request = request.clone();
        employee.touch();
        debug!(employee = %employee.id, request = %id, "leave request submitted");
        Ok(RequestChange {
            request,
            message: Some(message),
        })
    }

    /// Approves a submitted request and makes its days authoritative.
    ///
    /// Ordinary leave lands in the ledger; a schedule-modification request is
    /// written into its own variation, except days whose code the catalog
    /// flags as leave.
    pub fn approve(
        employee: &mut Employee,
        ctx: &ServiceContext,
        id: Uuid,
        approver: &str,
        catalog: &[Workcode],
    ) -> ServiceResult<RequestChange> {
        let idx = Self::position(employee, id)?;
        let request = &mut employee.requests[idx];
        if request.status == RequestStatus::Draft {
            return Err(ServiceError::StateConflict(
                "Draft leave requests must be submitted before approval".into(),
            ));
        }
        request.status = RequestStatus::Approved;
        request.approved_by = Some(approver.to_string());
        request.approval_date = Some(ctx.now());
        for day in request.requested_days.iter_mut() {
            day.status = Some(LeaveStatus::Approved);
        }
        let request = request.clone();

        LeaveService::clear_for_request(employee, &request);
        if ctx.policy.is_mod(&request.primary_code) {
            Self::apply_mod(employee, &request, catalog);
        } else {
            LeaveService::merge_approved(employee, &request);
        }
        employee.touch();
        debug!(
            employee = %employee.id,
            request = %request.display_label(),
            approver,
            "leave request approved"
        );
        Ok(RequestChange {
            request,
            message: Some("Leave Request: Leave Request approved.".into()),
        })
    }

    /// Returns a request to draft, recording why.
    pub fn unapprove(
        employee: &mut Employee,
        ctx: &ServiceContext,
        id: Uuid,
        comment: &str,
    ) -> ServiceResult<RequestChange> {
        let idx = Self::position(employee, id)?;
        let request = &mut employee.requests[idx];
        request.status = RequestStatus::Draft;
        request.clear_approval();
        for day in request.requested_days.iter_mut() {
            day.status = Some(LeaveStatus::Requested);
        }
        request.add_comment(comment, ctx.now());
        let request = request.clone();

        LeaveService::remove_for_request(employee, id);
        if ctx.policy.is_mod(&request.primary_code) {
            Self::remove_mod_variation(employee, request.range());
        }
        employee.touch();
        debug!(employee = %employee.id, request = %id, "leave request unapproved");
        Ok(RequestChange {
            request,
            message: Some(format!(
                "Leave Request: Leave Request unapproved.\nComment: {comment}"
            )),
        })
    }

    /// Removes a request together with what its approval produced.
    pub fn delete(employee: &mut Employee, ctx: &ServiceContext, id: Uuid) -> ServiceResult<String> {
        let idx = Self::position(employee, id)?;
        let request = employee.requests.remove(idx);
        LeaveService::remove_for_request(employee, id);
        if ctx.policy.is_mod(&request.primary_code) {
            Self::remove_mod_variation(employee, request.range());
        }
        employee.touch();
        debug!(employee = %employee.id, request = %id, "leave request deleted");
        Ok(format!(
            "Deleted Leave Request for {}, Dates: {} to {}",
            employee.name.last_first(),
            request.start_date.format("%m/%d/%y"),
            request.end_date.format("%m/%d/%y")
        ))
    }

    /// Per-day breakdown of `code` over `range`.
    ///
    /// Leave codes produce one row per scheduled day. The schedule
    /// modification code covers the enclosing Sunday-Saturday weeks with one
    /// row per day, copied from the resolved workday.
    pub fn build_days(
        employee: &Employee,
        policy: &LeavePolicy,
        code: &str,
        range: DateRange,
        status: Option<LeaveStatus>,
    ) -> Vec<RequestedDay> {
        let resolver = WorkdayResolver::new(employee, policy);
        if policy.is_mod(code) {
            let horizon = employee.last_workday();
            return range
                .week_aligned()
                .days()
                .map(|date| {
                    let workday = resolver.resolve(date, horizon).unwrap_or_default();
                    RequestedDay {
                        leave_date: date,
                        code: workday.code,
                        hours: workday.hours,
                        status,
                        workcenter: workday.workcenter,
                    }
                })
                .collect();
        }

        range
            .days()
            .filter_map(|date| {
                let workday = resolver
                    .resolve(date, range.start)
                    .filter(|wd| wd.is_scheduled())?;
                let hours = if policy.is_holiday(code) {
                    policy.holiday_hours
                } else if workday.hours == 0.0 {
                    resolver.standard_workday(date)
                } else {
                    workday.hours
                };
                let mut day = RequestedDay::new(date, code, hours);
                day.status = status;
                Some(day)
            })
            .collect()
    }

    fn position(employee: &Employee, id: Uuid) -> ServiceResult<usize> {
        employee
            .requests
            .iter()
            .position(|req| req.id == id)
            .ok_or_else(|| ServiceError::NotFound(format!("Leave request {id}")))
    }

    fn regenerate(employee: &mut Employee, policy: &LeavePolicy, idx: usize) {
        let request = &employee.requests[idx];
        let code = request.primary_code.clone();
        let range = request.range();
        let status = request.status.day_status();
        let days = Self::build_days(employee, policy, &code, range, status);
        employee.requests[idx].requested_days = days;
    }

    /// Moves the request to `range`.
    ///
    /// Leaving the current bounds, or moving an approved schedule
    /// modification at all, drops what approval produced and sends an
    /// approved request back for reapproval. Otherwise an approved request
    /// has its ledger days replaced by the regenerated breakdown.
    fn change_dates(
        employee: &mut Employee,
        policy: &LeavePolicy,
        idx: usize,
        range: DateRange,
        outside: bool,
        change: DateChange,
    ) -> Option<String> {
        let name = employee.name.last_first();
        let previous = employee.requests[idx].clone();
        let approved = previous.status == RequestStatus::Approved;
        let is_mod = policy.is_mod(&previous.primary_code);
        let downgrade = outside || (approved && is_mod);

        let mut message = None;
        if downgrade {
            LeaveService::remove_for_request(employee, previous.id);
            if is_mod {
                Self::remove_mod_variation(employee, previous.range());
            }
            if approved {
                let request = &mut employee.requests[idx];
                request.status = RequestStatus::Requested;
                request.clear_approval();
                message = Some(change.needs_reapproval(&name));
            }
        } else if approved {
            message = Some(change.moved(&name, range));
        }

        let request = &mut employee.requests[idx];
        request.start_date = range.start;
        request.end_date = range.end;
        Self::regenerate(employee, policy, idx);

        if approved && !downgrade {
            let request = employee.requests[idx].clone();
            LeaveService::clear_for_request(employee, &request);
            LeaveService::merge_approved(employee, &request);
        }
        debug!(
            employee = %employee.id,
            request = %previous.id,
            start = %range.start,
            end = %range.end,
            downgrade,
            "leave request dates changed"
        );
        message
    }

    fn set_day(
        employee: &mut Employee,
        policy: &LeavePolicy,
        idx: usize,
        date: NaiveDate,
        code: String,
        hours: f64,
        workcenter: String,
    ) {
        let request = &mut employee.requests[idx];
        let hours = if code.is_empty() { 0.0 } else { hours };
        let status = request.status.day_status();
        match request
            .requested_days
            .iter_mut()
            .find(|day| day.leave_date == date)
        {
            Some(day) => {
                day.code = code.clone();
                day.hours = hours;
                day.workcenter = workcenter;
            }
            None => {
                let mut day = RequestedDay::new(date, code.clone(), hours);
                day.status = status;
                day.workcenter = workcenter;
                request.requested_days.push(day);
                request.requested_days.sort_by_key(|day| day.leave_date);
            }
        }
        let sync = request.status == RequestStatus::Approved && !policy.is_mod(&request.primary_code);
        let request_id = request.id;
        if sync {
            LeaveService::sync_approved_day(employee, request_id, date, &code, hours);
        }
    }

    /// Writes an approved schedule modification into its variation, creating
    /// the variation on first approval.
    fn apply_mod(employee: &mut Employee, request: &LeaveRequest, catalog: &[Workcode]) {
        let range = request.range();
        let vidx = match employee
            .variations
            .iter()
            .position(|vari| vari.matches_mod(range))
        {
            Some(vidx) => vidx,
            None => {
                let mut variation = Variation::new(
                    employee.next_variation_id(),
                    employee.site_id.clone(),
                    range.start,
                    range.end,
                );
                variation.is_mod = true;
                employee.variations.push(variation);
                employee.variations.len() - 1
            }
        };

        let mut leave_days = Vec::new();
        let variation = &mut employee.variations[vidx];
        for day in &request.requested_days {
            if is_leave_code(catalog, &day.code) {
                leave_days.push(day);
                continue;
            }
            let Some(slot) = variation.slot_of(day.leave_date) else {
                continue;
            };
            variation
                .schedule
                .set_workday(slot, &day.code, &day.workcenter, day.hours);
        }

        let mut next = employee.next_leave_id();
        for day in leave_days.into_iter().filter(|day| day.hours > 0.0) {
            employee.leaves.push(
                LeaveDay::new(
                    next,
                    day.leave_date,
                    day.code.clone(),
                    day.hours,
                    LeaveStatus::Approved,
                )
                .for_request(request.id),
            );
            next += 1;
        }
        employee.sort_leaves();
        employee.sort_variations();
    }

    fn remove_mod_variation(employee: &mut Employee, range: DateRange) {
        employee.variations.retain(|vari| !vari.matches_mod(range));
    }
}
