use std::sync::Arc;

use chrono::{NaiveDate, TimeZone, Utc};
use uuid::Uuid;

use super::{
    AssignmentService, BalanceService, LeaveService, PurgeService, RequestService, ServiceError,
    TimesheetService, VariationService, WorkdayResolver,
};
use crate::core::{context::ServiceContext, time::FixedClock};
use crate::domain::{
    assignment::{Assignment, AssignmentEdit, EmployeeLaborCode},
    balance::AnnualLeave,
    common::{epoch, sentinel_end, DateRange},
    employee::{Employee, EmployeeName},
    labor::{LaborCode, Workcode},
    leave::{LeaveDay, LeaveEdit, LeaveStatus},
    request::{LeaveRequest, LeaveRequestEdit, RequestStatus},
    variation::VariationEdit,
    work::Work,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn context() -> ServiceContext {
    let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
    ServiceContext::default().with_clock(Arc::new(FixedClock(now)))
}

/// One open Monday-Friday day-shift assignment starting 2024-01-01.
fn employee() -> Employee {
    let mut emp = Employee::new(EmployeeName::new("Ada", "Lovelace"), "DGS");
    emp.assignments
        .push(Assignment::new(1, "DGS", "OPS", date(2024, 1, 1), "D", 8.0));
    emp
}

fn catalog() -> Vec<Workcode> {
    vec![
        Workcode::new("D", false),
        Workcode::new("N", false),
        Workcode::new("V", true),
    ]
}

fn tagged(emp: &Employee, request_id: Uuid) -> Vec<&LeaveDay> {
    emp.leaves
        .iter()
        .filter(|lv| lv.belongs_to(request_id))
        .collect()
}

fn approved_week(emp: &mut Employee, ctx: &ServiceContext) -> LeaveRequest {
    let request = RequestService::create(emp, ctx, "V", date(2024, 3, 11), date(2024, 3, 15), 0.0, "")
        .expect("create request");
    RequestService::submit(emp, request.id).expect("submit request");
    RequestService::approve(emp, ctx, request.id, "boss", &catalog())
        .expect("approve request")
        .request
}

fn assert_contiguous(emp: &Employee) {
    for pair in emp.assignments.windows(2) {
        assert!(pair[0].start_date < pair[1].start_date);
        assert_eq!(pair[0].end_date.succ_opt(), Some(pair[1].start_date));
    }
    let open = emp
        .assignments
        .iter()
        .filter(|asgmt| asgmt.end_date == sentinel_end())
        .count();
    assert_eq!(open, 1);
}

#[test]
fn weekday_and_weekend_resolution() {
    let emp = employee();
    let ctx = context();
    let resolver = WorkdayResolver::new(&emp, &ctx.policy);

    let tuesday = resolver.resolve(date(2024, 3, 12), epoch()).expect("tuesday");
    assert_eq!((tuesday.code.as_str(), tuesday.hours), ("D", 8.0));
    let saturday = resolver.resolve(date(2024, 3, 16), epoch());
    assert!(saturday.map_or(true, |wd| !wd.is_scheduled()));
    assert_eq!(
        resolver.resolve(date(2024, 3, 12), epoch()),
        resolver.resolve(date(2024, 3, 12), epoch())
    );
}

#[test]
fn single_day_request_is_created_and_submitted() {
    let mut emp = employee();
    let ctx = context();
    let request = RequestService::create(
        &mut emp,
        &ctx,
        "V",
        date(2024, 3, 12),
        date(2024, 3, 12),
        -6.0,
        "dentist",
    )
    .expect("create request");

    assert_eq!(request.status, RequestStatus::Draft);
    assert_eq!(request.requested_days.len(), 1);
    let row = &request.requested_days[0];
    assert_eq!((row.code.as_str(), row.hours, row.status), ("V", 8.0, None));
    assert_eq!(request.comments[0].comment, "dentist");
    assert_eq!(request.request_date, ctx.now());

    let change = RequestService::submit(&mut emp, request.id).expect("submit request");
    assert_eq!(change.request.status, RequestStatus::Requested);
    assert_eq!(
        change.request.requested_days[0].status,
        Some(LeaveStatus::Requested)
    );
    assert_eq!(
        change.message.as_deref(),
        Some(
            "Leave Request: Leave Request from Lovelace, Ada submitted for approval.  \
             Requested Leave Date: 12 Mar 24 - 12 Mar 24."
        )
    );
    assert_eq!(emp.request(request.id), Some(&change.request));
}

#[test]
fn approval_moves_leave_into_ledger_and_resolver() {
    let mut emp = employee();
    let ctx = context();
    let request = RequestService::create(
        &mut emp,
        &ctx,
        "V",
        date(2024, 3, 12),
        date(2024, 3, 12),
        0.0,
        "",
    )
    .expect("create request");
    RequestService::submit(&mut emp, request.id).expect("submit request");
    let change = RequestService::approve(&mut emp, &ctx, request.id, "boss", &catalog())
        .expect("approve request");

    assert_eq!(change.request.status, RequestStatus::Approved);
    assert_eq!(change.request.approved_by.as_deref(), Some("boss"));
    assert_eq!(change.request.approval_date, Some(ctx.now()));
    assert_eq!(emp.leaves.len(), 1);
    let leave = &emp.leaves[0];
    assert_eq!(leave.code, "V");
    assert_eq!(leave.hours, 8.0);
    assert_eq!(leave.status, LeaveStatus::Approved);
    assert_eq!(leave.request_id, Some(request.id));

    let resolved = WorkdayResolver::new(&emp, &ctx.policy)
        .resolve(date(2024, 3, 12), epoch())
        .expect("resolved");
    assert_eq!((resolved.code.as_str(), resolved.hours), ("V", 8.0));
}

#[test]
fn extending_an_approved_request_needs_reapproval() {
    let mut emp = employee();
    let ctx = context();
    let request = approved_week(&mut emp, &ctx);

    let change = RequestService::edit(
        &mut emp,
        &ctx,
        request.id,
        LeaveRequestEdit::SetEnd(date(2024, 3, 19)),
    )
    .expect("extend request");

    assert_eq!(change.request.status, RequestStatus::Requested);
    assert!(change.request.approved_by.is_none());
    assert!(change.request.approval_date.is_none());
    assert_eq!(
        change.message.as_deref(),
        Some("Leave Request from Lovelace, Ada: Ending date changed needs reapproval")
    );
    assert!(tagged(&emp, request.id).is_empty());
    // Mon-Fri plus the following Monday and Tuesday
    assert_eq!(change.request.requested_days.len(), 7);
    assert!(change
        .request
        .requested_days
        .iter()
        .all(|day| day.status == Some(LeaveStatus::Requested)));
}

#[test]
fn shrinking_an_approved_request_keeps_approval() {
    let mut emp = employee();
    let ctx = context();
    let request = approved_week(&mut emp, &ctx);
    assert_eq!(tagged(&emp, request.id).len(), 5);

    let change = RequestService::edit(
        &mut emp,
        &ctx,
        request.id,
        LeaveRequestEdit::SetEnd(date(2024, 3, 13)),
    )
    .expect("shrink request");

    assert_eq!(change.request.status, RequestStatus::Approved);
    assert_eq!(
        change.message.as_deref(),
        Some("Leave Request from Lovelace, Ada: Ending date changed to 2024-03-13")
    );
    let dates: Vec<_> = tagged(&emp, request.id)
        .iter()
        .map(|lv| lv.leave_date)
        .collect();
    assert_eq!(dates, vec![date(2024, 3, 11), date(2024, 3, 12), date(2024, 3, 13)]);
    let ids: Vec<_> = emp.leaves.iter().map(|lv| lv.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[test]
fn moving_start_before_range_downgrades() {
    let mut emp = employee();
    let ctx = context();
    let request = approved_week(&mut emp, &ctx);
    let change = RequestService::edit(
        &mut emp,
        &ctx,
        request.id,
        LeaveRequestEdit::SetStart(date(2024, 3, 4)),
    )
    .expect("move start");
    assert_eq!(change.request.status, RequestStatus::Requested);
    assert_eq!(change.request.start_date, date(2024, 3, 4));
    assert_eq!(change.request.end_date, date(2024, 3, 15));
    assert_eq!(
        change.message.as_deref(),
        Some("Leave Request from Lovelace, Ada: Starting date changed needs reapproval")
    );
}

#[test]
fn draft_date_edits_produce_no_message() {
    let mut emp = employee();
    let ctx = context();
    let request =
        RequestService::create(&mut emp, &ctx, "V", date(2024, 3, 11), date(2024, 3, 11), 0.0, "")
            .expect("create request");
    let change = RequestService::edit(
        &mut emp,
        &ctx,
        request.id,
        LeaveRequestEdit::SetEnd(date(2024, 3, 13)),
    )
    .expect("extend draft");
    assert!(change.message.is_none());
    assert_eq!(change.request.status, RequestStatus::Draft);
    assert_eq!(change.request.requested_days.len(), 3);
}

#[test]
fn create_reuses_request_with_same_dates() {
    let mut emp = employee();
    let ctx = context();
    let first =
        RequestService::create(&mut emp, &ctx, "V", date(2024, 3, 11), date(2024, 3, 15), 0.0, "first")
            .expect("create request");
    let second =
        RequestService::create(&mut emp, &ctx, "S", date(2024, 3, 11), date(2024, 3, 15), 0.0, "again")
            .expect("create duplicate");

    assert_eq!(first.id, second.id);
    assert_eq!(emp.requests.len(), 1);
    assert_eq!(second.primary_code, "V");
    let comments: Vec<_> = second.comments.iter().map(|c| c.comment.as_str()).collect();
    assert_eq!(comments, vec!["first", "again"]);
}

#[test]
fn week_request_skips_unscheduled_days() {
    let mut emp = employee();
    let ctx = context();
    let request =
        RequestService::create(&mut emp, &ctx, "V", date(2024, 3, 10), date(2024, 3, 16), 0.0, "")
            .expect("create request");
    let dates: Vec<_> = request.requested_days.iter().map(|d| d.leave_date).collect();
    assert_eq!(
        dates,
        (11..=15).map(|d| date(2024, 3, d)).collect::<Vec<_>>()
    );
}

#[test]
fn holiday_rows_use_policy_hours() {
    let mut emp = employee();
    AssignmentService::edit(
        &mut emp,
        1,
        AssignmentEdit::SetWorkday {
            index: 2,
            code: "D".into(),
            workcenter: "OPS".into(),
            hours: 10.0,
        },
    )
    .expect("set workday");
    let ctx = context();
    let request =
        RequestService::create(&mut emp, &ctx, "H", date(2024, 3, 12), date(2024, 3, 12), 0.0, "")
            .expect("create request");
    assert_eq!(request.requested_days[0].hours, 8.0);
}

#[test]
fn create_rejects_reversed_range_and_bad_offset() {
    let mut emp = employee();
    let ctx = context();
    assert!(matches!(
        RequestService::create(&mut emp, &ctx, "V", date(2024, 3, 15), date(2024, 3, 11), 0.0, ""),
        Err(ServiceError::Validation(_))
    ));
    assert!(matches!(
        RequestService::create(&mut emp, &ctx, "V", date(2024, 3, 11), date(2024, 3, 11), 20.0, ""),
        Err(ServiceError::Validation(_))
    ));
    assert!(emp.requests.is_empty());
}

#[test]
fn approval_merges_only_positive_hour_days() {
    let mut emp = employee();
    let ctx = context();
    let request =
        RequestService::create(&mut emp, &ctx, "V", date(2024, 3, 11), date(2024, 3, 15), 0.0, "")
            .expect("create request");
    RequestService::edit(
        &mut emp,
        &ctx,
        request.id,
        LeaveRequestEdit::SetDay {
            date: date(2024, 3, 13),
            code: String::new(),
            hours: 8.0,
            workcenter: String::new(),
        },
    )
    .expect("clear wednesday");
    RequestService::submit(&mut emp, request.id).expect("submit request");
    RequestService::approve(&mut emp, &ctx, request.id, "boss", &catalog())
        .expect("approve request");
    // approving twice must not duplicate ledger entries
    RequestService::approve(&mut emp, &ctx, request.id, "boss", &catalog())
        .expect("re-approve request");

    let entries = tagged(&emp, request.id);
    assert_eq!(entries.len(), 4);
    assert!(entries.iter().all(|lv| lv.leave_date != date(2024, 3, 13)));
    assert!(entries.iter().all(|lv| lv.status == LeaveStatus::Approved));
}

#[test]
fn actual_leave_survives_automated_paths() {
    let mut emp = employee();
    let ctx = context();
    emp.leaves
        .push(LeaveDay::new(1, date(2024, 3, 12), "V", 8.0, LeaveStatus::Actual));
    let request = approved_week(&mut emp, &ctx);

    let actual = |emp: &Employee| {
        emp.leaves
            .iter()
            .filter(|lv| lv.is_actual())
            .map(|lv| (lv.leave_date, lv.code.clone(), lv.hours))
            .collect::<Vec<_>>()
    };
    let expected = vec![(date(2024, 3, 12), "V".to_string(), 8.0)];
    assert_eq!(actual(&emp), expected);

    RequestService::edit(
        &mut emp,
        &ctx,
        request.id,
        LeaveRequestEdit::SetDay {
            date: date(2024, 3, 12),
            code: "S".into(),
            hours: 4.0,
            workcenter: String::new(),
        },
    )
    .expect("edit tuesday");
    assert_eq!(actual(&emp), expected);

    RequestService::edit(
        &mut emp,
        &ctx,
        request.id,
        LeaveRequestEdit::SetDates {
            start: date(2024, 3, 4),
            end: date(2024, 3, 20),
        },
    )
    .expect("widen request");
    assert_eq!(actual(&emp), expected);

    RequestService::delete(&mut emp, &ctx, request.id).expect("delete request");
    assert_eq!(actual(&emp), expected);
    assert_eq!(emp.leaves.len(), 1);
    assert!(matches!(
        LeaveService::delete(&mut emp, 1),
        Err(ServiceError::StateConflict(_))
    ));
}

#[test]
fn set_day_on_approved_request_updates_ledger() {
    let mut emp = employee();
    let ctx = context();
    let request = approved_week(&mut emp, &ctx);
    RequestService::edit(
        &mut emp,
        &ctx,
        request.id,
        LeaveRequestEdit::SetDay {
            date: date(2024, 3, 12),
            code: "V".into(),
            hours: 4.0,
            workcenter: String::new(),
        },
    )
    .expect("halve tuesday");
    RequestService::edit(
        &mut emp,
        &ctx,
        request.id,
        LeaveRequestEdit::SetDay {
            date: date(2024, 3, 13),
            code: String::new(),
            hours: 0.0,
            workcenter: String::new(),
        },
    )
    .expect("drop wednesday");

    let tuesday: Vec<_> = emp
        .leaves
        .iter()
        .filter(|lv| lv.leave_date == date(2024, 3, 12))
        .collect();
    assert_eq!(tuesday.len(), 1);
    assert_eq!(tuesday[0].hours, 4.0);
    assert!(emp.leaves.iter().all(|lv| lv.leave_date != date(2024, 3, 13)));
    let row = emp
        .request(request.id)
        .and_then(|req| req.requested_day(date(2024, 3, 12)))
        .expect("tuesday row");
    assert_eq!(row.hours, 4.0);
}

#[test]
fn code_change_regenerates_only_for_same_code() {
    let mut emp = employee();
    let ctx = context();
    let request =
        RequestService::create(&mut emp, &ctx, "V", date(2024, 3, 12), date(2024, 3, 12), 0.0, "")
            .expect("create request");

    let change =
        RequestService::edit(&mut emp, &ctx, request.id, LeaveRequestEdit::SetCode("S".into()))
            .expect("change code");
    assert_eq!(change.request.primary_code, "S");
    assert_eq!(change.request.requested_days[0].code, "V");

    let change =
        RequestService::edit(&mut emp, &ctx, request.id, LeaveRequestEdit::SetCode("s".into()))
            .expect("re-enter code");
    assert_eq!(change.request.requested_days[0].code, "s");
}

#[test]
fn lifecycle_rejects_illegal_transitions() {
    let mut emp = employee();
    let ctx = context();
    let request =
        RequestService::create(&mut emp, &ctx, "V", date(2024, 3, 12), date(2024, 3, 12), 0.0, "")
            .expect("create request");
    assert!(matches!(
        RequestService::approve(&mut emp, &ctx, request.id, "boss", &catalog()),
        Err(ServiceError::StateConflict(_))
    ));
    RequestService::submit(&mut emp, request.id).expect("submit request");
    RequestService::submit(&mut emp, request.id).expect("submit again");
    RequestService::approve(&mut emp, &ctx, request.id, "boss", &catalog())
        .expect("approve request");
    assert!(matches!(
        RequestService::submit(&mut emp, request.id),
        Err(ServiceError::StateConflict(_))
    ));
    assert!(matches!(
        RequestService::submit(&mut emp, Uuid::new_v4()),
        Err(ServiceError::NotFound(_))
    ));
}

#[test]
fn invalid_edit_leaves_request_untouched() {
    let mut emp = employee();
    let ctx = context();
    let request = approved_week(&mut emp, &ctx);
    let before = emp.clone();
    let err = RequestService::edit(
        &mut emp,
        &ctx,
        request.id,
        LeaveRequestEdit::SetDates {
            start: date(2024, 3, 20),
            end: date(2024, 3, 1),
        },
    )
    .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
    assert_eq!(emp, before);
    assert!(matches!(
        RequestService::edit(&mut emp, &ctx, Uuid::new_v4(), LeaveRequestEdit::AddComment("x".into())),
        Err(ServiceError::NotFound(_))
    ));
}

#[test]
fn unapprove_returns_to_draft() {
    let mut emp = employee();
    let ctx = context();
    let request = approved_week(&mut emp, &ctx);
    let change = RequestService::unapprove(&mut emp, &ctx, request.id, "coverage gap")
        .expect("unapprove request");

    assert_eq!(change.request.status, RequestStatus::Draft);
    assert!(change.request.approved_by.is_none());
    assert_eq!(
        change.message.as_deref(),
        Some("Leave Request: Leave Request unapproved.\nComment: coverage gap")
    );
    assert_eq!(
        change.request.comments.last().map(|c| c.comment.as_str()),
        Some("coverage gap")
    );
    assert!(change
        .request
        .requested_days
        .iter()
        .all(|day| day.status == Some(LeaveStatus::Requested)));
    assert!(emp.leaves.is_empty());
}

#[test]
fn delete_reports_and_clears_ledger() {
    let mut emp = employee();
    let ctx = context();
    let request = approved_week(&mut emp, &ctx);
    let message = RequestService::delete(&mut emp, &ctx, request.id).expect("delete request");
    assert_eq!(
        message,
        "Deleted Leave Request for Lovelace, Ada, Dates: 03/11/24 to 03/15/24"
    );
    assert!(emp.requests.is_empty());
    assert!(emp.leaves.is_empty());
}

#[test]
fn schedule_modification_writes_variation() {
    let mut emp = employee();
    let ctx = context();
    let request =
        RequestService::create(&mut emp, &ctx, "mod", date(2024, 3, 12), date(2024, 3, 13), 0.0, "")
            .expect("create mod request");
    assert_eq!(request.requested_days.len(), 7);
    assert_eq!(request.requested_days[0].leave_date, date(2024, 3, 10));
    assert_eq!(request.requested_days[2].code, "D");
    assert_eq!(request.requested_days[2].workcenter, "OPS");

    for (day, code, hours, workcenter) in [(12, "N", 10.0, "NIGHT"), (13, "V", 8.0, "")] {
        RequestService::edit(
            &mut emp,
            &ctx,
            request.id,
            LeaveRequestEdit::SetDay {
                date: date(2024, 3, day),
                code: code.into(),
                hours,
                workcenter: workcenter.into(),
            },
        )
        .expect("edit mod day");
    }
    RequestService::submit(&mut emp, request.id).expect("submit request");
    RequestService::approve(&mut emp, &ctx, request.id, "boss", &catalog())
        .expect("approve request");

    let range = DateRange::new(date(2024, 3, 12), date(2024, 3, 13));
    assert!(VariationService::find_mod(&emp, range).is_some());
    let leave = tagged(&emp, request.id);
    assert_eq!(leave.len(), 1);
    assert_eq!(leave[0].leave_date, date(2024, 3, 13));

    let resolver = WorkdayResolver::new(&emp, &ctx.policy);
    let tuesday = resolver.resolve(date(2024, 3, 12), epoch()).expect("tuesday");
    assert_eq!((tuesday.code.as_str(), tuesday.workcenter.as_str()), ("N", "NIGHT"));
    assert_eq!(resolver.resolve(date(2024, 3, 13), epoch()).expect("wed").code, "V");
    assert_eq!(resolver.resolve(date(2024, 3, 14), epoch()).expect("thu").code, "D");

    RequestService::delete(&mut emp, &ctx, request.id).expect("delete request");
    assert!(emp.variations.is_empty());
    assert!(emp.leaves.is_empty());
    let resolver = WorkdayResolver::new(&emp, &ctx.policy);
    assert_eq!(resolver.resolve(date(2024, 3, 12), epoch()).expect("tuesday").code, "D");
}

#[test]
fn modification_days_land_on_weekday_shifted_slots() {
    let mut emp = employee();
    let ctx = context();
    let request =
        RequestService::create(&mut emp, &ctx, "mod", date(2024, 3, 13), date(2024, 3, 14), 0.0, "")
            .expect("create mod request");
    RequestService::edit(
        &mut emp,
        &ctx,
        request.id,
        LeaveRequestEdit::SetDay {
            date: date(2024, 3, 13),
            code: "N".into(),
            hours: 10.0,
            workcenter: "NIGHT".into(),
        },
    )
    .expect("edit mod day");
    RequestService::submit(&mut emp, request.id).expect("submit request");
    RequestService::approve(&mut emp, &ctx, request.id, "boss", &catalog())
        .expect("approve request");

    let range = DateRange::new(date(2024, 3, 13), date(2024, 3, 14));
    let variation = VariationService::find_mod(&emp, range).expect("mod variation");
    let codes: Vec<&str> = variation
        .schedule
        .workdays
        .iter()
        .map(|day| day.code.as_str())
        .collect();
    // Wednesday start shifts every weekday by three slots
    assert_eq!(codes, ["D", "D", "", "", "D", "D", "N"]);

    let resolver = WorkdayResolver::new(&emp, &ctx.policy);
    let wednesday = resolver.resolve(date(2024, 3, 13), epoch()).expect("wednesday");
    assert_eq!((wednesday.code.as_str(), wednesday.hours), ("N", 10.0));
    assert_eq!(resolver.resolve(date(2024, 3, 14), epoch()).expect("thursday").code, "D");
}

#[test]
fn moving_an_approved_modification_needs_reapproval() {
    let mut emp = employee();
    let ctx = context();
    let request =
        RequestService::create(&mut emp, &ctx, "mod", date(2024, 3, 12), date(2024, 3, 13), 0.0, "")
            .expect("create mod request");
    RequestService::submit(&mut emp, request.id).expect("submit request");
    RequestService::approve(&mut emp, &ctx, request.id, "boss", &catalog())
        .expect("approve request");
    assert_eq!(emp.variations.len(), 1);

    let change = RequestService::edit(
        &mut emp,
        &ctx,
        request.id,
        LeaveRequestEdit::SetEnd(date(2024, 3, 12)),
    )
    .expect("shrink mod");
    assert_eq!(change.request.status, RequestStatus::Requested);
    assert!(emp.variations.is_empty());
}

#[test]
fn assignment_timeline_stays_contiguous() {
    let mut emp = employee();
    let ctx = context();
    let second = AssignmentService::add(&mut emp, &ctx.policy, "DGS", "OPS", date(2024, 3, 1))
        .expect("add second");
    assert_contiguous(&emp);
    let third = AssignmentService::add(&mut emp, &ctx.policy, "XYZ", "LAB", date(2024, 6, 1))
        .expect("add third");
    assert_eq!((second, third), (2, 3));
    assert_contiguous(&emp);
    assert_eq!(emp.assignments[1].end_date, date(2024, 5, 31));

    assert!(matches!(
        AssignmentService::add(&mut emp, &ctx.policy, "DGS", "OPS", date(2024, 6, 1)),
        Err(ServiceError::Validation(_))
    ));
    assert!(matches!(
        AssignmentService::remove(&mut emp, 1),
        Err(ServiceError::StateConflict(_))
    ));
    assert!(matches!(
        AssignmentService::remove(&mut emp, 99),
        Err(ServiceError::NotFound(_))
    ));

    AssignmentService::remove(&mut emp, 2).expect("remove middle");
    assert_contiguous(&emp);
    assert_eq!(emp.assignments[0].end_date, date(2024, 5, 31));

    AssignmentService::remove(&mut emp, 3).expect("remove last");
    assert_contiguous(&emp);
    assert!(emp.assignments[0].is_open());
}

#[test]
fn assignment_edits_keep_predecessor_aligned() {
    let mut emp = employee();
    let ctx = context();
    AssignmentService::add(&mut emp, &ctx.policy, "DGS", "OPS", date(2024, 3, 1)).expect("add");
    AssignmentService::edit(&mut emp, 2, AssignmentEdit::SetStart(date(2024, 2, 15)))
        .expect("move start");
    assert_eq!(emp.assignments[0].end_date, date(2024, 2, 14));
    assert_contiguous(&emp);
    assert!(matches!(
        AssignmentService::edit(&mut emp, 2, AssignmentEdit::SetStart(date(2023, 12, 1))),
        Err(ServiceError::Validation(_))
    ));

    let labor = EmployeeLaborCode::new("CHG-1", "01");
    AssignmentService::edit(&mut emp, 2, AssignmentEdit::AddLaborCode(labor.clone()))
        .expect("add labor");
    assert!(AssignmentService::has_labor_code(&emp, "chg-1", "01"));
    assert!(AssignmentService::is_primary_code(&emp, date(2024, 3, 12), "CHG-1", "01"));
    assert!(!AssignmentService::is_primary_code(&emp, date(2024, 1, 12), "CHG-1", "01"));
    assert!(AssignmentService::delete_labor_code(&mut emp, "CHG-1", "01"));
    assert!(matches!(
        AssignmentService::edit(&mut emp, 2, AssignmentEdit::RemoveLaborCode(labor)),
        Err(ServiceError::NotFound(_))
    ));
    assert!(matches!(
        AssignmentService::edit(&mut emp, 2, AssignmentEdit::ResizeSchedule(0)),
        Err(ServiceError::Validation(_))
    ));
}

#[test]
fn variation_service_crud() {
    let mut emp = employee();
    let range = DateRange::new(date(2024, 3, 11), date(2024, 3, 15));
    let id = VariationService::add(&mut emp, "DGS", range, true).expect("add variation");
    VariationService::edit(
        &mut emp,
        id,
        VariationEdit::SetWorkday {
            index: 1,
            code: "N".into(),
            workcenter: "NIGHT".into(),
            hours: 10.0,
        },
    )
    .expect("set workday");
    let ctx = context();
    let resolver = WorkdayResolver::new(&emp, &ctx.policy);
    assert_eq!(resolver.resolve(date(2024, 3, 11), epoch()).expect("mon").code, "N");
    assert!(VariationService::find_mod(&emp, range).is_none());

    assert!(matches!(
        VariationService::edit(
            &mut emp,
            id,
            VariationEdit::SetDates {
                start: date(2024, 3, 15),
                end: date(2024, 3, 11)
            }
        ),
        Err(ServiceError::Validation(_))
    ));
    VariationService::remove(&mut emp, id).expect("remove variation");
    assert!(matches!(
        VariationService::remove(&mut emp, id),
        Err(ServiceError::NotFound(_))
    ));
}

#[test]
fn variation_workday_outside_schedule_is_rejected() {
    let mut emp = employee();
    let range = DateRange::new(date(2024, 3, 11), date(2024, 3, 15));
    let id = VariationService::add(&mut emp, "DGS", range, false).expect("add variation");
    let before = emp.variation(id).cloned();
    for index in [7, usize::MAX] {
        assert!(matches!(
            VariationService::edit(
                &mut emp,
                id,
                VariationEdit::SetWorkday {
                    index,
                    code: "N".into(),
                    workcenter: "NIGHT".into(),
                    hours: 10.0,
                },
            ),
            Err(ServiceError::Validation(_))
        ));
    }
    assert_eq!(emp.variation(id).cloned(), before);
}

#[test]
fn leave_ledger_maintenance() {
    let mut emp = employee();
    let id = LeaveService::add(&mut emp, None, date(2024, 3, 12), "V", LeaveStatus::Approved, 8.0, None);
    let same = LeaveService::add(&mut emp, None, date(2024, 3, 12), "v", LeaveStatus::Actual, 4.0, None);
    assert_eq!(id, same);
    assert_eq!(emp.leaves.len(), 1);
    assert!(emp.leaves[0].is_actual());

    LeaveService::add(&mut emp, None, date(2024, 3, 5), "S", LeaveStatus::Actual, 8.0, None);
    LeaveService::add(&mut emp, None, date(2024, 3, 20), "V", LeaveStatus::Approved, 8.0, None);
    LeaveService::add(&mut emp, None, date(2024, 4, 2), "V", LeaveStatus::Actual, 8.0, None);

    let previous = LeaveService::update(&mut emp, id, LeaveEdit::SetHours(6.0)).expect("update");
    assert_eq!(previous.hours, 4.0);
    assert!(matches!(
        LeaveService::update(&mut emp, 42, LeaveEdit::SetHours(1.0)),
        Err(ServiceError::NotFound(_))
    ));

    let ctx = context();
    assert_eq!(LeaveService::leave_hours(&emp, date(2024, 3, 1), date(2024, 4, 1)), 14.0);
    assert_eq!(
        LeaveService::pto_hours(&emp, &ctx.policy, date(2024, 3, 1), date(2024, 4, 1)),
        6.0
    );

    let approved = emp
        .leaves
        .iter()
        .find(|lv| lv.status == LeaveStatus::Approved)
        .map(|lv| lv.id)
        .expect("approved entry");
    LeaveService::delete(&mut emp, approved).expect("delete approved");
    let ids: Vec<_> = emp.leaves.iter().map(|lv| lv.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);

    let removed = LeaveService::delete_between(
        &mut emp,
        DateRange::new(date(2024, 3, 1), date(2024, 4, 30)),
    );
    assert_eq!(removed, 0);
    assert_eq!(emp.leaves.len(), 3);
}

#[test]
fn carryover_follows_prior_year() {
    let mut emp = employee();
    let ctx = context();
    emp.balances.push(AnnualLeave::new(2023, 120.0, 16.0));
    for (idx, (day, code, status)) in [
        (date(2023, 2, 1), "V", LeaveStatus::Actual),
        (date(2023, 6, 1), "V", LeaveStatus::Actual),
        (date(2023, 9, 1), "V", LeaveStatus::Actual),
        (date(2023, 10, 2), "V", LeaveStatus::Approved),
        (date(2023, 11, 1), "S", LeaveStatus::Actual),
        (date(2024, 1, 3), "V", LeaveStatus::Actual),
    ]
    .into_iter()
    .enumerate()
    {
        emp.leaves
            .push(LeaveDay::new(idx as u32 + 1, day, code, 8.0, status));
    }

    assert!(BalanceService::create_leave_balance(&mut emp, &ctx.policy, 2024));
    assert!(!BalanceService::create_leave_balance(&mut emp, &ctx.policy, 2024));
    let balance = emp.balance(2024).expect("2024 balance");
    assert_eq!(balance.annual, 120.0);
    assert_eq!(balance.carryover, 112.0);
    assert_eq!(balance.available(), 232.0);

    let mut fresh = employee();
    assert!(BalanceService::create_leave_balance(&mut fresh, &ctx.policy, 2030));
    assert_eq!(fresh.balance(2030), Some(&AnnualLeave::new(2030, 120.0, 0.0)));

    BalanceService::update_annual_leave(&mut fresh, 2030, 160.0, 4.0).expect("update balance");
    assert_eq!(fresh.balance(2030), Some(&AnnualLeave::new(2030, 160.0, 4.0)));
}

#[test]
fn timesheet_queries_and_forecast() {
    let mut emp = employee();
    let ctx = context();
    AssignmentService::edit(
        &mut emp,
        1,
        AssignmentEdit::AddLaborCode(EmployeeLaborCode::new("CHG-1", "01")),
    )
    .expect("add labor");
    emp.work.push(Work::new(date(2024, 3, 11), "CHG-1", "01", 8.0));
    emp.work
        .push(Work::new(date(2024, 3, 9), "CHG-1", "01", 2.0).modified());

    assert_eq!(TimesheetService::worked_hours(&emp, date(2024, 3, 1), date(2024, 3, 31)), 8.0);
    assert_eq!(
        TimesheetService::worked_hours_for_labor(&emp, "chg-1", "01", date(2024, 3, 1), date(2024, 3, 31)),
        10.0
    );
    assert!(TimesheetService::has_mod_time(&emp, date(2024, 3, 9), date(2024, 3, 9)));
    assert_eq!(TimesheetService::mod_time(&emp, date(2024, 3, 1), date(2024, 3, 31)), 2.0);
    assert_eq!(emp.last_workday(), date(2024, 3, 11));

    let labor = LaborCode::new("CHG-1", "01", date(2024, 1, 1), date(2024, 12, 31));
    let forecast = TimesheetService::forecast_hours(
        &emp,
        &ctx.policy,
        &labor,
        date(2024, 3, 11),
        date(2024, 3, 18),
        &catalog(),
    );
    assert_eq!(forecast, 32.0);

    let other = LaborCode::new("CHG-2", "01", date(2024, 1, 1), date(2024, 12, 31));
    assert_eq!(
        TimesheetService::forecast_hours(
            &emp,
            &ctx.policy,
            &other,
            date(2024, 3, 11),
            date(2024, 3, 18),
            &catalog()
        ),
        0.0
    );
}

#[test]
fn purge_drops_old_history() {
    let mut emp = employee();
    let ctx = context();
    VariationService::add(
        &mut emp,
        "DGS",
        DateRange::new(date(2023, 12, 1), date(2023, 12, 31)),
        false,
    )
    .expect("add variation");
    emp.leaves
        .push(LeaveDay::new(1, date(2023, 12, 20), "V", 8.0, LeaveStatus::Actual));
    emp.leaves
        .push(LeaveDay::new(2, date(2024, 2, 20), "V", 8.0, LeaveStatus::Actual));
    emp.balances.push(AnnualLeave::new(2023, 120.0, 0.0));
    emp.balances.push(AnnualLeave::new(2024, 120.0, 0.0));
    RequestService::create(&mut emp, &ctx, "V", date(2023, 12, 20), date(2023, 12, 20), 0.0, "")
        .expect("old request");

    assert!(!PurgeService::purge_before(&mut emp, date(2024, 1, 1)));
    assert!(emp.variations.is_empty());
    assert!(emp.requests.is_empty());
    assert_eq!(emp.leaves.len(), 1);
    assert_eq!(emp.leaves[0].id, 1);
    assert_eq!(emp.balances.len(), 1);

    emp.assignments[0].end_date = date(2024, 6, 30);
    assert!(PurgeService::purge_before(&mut emp, date(2024, 7, 1)));
    assert_eq!(emp.assignments.len(), 1);
}
