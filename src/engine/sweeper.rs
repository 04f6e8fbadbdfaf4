//! Auto-checkout sweeper: a periodic pass that closes attendance records
//! left open past scheduled-out + grace. The decision itself is a pure
//! function; the loop does the fetching and the conditional close.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, Utc};
use sqlx::MySqlPool;
use tracing::{error, info};

use crate::engine::derive::derive_day;
use crate::engine::schedule::{self, ResolvedSchedule};
use crate::engine::time::{at_time_of_day, to_company_local, to_utc, today_in_company};
use crate::store;

/// When (if at all) an open record should be closed. `None` while the grace
/// window is still running, on weekly-off days, and on approved-leave days.
pub fn close_instant(
    date: NaiveDate,
    schedule: &ResolvedSchedule,
    now_local: NaiveDateTime,
    on_approved_leave: bool,
) -> Option<NaiveDateTime> {
    if on_approved_leave {
        return None;
    }
    if schedule.is_weekly_off(date.weekday()) {
        return None;
    }
    let due = at_time_of_day(date, schedule.fixed_out)
        + Duration::minutes(schedule.grace_minutes as i64);
    if now_local >= due { Some(due) } else { None }
}

/// One sweep over every tenant. Idempotent per record: only null-checkout
/// rows are touched, and the close is a conditional update.
pub async fn sweep_once(pool: &MySqlPool, now: DateTime<Utc>) -> anyhow::Result<u64> {
    let mut closed = 0u64;

    for company in store::list_companies(pool).await? {
        let today = today_in_company(now, company.tz_offset_minutes);
        let now_local = to_company_local(now, company.tz_offset_minutes);

        for record in store::open_attendance_for_date(pool, company.id, today).await? {
            if store::has_approved_leave_on(pool, company.id, record.employee_id, record.date)
                .await?
            {
                continue;
            }

            let active =
                store::fetch_active_schedule(pool, company.id, record.employee_id).await?;
            let resolved = schedule::resolve(active.as_ref(), Some(&company));

            let Some(due_local) = close_instant(record.date, &resolved, now_local, false) else {
                continue;
            };

            let check_in_local = record
                .check_in
                .map(|ci| ci + Duration::minutes(company.tz_offset_minutes as i64));
            let derived = derive_day(record.date, check_in_local, Some(due_local), &resolved);
            let due_utc = to_utc(due_local, company.tz_offset_minutes);

            let affected =
                store::close_attendance_if_open(pool, record.id, due_utc, &derived, true).await?;
            if affected > 0 {
                closed += 1;
                info!(
                    employee_id = record.employee_id,
                    date = %record.date,
                    status = %derived.status,
                    "auto-checkout closed open attendance"
                );
            }
        }
    }

    Ok(closed)
}

/// Recurring sweep task, spawned from `main` on the actix system.
pub async fn run(pool: MySqlPool, interval_secs: u64) {
    let mut ticker =
        actix_web::rt::time::interval(std::time::Duration::from_secs(interval_secs.max(1)));
    loop {
        ticker.tick().await;
        match sweep_once(&pool, Utc::now()).await {
            Ok(0) => {}
            Ok(n) => info!(closed = n, "auto-checkout sweep finished"),
            Err(e) => error!(error = %e, "auto-checkout sweep failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveTime, Weekday};
    use std::collections::HashSet;

    fn sched() -> ResolvedSchedule {
        ResolvedSchedule {
            fixed_in: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            fixed_out: NaiveTime::from_hms_opt(18, 30, 0).unwrap(),
            weekly_off: HashSet::from([Weekday::Sun]),
            grace_minutes: 15,
        }
    }

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 3).unwrap()
    }

    #[test]
    fn closes_at_scheduled_out_plus_grace() {
        let now = monday().and_hms_opt(18, 50, 0).unwrap();
        let due = close_instant(monday(), &sched(), now, false);
        assert_eq!(due, Some(monday().and_hms_opt(18, 45, 0).unwrap()));
    }

    #[test]
    fn waits_out_the_grace_window() {
        let now = monday().and_hms_opt(18, 40, 0).unwrap();
        assert_eq!(close_instant(monday(), &sched(), now, false), None);

        // boundary: exactly at due
        let now = monday().and_hms_opt(18, 45, 0).unwrap();
        assert!(close_instant(monday(), &sched(), now, false).is_some());
    }

    #[test]
    fn never_fires_on_weekly_off() {
        let sunday = NaiveDate::from_ymd_opt(2025, 3, 2).unwrap();
        let now = sunday.and_hms_opt(23, 0, 0).unwrap();
        assert_eq!(close_instant(sunday, &sched(), now, false), None);
    }

    #[test]
    fn never_fires_on_approved_leave() {
        let now = monday().and_hms_opt(23, 0, 0).unwrap();
        assert_eq!(close_instant(monday(), &sched(), now, true), None);
    }
}
