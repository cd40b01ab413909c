//! Loan status classification
//!
//! Pure function of a borrow record and the current time. No side effects;
//! the result changes only with the wall clock.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::models::record::BorrowRecord;

const SECONDS_PER_DAY: i64 = 86_400;

/// Loan state of a borrow record at a given instant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LoanStatus {
    Returned,
    Active,
    Overdue {
        /// Whole days past due, rounded up, at least 1
        days_late: i64,
    },
}

/// Classify a record against `now`.
///
/// Returned wins over everything else: a record returned late is simply
/// `Returned`, however overdue it was at the time.
pub fn classify(record: &BorrowRecord, now: DateTime<Utc>) -> LoanStatus {
    if record.is_returned {
        return LoanStatus::Returned;
    }
    if now <= record.due_date {
        return LoanStatus::Active;
    }
    let late_seconds = (now - record.due_date).num_seconds();
    let days_late = ((late_seconds + SECONDS_PER_DAY - 1) / SECONDS_PER_DAY).max(1);
    LoanStatus::Overdue { days_late }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BookId, RecordId, StudentId};
    use chrono::Duration;

    fn record(borrowed_days_ago: i64, due_days_ago: i64, returned: bool) -> BorrowRecord {
        let now = Utc::now();
        BorrowRecord {
            id: RecordId::new(),
            student_id: StudentId::new(),
            student_name: "Grace Hopper".to_string(),
            student_roll_number: "NV-1906".to_string(),
            book_id: BookId::new(),
            book_title: "A Wizard of Earthsea".to_string(),
            book_author: "Ursula K. Le Guin".to_string(),
            borrow_date: now - Duration::days(borrowed_days_ago),
            due_date: now - Duration::days(due_days_ago),
            return_date: returned.then_some(now),
            is_returned: returned,
            version: 1,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn open_record_before_due_date_is_active() {
        let rec = record(1, -13, false);
        assert_eq!(classify(&rec, Utc::now()), LoanStatus::Active);
    }

    #[test]
    fn record_due_exactly_now_is_still_active() {
        let rec = record(14, 0, false);
        assert_eq!(classify(&rec, rec.due_date), LoanStatus::Active);
    }

    #[test]
    fn ten_days_late_classifies_as_overdue_ten() {
        let rec = record(24, 10, false);
        let status = classify(&rec, rec.due_date + Duration::days(10));
        assert_eq!(status, LoanStatus::Overdue { days_late: 10 });
    }

    #[test]
    fn lateness_rounds_up_with_a_floor_of_one() {
        let rec = record(15, 1, false);
        let just_past = rec.due_date + Duration::seconds(30);
        assert_eq!(classify(&rec, just_past), LoanStatus::Overdue { days_late: 1 });

        let a_day_and_a_bit = rec.due_date + Duration::seconds(SECONDS_PER_DAY + 1);
        assert_eq!(
            classify(&rec, a_day_and_a_bit),
            LoanStatus::Overdue { days_late: 2 }
        );
    }

    #[test]
    fn returned_record_is_returned_no_matter_how_late() {
        let rec = record(60, 46, true);
        assert_eq!(
            classify(&rec, rec.due_date + Duration::days(46)),
            LoanStatus::Returned
        );
    }
}
