//! Circulation timing rules.
//!
//! The atomic borrow/return transitions live in the database layer; this
//! module owns the caller-facing loan-duration rules feeding them.

use chrono::Duration;

use crate::error::CoreError;
use crate::types::Timestamp;

/// Loan duration applied when the caller does not supply one.
pub const DEFAULT_LOAN_DAYS: i64 = 14;

/// Longest loan a caller may request.
pub const MAX_LOAN_DAYS: i64 = 365;

/// Validate a requested loan duration in days.
pub fn validate_loan_days(days: i64) -> Result<(), CoreError> {
    if (1..=MAX_LOAN_DAYS).contains(&days) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Loan duration must be between 1 and {MAX_LOAN_DAYS} days, got {days}"
        )))
    }
}

/// Compute the due date for a loan starting at `borrowed_at`.
pub fn due_date(borrowed_at: Timestamp, days: i64) -> Timestamp {
    borrowed_at + Duration::days(days)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::{TimeZone, Utc};

    use super::*;

    #[test]
    fn loan_days_bounds() {
        assert!(validate_loan_days(1).is_ok());
        assert!(validate_loan_days(DEFAULT_LOAN_DAYS).is_ok());
        assert!(validate_loan_days(MAX_LOAN_DAYS).is_ok());
        assert_matches!(validate_loan_days(0), Err(CoreError::Validation(_)));
        assert_matches!(validate_loan_days(-3), Err(CoreError::Validation(_)));
        assert_matches!(
            validate_loan_days(MAX_LOAN_DAYS + 1),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn due_date_adds_whole_days() {
        let start = Utc.with_ymd_and_hms(2025, 3, 1, 12, 30, 0).unwrap();
        let due = due_date(start, 14);
        assert_eq!(due, Utc.with_ymd_and_hms(2025, 3, 15, 12, 30, 0).unwrap());
    }
}
