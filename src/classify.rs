//! Attendance status classification and duration formatting.

use chrono::{NaiveTime, TimeDelta};

use crate::models::{AttendanceRecord, AttendanceStatus, ClassifiedRecord};

/// Office start time used when no policy is configured.
pub const DEFAULT_LATE_AFTER: NaiveTime = match NaiveTime::from_hms_opt(9, 0, 0) {
    Some(time) => time,
    None => NaiveTime::MIN,
};

/// Cutoff policy deciding Present vs Late.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassificationPolicy {
    /// Check-ins strictly after this time are late.
    pub late_after: NaiveTime,
}

impl ClassificationPolicy {
    pub fn new(late_after: NaiveTime) -> Self {
        Self { late_after }
    }

    /// Status for a first check-in under this policy.
    pub fn status_for(&self, first_check_in: Option<NaiveTime>) -> AttendanceStatus {
        match first_check_in {
            None => AttendanceStatus::Absent,
            Some(t) if t <= self.late_after => AttendanceStatus::Present,
            Some(_) => AttendanceStatus::Late,
        }
    }
}

impl Default for ClassificationPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_LATE_AFTER)
    }
}

/// Annotate a record with its status and formatted durations.
pub fn classify(record: AttendanceRecord, policy: &ClassificationPolicy) -> ClassifiedRecord {
    let status = policy.status_for(record.first_check_in);
    let work_time = format_duration(record.total_present);
    let break_time = format_duration(record.total_break);

    ClassifiedRecord {
        record,
        status,
        work_time,
        break_time,
    }
}

/// Format a duration as `{hours}h {minutes}m`, truncating seconds.
///
/// Negative durations render as `0h 0m`.
pub fn format_duration(duration: TimeDelta) -> String {
    let total_minutes = duration.num_minutes().max(0);
    format!("{}h {}m", total_minutes / 60, total_minutes % 60)
}

/// Work out present and break time from a day's check-in trail.
///
/// The day's span runs from first check-in to last sighting. Present time is
/// the accumulated work seconds, or the whole span when nothing was
/// accumulated; break time is whatever part of the span was not present.
pub fn derive_durations(
    first_in: Option<NaiveTime>,
    last_seen: Option<NaiveTime>,
    total_work_seconds: f64,
) -> (TimeDelta, TimeDelta) {
    let span = match (first_in, last_seen) {
        (Some(first), Some(last)) if last > first => last - first,
        _ => TimeDelta::zero(),
    };

    let accumulated = if total_work_seconds.is_finite() && total_work_seconds > 0.0 {
        TimeDelta::try_seconds(total_work_seconds as i64).unwrap_or_else(TimeDelta::zero)
    } else {
        TimeDelta::zero()
    };

    let present = if accumulated.is_zero() { span } else { accumulated };
    let on_break = (span - present).max(TimeDelta::zero());

    (present, on_break)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn hms(h: u32, m: u32, s: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, s).unwrap()
    }

    fn record(first_check_in: Option<NaiveTime>) -> AttendanceRecord {
        AttendanceRecord {
            employee_id: "E1".to_string(),
            name: "Ana".to_string(),
            department: None,
            date: NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(),
            first_check_in,
            total_present: TimeDelta::zero(),
            total_break: TimeDelta::zero(),
            image_ref: None,
        }
    }

    #[test]
    fn test_no_check_in_is_absent_with_zero_durations() {
        let classified = classify(record(None), &ClassificationPolicy::default());

        assert_eq!(classified.status, AttendanceStatus::Absent);
        assert_eq!(classified.work_time, "0h 0m");
        assert_eq!(classified.break_time, "0h 0m");
    }

    #[test]
    fn test_cutoff_is_inclusive() {
        let policy = ClassificationPolicy::default();

        assert_eq!(policy.status_for(Some(hms(8, 59, 59))), AttendanceStatus::Present);
        assert_eq!(policy.status_for(Some(hms(9, 0, 0))), AttendanceStatus::Present);
        assert_eq!(policy.status_for(Some(hms(9, 0, 1))), AttendanceStatus::Late);
    }

    #[test]
    fn test_default_cutoff_is_nine() {
        assert_eq!(ClassificationPolicy::default().late_after, hms(9, 0, 0));
    }

    #[test]
    fn test_custom_cutoff() {
        let policy = ClassificationPolicy::new(hms(10, 30, 0));
        assert_eq!(policy.status_for(Some(hms(10, 15, 0))), AttendanceStatus::Present);
        assert_eq!(policy.status_for(Some(hms(10, 31, 0))), AttendanceStatus::Late);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(TimeDelta::zero()), "0h 0m");
        assert_eq!(format_duration(TimeDelta::seconds(59)), "0h 0m");
        assert_eq!(format_duration(TimeDelta::minutes(61)), "1h 1m");
        assert_eq!(format_duration(TimeDelta::hours(27) + TimeDelta::minutes(5)), "27h 5m");
        assert_eq!(format_duration(TimeDelta::minutes(-30)), "0h 0m");
    }

    #[test]
    fn test_derive_uses_accumulated_work() {
        let (present, on_break) = derive_durations(Some(hms(8, 0, 0)), Some(hms(17, 0, 0)), 7.5 * 3600.0);
        assert_eq!(present, TimeDelta::minutes(450));
        assert_eq!(on_break, TimeDelta::minutes(90));
    }

    #[test]
    fn test_derive_falls_back_to_span() {
        let (present, on_break) = derive_durations(Some(hms(8, 0, 0)), Some(hms(12, 0, 0)), 0.0);
        assert_eq!(present, TimeDelta::hours(4));
        assert_eq!(on_break, TimeDelta::zero());
    }

    #[test]
    fn test_derive_without_last_seen() {
        let (present, on_break) = derive_durations(Some(hms(8, 0, 0)), None, 0.0);
        assert!(present.is_zero());
        assert!(on_break.is_zero());
    }

    #[test]
    fn test_derive_work_longer_than_span_has_no_break() {
        let (present, on_break) = derive_durations(Some(hms(8, 0, 0)), Some(hms(9, 0, 0)), 7200.0);
        assert_eq!(present, TimeDelta::hours(2));
        assert!(on_break.is_zero());
    }
}
