//! Attendance DTOs and view models.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime, TimeDelta};
use serde::{Deserialize, Serialize};

use super::employee::Employee;
use crate::classify::derive_durations;
use crate::error::{AppError, Result};

/// Derived attendance status for one employee on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttendanceStatus {
    Present,
    Late,
    Absent,
}

impl AttendanceStatus {
    pub const ALL: [AttendanceStatus; 3] = [Self::Present, Self::Late, Self::Absent];

    /// Display label used in tables and exports.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Present => "Present",
            Self::Late => "Late",
            Self::Absent => "Absent",
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttendanceStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "present" => Ok(Self::Present),
            "late" => Ok(Self::Late),
            "absent" => Ok(Self::Absent),
            other => Err(AppError::parse(format!("Unknown attendance status '{other}'"))),
        }
    }
}

/// Status predicate of a report query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(AttendanceStatus),
}

impl StatusFilter {
    /// Check whether a status passes this filter.
    pub fn matches(self, status: AttendanceStatus) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == status,
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("All"),
            Self::Only(status) => f.write_str(status.as_str()),
        }
    }
}

impl FromStr for StatusFilter {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        s.parse().map(Self::Only)
    }
}

/// One employee-day of attendance as delivered by the check-in pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceRecord {
    pub employee_id: String,
    pub name: String,
    pub department: Option<String>,
    pub date: NaiveDate,
    /// First recognised check-in of the day, `None` when never seen.
    pub first_check_in: Option<NaiveTime>,
    pub total_present: TimeDelta,
    pub total_break: TimeDelta,
    pub image_ref: Option<String>,
}

impl AttendanceRecord {
    /// Placeholder record for an employee with no check-in on `date`.
    pub fn absent(employee: &Employee, date: NaiveDate) -> Self {
        Self {
            employee_id: employee.key(),
            name: employee.name.clone(),
            department: employee.department.clone(),
            date,
            first_check_in: None,
            total_present: TimeDelta::zero(),
            total_break: TimeDelta::zero(),
            image_ref: employee.image_path.clone(),
        }
    }
}

/// Attendance record annotated with its status and display durations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedRecord {
    pub record: AttendanceRecord,
    pub status: AttendanceStatus,
    /// Present duration as `{h}h {m}m`.
    pub work_time: String,
    /// Break duration as `{h}h {m}m`.
    pub break_time: String,
}

impl ClassifiedRecord {
    /// Entry time as `HH:MM:SS`, or `-` when there was no check-in.
    pub fn entry_time(&self) -> String {
        self.record
            .first_check_in
            .map(|t| t.format("%H:%M:%S").to_string())
            .unwrap_or_else(|| "-".to_string())
    }
}

/// Attendance row as stored by the check-in backend and its offline JSON store.
///
/// `employee_id` is the internal employee key; `custom_id` is the badge code
/// when the backend joins it in.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttendanceRow {
    pub employee_id: i64,
    #[serde(default)]
    pub custom_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub image_path: Option<String>,
    pub date: String,
    #[serde(default)]
    pub first_in: Option<String>,
    #[serde(default)]
    pub last_seen: Option<String>,
    #[serde(default)]
    pub total_work_seconds: f64,
}

impl AttendanceRow {
    /// Fill in the employee fields the offline store keeps out of the row.
    pub fn join_employee(mut self, employee: &Employee) -> Self {
        if self.custom_id.is_none() {
            self.custom_id = employee.code.clone();
        }
        if self.name.is_none() {
            self.name = Some(employee.name.clone());
        }
        if self.department.is_none() {
            self.department = employee.department.clone();
        }
        if self.image_path.is_none() {
            self.image_path = employee.image_path.clone();
        }
        self
    }

    /// Convert into an [`AttendanceRecord`], deriving present and break time.
    pub fn into_record(self) -> Result<AttendanceRecord> {
        let row_ref = format!("employee {} on '{}'", self.employee_id, self.date);

        let date = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d")
            .map_err(|e| AppError::invalid_record(format!("{row_ref}: bad date: {e}")))?;
        let first_in = parse_clock(self.first_in.as_deref())
            .map_err(|e| AppError::invalid_record(format!("{row_ref}: bad first_in: {e}")))?;
        let last_seen = parse_clock(self.last_seen.as_deref())
            .map_err(|e| AppError::invalid_record(format!("{row_ref}: bad last_seen: {e}")))?;
        let name = self
            .name
            .ok_or_else(|| AppError::invalid_record(format!("{row_ref}: missing employee name")))?;

        let (total_present, total_break) = derive_durations(first_in, last_seen, self.total_work_seconds);

        Ok(AttendanceRecord {
            employee_id: self.custom_id.unwrap_or_else(|| self.employee_id.to_string()),
            name,
            department: self.department,
            date,
            first_check_in: first_in,
            total_present,
            total_break,
            image_ref: self.image_path,
        })
    }
}

/// Parse a wall-clock value, treating empty text and `-` as "not seen".
fn parse_clock(value: Option<&str>) -> std::result::Result<Option<NaiveTime>, chrono::ParseError> {
    let value = match value.map(str::trim) {
        None | Some("") | Some("-") => return Ok(None),
        Some(v) => v,
    };

    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S%.f"))
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .map(Some)
}
