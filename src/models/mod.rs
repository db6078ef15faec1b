//! Data models for employees and attendance records.

pub mod attendance;
pub mod employee;

pub use attendance::{AttendanceRecord, AttendanceRow, AttendanceStatus, ClassifiedRecord, StatusFilter};
pub use employee::Employee;
