//! Attendance data sources and employee directories.
//!
//! The check-in pipeline and the employee store live outside this crate;
//! these traits are the only way the report engine reaches them.

mod file;
mod http;
mod memory;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{AttendanceRecord, Employee};
use crate::range::DateRange;

pub use file::JsonFileSource;
pub use http::HttpSource;
pub use memory::MemorySource;

/// Range-scoped access to raw attendance records.
///
/// Implementations may return records outside the requested range and in
/// any order.
#[async_trait]
pub trait AttendanceSource: Send + Sync {
    async fn fetch_range(&self, range: &DateRange) -> Result<Vec<AttendanceRecord>>;
}

/// Listing of all known employees.
#[async_trait]
pub trait EmployeeDirectory: Send + Sync {
    async fn employees(&self) -> Result<Vec<Employee>>;
}
