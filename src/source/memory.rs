//! In-memory source, used for tests and pre-loaded data.

use async_trait::async_trait;

use super::{AttendanceSource, EmployeeDirectory};
use crate::error::{AppError, Result};
use crate::models::{AttendanceRecord, Employee};
use crate::range::DateRange;

/// Records and employees held in memory.
///
/// `fetch_range` hands back every record it holds; the engine narrows them
/// to the requested range.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    records: Vec<AttendanceRecord>,
    employees: Vec<Employee>,
    outage: Option<String>,
}

impl MemorySource {
    pub fn new(records: Vec<AttendanceRecord>) -> Self {
        Self {
            records,
            ..Default::default()
        }
    }

    pub fn with_employees(mut self, employees: Vec<Employee>) -> Self {
        self.employees = employees;
        self
    }

    /// Make every call fail as if the backend were down.
    pub fn unreachable(reason: impl Into<String>) -> Self {
        Self {
            outage: Some(reason.into()),
            ..Default::default()
        }
    }

    fn check_online(&self) -> Result<()> {
        match &self.outage {
            Some(reason) => Err(AppError::unavailable(reason.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl AttendanceSource for MemorySource {
    async fn fetch_range(&self, _range: &DateRange) -> Result<Vec<AttendanceRecord>> {
        self.check_online()?;
        Ok(self.records.clone())
    }
}

#[async_trait]
impl EmployeeDirectory for MemorySource {
    async fn employees(&self) -> Result<Vec<Employee>> {
        self.check_online()?;
        Ok(self.employees.clone())
    }
}
