//! Offline JSON store written by the check-in service.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::{AttendanceSource, EmployeeDirectory};
use crate::error::{AppError, Result};
use crate::models::{AttendanceRecord, AttendanceRow, Employee};
use crate::range::DateRange;

/// Reads `offline_attendance.json` and `offline_employees.json`.
///
/// Attendance rows only carry the employee key, so each fetch joins them
/// against the employee file.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    attendance_path: PathBuf,
    employees_path: PathBuf,
}

impl JsonFileSource {
    pub fn new(attendance_path: impl Into<PathBuf>, employees_path: impl Into<PathBuf>) -> Self {
        Self {
            attendance_path: attendance_path.into(),
            employees_path: employees_path.into(),
        }
    }
}

#[async_trait]
impl AttendanceSource for JsonFileSource {
    async fn fetch_range(&self, range: &DateRange) -> Result<Vec<AttendanceRecord>> {
        let rows: Vec<AttendanceRow> = read_json(&self.attendance_path).await?;
        let employees: Vec<Employee> = read_json(&self.employees_path).await?;
        let by_id: HashMap<i64, &Employee> = employees.iter().map(|e| (e.id, e)).collect();

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let Some(employee) = by_id.get(&row.employee_id) else {
                warn!("Skipping attendance row for unknown employee {}", row.employee_id);
                continue;
            };
            let record = row.join_employee(employee).into_record()?;
            if range.contains(record.date) {
                records.push(record);
            }
        }

        debug!(
            "Loaded {} records for {range} from {}",
            records.len(),
            self.attendance_path.display()
        );
        Ok(records)
    }
}

#[async_trait]
impl EmployeeDirectory for JsonFileSource {
    async fn employees(&self) -> Result<Vec<Employee>> {
        read_json(&self.employees_path).await
    }
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| AppError::unavailable(format!("Cannot read {}: {e}", path.display())))?;

    serde_json::from_str(&content).map_err(|e| AppError::parse(format!("Invalid JSON in {}: {e}", path.display())))
}
