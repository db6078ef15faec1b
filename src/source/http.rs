//! REST client for the check-in backend.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::{AttendanceSource, EmployeeDirectory};
use crate::error::{AppError, Result};
use crate::models::{AttendanceRecord, AttendanceRow, Employee};
use crate::range::DateRange;

/// Check-in backend HTTP client.
///
/// Uses the backend's custom-range daily endpoint and always asks for every
/// status; classification happens on this side.
pub struct HttpSource {
    client: Client,
    base_url: String,
}

impl HttpSource {
    /// Create a new client instance.
    ///
    /// # Arguments
    /// * `base_url` - The backend URL (e.g., "http://localhost:5001")
    /// * `timeout` - Per-request timeout
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_text(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::unavailable(format!("GET {url} failed: {e}")))?;

        let response = response
            .error_for_status()
            .map_err(|e| AppError::unavailable(format!("GET {url} failed: {e}")))?;

        response
            .text()
            .await
            .map_err(|e| AppError::unavailable(format!("Reading {url} failed: {e}")))
    }

    fn daily_url(&self, range: &DateRange) -> String {
        format!(
            "{base}/api/attendance/daily?filter=custom&start_date={start}&end_date={end}&status=All",
            base = self.base_url,
            start = range.start().format("%Y-%m-%d"),
            end = range.end().format("%Y-%m-%d"),
        )
    }
}

#[async_trait]
impl AttendanceSource for HttpSource {
    async fn fetch_range(&self, range: &DateRange) -> Result<Vec<AttendanceRecord>> {
        let url = self.daily_url(range);
        let body = self.get_text(&url).await?;
        let rows = parse_rows(&body)?;

        // Offline backends leave out the badge code
        let employees = if rows.iter().any(|r| r.custom_id.is_none()) {
            self.employees().await?
        } else {
            Vec::new()
        };

        let records = into_records(rows, &employees)?;
        debug!("Backend returned {} rows for {range}", records.len());
        Ok(records)
    }
}

#[async_trait]
impl EmployeeDirectory for HttpSource {
    async fn employees(&self) -> Result<Vec<Employee>> {
        let url = format!("{base}/api/employees", base = self.base_url);
        let body = self.get_text(&url).await?;
        serde_json::from_str(&body).map_err(|e| AppError::parse(format!("Invalid employee list: {e}")))
    }
}

/// Parse the daily endpoint's JSON array.
fn parse_rows(body: &str) -> Result<Vec<AttendanceRow>> {
    serde_json::from_str(body).map_err(|e| AppError::parse(format!("Invalid attendance payload: {e}")))
}

/// Convert rows, filling in employee fields from the directory where known.
fn into_records(rows: Vec<AttendanceRow>, employees: &[Employee]) -> Result<Vec<AttendanceRecord>> {
    rows.into_iter()
        .map(|row| match employees.iter().find(|e| e.id == row.employee_id) {
            Some(employee) => row.join_employee(employee).into_record(),
            None => row.into_record(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime, TimeDelta};

    #[test]
    fn test_daily_url() {
        let source = HttpSource::new("http://localhost:5001/", Duration::from_secs(5)).unwrap();
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
        )
        .unwrap();

        assert_eq!(
            source.daily_url(&range),
            "http://localhost:5001/api/attendance/daily?filter=custom&start_date=2024-03-01&end_date=2024-03-15&status=All"
        );
    }

    #[test]
    fn test_parse_backend_rows() {
        let body = r#"[
            {"id": 4, "employee_id": 2, "custom_id": "E002", "name": "Jane, Doe", "department": "HR",
             "image_path": null, "date": "2024-03-10", "first_in": "9:20:00", "last_seen": "17:20:00",
             "total_work_seconds": 0, "status": "Late", "work_hours": "8h 0m", "break_hours": "0h 0m"}
        ]"#;

        let records = into_records(parse_rows(body).unwrap(), &[]).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].employee_id, "E002");
        assert_eq!(records[0].first_check_in, NaiveTime::from_hms_opt(9, 20, 0));
        assert_eq!(records[0].total_present, TimeDelta::hours(8));
    }

    #[test]
    fn test_rows_without_badge_code_are_joined() {
        let body = r#"[
            {"id": 9, "employee_id": 1, "name": "Ana Silva", "department": "Ops", "date": "2024-03-10",
             "first_in": "08:30:00", "last_seen": "17:00:00", "total_work_seconds": 0}
        ]"#;
        let employees = [Employee {
            id: 1,
            code: Some("E1".to_string()),
            name: "Ana Silva".to_string(),
            department: Some("Ops".to_string()),
            image_path: None,
        }];

        let records = into_records(parse_rows(body).unwrap(), &employees).unwrap();
        assert_eq!(records[0].employee_id, "E1");

        let unjoined = into_records(parse_rows(body).unwrap(), &[]).unwrap();
        assert_eq!(unjoined[0].employee_id, "1");
    }

    #[test]
    fn test_parse_error_payload() {
        let err = parse_rows(r#"{"error": "db down"}"#).unwrap_err();
        assert!(matches!(err, AppError::Parse(_)));
    }

    #[tokio::test]
    async fn test_unreachable_backend() {
        let source = HttpSource::new("http://127.0.0.1:1", Duration::from_secs(2)).unwrap();
        let range = DateRange::day(NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());

        let err = source.fetch_range(&range).await.unwrap_err();
        assert!(matches!(err, AppError::DataSourceUnavailable(_)));
    }
}
