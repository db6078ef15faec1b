//! Report engine: fetch, classify, filter and order attendance records.


use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::classify::{ClassificationPolicy, classify};
use crate::error::Result;
use crate::models::{AttendanceRecord, AttendanceStatus, ClassifiedRecord, StatusFilter};
use crate::range::DateRange;
use crate::source::{AttendanceSource, EmployeeDirectory};

/// One reporting request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReportQuery {
    pub range: DateRange,
    pub status_filter: StatusFilter,
}

impl ReportQuery {
    pub fn new(range: DateRange, status_filter: StatusFilter) -> Self {
        Self { range, status_filter }
    }
}

/// Status counts over a result set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportSummary {
    pub total: usize,
    pub present: usize,
    pub late: usize,
    pub absent: usize,
}

impl ReportSummary {
    /// Get summary message.
    pub fn message(&self) -> String {
        format!(
            "{} records: {} present, {} late, {} absent",
            self.total, self.present, self.late, self.absent
        )
    }
}

/// Count statuses in a result set.
pub fn summarize(records: &[ClassifiedRecord]) -> ReportSummary {
    records.iter().fold(
        ReportSummary {
            total: records.len(),
            ..Default::default()
        },
        |mut acc, r| {
            match r.status {
                AttendanceStatus::Present => acc.present += 1,
                AttendanceStatus::Late => acc.late += 1,
                AttendanceStatus::Absent => acc.absent += 1,
            }
            acc
        },
    )
}

/// Directory used to list employees who never checked in.
#[derive(Clone)]
struct AbsenceRoster {
    directory: Arc<dyn EmployeeDirectory>,
    /// Days after this are not reported absent.
    through: NaiveDate,
}

/// Runs report queries against an attendance source.
#[derive(Clone)]
pub struct ReportEngine {
    source: Arc<dyn AttendanceSource>,
    policy: ClassificationPolicy,
    roster: Option<AbsenceRoster>,
}

impl ReportEngine {
    /// Create a new report engine.
    pub fn new(source: Arc<dyn AttendanceSource>, policy: ClassificationPolicy) -> Self {
        Self {
            source,
            policy,
            roster: None,
        }
    }

    /// Add an absent row for every directory employee with no record on a
    /// day of the range, up to and including `through`.
    pub fn with_absence_roster(mut self, directory: Arc<dyn EmployeeDirectory>, through: NaiveDate) -> Self {
        self.roster = Some(AbsenceRoster { directory, through });
        self
    }

    /// Run a query and return matching records ordered by date, then name.
    pub async fn run(&self, query: &ReportQuery) -> Result<Vec<ClassifiedRecord>> {
        let range = query.range;
        let fetched = self.source.fetch_range(&range).await?;
        let fetched_count = fetched.len();

        let mut records: Vec<AttendanceRecord> = fetched.into_iter().filter(|r| range.contains(r.date)).collect();
        if records.len() < fetched_count {
            warn!(
                "Source returned {} records outside {range}, dropped",
                fetched_count - records.len()
            );
        }

        if let Some(roster) = &self.roster {
            let absent = self.absent_records(roster, &range, &records).await?;
            debug!("Synthesized {} absent records", absent.len());
            records.extend(absent);
        }

        let mut results: Vec<ClassifiedRecord> = records
            .into_iter()
            .map(|r| classify(r, &self.policy))
            .filter(|r| query.status_filter.matches(r.status))
            .collect();

        results.sort_by(|a, b| {
            a.record
                .date
                .cmp(&b.record.date)
                .then_with(|| a.record.name.cmp(&b.record.name))
                .then_with(|| a.record.employee_id.cmp(&b.record.employee_id))
        });

        info!(
            "Report for {range} ({}): {} records",
            query.status_filter,
            results.len()
        );
        Ok(results)
    }

    async fn absent_records(
        &self,
        roster: &AbsenceRoster,
        range: &DateRange,
        records: &[AttendanceRecord],
    ) -> Result<Vec<AttendanceRecord>> {
        let employees = roster.directory.employees().await?;

        let mut absent = Vec::new();
        for day in range.iter_days().take_while(|d| *d <= roster.through) {
            let seen: Vec<&str> = records
                .iter()
                .filter(|r| r.date == day)
                .map(|r| r.employee_id.as_str())
                .collect();
            for employee in &employees {
                if !seen.iter().any(|id| employee.identifies(id)) {
                    absent.push(AttendanceRecord::absent(employee, day));
                }
            }
        }
        Ok(absent)
    }
}
