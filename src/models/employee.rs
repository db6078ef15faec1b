//! Employee directory entry.

use serde::{Deserialize, Serialize};

/// Employee as listed by the directory.
///
/// The directory stores the badge code under `employee_id`; `id` is the
/// internal key attendance rows refer to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: i64,
    #[serde(rename = "employee_id", default)]
    pub code: Option<String>,
    pub name: String,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub image_path: Option<String>,
}

impl Employee {
    /// Identifier shown in reports: the badge code, falling back to the key.
    pub fn key(&self) -> String {
        self.code.clone().unwrap_or_else(|| self.id.to_string())
    }

    /// Check whether a record's employee id refers to this employee.
    ///
    /// Rows without a joined badge code carry the internal key instead.
    pub fn identifies(&self, employee_id: &str) -> bool {
        self.code.as_deref() == Some(employee_id) || employee_id.parse::<i64>().is_ok_and(|id| id == self.id)
    }
}
