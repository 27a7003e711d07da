//! Student roster and attendance models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumString};

use super::decode::{first_datetime, first_str, id_of, list_items, str_or};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: String,
    pub name: String,
    pub class_name: Option<String>,
    pub admission_number: Option<String>,
    pub guardian_name: Option<String>,
}

impl Student {
    pub fn from_value(item: &Value) -> Option<Self> {
        let name = first_str(item, &["name", "full_name"]).unwrap_or_else(|| {
            [first_str(item, &["first_name"]), first_str(item, &["last_name"])]
                .into_iter()
                .flatten()
                .collect::<Vec<_>>()
                .join(" ")
        });

        Some(Self {
            id: id_of(item, &["id", "student_id"])?,
            name: if name.is_empty() { "Unknown".to_string() } else { name },
            class_name: first_str(item, &["class_name", "class", "grade"]),
            admission_number: first_str(item, &["admission_number", "admission_no"]),
            guardian_name: first_str(item, &["guardian_name", "parent_name"]),
        })
    }

    pub fn list_from_value(payload: &Value) -> Vec<Self> {
        list_items(payload, "students")
            .iter()
            .filter_map(Self::from_value)
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
    Excused,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub student_id: String,
    pub student_name: String,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
}

impl AttendanceRecord {
    /// Records with an unknown status or no date are dropped.
    /// `present: bool` is accepted in place of `status`.
    pub fn from_value(item: &Value) -> Option<Self> {
        let status = first_str(item, &["status"])
            .and_then(|s| s.parse().ok())
            .or_else(|| {
                item.get("present").and_then(Value::as_bool).map(|present| {
                    if present {
                        AttendanceStatus::Present
                    } else {
                        AttendanceStatus::Absent
                    }
                })
            })?;

        Some(Self {
            student_id: id_of(item, &["student_id", "id"])?,
            student_name: str_or(item, &["student_name", "name"], "Unknown"),
            date: first_datetime(item, &["date", "created_at"])?.date_naive(),
            status,
        })
    }

    pub fn list_from_value(payload: &Value) -> Vec<Self> {
        list_items(payload, "attendance")
            .iter()
            .filter_map(Self::from_value)
            .collect()
    }
}

/// Counts shown on the attendance cards. The default is the empty state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AttendanceSummary {
    pub present: u32,
    pub absent: u32,
    pub late: u32,
    pub excused: u32,
}

impl AttendanceSummary {
    pub fn from_records(records: &[AttendanceRecord]) -> Self {
        records.iter().fold(Self::default(), |mut acc, record| {
            match record.status {
                AttendanceStatus::Present => acc.present += 1,
                AttendanceStatus::Absent => acc.absent += 1,
                AttendanceStatus::Late => acc.late += 1,
                AttendanceStatus::Excused => acc.excused += 1,
            }
            acc
        })
    }

    pub fn total(&self) -> u32 {
        self.present + self.absent + self.late + self.excused
    }

    /// Late counts as attended. `None` when there are no records.
    pub fn attendance_rate(&self) -> Option<f64> {
        let total = self.total();
        (total > 0).then(|| f64::from(self.present + self.late) / f64::from(total) * 100.0)
    }
}
