use async_graphql::{Enum, SimpleObject};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, SimpleObject)]
pub struct AttendanceRecord {
    pub id: String,
    pub class_id: String,
    pub course_id: Option<String>,
    pub date: NaiveDate,
    pub marked_by: String,
    pub entries: Vec<AttendanceEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, SimpleObject)]
pub struct AttendanceEntry {
    pub student_id: String,
    pub status: AttendanceStatus,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize, Enum)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
    Excused,
}

impl AttendanceRecord {
    /// One sheet per class and day; re-marking replaces it.
    pub fn record_id(class_id: &str, date: NaiveDate) -> String {
        format!("{}_{}", class_id, date.format("%Y%m%d"))
    }

    pub fn new(
        class_id: &str,
        course_id: Option<String>,
        date: NaiveDate,
        marked_by: &str,
        entries: Vec<AttendanceEntry>,
    ) -> Self {
        AttendanceRecord {
            id: Self::record_id(class_id, date),
            class_id: class_id.to_string(),
            course_id,
            date,
            marked_by: marked_by.to_string(),
            entries,
            created_at: Some(Utc::now()),
            modified_at: Some(Utc::now()),
        }
    }

    pub fn status_of(&self, student_id: &str) -> Option<AttendanceStatus> {
        self.entries
            .iter()
            .find(|e| e.student_id == student_id)
            .map(|e| e.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_id_is_stable_per_class_and_day() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(AttendanceRecord::record_id("cls-1", date), "cls-1_20240307");
    }

    #[test]
    fn status_lookup_by_student() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        let record = AttendanceRecord::new(
            "cls-1",
            None,
            date,
            "tch-1",
            vec![AttendanceEntry {
                student_id: "stu-1".to_string(),
                status: AttendanceStatus::Late,
            }],
        );

        assert_eq!(record.status_of("stu-1"), Some(AttendanceStatus::Late));
        assert_eq!(record.status_of("stu-2"), None);
    }

    #[test]
    fn date_serializes_as_iso_day() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        let record = AttendanceRecord::new("cls-1", None, date, "tch-1", vec![]);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["date"], "2024-03-07");
    }
}
