use async_graphql::SimpleObject;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::models::domain::{AttendanceStatus, Class, Course, User, UserRole, UserStatus};

#[derive(Debug, Clone, PartialEq, Serialize, SimpleObject)]
pub struct UserDto {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub status: UserStatus,
    pub class_ids: Vec<String>,
    #[graphql(skip)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        UserDto {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            status: user.status,
            class_ids: user.class_ids,
            created_at: user.created_at,
        }
    }
}

/// Body of `GET /api/getUserRole`.
#[derive(Debug, Clone, Serialize)]
pub struct UserRoleResponse {
    pub uid: String,
    pub user_id: String,
    pub role: UserRole,
    pub status: UserStatus,
    pub home: String,
}

impl From<&User> for UserRoleResponse {
    fn from(user: &User) -> Self {
        UserRoleResponse {
            uid: user.uid.clone(),
            user_id: user.id.clone(),
            role: user.role,
            status: user.status,
            home: user.role.home_path().to_string(),
        }
    }
}

#[derive(Debug, Serialize, SimpleObject)]
pub struct DeleteResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, SimpleObject)]
pub struct PaginationMetadata {
    pub offset: i64,
    pub limit: i64,
    pub total: i64,
    pub has_more: bool,
}

impl PaginationMetadata {
    pub fn new(offset: i64, limit: i64, total: i64) -> Self {
        PaginationMetadata {
            offset,
            limit,
            total,
            has_more: offset + limit < total,
        }
    }
}

#[derive(Debug, Serialize, SimpleObject)]
pub struct PaginatedUsers {
    pub items: Vec<UserDto>,
    pub pagination: PaginationMetadata,
}

/// A class with its association arrays resolved to objects.
#[derive(Debug, Clone, Serialize, SimpleObject)]
pub struct ClassDetail {
    pub class: Class,
    pub courses: Vec<Course>,
    pub students: Vec<UserDto>,
    pub teachers: Vec<UserDto>,
}

#[derive(Debug, Clone, Serialize, SimpleObject)]
pub struct StudentAttendance {
    pub record_id: String,
    pub class_id: String,
    pub course_id: Option<String>,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, SimpleObject)]
pub struct AttendanceSummary {
    pub student_id: String,
    pub class_id: Option<String>,
    pub present: i32,
    pub absent: i32,
    pub late: i32,
    pub excused: i32,
    pub total: i32,
    /// Share of sessions attended (present or late), 0.0 when nothing was marked.
    pub rate: f64,
}

impl AttendanceSummary {
    pub fn from_statuses(
        student_id: &str,
        class_id: Option<String>,
        statuses: impl IntoIterator<Item = AttendanceStatus>,
    ) -> Self {
        let mut summary = AttendanceSummary {
            student_id: student_id.to_string(),
            class_id,
            ..Default::default()
        };

        for status in statuses {
            match status {
                AttendanceStatus::Present => summary.present += 1,
                AttendanceStatus::Absent => summary.absent += 1,
                AttendanceStatus::Late => summary.late += 1,
                AttendanceStatus::Excused => summary.excused += 1,
            }
            summary.total += 1;
        }

        if summary.total > 0 {
            summary.rate = f64::from(summary.present + summary.late) / f64::from(summary.total);
        }

        summary
    }
}
