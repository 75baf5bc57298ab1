use std::{collections::HashSet, sync::Arc};

use chrono::{NaiveDate, Utc};
use validator::Validate;

use crate::{
    auth::{require_staff, Claims},
    db::CollectionName,
    errors::{AppError, AppResult},
    models::{
        domain::{AttendanceEntry, AttendanceRecord},
        dto::{
            request::MarkAttendanceRequest,
            response::{AttendanceSummary, DeleteResponse, StudentAttendance},
        },
    },
    repositories::Repositories,
    services::realtime::RealtimeService,
};

pub struct AttendanceService {
    repos: Repositories,
    realtime: Arc<RealtimeService>,
}

impl AttendanceService {
    pub fn new(repos: Repositories, realtime: Arc<RealtimeService>) -> Self {
        Self { repos, realtime }
    }

    /// Writes the sheet for a class and day, replacing any earlier one.
    pub async fn mark(&self, actor: &Claims, request: MarkAttendanceRequest) -> AppResult<AttendanceRecord> {
        require_staff(actor)?;
        request.validate()?;

        let class = self
            .repos
            .classes
            .find_by_id(&request.class_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Class with id '{}' not found", request.class_id))
            })?;

        if let Some(course_id) = &request.course_id {
            if !class.has_course(course_id) {
                return Err(AppError::ValidationError(format!(
                    "Course '{}' is not taught in class '{}'",
                    course_id, class.id
                )));
            }
        }

        let mut seen = HashSet::new();
        for entry in &request.entries {
            if !seen.insert(entry.student_id.as_str()) {
                return Err(AppError::ValidationError(format!(
                    "Student '{}' is listed more than once",
                    entry.student_id
                )));
            }
            if !class.has_student(&entry.student_id) {
                return Err(AppError::ValidationError(format!(
                    "Student '{}' is not enrolled in class '{}'",
                    entry.student_id, class.id
                )));
            }
        }

        let entries = request
            .entries
            .into_iter()
            .map(|e| AttendanceEntry {
                student_id: e.student_id,
                status: e.status,
            })
            .collect();
        let mut record = AttendanceRecord::new(
            &class.id,
            request.course_id,
            request.date,
            &actor.sub,
            entries,
        );

        if let Some(existing) = self.repos.attendance.find_by_id(&record.id).await? {
            record.created_at = existing.created_at;
            record.modified_at = Some(Utc::now());
        }

        let saved = self.repos.attendance.upsert(record).await?;
        log::info!(
            "Attendance '{}' marked by '{}' for {} students",
            saved.id,
            actor.sub,
            saved.entries.len()
        );
        self.realtime.refresh(CollectionName::Attendance).await;
        Ok(saved)
    }

    pub async fn records_for_class(&self, class_id: &str) -> AppResult<Vec<AttendanceRecord>> {
        self.repos.attendance.find_by_class(class_id).await
    }

    pub async fn record_for_class_on(
        &self,
        class_id: &str,
        date: NaiveDate,
    ) -> AppResult<AttendanceRecord> {
        self.repos
            .attendance
            .find_by_class_and_date(class_id, date)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "No attendance for class '{}' on {}",
                    class_id, date
                ))
            })
    }

    pub async fn records_for_student(&self, student_id: &str) -> AppResult<Vec<StudentAttendance>> {
        let records = self.repos.attendance.find_by_student(student_id).await?;

        Ok(records
            .into_iter()
            .filter_map(|record| {
                record.status_of(student_id).map(|status| StudentAttendance {
                    record_id: record.id,
                    class_id: record.class_id,
                    course_id: record.course_id,
                    date: record.date,
                    status,
                })
            })
            .collect())
    }

    /// Counts per status, optionally limited to one class.
    pub async fn summary(
        &self,
        student_id: &str,
        class_id: Option<String>,
    ) -> AppResult<AttendanceSummary> {
        let records = self.repos.attendance.find_by_student(student_id).await?;

        let statuses = records
            .iter()
            .filter(|r| class_id.as_deref().map(|c| r.class_id == c).unwrap_or(true))
            .filter_map(|r| r.status_of(student_id));

        Ok(AttendanceSummary::from_statuses(student_id, class_id.clone(), statuses))
    }

    pub async fn delete(&self, actor: &Claims, id: &str) -> AppResult<DeleteResponse> {
        require_staff(actor)?;
        self.repos.attendance.delete(id).await?;
        self.realtime.refresh(CollectionName::Attendance).await;

        Ok(DeleteResponse {
            message: format!("Attendance record '{}' deleted", id),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{
            domain::{AttendanceStatus, UserRole},
            dto::request::AttendanceEntryInput,
        },
        test_utils::{
            fixtures::{claims_for, class_with},
            MockRepos,
        },
    };

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
    }

    fn entry(student_id: &str, status: AttendanceStatus) -> AttendanceEntryInput {
        AttendanceEntryInput {
            student_id: student_id.to_string(),
            status,
        }
    }

    fn request(entries: Vec<AttendanceEntryInput>) -> MarkAttendanceRequest {
        MarkAttendanceRequest {
            class_id: "k1".to_string(),
            course_id: None,
            date: date(),
            entries,
        }
    }

    fn class_repos() -> MockRepos {
        let mut repos = MockRepos::new();
        repos
            .classes
            .expect_find_by_id()
            .returning(|_| Ok(Some(class_with("k1", &["c1"], &["s1", "s2"]))));
        repos
    }

    #[tokio::test]
    async fn test_mark_uses_class_and_date_id() {
        let mut repos = class_repos();
        repos.attendance.expect_find_by_id().returning(|_| Ok(None));
        repos
            .attendance
            .expect_upsert()
            .withf(|r| r.id == "k1_20240305")
            .times(1)
            .returning(Ok);
        let (repos, realtime) = repos.build_with_realtime();
        let service = AttendanceService::new(repos, realtime);
        let teacher = claims_for("t1", UserRole::Teacher);

        let record = service
            .mark(
                &teacher,
                request(vec![
                    entry("s1", AttendanceStatus::Present),
                    entry("s2", AttendanceStatus::Late),
                ]),
            )
            .await
            .unwrap();

        assert_eq!(record.marked_by, "t1");
        assert_eq!(record.status_of("s2"), Some(AttendanceStatus::Late));
    }

    #[tokio::test]
    async fn test_remark_keeps_creation_time() {
        let original = AttendanceRecord::new("k1", None, date(), "t1", vec![]);
        let created_at = original.created_at;

        let mut repos = class_repos();
        repos
            .attendance
            .expect_find_by_id()
            .returning(move |_| Ok(Some(original.clone())));
        repos
            .attendance
            .expect_upsert()
            .withf(move |r| r.created_at == created_at)
            .returning(Ok);
        let (repos, realtime) = repos.build_with_realtime();
        let service = AttendanceService::new(repos, realtime);
        let teacher = claims_for("t2", UserRole::Teacher);

        let record = service
            .mark(&teacher, request(vec![entry("s1", AttendanceStatus::Absent)]))
            .await
            .unwrap();
        assert_eq!(record.marked_by, "t2");
    }

    #[tokio::test]
    async fn test_mark_rejects_student_outside_class() {
        let (repos, realtime) = class_repos().build_with_realtime();
        let service = AttendanceService::new(repos, realtime);
        let teacher = claims_for("t1", UserRole::Teacher);

        let result = service
            .mark(&teacher, request(vec![entry("s9", AttendanceStatus::Present)]))
            .await;
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_mark_rejects_duplicate_entries() {
        let (repos, realtime) = class_repos().build_with_realtime();
        let service = AttendanceService::new(repos, realtime);
        let teacher = claims_for("t1", UserRole::Teacher);

        let result = service
            .mark(
                &teacher,
                request(vec![
                    entry("s1", AttendanceStatus::Present),
                    entry("s1", AttendanceStatus::Absent),
                ]),
            )
            .await;
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_mark_unknown_class() {
        let mut repos = MockRepos::new();
        repos.classes.expect_find_by_id().returning(|_| Ok(None));
        let (repos, realtime) = repos.build_with_realtime();
        let service = AttendanceService::new(repos, realtime);
        let admin = claims_for("a1", UserRole::Admin);

        let result = service
            .mark(&admin, request(vec![entry("s1", AttendanceStatus::Present)]))
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_student_cannot_mark() {
        let (repos, realtime) = MockRepos::new().build_with_realtime();
        let service = AttendanceService::new(repos, realtime);
        let student = claims_for("s1", UserRole::Student);

        let result = service
            .mark(&student, request(vec![entry("s1", AttendanceStatus::Present)]))
            .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_summary_counts_late_as_attended() {
        let mut repos = MockRepos::new();
        repos.attendance.expect_find_by_student().returning(|_| {
            let day = |d| NaiveDate::from_ymd_opt(2024, 3, d).unwrap();
            let sheet = |class_id: &str, d, status| {
                AttendanceRecord::new(
                    class_id,
                    None,
                    day(d),
                    "t1",
                    vec![AttendanceEntry {
                        student_id: "s1".to_string(),
                        status,
                    }],
                )
            };
            Ok(vec![
                sheet("k1", 1, AttendanceStatus::Present),
                sheet("k1", 2, AttendanceStatus::Late),
                sheet("k1", 3, AttendanceStatus::Absent),
                sheet("k1", 4, AttendanceStatus::Excused),
                sheet("k2", 1, AttendanceStatus::Absent),
            ])
        });
        let (repos, realtime) = repos.build_with_realtime();
        let service = AttendanceService::new(repos, realtime);

        let summary = service.summary("s1", Some("k1".to_string())).await.unwrap();

        assert_eq!(summary.total, 4);
        assert_eq!(summary.present, 1);
        assert_eq!(summary.late, 1);
        assert!((summary.rate - 0.5).abs() < f64::EPSILON);
    }
}
