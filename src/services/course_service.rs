use std::sync::Arc;

use validator::Validate;

use crate::{
    db::CollectionName,
    errors::{AppError, AppResult},
    models::{
        domain::{Course, UserRole},
        dto::{
            request::{CreateCourseRequest, UpdateCourseRequest},
            response::DeleteResponse,
        },
    },
    repositories::Repositories,
    services::{
        associations::{dedup_ids, ensure_all_found, resolve_in_order, student_audience, users_with_role},
        realtime::RealtimeService,
    },
};

pub struct CourseService {
    repos: Repositories,
    realtime: Arc<RealtimeService>,
}

impl CourseService {
    pub fn new(repos: Repositories, realtime: Arc<RealtimeService>) -> Self {
        Self { repos, realtime }
    }

    async fn ensure_teacher(&self, teacher_id: &str) -> AppResult<()> {
        users_with_role(
            self.repos.users.as_ref(),
            &[teacher_id.to_string()],
            UserRole::Teacher,
        )
        .await
        .map(|_| ())
    }

    pub async fn create_course(&self, request: CreateCourseRequest) -> AppResult<Course> {
        request.validate()?;

        if let Some(teacher_id) = &request.teacher_id {
            self.ensure_teacher(teacher_id).await?;
        }

        let class_ids = dedup_ids(&request.class_ids);
        if !class_ids.is_empty() {
            let classes = self.repos.classes.find_by_ids(&class_ids).await?;
            let found: Vec<&str> = classes.iter().map(|c| c.id.as_str()).collect();
            ensure_all_found(&class_ids, &found, "Class")?;
        }

        let mut course = Course::new(&request.name, request.code, request.description);
        course.teacher_id = request.teacher_id;
        course.class_ids = class_ids.clone();

        let created = self.repos.courses.create(course).await?;
        for class_id in &class_ids {
            self.repos.classes.add_course(class_id, &created.id).await?;
        }

        log::info!("Created course '{}' in {} classes", created.id, class_ids.len());
        self.realtime
            .refresh_all(&[CollectionName::Courses, CollectionName::Classes])
            .await;
        Ok(created)
    }

    pub async fn get_course(&self, id: &str) -> AppResult<Course> {
        self.repos
            .courses
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Course with id '{}' not found", id)))
    }

    pub async fn list_courses(&self) -> AppResult<Vec<Course>> {
        self.repos.courses.find_all().await
    }

    pub async fn courses_for_teacher(&self, teacher_id: &str) -> AppResult<Vec<Course>> {
        self.repos.courses.find_by_teacher(teacher_id).await
    }

    /// Courses taught in any of the student's classes.
    pub async fn courses_for_student(&self, student_id: &str) -> AppResult<Vec<Course>> {
        let audience = student_audience(self.repos.classes.as_ref(), student_id).await?;
        if audience.course_ids.is_empty() {
            return Ok(Vec::new());
        }

        let courses = self.repos.courses.find_by_ids(&audience.course_ids).await?;
        Ok(resolve_in_order(&audience.course_ids, courses, |c| {
            c.id.as_str()
        }))
    }

    pub async fn update_course(&self, id: &str, request: UpdateCourseRequest) -> AppResult<Course> {
        request.validate()?;

        let mut course = self.get_course(id).await?;
        if let Some(name) = request.name {
            course.name = name;
        }
        if let Some(code) = request.code {
            course.code = Some(code);
        }
        if let Some(description) = request.description {
            course.description = Some(description);
        }
        if let Some(teacher_id) = request.teacher_id {
            self.ensure_teacher(&teacher_id).await?;
            course.teacher_id = Some(teacher_id);
        }
        course.touch();

        let updated = self.repos.courses.update(course).await?;
        self.realtime.refresh(CollectionName::Courses).await;
        Ok(updated)
    }

    pub async fn delete_course(&self, id: &str) -> AppResult<DeleteResponse> {
        self.repos.courses.delete(id).await?;
        let unlinked = self.repos.classes.remove_course_everywhere(id).await?;
        log::info!("Deleted course '{}', unlinked from {} classes", id, unlinked);

        self.realtime
            .refresh_all(&[CollectionName::Courses, CollectionName::Classes])
            .await;

        Ok(DeleteResponse {
            message: format!("Course '{}' deleted", id),
        })
    }
}
