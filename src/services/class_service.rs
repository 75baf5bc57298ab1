use std::sync::Arc;

use validator::Validate;

use crate::{
    auth::{require_staff, Claims},
    db::CollectionName,
    errors::{AppError, AppResult},
    models::{
        domain::{
            entity_ref::{ref_ids, remove_ref},
            Class, EntityRef, UserRole,
        },
        dto::{
            request::{CreateClassRequest, UpdateClassRequest},
            response::{ClassDetail, DeleteResponse, UserDto},
        },
    },
    repositories::Repositories,
    services::{
        associations::{dedup_ids, ensure_all_found, resolve_in_order, users_with_role},
        realtime::RealtimeService,
    },
};

pub struct ClassService {
    repos: Repositories,
    realtime: Arc<RealtimeService>,
}

impl ClassService {
    pub fn new(repos: Repositories, realtime: Arc<RealtimeService>) -> Self {
        Self { repos, realtime }
    }

    async fn ensure_courses_exist(&self, course_ids: &[String]) -> AppResult<()> {
        if course_ids.is_empty() {
            return Ok(());
        }
        let courses = self.repos.courses.find_by_ids(course_ids).await?;
        let found: Vec<&str> = courses.iter().map(|c| c.id.as_str()).collect();
        ensure_all_found(course_ids, &found, "Course")
    }

    pub async fn create_class(&self, request: CreateClassRequest) -> AppResult<Class> {
        request.validate()?;

        let course_ids = dedup_ids(&request.course_ids);
        let student_ids = dedup_ids(&request.student_ids);
        let teacher_ids = dedup_ids(&request.teacher_ids);

        self.ensure_courses_exist(&course_ids).await?;
        users_with_role(self.repos.users.as_ref(), &student_ids, UserRole::Student).await?;
        users_with_role(self.repos.users.as_ref(), &teacher_ids, UserRole::Teacher).await?;

        let mut class = Class::new(&request.name, request.description);
        class.courses = course_ids.iter().map(|id| EntityRef::from(id.as_str())).collect();
        class.students = student_ids.iter().map(|id| EntityRef::from(id.as_str())).collect();
        class.teacher_ids = teacher_ids;

        let created = self.repos.classes.create(class).await?;

        for course_id in &course_ids {
            self.repos.courses.add_class(course_id, &created.id).await?;
        }
        for student_id in &student_ids {
            self.repos.users.add_class(student_id, &created.id).await?;
        }

        log::info!(
            "Created class '{}' with {} courses and {} students",
            created.id,
            course_ids.len(),
            student_ids.len()
        );
        self.realtime
            .refresh_all(&[
                CollectionName::Classes,
                CollectionName::Courses,
                CollectionName::Users,
            ])
            .await;
        Ok(created)
    }

    pub async fn get_class(&self, id: &str) -> AppResult<Class> {
        self.repos
            .classes
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Class with id '{}' not found", id)))
    }

    pub async fn list_classes(&self) -> AppResult<Vec<Class>> {
        self.repos.classes.find_all().await
    }

    pub async fn classes_for_student(&self, student_id: &str) -> AppResult<Vec<Class>> {
        self.repos.classes.find_by_student(student_id).await
    }

    pub async fn classes_for_teacher(&self, teacher_id: &str) -> AppResult<Vec<Class>> {
        self.repos.classes.find_by_teacher(teacher_id).await
    }

    /// The class with its references resolved. Dangling references are
    /// dropped and the stored order is kept.
    pub async fn class_detail(&self, id: &str) -> AppResult<ClassDetail> {
        let class = self.get_class(id).await?;
        self.resolve_detail(class).await
    }

    /// Detail view for staff. Teachers only see classes they are assigned to.
    pub async fn class_detail_for(&self, actor: &Claims, id: &str) -> AppResult<ClassDetail> {
        require_staff(actor)?;

        let class = self.get_class(id).await?;
        if actor.role != UserRole::Admin && !class.teacher_ids.contains(&actor.sub) {
            return Err(AppError::Forbidden(
                "Teachers can only view classes they are assigned to".into(),
            ));
        }
        self.resolve_detail(class).await
    }

    async fn resolve_detail(&self, class: Class) -> AppResult<ClassDetail> {
        let course_ids = ref_ids(&class.courses);
        let student_ids = ref_ids(&class.students);
        let teacher_ids = dedup_ids(&class.teacher_ids);

        let courses = if course_ids.is_empty() {
            Vec::new()
        } else {
            let found = self.repos.courses.find_by_ids(&course_ids).await?;
            resolve_in_order(&course_ids, found, |c| c.id.as_str())
        };

        let mut member_ids = student_ids.clone();
        member_ids.extend(teacher_ids.iter().cloned());
        let members = if member_ids.is_empty() {
            Vec::new()
        } else {
            self.repos.users.find_by_ids(&member_ids).await?
        };

        let students = resolve_in_order(&student_ids, members.clone(), |u| u.id.as_str());
        let teachers = resolve_in_order(&teacher_ids, members, |u| u.id.as_str());

        Ok(ClassDetail {
            class,
            courses,
            students: students.into_iter().map(UserDto::from).collect(),
            teachers: teachers.into_iter().map(UserDto::from).collect(),
        })
    }

    pub async fn update_class(&self, id: &str, request: UpdateClassRequest) -> AppResult<Class> {
        request.validate()?;

        let mut class = self.get_class(id).await?;
        if let Some(name) = request.name {
            class.name = name;
        }
        if let Some(description) = request.description {
            class.description = Some(description);
        }
        if let Some(teacher_ids) = request.teacher_ids {
            let teacher_ids = dedup_ids(&teacher_ids);
            users_with_role(self.repos.users.as_ref(), &teacher_ids, UserRole::Teacher).await?;
            class.teacher_ids = teacher_ids;
        }
        class.touch();

        let updated = self.repos.classes.update(class).await?;
        self.realtime.refresh(CollectionName::Classes).await;
        Ok(updated)
    }

    pub async fn add_course(&self, class_id: &str, course_id: &str) -> AppResult<Class> {
        let class = self.get_class(class_id).await?;
        self.repos
            .courses
            .find_by_id(course_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Course with id '{}' not found", course_id)))?;

        if !class.has_course(course_id) {
            self.repos.classes.add_course(class_id, course_id).await?;
        }
        self.repos.courses.add_class(course_id, class_id).await?;

        self.realtime
            .refresh_all(&[CollectionName::Classes, CollectionName::Courses])
            .await;
        self.get_class(class_id).await
    }

    pub async fn remove_course(&self, class_id: &str, course_id: &str) -> AppResult<Class> {
        let mut class = self.get_class(class_id).await?;
        if !remove_ref(&mut class.courses, course_id) {
            return Err(AppError::NotFound(format!(
                "Course '{}' is not part of class '{}'",
                course_id, class_id
            )));
        }
        class.touch();
        let updated = self.repos.classes.update(class).await?;

        // The course may already be gone; its back-reference goes with it.
        if let Err(e) = self.repos.courses.remove_class(course_id, class_id).await {
            log::warn!("Could not unlink course '{}' from class '{}': {}", course_id, class_id, e);
        }

        self.realtime
            .refresh_all(&[CollectionName::Classes, CollectionName::Courses])
            .await;
        Ok(updated)
    }

    pub async fn add_student(&self, class_id: &str, student_id: &str) -> AppResult<Class> {
        let class = self.get_class(class_id).await?;
        users_with_role(
            self.repos.users.as_ref(),
            &[student_id.to_string()],
            UserRole::Student,
        )
        .await?;

        if !class.has_student(student_id) {
            self.repos.classes.add_student(class_id, student_id).await?;
        }
        self.repos.users.add_class(student_id, class_id).await?;

        self.realtime
            .refresh_all(&[CollectionName::Classes, CollectionName::Users])
            .await;
        self.get_class(class_id).await
    }

    pub async fn remove_student(&self, class_id: &str, student_id: &str) -> AppResult<Class> {
        let mut class = self.get_class(class_id).await?;
        if !remove_ref(&mut class.students, student_id) {
            return Err(AppError::NotFound(format!(
                "Student '{}' is not enrolled in class '{}'",
                student_id, class_id
            )));
        }
        class.touch();
        let updated = self.repos.classes.update(class).await?;

        if let Err(e) = self.repos.users.remove_class(student_id, class_id).await {
            log::warn!("Could not unlink student '{}' from class '{}': {}", student_id, class_id, e);
        }

        self.realtime
            .refresh_all(&[CollectionName::Classes, CollectionName::Users])
            .await;
        Ok(updated)
    }

    pub async fn delete_class(&self, id: &str) -> AppResult<DeleteResponse> {
        self.repos.classes.delete(id).await?;
        let courses = self.repos.courses.remove_class_everywhere(id).await?;
        let users = self.repos.users.remove_class_everywhere(id).await?;
        log::info!(
            "Deleted class '{}', unlinked {} courses and {} users",
            id,
            courses,
            users
        );

        self.realtime
            .refresh_all(&[
                CollectionName::Classes,
                CollectionName::Courses,
                CollectionName::Users,
            ])
            .await;

        Ok(DeleteResponse {
            message: format!("Class '{}' deleted", id),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{
        fixtures::{approved_user, claims_for, class_with, course},
        MockRepos,
    };
    use mockall::predicate::eq;

    fn create_request() -> CreateClassRequest {
        CreateClassRequest {
            name: "Grade 7".to_string(),
            description: None,
            course_ids: vec!["c1".to_string(), "c1".to_string()],
            student_ids: vec!["s1".to_string()],
            teacher_ids: vec![],
        }
    }

    #[tokio::test]
    async fn test_create_class_mirrors_references() {
        let mut repos = MockRepos::new();
        repos
            .courses
            .expect_find_by_ids()
            .returning(|_| Ok(vec![course("c1")]));
        repos
            .users
            .expect_find_by_ids()
            .returning(|_| Ok(vec![approved_user("s1", UserRole::Student)]));
        repos
            .classes
            .expect_create()
            .withf(|c| c.courses.len() == 1 && c.has_student("s1"))
            .returning(Ok);
        repos
            .courses
            .expect_add_class()
            .withf(|course_id, _| course_id == "c1")
            .times(1)
            .returning(|_, _| Ok(()));
        repos
            .users
            .expect_add_class()
            .withf(|user_id, _| user_id == "s1")
            .times(1)
            .returning(|_, _| Ok(()));
        let (repos, realtime) = repos.build_with_realtime();
        let service = ClassService::new(repos, realtime);

        let class = service.create_class(create_request()).await.unwrap();
        assert_eq!(class.name, "Grade 7");
    }

    #[tokio::test]
    async fn test_create_class_rejects_unknown_course() {
        let mut repos = MockRepos::new();
        repos.courses.expect_find_by_ids().returning(|_| Ok(vec![]));
        let (repos, realtime) = repos.build_with_realtime();
        let service = ClassService::new(repos, realtime);

        let result = service.create_class(create_request()).await;
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_class_detail_drops_dangling_refs() {
        let mut repos = MockRepos::new();
        repos
            .classes
            .expect_find_by_id()
            .returning(|_| Ok(Some(class_with("k1", &["c2", "gone", "c1"], &["s1"]))));
        repos
            .courses
            .expect_find_by_ids()
            .returning(|_| Ok(vec![course("c1"), course("c2")]));
        repos
            .users
            .expect_find_by_ids()
            .returning(|_| Ok(vec![approved_user("s1", UserRole::Student)]));
        let (repos, realtime) = repos.build_with_realtime();
        let service = ClassService::new(repos, realtime);

        let detail = service.class_detail("k1").await.unwrap();

        let ids: Vec<&str> = detail.courses.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["c2", "c1"]);
        assert_eq!(detail.students.len(), 1);
        assert!(detail.teachers.is_empty());
    }

    #[tokio::test]
    async fn test_unassigned_teacher_cannot_view_class_detail() {
        let mut repos = MockRepos::new();
        repos.classes.expect_find_by_id().returning(|_| {
            let mut class = class_with("k1", &[], &["s1"]);
            class.teacher_ids = vec!["t1".to_string()];
            Ok(Some(class))
        });
        repos.users.expect_find_by_ids().never();
        let (repos, realtime) = repos.build_with_realtime();
        let service = ClassService::new(repos, realtime);

        let result = service
            .class_detail_for(&claims_for("t2", UserRole::Teacher), "k1")
            .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));

        let result = service
            .class_detail_for(&claims_for("s1", UserRole::Student), "k1")
            .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_assigned_teacher_and_admin_view_class_detail() {
        let mut repos = MockRepos::new();
        repos.classes.expect_find_by_id().returning(|_| {
            let mut class = class_with("k1", &[], &[]);
            class.teacher_ids = vec!["t1".to_string()];
            Ok(Some(class))
        });
        repos
            .users
            .expect_find_by_ids()
            .returning(|_| Ok(vec![approved_user("t1", UserRole::Teacher)]));
        let (repos, realtime) = repos.build_with_realtime();
        let service = ClassService::new(repos, realtime);

        let detail = service
            .class_detail_for(&claims_for("t1", UserRole::Teacher), "k1")
            .await
            .unwrap();
        assert_eq!(detail.teachers.len(), 1);

        let detail = service
            .class_detail_for(&claims_for("a1", UserRole::Admin), "k1")
            .await
            .unwrap();
        assert_eq!(detail.class.id, "k1");
    }

    #[tokio::test]
    async fn test_add_student_requires_student_role() {
        let mut repos = MockRepos::new();
        repos
            .classes
            .expect_find_by_id()
            .returning(|_| Ok(Some(class_with("k1", &[], &[]))));
        repos
            .users
            .expect_find_by_ids()
            .returning(|_| Ok(vec![approved_user("t1", UserRole::Teacher)]));
        let (repos, realtime) = repos.build_with_realtime();
        let service = ClassService::new(repos, realtime);

        let result = service.add_student("k1", "t1").await;
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_add_existing_course_does_not_duplicate() {
        let mut repos = MockRepos::new();
        repos
            .classes
            .expect_find_by_id()
            .returning(|_| Ok(Some(class_with("k1", &["c1"], &[]))));
        repos
            .courses
            .expect_find_by_id()
            .returning(|_| Ok(Some(course("c1"))));
        repos.classes.expect_add_course().never();
        repos
            .courses
            .expect_add_class()
            .returning(|_, _| Ok(()));
        let (repos, realtime) = repos.build_with_realtime();
        let service = ClassService::new(repos, realtime);

        let class = service.add_course("k1", "c1").await.unwrap();
        assert_eq!(class.courses.len(), 1);
    }

    #[tokio::test]
    async fn test_remove_student_not_enrolled() {
        let mut repos = MockRepos::new();
        repos
            .classes
            .expect_find_by_id()
            .returning(|_| Ok(Some(class_with("k1", &[], &["s1"]))));
        let (repos, realtime) = repos.build_with_realtime();
        let service = ClassService::new(repos, realtime);

        let result = service.remove_student("k1", "s2").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_class_cleans_back_references() {
        let mut repos = MockRepos::new();
        repos.classes.expect_delete().with(eq("k1")).returning(|_| Ok(()));
        repos
            .courses
            .expect_remove_class_everywhere()
            .with(eq("k1"))
            .times(1)
            .returning(|_| Ok(2));
        repos
            .users
            .expect_remove_class_everywhere()
            .with(eq("k1"))
            .times(1)
            .returning(|_| Ok(30));
        let (repos, realtime) = repos.build_with_realtime();
        let service = ClassService::new(repos, realtime);

        service.delete_class("k1").await.unwrap();
    }
}
