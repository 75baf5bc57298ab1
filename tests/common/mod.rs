#![allow(dead_code)]

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use chrono::NaiveDate;
use secrecy::SecretString;
use tokio::sync::RwLock;

use eduportal_server::{
    app_state::AppState,
    auth::Claims,
    config::Config,
    errors::{AppError, AppResult},
    models::domain::{
        AttendanceRecord, Class, Course, EntityRef, Quiz, Submission, User, UserRole, UserStatus,
    },
    repositories::{
        AttendanceRepository, ClassRepository, CourseRepository, QuizRepository, Repositories,
        SubmissionRepository, UserRepository,
    },
};

type Table<T> = Arc<RwLock<HashMap<String, T>>>;

fn table<T>() -> Table<T> {
    Arc::new(RwLock::new(HashMap::new()))
}

fn not_found(what: &str, id: &str) -> AppError {
    AppError::NotFound(format!("{} with id '{}' not found", what, id))
}

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Table<User>,
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> AppResult<User> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.uid == user.uid) {
            return Err(AppError::AlreadyExists(format!(
                "User with uid '{}' already exists",
                user.uid
            )));
        }
        users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<User>> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn find_by_uid(&self, uid: &str) -> AppResult<Option<User>> {
        Ok(self.users.read().await.values().find(|u| u.uid == uid).cloned())
    }

    async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<User>> {
        let users = self.users.read().await;
        Ok(ids.iter().filter_map(|id| users.get(id).cloned()).collect())
    }

    async fn find_all(&self) -> AppResult<Vec<User>> {
        let mut items: Vec<User> = self.users.read().await.values().cloned().collect();
        items.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(items)
    }

    async fn find_by_status(&self, status: UserStatus) -> AppResult<Vec<User>> {
        let mut items = self.find_all().await?;
        items.retain(|u| u.status == status);
        Ok(items)
    }

    async fn find_paginated(
        &self,
        role: Option<UserRole>,
        status: Option<UserStatus>,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<User>, i64)> {
        let items: Vec<User> = self
            .find_all()
            .await?
            .into_iter()
            .filter(|u| role.map(|r| u.role == r).unwrap_or(true))
            .filter(|u| status.map(|s| u.status == s).unwrap_or(true))
            .collect();

        let total = items.len() as i64;
        let page = items
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect();
        Ok((page, total))
    }

    async fn update(&self, user: User) -> AppResult<User> {
        let mut users = self.users.write().await;
        if !users.contains_key(&user.id) {
            return Err(not_found("User", &user.id));
        }
        users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn add_class(&self, user_id: &str, class_id: &str) -> AppResult<()> {
        let mut users = self.users.write().await;
        let user = users.get_mut(user_id).ok_or_else(|| not_found("User", user_id))?;
        if !user.class_ids.iter().any(|id| id == class_id) {
            user.class_ids.push(class_id.to_string());
        }
        Ok(())
    }

    async fn remove_class(&self, user_id: &str, class_id: &str) -> AppResult<()> {
        if let Some(user) = self.users.write().await.get_mut(user_id) {
            user.class_ids.retain(|id| id != class_id);
        }
        Ok(())
    }

    async fn remove_class_everywhere(&self, class_id: &str) -> AppResult<u64> {
        let mut modified = 0;
        for user in self.users.write().await.values_mut() {
            let before = user.class_ids.len();
            user.class_ids.retain(|id| id != class_id);
            if user.class_ids.len() != before {
                modified += 1;
            }
        }
        Ok(modified)
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        self.users
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| not_found("User", id))
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryClassRepository {
    classes: Table<Class>,
}

#[async_trait]
impl ClassRepository for InMemoryClassRepository {
    async fn create(&self, class: Class) -> AppResult<Class> {
        self.classes
            .write()
            .await
            .insert(class.id.clone(), class.clone());
        Ok(class)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Class>> {
        Ok(self.classes.read().await.get(id).cloned())
    }

    async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<Class>> {
        let classes = self.classes.read().await;
        Ok(ids.iter().filter_map(|id| classes.get(id).cloned()).collect())
    }

    async fn find_all(&self) -> AppResult<Vec<Class>> {
        let mut items: Vec<Class> = self.classes.read().await.values().cloned().collect();
        items.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(items)
    }

    async fn find_by_student(&self, student_id: &str) -> AppResult<Vec<Class>> {
        Ok(self
            .find_all()
            .await?
            .into_iter()
            .filter(|c| c.has_student(student_id))
            .collect())
    }

    async fn find_by_teacher(&self, teacher_id: &str) -> AppResult<Vec<Class>> {
        Ok(self
            .find_all()
            .await?
            .into_iter()
            .filter(|c| c.teacher_ids.iter().any(|id| id == teacher_id))
            .collect())
    }

    async fn update(&self, class: Class) -> AppResult<Class> {
        let mut classes = self.classes.write().await;
        if !classes.contains_key(&class.id) {
            return Err(not_found("Class", &class.id));
        }
        classes.insert(class.id.clone(), class.clone());
        Ok(class)
    }

    async fn add_course(&self, class_id: &str, course_id: &str) -> AppResult<()> {
        let mut classes = self.classes.write().await;
        let class = classes.get_mut(class_id).ok_or_else(|| not_found("Class", class_id))?;
        if !class.has_course(course_id) {
            class.courses.push(EntityRef::from(course_id));
        }
        Ok(())
    }

    async fn add_student(&self, class_id: &str, student_id: &str) -> AppResult<()> {
        let mut classes = self.classes.write().await;
        let class = classes.get_mut(class_id).ok_or_else(|| not_found("Class", class_id))?;
        if !class.has_student(student_id) {
            class.students.push(EntityRef::from(student_id));
        }
        Ok(())
    }

    async fn remove_course_everywhere(&self, course_id: &str) -> AppResult<u64> {
        let mut modified = 0;
        for class in self.classes.write().await.values_mut() {
            if class.has_course(course_id) {
                class.courses.retain(|r| !r.refers_to(course_id));
                modified += 1;
            }
        }
        Ok(modified)
    }

    async fn remove_student_everywhere(&self, student_id: &str) -> AppResult<u64> {
        let mut modified = 0;
        for class in self.classes.write().await.values_mut() {
            if class.has_student(student_id) {
                class.students.retain(|r| !r.refers_to(student_id));
                modified += 1;
            }
        }
        Ok(modified)
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        self.classes
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| not_found("Class", id))
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryCourseRepository {
    courses: Table<Course>,
}

#[async_trait]
impl CourseRepository for InMemoryCourseRepository {
    async fn create(&self, course: Course) -> AppResult<Course> {
        self.courses
            .write()
            .await
            .insert(course.id.clone(), course.clone());
        Ok(course)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Course>> {
        Ok(self.courses.read().await.get(id).cloned())
    }

    async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<Course>> {
        let courses = self.courses.read().await;
        Ok(ids.iter().filter_map(|id| courses.get(id).cloned()).collect())
    }

    async fn find_all(&self) -> AppResult<Vec<Course>> {
        let mut items: Vec<Course> = self.courses.read().await.values().cloned().collect();
        items.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(items)
    }

    async fn find_by_teacher(&self, teacher_id: &str) -> AppResult<Vec<Course>> {
        Ok(self
            .find_all()
            .await?
            .into_iter()
            .filter(|c| c.is_taught_by(teacher_id))
            .collect())
    }

    async fn update(&self, course: Course) -> AppResult<Course> {
        let mut courses = self.courses.write().await;
        if !courses.contains_key(&course.id) {
            return Err(not_found("Course", &course.id));
        }
        courses.insert(course.id.clone(), course.clone());
        Ok(course)
    }

    async fn add_class(&self, course_id: &str, class_id: &str) -> AppResult<()> {
        let mut courses = self.courses.write().await;
        let course = courses
            .get_mut(course_id)
            .ok_or_else(|| not_found("Course", course_id))?;
        if !course.class_ids.iter().any(|id| id == class_id) {
            course.class_ids.push(class_id.to_string());
        }
        Ok(())
    }

    async fn remove_class(&self, course_id: &str, class_id: &str) -> AppResult<()> {
        if let Some(course) = self.courses.write().await.get_mut(course_id) {
            course.class_ids.retain(|id| id != class_id);
        }
        Ok(())
    }

    async fn remove_class_everywhere(&self, class_id: &str) -> AppResult<u64> {
        let mut modified = 0;
        for course in self.courses.write().await.values_mut() {
            let before = course.class_ids.len();
            course.class_ids.retain(|id| id != class_id);
            if course.class_ids.len() != before {
                modified += 1;
            }
        }
        Ok(modified)
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        self.courses
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| not_found("Course", id))
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryQuizRepository {
    quizzes: Table<Quiz>,
}

#[async_trait]
impl QuizRepository for InMemoryQuizRepository {
    async fn create(&self, quiz: Quiz) -> AppResult<Quiz> {
        self.quizzes
            .write()
            .await
            .insert(quiz.id.clone(), quiz.clone());
        Ok(quiz)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Quiz>> {
        Ok(self.quizzes.read().await.get(id).cloned())
    }

    async fn find_all(&self) -> AppResult<Vec<Quiz>> {
        let mut items: Vec<Quiz> = self.quizzes.read().await.values().cloned().collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }

    async fn find_by_creator(&self, user_id: &str) -> AppResult<Vec<Quiz>> {
        Ok(self
            .find_all()
            .await?
            .into_iter()
            .filter(|q| q.created_by == user_id)
            .collect())
    }

    async fn find_for_audience(
        &self,
        class_ids: &[String],
        course_ids: &[String],
    ) -> AppResult<Vec<Quiz>> {
        Ok(self
            .find_all()
            .await?
            .into_iter()
            .filter(|q| {
                q.class_ids.iter().any(|id| class_ids.contains(id))
                    || course_ids.contains(&q.course_id)
            })
            .collect())
    }

    async fn update(&self, quiz: Quiz) -> AppResult<Quiz> {
        let mut quizzes = self.quizzes.write().await;
        if !quizzes.contains_key(&quiz.id) {
            return Err(not_found("Quiz", &quiz.id));
        }
        quizzes.insert(quiz.id.clone(), quiz.clone());
        Ok(quiz)
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        self.quizzes
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| not_found("Quiz", id))
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemorySubmissionRepository {
    submissions: Table<Submission>,
}

#[async_trait]
impl SubmissionRepository for InMemorySubmissionRepository {
    async fn create(&self, submission: Submission) -> AppResult<Submission> {
        self.submissions
            .write()
            .await
            .insert(submission.id.clone(), submission.clone());
        Ok(submission)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Submission>> {
        Ok(self.submissions.read().await.get(id).cloned())
    }

    async fn find_all(&self) -> AppResult<Vec<Submission>> {
        let mut items: Vec<Submission> = self.submissions.read().await.values().cloned().collect();
        items.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        Ok(items)
    }

    async fn find_by_quiz(&self, quiz_id: &str) -> AppResult<Vec<Submission>> {
        Ok(self
            .find_all()
            .await?
            .into_iter()
            .filter(|s| s.quiz_id == quiz_id)
            .collect())
    }

    async fn find_by_student(&self, student_id: &str) -> AppResult<Vec<Submission>> {
        Ok(self
            .find_all()
            .await?
            .into_iter()
            .filter(|s| s.student_id == student_id)
            .collect())
    }

    async fn count_student_attempts(&self, student_id: &str, quiz_id: &str) -> AppResult<usize> {
        Ok(self
            .submissions
            .read()
            .await
            .values()
            .filter(|s| s.student_id == student_id && s.quiz_id == quiz_id)
            .count())
    }

    async fn update(&self, submission: Submission) -> AppResult<Submission> {
        let mut submissions = self.submissions.write().await;
        if !submissions.contains_key(&submission.id) {
            return Err(not_found("Submission", &submission.id));
        }
        submissions.insert(submission.id.clone(), submission.clone());
        Ok(submission)
    }

    async fn delete_by_quiz(&self, quiz_id: &str) -> AppResult<u64> {
        let mut submissions = self.submissions.write().await;
        let before = submissions.len();
        submissions.retain(|_, s| s.quiz_id != quiz_id);
        Ok((before - submissions.len()) as u64)
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryAttendanceRepository {
    records: Table<AttendanceRecord>,
}

#[async_trait]
impl AttendanceRepository for InMemoryAttendanceRepository {
    async fn upsert(&self, record: AttendanceRecord) -> AppResult<AttendanceRecord> {
        self.records
            .write()
            .await
            .insert(record.id.clone(), record.clone());
        Ok(record)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<AttendanceRecord>> {
        Ok(self.records.read().await.get(id).cloned())
    }

    async fn find_all(&self) -> AppResult<Vec<AttendanceRecord>> {
        let mut items: Vec<AttendanceRecord> = self.records.read().await.values().cloned().collect();
        items.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(items)
    }

    async fn find_by_class(&self, class_id: &str) -> AppResult<Vec<AttendanceRecord>> {
        Ok(self
            .find_all()
            .await?
            .into_iter()
            .filter(|r| r.class_id == class_id)
            .collect())
    }

    async fn find_by_class_and_date(
        &self,
        class_id: &str,
        date: NaiveDate,
    ) -> AppResult<Option<AttendanceRecord>> {
        Ok(self
            .records
            .read()
            .await
            .get(&AttendanceRecord::record_id(class_id, date))
            .cloned())
    }

    async fn find_by_student(&self, student_id: &str) -> AppResult<Vec<AttendanceRecord>> {
        Ok(self
            .find_all()
            .await?
            .into_iter()
            .filter(|r| r.status_of(student_id).is_some())
            .collect())
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        self.records
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| not_found("Attendance record", id))
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        Ok(())
    }
}

pub fn in_memory_repositories() -> Repositories {
    Repositories {
        users: Arc::new(InMemoryUserRepository::default()),
        classes: Arc::new(InMemoryClassRepository::default()),
        courses: Arc::new(InMemoryCourseRepository::default()),
        quizzes: Arc::new(InMemoryQuizRepository::default()),
        submissions: Arc::new(InMemorySubmissionRepository::default()),
        attendance: Arc::new(InMemoryAttendanceRepository::default()),
    }
}

pub fn test_config() -> Config {
    Config {
        mongo_conn_string: "mongodb://localhost:27017".to_string(),
        mongo_db_name: "eduportal-test".to_string(),
        web_server_host: "127.0.0.1".to_string(),
        web_server_port: 8080,
        session_secret: SecretString::from("integration_test_session_secret".to_string()),
        session_expiration_hours: 1,
        cookie_secure: false,
        frontend_origin: "http://localhost:3000".to_string(),
        app_env: "test".to_string(),
    }
}

/// App state over fresh in-memory repositories, plus a handle for seeding.
pub fn test_state() -> (AppState, Repositories) {
    let repos = in_memory_repositories();
    let state = AppState::from_repositories(test_config(), repos.clone(), None);
    (state, repos)
}

/// Inserts a user directly, bypassing registration rules (admins cannot self-register).
pub async fn seed_user(repos: &Repositories, uid: &str, name: &str, role: UserRole) -> User {
    let user = User::new(uid, name, &format!("{}@example.com", uid), role);
    repos.users.create(user).await.expect("seed user")
}

pub async fn approved_user(
    state: &AppState,
    repos: &Repositories,
    uid: &str,
    name: &str,
    role: UserRole,
) -> User {
    let user = seed_user(repos, uid, name, role).await;
    state
        .user_service
        .approve(&user.id)
        .await
        .expect("approve user")
}

pub fn claims(state: &AppState, user: &User) -> Claims {
    Claims::new(user, state.jwt_service.expiration_hours())
}
