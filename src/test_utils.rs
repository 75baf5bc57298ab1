use std::sync::Arc;

use crate::{
    repositories::{
        attendance_repository::MockAttendanceRepository, class_repository::MockClassRepository,
        course_repository::MockCourseRepository, quiz_repository::MockQuizRepository,
        submission_repository::MockSubmissionRepository, user_repository::MockUserRepository,
        Repositories,
    },
    services::realtime::RealtimeService,
};

/// Mock repositories for service tests. Set expectations on the fields, then
/// call [`MockRepos::build`].
pub struct MockRepos {
    pub users: MockUserRepository,
    pub classes: MockClassRepository,
    pub courses: MockCourseRepository,
    pub quizzes: MockQuizRepository,
    pub submissions: MockSubmissionRepository,
    pub attendance: MockAttendanceRepository,
}

impl MockRepos {
    pub fn new() -> Self {
        Self {
            users: MockUserRepository::new(),
            classes: MockClassRepository::new(),
            courses: MockCourseRepository::new(),
            quizzes: MockQuizRepository::new(),
            submissions: MockSubmissionRepository::new(),
            attendance: MockAttendanceRepository::new(),
        }
    }

    pub fn build(self) -> Repositories {
        Repositories {
            users: Arc::new(self.users),
            classes: Arc::new(self.classes),
            courses: Arc::new(self.courses),
            quizzes: Arc::new(self.quizzes),
            submissions: Arc::new(self.submissions),
            attendance: Arc::new(self.attendance),
        }
    }

    /// Repositories plus a realtime service with no subscribers.
    pub fn build_with_realtime(self) -> (Repositories, Arc<RealtimeService>) {
        let repos = self.build();
        let realtime = Arc::new(RealtimeService::new(repos.clone()));
        (repos, realtime)
    }
}

pub mod fixtures {
    use crate::{
        auth::Claims,
        models::domain::{
            Class, Course, Quiz, QuizQuestion, QuizQuestionOption, QuizQuestionType, User,
            UserRole, UserStatus,
        },
    };

    pub fn approved_user(id: &str, role: UserRole) -> User {
        let mut user = User::new(
            &format!("uid-{}", id),
            &format!("User {}", id),
            &format!("{}@example.com", id),
            role,
        );
        user.id = id.to_string();
        user.status = UserStatus::Approved;
        user
    }

    pub fn claims_for(id: &str, role: UserRole) -> Claims {
        Claims::new(&approved_user(id, role), 1)
    }

    pub fn class_with(id: &str, course_ids: &[&str], student_ids: &[&str]) -> Class {
        let mut class = Class::new(&format!("Class {}", id), None);
        class.id = id.to_string();
        class.courses = course_ids.iter().map(|c| (*c).into()).collect();
        class.students = student_ids.iter().map(|s| (*s).into()).collect();
        class
    }

    pub fn course(id: &str) -> Course {
        let mut course = Course::new(&format!("Course {}", id), None, None);
        course.id = id.to_string();
        course
    }

    fn option(id: &str, correct: bool) -> QuizQuestionOption {
        QuizQuestionOption {
            id: id.to_string(),
            text: format!("Option {}", id),
            correct,
        }
    }

    /// Two auto-graded questions worth 2 and 3 points.
    pub fn choice_quiz(id: &str, course_id: &str, created_by: &str) -> Quiz {
        let mut quiz = Quiz::new(
            &format!("Quiz {}", id),
            course_id,
            created_by,
            vec![
                QuizQuestion {
                    id: "q1".to_string(),
                    prompt: "Pick A".to_string(),
                    question_type: QuizQuestionType::Single,
                    options: vec![option("opt1", true), option("opt2", false)],
                    points: 2,
                },
                QuizQuestion {
                    id: "q2".to_string(),
                    prompt: "The sky is blue".to_string(),
                    question_type: QuizQuestionType::Bool,
                    options: vec![option("opt1", true), option("opt2", false)],
                    points: 3,
                },
            ],
        );
        quiz.id = id.to_string();
        quiz
    }

    /// `choice_quiz` plus a 5 point text question.
    pub fn mixed_quiz(id: &str, course_id: &str, created_by: &str) -> Quiz {
        let mut quiz = choice_quiz(id, course_id, created_by);
        quiz.questions.push(QuizQuestion {
            id: "q3".to_string(),
            prompt: "Explain".to_string(),
            question_type: QuizQuestionType::Text,
            options: vec![],
            points: 5,
        });
        quiz
    }
}
