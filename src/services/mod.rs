pub mod associations;
pub mod attendance_service;
pub mod class_service;
pub mod course_service;
pub mod grading;
pub mod quiz_service;
pub mod realtime;
pub mod submission_service;
pub mod user_service;

pub use attendance_service::AttendanceService;
pub use class_service::ClassService;
pub use course_service::CourseService;
pub use quiz_service::QuizService;
pub use realtime::{CollectionSnapshot, RealtimeService, SnapshotHub};
pub use submission_service::SubmissionService;
pub use user_service::UserService;
