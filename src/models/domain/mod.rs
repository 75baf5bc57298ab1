pub mod attendance;
pub mod class;
pub mod course;
pub mod entity_ref;
pub mod ids;
pub mod quiz;
pub mod quiz_question;
pub mod submission;
pub mod user;

pub use attendance::{AttendanceEntry, AttendanceRecord, AttendanceStatus};
pub use class::Class;
pub use course::Course;
pub use entity_ref::EntityRef;
pub use quiz::{Quiz, QuizStatus};
pub use quiz_question::{QuizQuestion, QuizQuestionOption, QuizQuestionType};
pub use submission::{Submission, SubmissionAnswer, SubmissionStatus};
pub use user::{User, UserRole, UserStatus};
