pub mod attendance_handler;
pub mod auth_handler;
pub mod class_handler;
pub mod course_handler;
pub mod health_handler;
pub mod quiz_handler;
pub mod realtime_handler;
pub mod submission_handler;
pub mod user_handler;

use actix_web::web;

use crate::graphql;

/// Registers every route. Literal paths come before parameterised siblings.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health_handler::health_check)
        .service(health_handler::health_check_live)
        .service(health_handler::health_check_ready)
        // session relay
        .service(auth_handler::get_user_role)
        .service(auth_handler::register)
        .service(auth_handler::logout)
        .service(auth_handler::me)
        .service(realtime_handler::stream_collection)
        .service(graphql::graphql_handler)
        .service(graphql::graphiql)
        // admin
        .service(user_handler::list_users)
        .service(user_handler::list_pending_users)
        .service(user_handler::get_user)
        .service(user_handler::update_user)
        .service(user_handler::approve_user)
        .service(user_handler::reject_user)
        .service(user_handler::update_user_role)
        .service(user_handler::delete_user)
        .service(class_handler::create_class)
        .service(class_handler::list_classes)
        .service(class_handler::get_class)
        .service(class_handler::update_class)
        .service(class_handler::delete_class)
        .service(class_handler::add_class_course)
        .service(class_handler::remove_class_course)
        .service(class_handler::add_class_student)
        .service(class_handler::remove_class_student)
        .service(course_handler::create_course)
        .service(course_handler::list_courses)
        .service(course_handler::get_course)
        .service(course_handler::update_course)
        .service(course_handler::delete_course)
        .service(quiz_handler::admin_list_quizzes)
        .service(quiz_handler::admin_delete_quiz)
        .service(submission_handler::list_all_submissions)
        .service(attendance_handler::admin_attendance)
        // teacher
        .service(class_handler::teacher_classes)
        .service(class_handler::teacher_class_detail)
        .service(course_handler::teacher_courses)
        .service(quiz_handler::create_quiz)
        .service(quiz_handler::list_quizzes)
        .service(submission_handler::quiz_submissions)
        .service(quiz_handler::get_quiz)
        .service(quiz_handler::update_quiz)
        .service(quiz_handler::delete_quiz)
        .service(submission_handler::teacher_get_submission)
        .service(submission_handler::evaluate_submission)
        .service(attendance_handler::mark_attendance)
        .service(attendance_handler::teacher_attendance)
        .service(attendance_handler::student_summary_for_staff)
        .service(attendance_handler::delete_attendance)
        // student
        .service(class_handler::student_classes)
        .service(course_handler::student_courses)
        .service(quiz_handler::student_quizzes)
        .service(quiz_handler::take_quiz)
        .service(quiz_handler::submit_quiz)
        .service(submission_handler::my_submissions)
        .service(submission_handler::student_get_submission)
        .service(attendance_handler::my_attendance)
        .service(attendance_handler::my_attendance_summary);
}
