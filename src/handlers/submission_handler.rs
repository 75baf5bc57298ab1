use actix_web::{get, put, web, HttpResponse};

use crate::{
    app_state::AppState,
    auth::{require_role, CurrentUser},
    errors::AppError,
    models::{domain::UserRole, dto::request::EvaluateSubmissionRequest},
};

#[get("/admin/submissions")]
pub async fn list_all_submissions(
    state: web::Data<AppState>,
    user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    let submissions = state.submission_service.list_all(&user.0).await?;
    Ok(HttpResponse::Ok().json(submissions))
}

#[get("/teacher/quizzes/{id}/submissions")]
pub async fn quiz_submissions(
    state: web::Data<AppState>,
    id: web::Path<String>,
    user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    let submissions = state
        .submission_service
        .submissions_for_quiz(&user.0, &id)
        .await?;
    Ok(HttpResponse::Ok().json(submissions))
}

#[get("/teacher/submissions/{id}")]
pub async fn teacher_get_submission(
    state: web::Data<AppState>,
    id: web::Path<String>,
    user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    let submission = state.submission_service.get_submission(&user.0, &id).await?;
    Ok(HttpResponse::Ok().json(submission))
}

#[put("/teacher/submissions/{id}/evaluate")]
pub async fn evaluate_submission(
    state: web::Data<AppState>,
    id: web::Path<String>,
    request: web::Json<EvaluateSubmissionRequest>,
    user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    let submission = state
        .submission_service
        .evaluate(&user.0, &id, request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(submission))
}

#[get("/student/submissions")]
pub async fn my_submissions(
    state: web::Data<AppState>,
    user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    require_role(&user.0, UserRole::Student)?;

    let submissions = state
        .submission_service
        .submissions_for_student(&user.0.sub)
        .await?;
    Ok(HttpResponse::Ok().json(submissions))
}

#[get("/student/submissions/{id}")]
pub async fn student_get_submission(
    state: web::Data<AppState>,
    id: web::Path<String>,
    user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    let submission = state.submission_service.get_submission(&user.0, &id).await?;
    Ok(HttpResponse::Ok().json(submission))
}
