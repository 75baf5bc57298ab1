use actix_web::{delete, get, post, put, web, HttpResponse};

use crate::{
    app_state::AppState,
    auth::{require_admin, require_role, CurrentUser},
    errors::AppError,
    models::{
        domain::UserRole,
        dto::request::{CreateQuizRequest, SubmitQuizRequest, UpdateQuizRequest},
    },
};

#[get("/admin/quizzes")]
pub async fn admin_list_quizzes(
    state: web::Data<AppState>,
    user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&user.0)?;

    let quizzes = state.quiz_service.list_quizzes(&user.0).await?;
    Ok(HttpResponse::Ok().json(quizzes))
}

#[delete("/admin/quizzes/{id}")]
pub async fn admin_delete_quiz(
    state: web::Data<AppState>,
    id: web::Path<String>,
    user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    let response = state.quiz_service.delete_quiz(&user.0, &id).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[post("/teacher/quizzes")]
pub async fn create_quiz(
    state: web::Data<AppState>,
    request: web::Json<CreateQuizRequest>,
    user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    let quiz = state
        .quiz_service
        .create_quiz(&user.0, request.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(quiz))
}

#[get("/teacher/quizzes")]
pub async fn list_quizzes(
    state: web::Data<AppState>,
    user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    let quizzes = state.quiz_service.list_quizzes(&user.0).await?;
    Ok(HttpResponse::Ok().json(quizzes))
}

#[get("/teacher/quizzes/{id}")]
pub async fn get_quiz(
    state: web::Data<AppState>,
    id: web::Path<String>,
    user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    let quiz = state.quiz_service.get_quiz_for_staff(&user.0, &id).await?;
    Ok(HttpResponse::Ok().json(quiz))
}

#[put("/teacher/quizzes/{id}")]
pub async fn update_quiz(
    state: web::Data<AppState>,
    id: web::Path<String>,
    request: web::Json<UpdateQuizRequest>,
    user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    let quiz = state
        .quiz_service
        .update_quiz(&user.0, &id, request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(quiz))
}

#[delete("/teacher/quizzes/{id}")]
pub async fn delete_quiz(
    state: web::Data<AppState>,
    id: web::Path<String>,
    user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    let response = state.quiz_service.delete_quiz(&user.0, &id).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[get("/student/quizzes")]
pub async fn student_quizzes(
    state: web::Data<AppState>,
    user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    require_role(&user.0, UserRole::Student)?;

    let quizzes = state.quiz_service.quizzes_for_student(&user.0.sub).await?;
    Ok(HttpResponse::Ok().json(quizzes))
}

#[get("/student/quizzes/{id}")]
pub async fn take_quiz(
    state: web::Data<AppState>,
    id: web::Path<String>,
    user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    require_role(&user.0, UserRole::Student)?;

    let quiz = state.quiz_service.quiz_for_taking(&user.0.sub, &id).await?;
    Ok(HttpResponse::Ok().json(quiz))
}

#[post("/student/quizzes/{id}/submit")]
pub async fn submit_quiz(
    state: web::Data<AppState>,
    id: web::Path<String>,
    request: web::Json<SubmitQuizRequest>,
    user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    let submission = state
        .submission_service
        .submit(&user.0, &id, request.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(submission))
}
