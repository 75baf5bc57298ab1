use actix_web::{delete, get, post, put, web, HttpResponse};

use crate::{
    app_state::AppState,
    auth::{require_admin, require_role, CurrentUser},
    errors::AppError,
    models::{
        domain::UserRole,
        dto::request::{CreateCourseRequest, UpdateCourseRequest},
    },
};

#[post("/admin/courses")]
pub async fn create_course(
    state: web::Data<AppState>,
    request: web::Json<CreateCourseRequest>,
    user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&user.0)?;

    let course = state.course_service.create_course(request.into_inner()).await?;
    Ok(HttpResponse::Created().json(course))
}

#[get("/admin/courses")]
pub async fn list_courses(
    state: web::Data<AppState>,
    user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&user.0)?;

    let courses = state.course_service.list_courses().await?;
    Ok(HttpResponse::Ok().json(courses))
}

#[get("/admin/courses/{id}")]
pub async fn get_course(
    state: web::Data<AppState>,
    id: web::Path<String>,
    user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&user.0)?;

    let course = state.course_service.get_course(&id).await?;
    Ok(HttpResponse::Ok().json(course))
}

#[put("/admin/courses/{id}")]
pub async fn update_course(
    state: web::Data<AppState>,
    id: web::Path<String>,
    request: web::Json<UpdateCourseRequest>,
    user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&user.0)?;

    let course = state
        .course_service
        .update_course(&id, request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(course))
}

#[delete("/admin/courses/{id}")]
pub async fn delete_course(
    state: web::Data<AppState>,
    id: web::Path<String>,
    user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&user.0)?;

    let response = state.course_service.delete_course(&id).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[get("/teacher/courses")]
pub async fn teacher_courses(
    state: web::Data<AppState>,
    user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    require_role(&user.0, UserRole::Teacher)?;

    let courses = state.course_service.courses_for_teacher(&user.0.sub).await?;
    Ok(HttpResponse::Ok().json(courses))
}

#[get("/student/courses")]
pub async fn student_courses(
    state: web::Data<AppState>,
    user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    require_role(&user.0, UserRole::Student)?;

    let courses = state.course_service.courses_for_student(&user.0.sub).await?;
    Ok(HttpResponse::Ok().json(courses))
}
