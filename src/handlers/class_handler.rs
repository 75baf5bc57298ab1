use actix_web::{delete, get, post, put, web, HttpResponse};

use crate::{
    app_state::AppState,
    auth::{require_admin, require_role, CurrentUser},
    errors::AppError,
    models::{
        domain::UserRole,
        dto::request::{CreateClassRequest, MemberRequest, UpdateClassRequest},
    },
};

#[post("/admin/classes")]
pub async fn create_class(
    state: web::Data<AppState>,
    request: web::Json<CreateClassRequest>,
    user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&user.0)?;

    let class = state.class_service.create_class(request.into_inner()).await?;
    Ok(HttpResponse::Created().json(class))
}

#[get("/admin/classes")]
pub async fn list_classes(
    state: web::Data<AppState>,
    user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&user.0)?;

    let classes = state.class_service.list_classes().await?;
    Ok(HttpResponse::Ok().json(classes))
}

#[get("/admin/classes/{id}")]
pub async fn get_class(
    state: web::Data<AppState>,
    id: web::Path<String>,
    user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&user.0)?;

    let detail = state.class_service.class_detail(&id).await?;
    Ok(HttpResponse::Ok().json(detail))
}

#[put("/admin/classes/{id}")]
pub async fn update_class(
    state: web::Data<AppState>,
    id: web::Path<String>,
    request: web::Json<UpdateClassRequest>,
    user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&user.0)?;

    let class = state
        .class_service
        .update_class(&id, request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(class))
}

#[delete("/admin/classes/{id}")]
pub async fn delete_class(
    state: web::Data<AppState>,
    id: web::Path<String>,
    user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&user.0)?;

    let response = state.class_service.delete_class(&id).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[post("/admin/classes/{id}/courses")]
pub async fn add_class_course(
    state: web::Data<AppState>,
    id: web::Path<String>,
    request: web::Json<MemberRequest>,
    user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&user.0)?;

    let class = state.class_service.add_course(&id, &request.id).await?;
    Ok(HttpResponse::Ok().json(class))
}

#[delete("/admin/classes/{id}/courses/{course_id}")]
pub async fn remove_class_course(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
    user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&user.0)?;

    let (id, course_id) = path.into_inner();
    let class = state.class_service.remove_course(&id, &course_id).await?;
    Ok(HttpResponse::Ok().json(class))
}

#[post("/admin/classes/{id}/students")]
pub async fn add_class_student(
    state: web::Data<AppState>,
    id: web::Path<String>,
    request: web::Json<MemberRequest>,
    user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&user.0)?;

    let class = state.class_service.add_student(&id, &request.id).await?;
    Ok(HttpResponse::Ok().json(class))
}

#[delete("/admin/classes/{id}/students/{student_id}")]
pub async fn remove_class_student(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
    user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&user.0)?;

    let (id, student_id) = path.into_inner();
    let class = state.class_service.remove_student(&id, &student_id).await?;
    Ok(HttpResponse::Ok().json(class))
}

#[get("/teacher/classes")]
pub async fn teacher_classes(
    state: web::Data<AppState>,
    user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    require_role(&user.0, UserRole::Teacher)?;

    let classes = state.class_service.classes_for_teacher(&user.0.sub).await?;
    Ok(HttpResponse::Ok().json(classes))
}

#[get("/teacher/classes/{id}")]
pub async fn teacher_class_detail(
    state: web::Data<AppState>,
    id: web::Path<String>,
    user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    require_role(&user.0, UserRole::Teacher)?;

    let detail = state.class_service.class_detail_for(&user.0, &id).await?;
    Ok(HttpResponse::Ok().json(detail))
}

#[get("/student/classes")]
pub async fn student_classes(
    state: web::Data<AppState>,
    user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    require_role(&user.0, UserRole::Student)?;

    let classes = state.class_service.classes_for_student(&user.0.sub).await?;
    Ok(HttpResponse::Ok().json(classes))
}
