use actix_web::{delete, get, post, web, HttpResponse};

use crate::{
    app_state::AppState,
    auth::{require_role, require_staff, CurrentUser},
    errors::AppError,
    models::{
        domain::UserRole,
        dto::request::{AttendanceQuery, AttendanceSummaryQuery, MarkAttendanceRequest},
    },
};

#[post("/teacher/attendance")]
pub async fn mark_attendance(
    state: web::Data<AppState>,
    request: web::Json<MarkAttendanceRequest>,
    user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    let record = state
        .attendance_service
        .mark(&user.0, request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(record))
}

/// All sheets of a class, or the one for `date` when given.
async fn class_attendance(
    state: &AppState,
    query: AttendanceQuery,
) -> Result<HttpResponse, AppError> {
    match query.date {
        Some(date) => {
            let record = state
                .attendance_service
                .record_for_class_on(&query.class_id, date)
                .await?;
            Ok(HttpResponse::Ok().json(record))
        }
        None => {
            let records = state
                .attendance_service
                .records_for_class(&query.class_id)
                .await?;
            Ok(HttpResponse::Ok().json(records))
        }
    }
}

#[get("/teacher/attendance")]
pub async fn teacher_attendance(
    state: web::Data<AppState>,
    query: web::Query<AttendanceQuery>,
    user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    require_staff(&user.0)?;
    class_attendance(&state, query.into_inner()).await
}

#[get("/admin/attendance")]
pub async fn admin_attendance(
    state: web::Data<AppState>,
    query: web::Query<AttendanceQuery>,
    user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    require_staff(&user.0)?;
    class_attendance(&state, query.into_inner()).await
}

#[get("/teacher/attendance/summary/{student_id}")]
pub async fn student_summary_for_staff(
    state: web::Data<AppState>,
    student_id: web::Path<String>,
    query: web::Query<AttendanceSummaryQuery>,
    user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    require_staff(&user.0)?;

    let summary = state
        .attendance_service
        .summary(&student_id, query.into_inner().class_id)
        .await?;
    Ok(HttpResponse::Ok().json(summary))
}

#[delete("/teacher/attendance/{id}")]
pub async fn delete_attendance(
    state: web::Data<AppState>,
    id: web::Path<String>,
    user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    let response = state.attendance_service.delete(&user.0, &id).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[get("/student/attendance")]
pub async fn my_attendance(
    state: web::Data<AppState>,
    user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    require_role(&user.0, UserRole::Student)?;

    let records = state
        .attendance_service
        .records_for_student(&user.0.sub)
        .await?;
    Ok(HttpResponse::Ok().json(records))
}

#[get("/student/attendance/summary")]
pub async fn my_attendance_summary(
    state: web::Data<AppState>,
    query: web::Query<AttendanceSummaryQuery>,
    user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    require_role(&user.0, UserRole::Student)?;

    let summary = state
        .attendance_service
        .summary(&user.0.sub, query.into_inner().class_id)
        .await?;
    Ok(HttpResponse::Ok().json(summary))
}
