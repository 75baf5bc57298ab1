use actix_web::{delete, get, put, web, HttpResponse};

use crate::{
    app_state::AppState,
    auth::{require_admin, CurrentUser},
    errors::AppError,
    models::dto::{
        request::{UpdateUserRequest, UpdateUserRoleRequest, UserListQuery},
        response::UserDto,
    },
};

#[get("/admin/users")]
pub async fn list_users(
    state: web::Data<AppState>,
    query: web::Query<UserListQuery>,
    user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&user.0)?;

    let page = state.user_service.list_users(&query.into_inner()).await?;
    Ok(HttpResponse::Ok().json(page))
}

#[get("/admin/users/pending")]
pub async fn list_pending_users(
    state: web::Data<AppState>,
    user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&user.0)?;

    let users = state.user_service.list_pending().await?;
    Ok(HttpResponse::Ok().json(users))
}

#[get("/admin/users/{id}")]
pub async fn get_user(
    state: web::Data<AppState>,
    id: web::Path<String>,
    user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&user.0)?;

    let found = state.user_service.get_user(&id).await?;
    Ok(HttpResponse::Ok().json(UserDto::from(found)))
}

#[put("/admin/users/{id}")]
pub async fn update_user(
    state: web::Data<AppState>,
    id: web::Path<String>,
    request: web::Json<UpdateUserRequest>,
    user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&user.0)?;

    let updated = state
        .user_service
        .update_profile(&id, request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(UserDto::from(updated)))
}

#[put("/admin/users/{id}/approve")]
pub async fn approve_user(
    state: web::Data<AppState>,
    id: web::Path<String>,
    user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&user.0)?;

    let approved = state.user_service.approve(&id).await?;
    Ok(HttpResponse::Ok().json(UserDto::from(approved)))
}

#[put("/admin/users/{id}/reject")]
pub async fn reject_user(
    state: web::Data<AppState>,
    id: web::Path<String>,
    user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&user.0)?;

    let rejected = state.user_service.reject(&id).await?;
    Ok(HttpResponse::Ok().json(UserDto::from(rejected)))
}

#[put("/admin/users/{id}/role")]
pub async fn update_user_role(
    state: web::Data<AppState>,
    id: web::Path<String>,
    request: web::Json<UpdateUserRoleRequest>,
    user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&user.0)?;

    let updated = state.user_service.update_role(&id, request.role).await?;
    Ok(HttpResponse::Ok().json(UserDto::from(updated)))
}

#[delete("/admin/users/{id}")]
pub async fn delete_user(
    state: web::Data<AppState>,
    id: web::Path<String>,
    user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&user.0)?;

    if user.0.sub == *id {
        return Err(AppError::BadRequest(
            "Admins cannot delete their own account".to_string(),
        ));
    }

    let response = state.user_service.delete_user(&id).await?;
    Ok(HttpResponse::Ok().json(response))
}
