use actix_web::{get, post, web, HttpResponse, HttpResponseBuilder};

use crate::{
    app_state::AppState,
    auth::{cookies, CurrentUser},
    errors::AppError,
    models::{
        domain::User,
        dto::{
            request::{RegisterUserRequest, UserRoleQuery},
            response::{UserDto, UserRoleResponse},
        },
    },
};

fn with_session_cookies(
    mut builder: HttpResponseBuilder,
    state: &AppState,
    user: &User,
) -> Result<HttpResponseBuilder, AppError> {
    let token = state.jwt_service.create_token(user)?;
    for cookie in cookies::session_cookies(
        user,
        token,
        state.jwt_service.expiration_hours(),
        state.config.cookie_secure,
    ) {
        builder.cookie(cookie);
    }
    Ok(builder)
}

/// Relays a provider uid into portal session cookies.
#[get("/api/getUserRole")]
pub async fn get_user_role(
    state: web::Data<AppState>,
    web::Query(query): web::Query<UserRoleQuery>,
) -> Result<HttpResponse, AppError> {
    let user = state.user_service.role_for_uid(&query.uid).await?;
    log::info!("Session issued for user '{}' as {} ({})", user.id, user.role, user.status);

    let mut builder = with_session_cookies(HttpResponse::Ok(), &state, &user)?;
    Ok(builder.json(UserRoleResponse::from(&user)))
}

#[post("/api/register")]
pub async fn register(
    state: web::Data<AppState>,
    request: web::Json<RegisterUserRequest>,
) -> Result<HttpResponse, AppError> {
    let user = state.user_service.register(request.into_inner()).await?;

    let mut builder = with_session_cookies(HttpResponse::Created(), &state, &user)?;
    Ok(builder.json(UserRoleResponse::from(&user)))
}

#[post("/api/logout")]
pub async fn logout(state: web::Data<AppState>) -> HttpResponse {
    let mut builder = HttpResponse::Ok();
    for cookie in cookies::cleared_cookies(state.config.cookie_secure) {
        builder.cookie(cookie);
    }
    builder.json(serde_json::json!({ "message": "Logged out" }))
}

#[get("/api/me")]
pub async fn me(
    state: web::Data<AppState>,
    user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    let profile = state.user_service.get_user(&user.0.sub).await?;
    Ok(HttpResponse::Ok().json(UserDto::from(profile)))
}
