use std::future::{ready, Ready};

use actix_web::{
    cookie::Cookie, http::header::AUTHORIZATION, http::header::HeaderMap, web, FromRequest,
    HttpMessage, HttpRequest,
};

use crate::{
    app_state::AppState,
    auth::{cookies::SESSION_COOKIE, Claims, JwtService},
    errors::{AppError, AppResult},
};

/// Session token from the `session` cookie, falling back to a bearer header.
pub fn session_token(cookie: Option<Cookie<'static>>, headers: &HeaderMap) -> Option<String> {
    if let Some(cookie) = cookie {
        if !cookie.value().is_empty() {
            return Some(cookie.value().to_string());
        }
    }

    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

pub fn validate_session(
    jwt_service: &JwtService,
    cookie: Option<Cookie<'static>>,
    headers: &HeaderMap,
) -> AppResult<Claims> {
    let token = session_token(cookie, headers)
        .ok_or_else(|| AppError::Unauthorized("Missing session".to_string()))?;
    jwt_service.validate_token(&token)
}

/// Claims placed by the role gate, or validated from the request itself.
pub fn claims_from_request(req: &HttpRequest) -> AppResult<Claims> {
    if let Some(claims) = req.extensions().get::<Claims>() {
        return Ok(claims.clone());
    }

    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| AppError::InternalError("Application state not configured".to_string()))?;

    validate_session(&state.jwt_service, req.cookie(SESSION_COOKIE), req.headers())
}

/// Extractor for the signed-in portal user.
pub struct CurrentUser(pub Claims);

impl FromRequest for CurrentUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        ready(claims_from_request(req).map(CurrentUser))
    }
}
