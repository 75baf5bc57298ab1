use std::{
    future::{ready, Ready},
    rc::Rc,
};

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::LOCATION,
    web, Error, HttpMessage, HttpResponse,
};
use futures::future::LocalBoxFuture;

use crate::{
    app_state::AppState,
    auth::{cookies::SESSION_COOKIE, middleware::validate_session, Claims},
    middleware::get_request_id,
    models::domain::UserRole,
};

pub const LOGIN_PATH: &str = "/login";
pub const PENDING_PATH: &str = "/pending-approval";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Path is outside the gated route groups.
    PassThrough,
    Allow(Claims),
    Redirect(String),
}

/// Role owning the route group that `path` falls under.
pub fn route_group(path: &str) -> Option<UserRole> {
    [UserRole::Admin, UserRole::Teacher, UserRole::Student]
        .into_iter()
        .find(|role| {
            let prefix = role.home_path();
            path == prefix
                || path
                    .strip_prefix(prefix)
                    .map(|rest| rest.starts_with('/'))
                    .unwrap_or(false)
        })
}

pub fn decide(path: &str, claims: Option<Claims>) -> GateDecision {
    let Some(group) = route_group(path) else {
        return GateDecision::PassThrough;
    };

    let Some(claims) = claims else {
        return GateDecision::Redirect(LOGIN_PATH.to_string());
    };

    if !claims.is_approved() {
        return GateDecision::Redirect(PENDING_PATH.to_string());
    }

    if claims.role != group {
        return GateDecision::Redirect(claims.role.home_path().to_string());
    }

    GateDecision::Allow(claims)
}

/// Guards the `/admin`, `/teacher` and `/student` route groups.
pub struct RoleGate;

impl<S, B> Transform<S, ServiceRequest> for RoleGate
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RoleGateService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RoleGateService {
            service: Rc::new(service),
        }))
    }
}

pub struct RoleGateService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RoleGateService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            let claims = if route_group(req.path()).is_some() {
                req.app_data::<web::Data<AppState>>().and_then(|state| {
                    validate_session(&state.jwt_service, req.cookie(SESSION_COOKIE), req.headers())
                        .map_err(|e| log::debug!("Rejected session on {}: {}", req.path(), e))
                        .ok()
                })
            } else {
                None
            };

            match decide(req.path(), claims) {
                GateDecision::PassThrough => {
                    let res = service.call(req).await?;
                    Ok(res.map_into_left_body())
                }
                GateDecision::Allow(claims) => {
                    req.extensions_mut().insert(claims);
                    let res = service.call(req).await?;
                    Ok(res.map_into_left_body())
                }
                GateDecision::Redirect(location) => {
                    log::info!(
                        "[{}] Redirecting {} to {}",
                        get_request_id(req.request()).unwrap_or_default(),
                        req.path(),
                        location
                    );
                    let response = HttpResponse::Found()
                        .insert_header((LOCATION, location))
                        .finish();
                    Ok(req.into_response(response).map_into_right_body())
                }
            }
        })
    }
}
