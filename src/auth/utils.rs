use async_graphql::Context;

use crate::{
    auth::Claims,
    errors::{AppError, AppResult},
    models::domain::UserRole,
};

pub fn require_approved(claims: &Claims) -> AppResult<()> {
    if !claims.is_approved() {
        return Err(AppError::Forbidden(format!(
            "Account is {} and cannot use the portal yet",
            claims.status
        )));
    }
    Ok(())
}

pub fn require_role(claims: &Claims, role: UserRole) -> AppResult<()> {
    require_approved(claims)?;
    if claims.role != role {
        return Err(AppError::Forbidden(format!(
            "Only {} users can perform this action",
            role
        )));
    }
    Ok(())
}

pub fn require_admin(claims: &Claims) -> AppResult<()> {
    require_role(claims, UserRole::Admin)
}

/// Teachers and admins.
pub fn require_staff(claims: &Claims) -> AppResult<()> {
    require_approved(claims)?;
    if claims.role == UserRole::Student {
        return Err(AppError::Forbidden(
            "Only teachers and admins can perform this action".to_string(),
        ));
    }
    Ok(())
}

pub fn require_owner_or_admin(claims: &Claims, resource_owner: &str) -> AppResult<()> {
    require_approved(claims)?;
    if claims.role != UserRole::Admin && claims.sub != resource_owner {
        return Err(AppError::Forbidden(
            "You can only access your own resources".to_string(),
        ));
    }
    Ok(())
}

pub fn extract_claims_from_context(ctx: &Context<'_>) -> AppResult<Claims> {
    ctx.data::<Claims>()
        .cloned()
        .map_err(|_| AppError::Unauthorized("Authentication required".to_string()))
}
