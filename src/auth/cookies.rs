use actix_web::cookie::{time::Duration, Cookie, SameSite};

use crate::models::domain::User;

pub const SESSION_COOKIE: &str = "session";
pub const ROLE_COOKIE: &str = "userRole";
pub const STATUS_COOKIE: &str = "userStatus";

fn base_cookie(name: &'static str, value: String, secure: bool, http_only: bool) -> Cookie<'static> {
    Cookie::build(name, value)
        .path("/")
        .secure(secure)
        .http_only(http_only)
        .same_site(SameSite::Lax)
        .finish()
}

/// `session` carries the signed token; the role and status cookies are plain
/// hints for the frontend.
pub fn session_cookies(
    user: &User,
    token: String,
    expiration_hours: i64,
    secure: bool,
) -> Vec<Cookie<'static>> {
    let max_age = Duration::hours(expiration_hours);

    vec![
        base_cookie(SESSION_COOKIE, token, secure, true),
        base_cookie(ROLE_COOKIE, user.role.as_str().to_string(), secure, false),
        base_cookie(STATUS_COOKIE, user.status.as_str().to_string(), secure, false),
    ]
    .into_iter()
    .map(|mut cookie| {
        cookie.set_max_age(max_age);
        cookie
    })
    .collect()
}

pub fn cleared_cookies(secure: bool) -> Vec<Cookie<'static>> {
    [SESSION_COOKIE, ROLE_COOKIE, STATUS_COOKIE]
        .into_iter()
        .map(|name| {
            let mut cookie = base_cookie(name, String::new(), secure, name == SESSION_COOKIE);
            cookie.make_removal();
            cookie
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::domain::{UserRole, UserStatus};

    #[test]
    fn session_cookies_carry_role_and_status() {
        let mut user = User::new("uid-1", "Ada", "ada@example.com", UserRole::Teacher);
        user.status = UserStatus::Approved;

        let cookies = session_cookies(&user, "token".to_string(), 2, true);

        assert_eq!(cookies.len(), 3);
        assert_eq!(cookies[0].name(), SESSION_COOKIE);
        assert_eq!(cookies[0].http_only(), Some(true));
        assert_eq!(cookies[1].value(), "teacher");
        assert_eq!(cookies[2].value(), "approved");
        assert!(cookies.iter().all(|c| c.max_age() == Some(Duration::hours(2))));
        assert!(cookies.iter().all(|c| c.path() == Some("/")));
    }

    #[test]
    fn cleared_cookies_expire_immediately() {
        let cookies = cleared_cookies(false);

        assert_eq!(cookies.len(), 3);
        assert!(cookies.iter().all(|c| c.value().is_empty()));
        assert!(cookies.iter().all(|c| c.max_age() == Some(Duration::ZERO)));
    }
}
