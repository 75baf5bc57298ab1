use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::models::domain::{User, UserRole, UserStatus};

/// Payload of the signed `session` cookie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // portal user id
    pub uid: String, // auth provider uid
    pub role: UserRole,
    pub status: UserStatus,
    pub exp: usize,
    pub iat: usize,
}

impl Claims {
    pub fn new(user: &User, expiration_hours: i64) -> Self {
        let now = Utc::now();
        let exp = now + Duration::hours(expiration_hours);

        Self {
            sub: user.id.clone(),
            uid: user.uid.clone(),
            role: user.role,
            status: user.status,
            iat: now.timestamp() as usize,
            exp: exp.timestamp() as usize,
        }
    }

    pub fn is_approved(&self) -> bool {
        self.status == UserStatus::Approved
    }
}
