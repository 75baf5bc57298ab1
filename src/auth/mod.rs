pub mod claims;
pub mod cookies;
pub mod gate;
pub mod jwt;
pub mod middleware;
pub mod utils;

pub use claims::Claims;
pub use gate::RoleGate;
pub use jwt::JwtService;
pub use middleware::{claims_from_request, CurrentUser};
pub use utils::{
    extract_claims_from_context, require_admin, require_approved, require_owner_or_admin,
    require_role, require_staff,
};
