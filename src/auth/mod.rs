pub mod jwt;
pub mod middleware;
pub mod password;

pub use jwt::{Claims, JwtKeys};
pub use middleware::require_auth;
