//! Authentication and authorization: password hashing, reset tokens,
//! role policy, and request extractors.

pub mod middleware;
pub mod password;
pub mod policy;
pub mod reset;

pub use middleware::{AdminSession, AppState, AuthSession, ExecSession, RateLimiter};
pub use password::{hash_password, verify_password};
pub use reset::{generate_reset_token, hash_reset_token};
