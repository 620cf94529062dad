//! Stateless session core: signed-token codec, cookie adapter, and resolver.
//!
//! The token itself is the session record. The server keeps no per-session
//! state; every request carries its own verifiable credential.

pub mod cookie;
pub mod resolver;
pub mod token;

pub use cookie::{
    apply_cookie, apply_renewal, clear_session_cookie, read_session_token, session_cookie,
};
pub use resolver::{resolve, Identity, Resolution};
pub use token::{SessionClaims, TokenCodec, TokenError};
