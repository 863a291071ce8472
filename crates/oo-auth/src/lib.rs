//! # oo-auth
//!
//! Bearer token authentication for OfficeOps RS.
//!
//! Tokens are issued elsewhere; this crate validates them and turns the
//! claims into a [`CurrentUser`] that services accept as their
//! `UserContext`.

pub mod jwt;
pub mod middleware;
pub mod permissions;

pub use jwt::{extract_bearer_token, Claims, JwtError, JwtService};
pub use middleware::{AuthError, Authenticator};
pub use permissions::CurrentUser;
