//! Double-submit CSRF protection.
//!
//! A random secret lives in an HTTP-only cookie; tokens are salted
//! HMAC bindings to that secret, echoed back by the client in a header and
//! re-verified on every mutation. Successful use rotates the secret, so a
//! captured token is good for at most one mutation. Same-origin checking
//! runs in front of all of it as defense-in-depth.

pub mod codec;
pub mod config;
pub mod cookies;
pub mod engine;
pub mod middleware;
pub mod origin;

pub use config::CsrfConfig;
pub use cookies::{CookieSnapshot, SetCookie};
pub use engine::{CsrfAction, Issued, RejectReason};
