//! Request authentication

pub mod session;

pub use session::{SessionIdentity, session_auth_middleware};
