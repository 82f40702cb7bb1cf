// handlers/protected/auth/mod.rs - Session handlers for authenticated users

pub mod logout; // POST /api/auth/logout
pub mod whoami; // GET /api/auth/whoami

pub use logout::{logout_post, LogoutRequest};
pub use whoami::whoami_get;
