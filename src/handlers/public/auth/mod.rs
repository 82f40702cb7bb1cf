// handlers/public/auth/mod.rs - Public authentication handlers
//
// Token rotation only; credentials are checked elsewhere.

pub mod refresh; // POST /auth/refresh

pub use refresh::{refresh_post, RefreshRequest};
