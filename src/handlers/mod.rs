// handlers/mod.rs - Two-tier handler layout
//
// Public (no auth) -> Protected (bearer access token, /api/*)
pub mod protected;
pub mod public;
