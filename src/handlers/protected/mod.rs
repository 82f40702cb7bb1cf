// handlers/protected/mod.rs - Protected handlers (bearer access token required)
//
// Route Prefix: /api/*
// Middleware: jwt_auth_middleware injects AuthUser and BearerToken

pub mod auth;
pub mod fields;
pub mod search;
