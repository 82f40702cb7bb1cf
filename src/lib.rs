pub mod app;
pub mod auth;
pub mod config;
pub mod criteria;
pub mod database;
pub mod error;
pub mod field;
pub mod filter;
pub mod handlers;
pub mod middleware;
pub mod projection;
pub mod services;
pub mod specification;
pub mod types;
