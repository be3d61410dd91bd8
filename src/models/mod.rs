pub mod auth;
pub mod common;
pub mod score;
pub mod user;
