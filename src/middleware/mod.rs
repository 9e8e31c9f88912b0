// Middleware for session authentication

pub mod auth;

pub use auth::*;
