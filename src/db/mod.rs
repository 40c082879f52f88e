pub mod fake;
pub mod postgres_service;
pub mod role;
pub mod user;
