pub mod error;
pub mod mail;
pub mod permission;
pub mod response;
pub mod token;
pub mod user;
