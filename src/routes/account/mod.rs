pub mod change_email;
pub mod confirm;
pub mod join_invite;
pub mod login;
pub mod manage;
pub mod register;
pub mod reset_password;
