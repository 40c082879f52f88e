pub mod account_type;
pub mod change_email;
pub mod invite;
pub mod new_user;
pub mod users;
