use crate::types::permission::Permission;
use crate::utils::webutils::{permission_required, validate_token};
use actix_web::web;
use actix_web_httpauth::middleware::HttpAuthentication;

pub mod account;
pub mod admin;
pub mod health;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    let user_auth = HttpAuthentication::bearer(validate_token);
    let admin_auth = HttpAuthentication::bearer(|req, credentials| {
        permission_required(req, credentials, Permission::ADMINISTER)
    });

    cfg.service(web::scope("/health").service(health::health));
    cfg.service(
        web::scope("/account")
            .service(account::register::register)
            .service(account::login::login)
            .service(account::reset_password::reset_password_request)
            .service(account::reset_password::reset_password)
            .service(account::join_invite::join_from_invite)
            .service(
                web::scope("/manage")
                    .service(account::manage::manage)
                    .service(account::manage::change_password)
                    .service(account::change_email::change_email_request)
                    .service(account::change_email::change_email)
                    .wrap(user_auth.clone())
            )
            .service(
                web::scope("/confirm-account")
                    .service(account::confirm::confirm_request)
                    .service(account::confirm::confirm)
                    .wrap(user_auth.clone())
            )
            .service(
                web::scope("/unconfirmed")
                    .service(account::confirm::unconfirmed)
                    .wrap(user_auth)
            )
    );
    cfg.service(
        web::scope("/admin")
            .service(admin::users::registered_users)
            .service(admin::users::user_info)
            .service(admin::users::delete_user)
            .service(admin::new_user::new_user)
            .service(admin::invite::invite_user)
            .service(admin::change_email::change_user_email)
            .service(admin::account_type::change_account_type)
            .wrap(admin_auth)
    );
}
