use actix_web::{web, App};
use account_service::{
    db::postgres_service::PostgresService,
    types::{permission::RoleKind, user::DBUserCreate},
    utils::mail::Mailer,
};
use std::sync::Arc;

use super::TestContext;

pub const PASSWORD: &str = "correct horse battery";

pub struct TestClient<'a> {
    pub ctx: &'a TestContext,
}

impl<'a> TestClient<'a> {
    pub fn new(ctx: &'a TestContext) -> Self {
        TestClient { ctx }
    }

    pub fn db(&self) -> &Arc<PostgresService> {
        &self.ctx.db
    }

    pub fn create_app(&self) -> actix_web::App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        let mailer: Arc<dyn Mailer> = self.ctx.mailer.clone();
        App::new()
            .app_data(web::Data::new(Arc::clone(&self.ctx.db)))
            .app_data(web::Data::new(self.ctx.signer.clone()))
            .app_data(web::Data::new(self.ctx.config.clone()))
            .app_data(web::Data::from(mailer))
            .configure(account_service::routes::configure_routes)
    }

    async fn create_with_role(&self, email: &str, kind: RoleKind, confirmed: bool) -> i32 {
        let role = self
            .ctx
            .db
            .get_role_by_name(kind.name())
            .await
            .expect("roles not seeded");
        self.ctx
            .db
            .create_user(DBUserCreate {
                first_name: "Test".to_string(),
                last_name: "User".to_string(),
                email: email.to_string(),
                password: Some(PASSWORD.to_string()),
                confirmed,
                role_id: Some(role.id),
            })
            .await
            .expect("Failed to create user")
            .id
    }

    #[allow(dead_code)]
    pub async fn create_test_user(&self, email: &str, confirmed: bool) -> i32 {
        self.create_with_role(email, RoleKind::General, confirmed).await
    }

    #[allow(dead_code)]
    pub async fn create_test_admin(&self, email: &str) -> i32 {
        self.create_with_role(email, RoleKind::Administrator, true).await
    }
}
