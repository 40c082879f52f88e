use account_service::config::EnvConfig;
use account_service::db::postgres_service::PostgresService;
use account_service::routes::configure_routes;
use account_service::utils::{mail::mailer_from_config, token::TokenSigner};
use actix_web::{middleware::Logger, web, App, HttpServer};
use tracing::info;
use std::sync::Arc;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));
    let config = EnvConfig::from_env().expect("Failed to load configuration");
    let addr = format!("0.0.0.0:{}", config.port);

    let postgres_service = Arc::new(
        PostgresService::new(&config.db_url)
            .await
            .expect("Failed to initialize PostgresService"),
    );
    let signer = web::Data::new(TokenSigner::new(&config.secret_key));
    let mailer = web::Data::from(mailer_from_config(&config.mail).expect("Failed to build mailer"));
    let config = web::Data::new(config);

    info!("Starting server on {}", addr);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(web::Data::new(Arc::clone(&postgres_service)))
            .app_data(signer.clone())
            .app_data(config.clone())
            .app_data(mailer.clone())
            .configure(configure_routes)
    })
    .bind(addr)?
    .run()
    .await
}
