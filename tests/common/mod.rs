use account_service::config::{EnvConfig, MailConfig};
use account_service::db::postgres_service::PostgresService;
use account_service::types::mail::SendEmail;
use account_service::utils::mail::{MailError, Mailer};
use account_service::utils::token::TokenSigner;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use testcontainers::{runners::AsyncRunner, ContainerAsync};
use testcontainers_modules::postgres::Postgres;

pub mod client;

pub const TEST_SECRET: &str = "test-secret-key";
pub const BASE_URL: &str = "http://accounts.test";

pub struct TestContext {
    pub db: Arc<PostgresService>,
    pub signer: TokenSigner,
    pub config: EnvConfig,
    pub mailer: Arc<RecordingMailer>,
    pub _container: ContainerAsync<Postgres>,
}

impl TestContext {
    pub async fn new() -> TestContext {
        let container = Postgres::default()
            .start()
            .await
            .expect("Failed to start postgres container");

        let host = container.get_host().await.expect("Failed to get host");
        let port = container.get_host_port_ipv4(5432).await.expect("Failed to get port");

        let db_url = format!("postgresql://postgres:postgres@{}:{}/postgres", host, port);

        let db = Arc::new(
            PostgresService::new(&db_url)
                .await
                .expect("Failed to initialize PostgresService"),
        );
        db.insert_roles().await.expect("Failed to seed roles");

        TestContext {
            db,
            signer: TokenSigner::new(TEST_SECRET),
            config: get_test_config(db_url),
            mailer: Arc::new(RecordingMailer::default()),
            _container: container,
        }
    }
}

pub fn get_test_config(db_url: String) -> EnvConfig {
    EnvConfig {
        port: 8080,
        db_url,
        secret_key: TEST_SECRET.to_string(),
        app_name: "Accounts".to_string(),
        admin_email: Some("boss@example.com".to_string()),
        base_url: BASE_URL.to_string(),
        session_ttl_hours: 24,
        mail: MailConfig {
            api_key: None,
            endpoint: "unused".to_string(),
            sender: "Accounts Admin <noreply@example.com>".to_string(),
        },
    }
}

/// Keeps every mail so tests can follow the links inside.
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<SendEmail>>,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: SendEmail) -> Result<(), MailError> {
        self.sent.lock().unwrap().push(email);
        Ok(())
    }
}

impl RecordingMailer {
    pub fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn last(&self) -> SendEmail {
        self.sent.lock().unwrap().last().cloned().expect("no mail sent")
    }

    /// Link found in the most recent mail.
    pub fn last_link(&self) -> String {
        let mail = self.last();
        let text = mail.text.expect("mail has no text body");
        text.lines()
            .find(|l| l.starts_with(BASE_URL))
            .expect("mail has no link")
            .to_string()
    }

    /// The token at the end of the most recent link, without any query string.
    pub fn last_token(&self) -> String {
        let link = self.last_link();
        let path = link.split('?').next().unwrap_or_default();
        path.rsplit('/').next().unwrap_or_default().to_string()
    }
}
