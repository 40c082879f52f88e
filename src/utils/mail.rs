use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{EnvConfig, MailConfig};
use crate::types::mail::SendEmail;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("build client failed: {0}")]
    Build(reqwest::Error),
    #[error("send failed: {0}")]
    Send(reqwest::Error),
    #[error("mail API error: HTTP {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Outbound mail. Delivery problems are the mailer's business; callers log and move on.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: SendEmail) -> Result<(), MailError>;
}

/// Posts JSON to a Resend-compatible HTTP mail API.
pub struct ResendMailer {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl ResendMailer {
    pub fn new(endpoint: &str, api_key: &str) -> Result<Self, MailError> {
        let client: Client = ClientBuilder::new()
            .user_agent("account-service/1.0 (+reqwest)")
            .tcp_nodelay(true)
            .pool_idle_timeout(Duration::from_secs(30))
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(MailError::Build)?;

        Ok(Self { client, endpoint: endpoint.to_string(), api_key: api_key.to_string() })
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, email: SendEmail) -> Result<(), MailError> {
        debug!("[mail] -> POST {} to {:?}", self.endpoint, email.to);

        let t0 = Instant::now();
        let res = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key) // do NOT log the key
            .json(&email)
            .send()
            .await
            .map_err(MailError::Send)?;
        let dt = t0.elapsed();

        let status = res.status();
        let body = res.text().await.map_err(MailError::Send)?;
        debug!("[mail] <- status: {status} in {} ms", dt.as_millis());

        if status.is_success() {
            Ok(())
        } else {
            Err(MailError::Rejected { status: status.as_u16(), body })
        }
    }
}

/// Used when no mail API key is configured: the message only goes to the log.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: SendEmail) -> Result<(), MailError> {
        info!(
            "[mail] (not sent) to={:?} subject={:?}\n{}",
            email.to,
            email.subject,
            email.text.as_deref().unwrap_or_default()
        );
        Ok(())
    }
}

pub fn mailer_from_config(mail: &MailConfig) -> Result<Arc<dyn Mailer>, MailError> {
    match &mail.api_key {
        Some(key) => Ok(Arc::new(ResendMailer::new(&mail.endpoint, key)?)),
        None => {
            warn!("MAIL_API_KEY not set, outgoing mail will only be logged");
            Ok(Arc::new(LogMailer))
        }
    }
}

/// Sends and logs failures without surfacing them to the request.
pub async fn deliver(mailer: &dyn Mailer, email: SendEmail) {
    let to = email.to.clone();
    if let Err(e) = mailer.send(email).await {
        warn!("failed to deliver mail to {:?}: {e}", to);
    }
}

fn message(config: &EnvConfig, to: &str, subject: &str, text: String) -> SendEmail {
    SendEmail {
        from: config.mail.sender.clone(),
        to: vec![to.to_string()],
        subject: config.mail.subject(&config.app_name, subject),
        text: Some(text),
        ..Default::default()
    }
}

pub fn confirm_account_mail(config: &EnvConfig, user: &entity::user::Model, token: &str) -> SendEmail {
    let link = format!("{}/account/confirm-account/{token}", config.base_url);
    message(
        config,
        &user.email,
        "Confirm Your Account",
        format!(
            "Dear {},\n\nWelcome to {}! To confirm your account please follow this link:\n\n{link}\n\nSincerely,\nThe {} Team",
            user.full_name(),
            config.app_name,
            config.app_name
        ),
    )
}

pub fn reset_password_mail(
    config: &EnvConfig,
    user: &entity::user::Model,
    token: &str,
    next: Option<&str>,
) -> SendEmail {
    let mut link = format!("{}/account/reset-password/{token}", config.base_url);
    if let Some(next) = next {
        link.push_str("?next=");
        link.push_str(&urlencoding::encode(next));
    }
    message(
        config,
        &user.email,
        "Reset Your Password",
        format!(
            "Dear {},\n\nTo reset your password please follow this link:\n\n{link}\n\nIf you have not requested a password reset simply ignore this message.\n\nSincerely,\nThe {} Team",
            user.full_name(),
            config.app_name
        ),
    )
}

pub fn change_email_mail(
    config: &EnvConfig,
    user: &entity::user::Model,
    new_email: &str,
    token: &str,
) -> SendEmail {
    let link = format!("{}/account/manage/change-email/{token}", config.base_url);
    message(
        config,
        new_email,
        "Confirm Your New Email",
        format!(
            "Dear {},\n\nTo confirm your new email address please follow this link:\n\n{link}\n\nSincerely,\nThe {} Team",
            user.full_name(),
            config.app_name
        ),
    )
}

pub fn invite_mail(config: &EnvConfig, user: &entity::user::Model, token: &str) -> SendEmail {
    let link = format!("{}/account/join-from-invite/{}/{token}", config.base_url, user.id);
    message(
        config,
        &user.email,
        "You Are Invited To Join",
        format!(
            "Dear {},\n\nYou are invited to join {}! To set your password and activate your account please follow this link:\n\n{link}\n\nSincerely,\nThe {} Team",
            user.full_name(),
            config.app_name,
            config.app_name
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn config() -> EnvConfig {
        EnvConfig {
            port: 8080,
            db_url: "unused".into(),
            secret_key: "secret".into(),
            app_name: "Base".into(),
            admin_email: None,
            base_url: "https://base.test".into(),
            session_ttl_hours: 24,
            mail: MailConfig { api_key: None, endpoint: "unused".into(), sender: "Base Admin <a@b.c>".into() },
        }
    }

    fn user() -> entity::user::Model {
        entity::user::Model {
            id: 12,
            confirmed: false,
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.com".into(),
            password_hash: None,
            role_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn confirm_mail_carries_link_and_prefix() {
        let m = confirm_account_mail(&config(), &user(), "tok.sig");
        assert_eq!(m.to, vec!["ada@example.com".to_string()]);
        assert_eq!(m.subject, "[Base] Confirm Your Account");
        assert_eq!(m.from, "Base Admin <a@b.c>");
        let text = m.text.unwrap();
        assert!(text.contains("https://base.test/account/confirm-account/tok.sig"));
        assert!(text.contains("Ada Lovelace"));
    }

    #[test]
    fn reset_mail_encodes_next() {
        let m = reset_password_mail(&config(), &user(), "t.s", Some("/admin?x=1"));
        let text = m.text.unwrap();
        assert!(text.contains("/account/reset-password/t.s?next=%2Fadmin%3Fx%3D1"));
    }

    #[test]
    fn change_email_goes_to_the_new_address() {
        let m = change_email_mail(&config(), &user(), "new@example.com", "t.s");
        assert_eq!(m.to, vec!["new@example.com".to_string()]);
    }

    #[test]
    fn invite_link_names_the_user() {
        let m = invite_mail(&config(), &user(), "t.s");
        assert!(m.text.unwrap().contains("/account/join-from-invite/12/t.s"));
    }
}
