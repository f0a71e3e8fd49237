use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info};

use crate::config::AppConfig;

#[derive(Debug, Clone)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Outbound mail transport. The real delivery mechanism lives outside
/// this repository; anything implementing this trait can be plugged into
/// `AppState`.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: OutgoingEmail) -> anyhow::Result<()>;
}

/// Transport that writes outgoing mail to the log instead of the wire.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, mail: OutgoingEmail) -> anyhow::Result<()> {
        info!(
            from = %mail.from,
            to = %mail.to,
            subject = %mail.subject,
            body = %mail.body,
            "outgoing email"
        );
        Ok(())
    }
}

/// Fire-and-forget dispatch: the HTTP response never waits on the mail
/// transport, and a failed send is only visible in the logs.
pub fn dispatch(mailer: Arc<dyn Mailer>, mail: OutgoingEmail) {
    tokio::spawn(async move {
        let to = mail.to.clone();
        if let Err(e) = mailer.send(mail).await {
            error!(error = %e, to = %to, "email send failed");
        }
    });
}

pub fn confirmation_email(config: &AppConfig, to: &str, token: &str) -> OutgoingEmail {
    let confirm_url = format!("{}/users/confirm/{}", config.mail.public_base_url, token);
    OutgoingEmail {
        from: config.mail.sender.clone(),
        to: to.to_string(),
        subject: "Journal API - Confirm Your Email Address".into(),
        body: format!(
            "Welcome to the Journal API!\n\n\
             Please confirm your email address by visiting the link below:\n\n\
             {confirm_url}\n\n\
             The link expires in one hour."
        ),
    }
}

pub fn password_reset_email(config: &AppConfig, to: &str, token: &str) -> OutgoingEmail {
    let reset_url = format!(
        "{}/users/password_reset_via_token/{}",
        config.mail.public_base_url, token
    );
    OutgoingEmail {
        from: config.mail.sender.clone(),
        to: to.to_string(),
        subject: "Journal API - Password Reset Requested".into(),
        body: format!(
            "A password reset was requested for your account.\n\n\
             Visit the link below to choose a new password:\n\n\
             {reset_url}\n\n\
             The link expires in one hour. If you did not request a reset,\n\
             you can ignore this message."
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;

    #[test]
    fn confirmation_email_links_to_the_confirm_route() {
        let state = AppState::fake();
        let mail = confirmation_email(&state.config, "a@example.com", "tok123");
        assert_eq!(mail.to, "a@example.com");
        assert!(mail
            .body
            .contains("http://localhost:8080/users/confirm/tok123"));
    }

    #[test]
    fn reset_email_links_to_the_reset_route() {
        let state = AppState::fake();
        let mail = password_reset_email(&state.config, "a@example.com", "tok456");
        assert!(mail
            .body
            .contains("http://localhost:8080/users/password_reset_via_token/tok456"));
        assert!(mail.subject.contains("Password Reset"));
    }
}
