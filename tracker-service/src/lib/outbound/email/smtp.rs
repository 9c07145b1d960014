use std::path::Path;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::AsyncFileTransport;
use lettre::AsyncSmtpTransport;
use lettre::AsyncTransport;
use lettre::Message;
use lettre::Tokio1Executor;

use crate::auth_domain::errors::MailerError;
use crate::auth_domain::ports::Mailer;
use crate::config::EmailConfig;
use crate::config::EmailTransportConfig;

/// Outbound mailer sending confirmation and password-reset links.
///
/// SMTP in production; a file transport writes messages to disk for
/// development so flows can be exercised without a relay.
pub struct SmtpMailer {
    transport: Transport,
    from_address: String,
    frontend_url: String,
}

enum Transport {
    Smtp(AsyncSmtpTransport<Tokio1Executor>),
    File(AsyncFileTransport<Tokio1Executor>),
}

impl SmtpMailer {
    pub fn new(config: &EmailConfig) -> Result<Self, MailerError> {
        let transport = match &config.transport {
            EmailTransportConfig::Smtp {
                host,
                port,
                username,
                password,
            } => {
                let builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
                    .map_err(|e| MailerError::BuildFailed(e.to_string()))?
                    .port(*port)
                    .credentials(Credentials::new(username.clone(), password.clone()));

                Transport::Smtp(builder.build())
            }
            EmailTransportConfig::File { path } => {
                let emails_dir = Path::new(path);
                if !emails_dir.exists() {
                    std::fs::create_dir_all(emails_dir)
                        .map_err(|e| MailerError::BuildFailed(e.to_string()))?;
                }
                Transport::File(AsyncFileTransport::<Tokio1Executor>::new(emails_dir))
            }
        };

        Ok(Self {
            transport,
            from_address: config.from_address.clone(),
            frontend_url: config.frontend_url.clone(),
        })
    }

    async fn send_html(&self, to: &str, subject: &str, body: String) -> Result<(), MailerError> {
        let message = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|e| MailerError::BuildFailed(format!("from address: {}", e)))?,
            )
            .to(to
                .parse()
                .map_err(|e| MailerError::BuildFailed(format!("to address: {}", e)))?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(body)
            .map_err(|e| MailerError::BuildFailed(e.to_string()))?;

        let result = match &self.transport {
            Transport::Smtp(transport) => transport
                .send(message)
                .await
                .map(|_| ())
                .map_err(|e| e.to_string()),
            Transport::File(transport) => transport
                .send(message)
                .await
                .map(|_| ())
                .map_err(|e| e.to_string()),
        };

        result.map_err(|e| {
            tracing::error!(to, subject, error = %e, "Email delivery failed");
            MailerError::DeliveryFailed(e.to_string())
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_confirmation_email(&self, to: &str, token: &str) -> Result<(), MailerError> {
        let confirm_url = format!("{}/auth/confirm?token={}", self.frontend_url, token);
        let body = format!(
            "<html><body>\
             <h2>Welcome to Job Application Tracker!</h2>\
             <p>Please click the link below to confirm your email:</p>\
             <a href=\"{confirm_url}\">Confirm Email</a>\
             <p>This link will expire in 15 minutes.</p>\
             </body></html>"
        );

        self.send_html(to, "Confirm your email", body).await
    }

    async fn send_password_reset_email(&self, to: &str, token: &str) -> Result<(), MailerError> {
        let reset_url = format!("{}/reset-password?token={}", self.frontend_url, token);
        let body = format!(
            "<html><body>\
             <h2>Password Reset Request</h2>\
             <p>Click the link below to reset your password:</p>\
             <a href=\"{reset_url}\">Reset Password</a>\
             <p>This link will expire in 15 minutes.</p>\
             <p>If you did not request this, please ignore this email.</p>\
             </body></html>"
        );

        self.send_html(to, "Reset your password", body).await
    }
}
