//! SMTP email provider implementation using Lettre.

use crate::config::SmtpConfig;
use crate::error::{ApiError, Result};
use crate::providers::EmailProvider;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

/// SMTP email provider.
///
/// Delivers real mail through the relay named in [`SmtpConfig`]; the
/// binary wires it in when `SMTP_SERVER` is configured.
#[derive(Clone)]
pub struct SmtpEmailProvider {
    /// Relay configuration.
    config: SmtpConfig,
}

impl SmtpEmailProvider {
    /// Create an SMTP email provider from relay configuration.
    #[must_use]
    pub const fn new(config: SmtpConfig) -> Self {
        Self { config }
    }

    /// Build a transport for one delivery.
    ///
    /// Transports are not reused across sends; relays drop idle
    /// connections and a fresh handshake per signup is cheap at this
    /// volume.
    fn transport(&self) -> Result<SmtpTransport> {
        let relay = SmtpTransport::relay(&self.config.server)
            .map_err(|e| ApiError::EmailDelivery(format!("SMTP relay error: {e}")))?;

        Ok(relay
            .port(self.config.port)
            .credentials(Credentials::new(
                self.config.username.clone(),
                self.config.password.clone(),
            ))
            .build())
    }

    fn sender(&self) -> String {
        format!("{} <{}>", self.config.from_name, self.config.from_email)
    }
}

impl EmailProvider for SmtpEmailProvider {
    async fn send_signup_confirmation(&self, to: &str, full_name: &str) -> Result<()> {
        let body = format!(
            r#"<!DOCTYPE html>
<html>
<body style="font-family: Arial, sans-serif;">
  <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
    <h2>Welcome to Gather, {full_name}!</h2>
    <p>Your account has been created. You can now browse events,
    RSVP, and organize events of your own.</p>
    <p style="color: #666; font-size: 14px;">
      If you didn't sign up, you can safely ignore this email.
    </p>
  </div>
</body>
</html>
"#
        );

        let message = Message::builder()
            .from(
                self.sender()
                    .parse()
                    .map_err(|e| ApiError::EmailDelivery(format!("Invalid from address: {e}")))?,
            )
            .to(to
                .parse()
                .map_err(|e| ApiError::EmailDelivery(format!("Invalid to address: {e}")))?)
            .subject("Welcome to Gather")
            .header(ContentType::TEXT_HTML)
            .body(body)
            .map_err(|e| ApiError::EmailDelivery(format!("Failed to build email: {e}")))?;

        let transport = self.transport()?;

        // Lettre's sync transport blocks; run it on the blocking pool.
        tokio::task::spawn_blocking(move || {
            transport
                .send(&message)
                .map_err(|e| ApiError::EmailDelivery(format!("Failed to send email: {e}")))
        })
        .await
        .map_err(|e| ApiError::EmailDelivery(format!("Email task failed: {e}")))??;

        Ok(())
    }
}
