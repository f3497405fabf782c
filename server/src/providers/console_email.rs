//! Console email provider for development.

use crate::error::Result;
use crate::providers::EmailProvider;
use tracing::info;

/// Console email provider.
///
/// Logs emails instead of sending them. This is the default provider when
/// no SMTP relay is configured, so development signups work without any
/// mail infrastructure.
#[derive(Clone, Debug, Default)]
pub struct ConsoleEmailProvider;

impl ConsoleEmailProvider {
    /// Create a new console email provider.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl EmailProvider for ConsoleEmailProvider {
    async fn send_signup_confirmation(&self, to: &str, full_name: &str) -> Result<()> {
        info!(
            to = %to,
            full_name = %full_name,
            "📧 Signup confirmation email (development mode)"
        );
        Ok(())
    }
}
