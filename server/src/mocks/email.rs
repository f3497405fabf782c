//! Mock email provider for testing.

use crate::error::{ApiError, Result};
use crate::providers::EmailProvider;
use std::sync::{Arc, Mutex};

/// A recorded outbound email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentEmail {
    /// Recipient address.
    pub to: String,

    /// Recipient display name.
    pub full_name: String,
}

/// Mock email provider.
///
/// Records sent emails instead of delivering them; can be told to fail to
/// exercise the fire-and-forget path.
#[derive(Debug, Clone, Default)]
pub struct MockEmailProvider {
    sent: Arc<Mutex<Vec<SentEmail>>>,
    fail: Arc<Mutex<bool>>,
}

impl MockEmailProvider {
    /// Create a new mock email provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded emails.
    ///
    /// # Errors
    ///
    /// Returns error if the lock is poisoned.
    pub fn sent(&self) -> Result<Vec<SentEmail>> {
        Ok(self
            .sent
            .lock()
            .map_err(|_| ApiError::Internal("Mock mailer lock poisoned".to_string()))?
            .clone())
    }

    /// Make every subsequent send fail.
    ///
    /// # Errors
    ///
    /// Returns error if the lock is poisoned.
    pub fn fail_sends(&self) -> Result<()> {
        *self
            .fail
            .lock()
            .map_err(|_| ApiError::Internal("Mock mailer lock poisoned".to_string()))? = true;
        Ok(())
    }
}

impl EmailProvider for MockEmailProvider {
    async fn send_signup_confirmation(&self, to: &str, full_name: &str) -> Result<()> {
        let failing = self
            .fail
            .lock()
            .map_err(|_| ApiError::Internal("Mock mailer lock poisoned".to_string()))?;
        if *failing {
            return Err(ApiError::EmailDelivery("Mock failure".to_string()));
        }
        drop(failing);

        self.sent
            .lock()
            .map_err(|_| ApiError::Internal("Mock mailer lock poisoned".to_string()))?
            .push(SentEmail {
                to: to.to_string(),
                full_name: full_name.to_string(),
            });
        Ok(())
    }
}
