//! Email provider trait.

use crate::error::Result;
use std::future::Future;

/// Outbound email.
///
/// Delivery is best-effort and always invoked from a spawned task: a
/// failed confirmation email is logged, never surfaced to the signup
/// response.
pub trait EmailProvider: Send + Sync {
    /// Send the signup confirmation email.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::EmailDelivery` if the message cannot be sent.
    fn send_signup_confirmation(
        &self,
        to: &str,
        full_name: &str,
    ) -> impl Future<Output = Result<()>> + Send;
}
