//! Outbound email collaborator.
//!
//! Delivery is out of scope for this service; the session core only needs
//! "send this reset link to this address, tell me if it worked". Deployments
//! plug in a real provider behind [`Mailer`].

use async_trait::async_trait;

#[async_trait]
pub trait Mailer: Send + Sync {
    /// Send a password-reset link. Returns false on delivery failure.
    async fn send_password_reset(&self, to: &str, reset_url: &str) -> bool;
}

/// Mailer that logs instead of sending. Used in development and tests.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_password_reset(&self, to: &str, reset_url: &str) -> bool {
        tracing::info!(action = "password_reset_email", to = %to, url = %reset_url, "Password reset link issued");
        true
    }
}
