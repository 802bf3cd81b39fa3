//! Outbound mail as a narrow, fire-and-forget contract.
//!
//! The engine hands a token to the mailer and never consumes a return
//! value; delivery failures are the mailer's problem, not the request's.

/// Sends account mails carrying a single-use token.
pub trait Mailer: Send + Sync {
    fn send_activation(&self, email: &str, token: &str);
    fn send_password_reset(&self, email: &str, token: &str);
}

/// Mailer that only logs. Used in development and in tests.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogMailer;

impl Mailer for LogMailer {
    fn send_activation(&self, email: &str, token: &str) {
        tracing::info!(email, token, "activation mail");
    }

    fn send_password_reset(&self, email: &str, token: &str) {
        tracing::info!(email, token, "password reset mail");
    }
}
