use async_trait::async_trait;
use tracing::info;

/// Outbound notification collaborator for the password-reset flow.
///
/// Sending is best-effort: the reset-token write is committed before the send,
/// and a failed send is logged and swallowed by the caller.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_reset_email(&self, to: &str, token: &str) -> anyhow::Result<()>;
}

/// Default mailer: logs the reset link instead of delivering it.
/// Suitable for local development; swap in a real transport at startup.
#[derive(Clone)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_reset_email(&self, to: &str, token: &str) -> anyhow::Result<()> {
        info!(%to, %token, "password reset requested; reset link logged");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn log_mailer_always_succeeds() {
        let mailer = LogMailer;
        mailer
            .send_reset_email("user@example.com", "token123")
            .await
            .expect("log mailer never fails");
    }
}
