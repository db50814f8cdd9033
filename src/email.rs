use color_eyre::Result;
use serde::Serialize;

use crate::services::auth::EmailSender;

#[derive(Serialize)]
struct SendEmailRequest {
    from: String,
    to: Vec<String>,
    subject: String,
    html: String,
}

/// Sends mail through the Resend API. An empty API key turns sending off,
/// which the auth service treats as "reset by email unavailable".
#[derive(Clone)]
pub struct ResendEmailSender {
    client: reqwest::Client,
    api_key: String,
}

impl ResendEmailSender {
    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
        }
    }

    async fn send(&self, body: &SendEmailRequest) -> Result<()> {
        let resp = self
            .client
            .post("https://api.resend.com/emails")
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            tracing::error!("Resend API error: {status} - {text}");
            color_eyre::eyre::bail!("Resend API returned {status}");
        }

        Ok(())
    }
}

impl EmailSender for ResendEmailSender {
    fn is_enabled(&self) -> bool {
        !self.api_key.is_empty()
    }

    fn send_password_reset_email(
        &self,
        to_email: &str,
        reset_url: &str,
    ) -> impl std::future::Future<Output = Result<()>> + Send {
        async move {
            let body = SendEmailRequest {
                from: "VerseQuiz <noreply@versequiz.app>".to_string(),
                to: vec![to_email.to_string()],
                subject: "Reset your VerseQuiz admin password".to_string(),
                html: format!(
                    r#"<h2>Password Reset</h2>
<p>Click the link below to reset your password:</p>
<p><a href="{reset_url}">{reset_url}</a></p>
<p>This link expires in 24 hours.</p>
<p>If you did not request this, you can safely ignore this email.</p>"#
                ),
            };

            self.send(&body).await?;

            tracing::info!("password reset email sent to {to_email}");
            Ok(())
        }
    }
}
