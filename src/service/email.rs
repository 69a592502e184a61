use crate::config::EmailConfig;
use crate::error::app_error::AppError;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

/// Out-of-band delivery channel for magic links. Treated as fire-and-forget
/// by the caller: a delivery failure is logged, never surfaced to the client.
pub struct EmailService {
    config: EmailConfig,
}

impl EmailService {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    /// Send a sign-in email containing the magic link.
    ///
    /// With email disabled (local development) the link is written to the log
    /// instead, which is the only place the plain token may ever appear.
    pub async fn send_magic_link_email(&self, to_email: &str, magic_link: &str) -> Result<(), AppError> {
        if !self.config.enabled {
            tracing::info!("Email delivery disabled; sign-in link for {}: {}", to_email, magic_link);
            return Ok(());
        }

        let subject = "Your Daybook sign-in link";
        let html_body = self.generate_magic_link_html(magic_link);
        let text_body = self.generate_magic_link_text(magic_link);

        self.send_email(to_email, subject, &html_body, &text_body).await
    }

    fn generate_magic_link_html(&self, magic_link: &str) -> String {
        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Sign in to Daybook</title>
</head>
<body style="font-family: -apple-system, 'Segoe UI', Roboto, Arial, sans-serif; color: #141517; line-height: 1.6;">
    <h1 style="font-size: 20px;">Sign in to Daybook</h1>
    <p>Click the button below to sign in. No password needed.</p>
    <p style="margin: 24px 0;">
        <a href="{link}" style="background-color: #141517; color: #FFFFFF; padding: 12px 20px; border-radius: 8px; text-decoration: none;">Sign in</a>
    </p>
    <p>Or paste this link into your browser:<br><a href="{link}">{link}</a></p>
    <p>This link can be used once and expires in 15 minutes.</p>
    <p>If you did not request this email, you can safely ignore it.</p>
    <p>Daybook</p>
</body>
</html>
"#,
            link = magic_link
        )
    }

    fn generate_magic_link_text(&self, magic_link: &str) -> String {
        format!(
            r#"Sign in to Daybook

Use the link below to sign in. No password needed:
{}

This link can be used once and expires in 15 minutes.

If you did not request this email, you can safely ignore it.

Daybook
"#,
            magic_link
        )
    }

    /// Send an email using SMTP
    async fn send_email(&self, to_email: &str, subject: &str, html_body: &str, text_body: &str) -> Result<(), AppError> {
        let email = Message::builder()
            .from(
                format!("{} <{}>", self.config.from_name, self.config.from_address)
                    .parse()
                    .map_err(|e| AppError::email(format!("Invalid from address: {}", e)))?,
            )
            .to(to_email.parse().map_err(|e| AppError::email(format!("Invalid to address: {}", e)))?)
            .subject(subject)
            .multipart(
                lettre::message::MultiPart::alternative()
                    .singlepart(
                        lettre::message::SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text_body.to_string()),
                    )
                    .singlepart(
                        lettre::message::SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_body.to_string()),
                    ),
            )
            .map_err(|e| AppError::email(format!("Failed to build email: {}", e)))?;

        let creds = Credentials::new(self.config.smtp_username.clone(), self.config.smtp_password.clone());

        let mailer = SmtpTransport::relay(&self.config.smtp_host)
            .map_err(|e| AppError::email(format!("Failed to create SMTP transport: {}", e)))?
            .credentials(creds)
            .port(self.config.smtp_port)
            .build();

        // Blocking transport, run off the async worker threads
        let result = tokio::task::spawn_blocking(move || mailer.send(&email))
            .await
            .map_err(|e| AppError::email(format!("Failed to spawn email sending task: {}", e)))?;

        result.map_err(|e| AppError::email(format!("Failed to send email: {}", e)))?;

        tracing::info!("Magic link email sent successfully to {}", to_email);
        Ok(())
    }
}
