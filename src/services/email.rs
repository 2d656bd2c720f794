use lettre::{
    message::header::ContentType,
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct EmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_email: String,
}

impl EmailService {
    pub fn new(smtp_host: &str, smtp_user: &str, smtp_pass: &str, from_email: &str) -> AppResult<Self> {
        let creds = Credentials::new(smtp_user.to_string(), smtp_pass.to_string());

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(smtp_host)
            .map_err(|e| AppError::Internal(format!("Failed to create SMTP transport: {}", e)))?
            .credentials(creds)
            .build();

        Ok(Self {
            mailer,
            from_email: from_email.to_string(),
        })
    }

    pub async fn send_verification_code(&self, to_email: &str, otp: &str, ttl_minutes: i64) -> AppResult<()> {
        let body = format!(
            r#"<!DOCTYPE html>
<html>
<body style="font-family: Arial, sans-serif; padding: 20px;">
    <h2>Please confirm your email</h2>
    <p>Your four digit OTP is <strong style="font-size: 20px; letter-spacing: 4px;">{}</strong></p>
    <p>The code expires in {} minutes. If you did not register a restaurant, you can ignore this email.</p>
</body>
</html>"#,
            otp, ttl_minutes
        );

        self.send_email(to_email, "Please confirm your Email", &body).await
    }

    async fn send_email(&self, to: &str, subject: &str, html_body: &str) -> AppResult<()> {
        let email = Message::builder()
            .from(
                self.from_email
                    .parse()
                    .map_err(|e| AppError::Internal(format!("Invalid from email: {}", e)))?,
            )
            .to(to
                .parse()
                .map_err(|e| AppError::BadRequest(format!("Invalid email address: {}", e)))?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html_body.to_string())
            .map_err(|e| AppError::Internal(format!("Failed to build email: {}", e)))?;

        self.mailer
            .send(email)
            .await
            .map_err(|e| AppError::ExternalService(format!("Failed to send email: {}", e)))?;

        Ok(())
    }
}
