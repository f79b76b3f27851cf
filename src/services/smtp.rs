use lettre::{
    Message, SmtpTransport, Transport,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use log::{info, warn};

use crate::config::Config;
use crate::models::SubmissionPayload;
use crate::services::gateway::{GatewayError, SubmissionGateway};

/// SMTP delivery of the contact notification, used when EmailJS is not
/// configured.
pub struct SmtpService;

impl SmtpService {
    pub fn new() -> Self {
        SmtpService
    }
}

impl Default for SmtpService {
    fn default() -> Self {
        Self::new()
    }
}

#[rocket::async_trait]
impl SubmissionGateway for SmtpService {
    async fn send(&self, payload: &SubmissionPayload) -> Result<(), GatewayError> {
        let mail_user = Config::mail_user();
        let mail_password = Config::mail_password();

        if mail_user.is_empty() || mail_password.is_empty() {
            warn!("Mail credentials not configured. Skipping notification send.");
            return Err(GatewayError::Rejected(
                "Mail transport is not configured".to_string(),
            ));
        }

        let from_mailbox: Mailbox = Config::mail_from()
            .parse()
            .map_err(|e| GatewayError::Rejected(format!("Bad sender address: {}", e)))?;
        let to_mailbox: Mailbox = payload
            .to_email
            .parse()
            .map_err(|e| GatewayError::Rejected(format!("Bad recipient address: {}", e)))?;

        let email_body = format!(
            r#"
            <!DOCTYPE html>
            <html>
            <body>
                <h1>New contact request</h1>
                <p>A visitor completed mobile verification and submitted the contact form.</p>
                <ul>
                    <li><strong>Name:</strong> {}</li>
                    <li><strong>Company:</strong> {}</li>
                    <li><strong>Email:</strong> {}</li>
                    <li><strong>Mobile (verified):</strong> {}</li>
                </ul>
                <p><strong>Message:</strong></p>
                <p>{}</p>
            </body>
            </html>
            "#,
            payload.from_name,
            payload.company_name,
            payload.from_email,
            payload.mobile_number,
            payload.message
        );

        let email_message = Message::builder()
            .from(from_mailbox)
            .to(to_mailbox)
            .reply_to(
                payload
                    .from_email
                    .parse()
                    .map_err(|e| GatewayError::Rejected(format!("Bad reply address: {}", e)))?,
            )
            .subject(format!("New contact request from {}", payload.from_name))
            .header(ContentType::TEXT_HTML)
            .body(email_body)
            .map_err(|e| GatewayError::Rejected(format!("Could not build email: {}", e)))?;

        let creds = Credentials::new(mail_user, mail_password);
        let mailer = SmtpTransport::relay(&Config::mail_host())
            .map_err(|e| GatewayError::Transport(format!("SMTP relay unavailable: {}", e)))?
            .port(Config::mail_port())
            .credentials(creds)
            .build();

        mailer
            .send(&email_message)
            .map_err(|e| GatewayError::Transport(format!("SMTP delivery failed: {}", e)))?;

        info!("Contact notification delivered to {}", payload.to_email);
        Ok(())
    }
}
