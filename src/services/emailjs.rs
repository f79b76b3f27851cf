use log::info;
use reqwest::Client;
use serde_json::json;

use crate::config::Config;
use crate::models::SubmissionPayload;
use crate::services::gateway::{GatewayError, SubmissionGateway};

const EMAILJS_SEND: &str = "https://api.emailjs.com/api/v1.0/email/send";

/// EmailJS REST delivery. The submission payload travels as the template
/// parameters of a pre-built EmailJS template.
pub struct EmailJsService {
    client: Client,
}

impl EmailJsService {
    pub fn new() -> Self {
        EmailJsService {
            client: Client::new(),
        }
    }

    fn credentials() -> Result<(String, String, String), GatewayError> {
        match (
            Config::emailjs_service_id(),
            Config::emailjs_template_id(),
            Config::emailjs_public_key(),
        ) {
            (Some(service), Some(template), Some(key)) => Ok((service, template, key)),
            _ => Err(GatewayError::Rejected(
                "EmailJS is not configured".to_string(),
            )),
        }
    }
}

impl Default for EmailJsService {
    fn default() -> Self {
        Self::new()
    }
}

#[rocket::async_trait]
impl SubmissionGateway for EmailJsService {
    async fn send(&self, payload: &SubmissionPayload) -> Result<(), GatewayError> {
        let (service_id, template_id, public_key) = Self::credentials()?;

        let body = json!({
            "service_id": service_id,
            "template_id": template_id,
            "user_id": public_key,
            "template_params": payload,
        });

        let res = self
            .client
            .post(EMAILJS_SEND)
            .json(&body)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(format!("EmailJS request failed: {}", e)))?;

        if !res.status().is_success() {
            let detail = res
                .text()
                .await
                .unwrap_or_else(|_| "EmailJS error".to_string());
            return Err(GatewayError::Rejected(detail));
        }

        info!("Contact notification delivered via EmailJS");
        Ok(())
    }
}
