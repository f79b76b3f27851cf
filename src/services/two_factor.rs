use log::{info, warn};
use reqwest::Client;
use serde::Deserialize;

use crate::config::Config;
use crate::models::SessionId;
use crate::services::gateway::{GatewayError, OtpGateway};

const TWO_FACTOR_BASE: &str = "https://2factor.in/API/V1";

/// 2factor.in SMS OTP provider. AUTOGEN lets the provider mint the code;
/// the `Details` field of a successful send is the verification session
/// token for the follow-up VERIFY call.
pub struct TwoFactorService {
    client: Client,
}

#[derive(Debug, Deserialize)]
struct TwoFactorResponse {
    #[serde(rename = "Status")]
    status: String,
    #[serde(rename = "Details")]
    details: String,
}

impl TwoFactorService {
    pub fn new() -> Self {
        TwoFactorService {
            client: Client::new(),
        }
    }

    fn api_key() -> Result<String, GatewayError> {
        Config::two_factor_api_key()
            .ok_or_else(|| GatewayError::Rejected("SMS provider is not configured".to_string()))
    }
}

impl Default for TwoFactorService {
    fn default() -> Self {
        Self::new()
    }
}

#[rocket::async_trait]
impl OtpGateway for TwoFactorService {
    async fn request_otp(&self, mobile: &str) -> Result<SessionId, GatewayError> {
        let url = format!(
            "{}/{}/SMS/{}/AUTOGEN/{}",
            TWO_FACTOR_BASE,
            Self::api_key()?,
            mobile,
            Config::two_factor_template(),
        );

        let res = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(format!("2factor request failed: {}", e)))?;

        if !res.status().is_success() {
            warn!("2factor send returned {}", res.status());
            return Err(GatewayError::Rejected(format!(
                "OTP provider error ({})",
                res.status()
            )));
        }

        let body: TwoFactorResponse = res
            .json()
            .await
            .map_err(|e| GatewayError::Transport(format!("2factor response unreadable: {}", e)))?;

        if body.status == "Success" {
            info!("OTP SMS dispatched to {}", mobile);
            Ok(SessionId::new(body.details))
        } else {
            Err(GatewayError::Rejected(body.details))
        }
    }

    async fn verify(&self, session: &SessionId, code: &str) -> Result<(), GatewayError> {
        let url = format!(
            "{}/{}/SMS/VERIFY/{}/{}",
            TWO_FACTOR_BASE,
            Self::api_key()?,
            session.as_str(),
            code,
        );

        let res = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(format!("2factor request failed: {}", e)))?;

        // Mismatches come back with an error HTTP status and an explanatory
        // body, so parse before judging the status code.
        let body: TwoFactorResponse = res
            .json()
            .await
            .map_err(|e| GatewayError::Transport(format!("2factor response unreadable: {}", e)))?;

        if body.status == "Success" && body.details == "OTP Matched" {
            Ok(())
        } else {
            Err(GatewayError::Rejected(body.details))
        }
    }
}
