use crate::models::{SessionId, SubmissionPayload};

/// How a provider call can fail. `Rejected` means the provider answered and
/// said no; `Transport` means it could not be reached at all. The two get
/// different user-facing messages upstream.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("{0}")]
    Rejected(String),
    #[error("transport failure: {0}")]
    Transport(String),
}

/// SMS OTP provider: issues a verification session for a mobile number and
/// checks codes against it.
#[rocket::async_trait]
pub trait OtpGateway: Send + Sync {
    async fn request_otp(&self, mobile: &str) -> Result<SessionId, GatewayError>;
    async fn verify(&self, session: &SessionId, code: &str) -> Result<(), GatewayError>;
}

/// Notification channel that receives a finalized submission.
#[rocket::async_trait]
pub trait SubmissionGateway: Send + Sync {
    async fn send(&self, payload: &SubmissionPayload) -> Result<(), GatewayError>;
}
