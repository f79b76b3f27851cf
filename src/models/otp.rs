use std::fmt;

use rocket_okapi::okapi::schemars::JsonSchema;
use serde::Serialize;

/// Where the mobile-verification side of the form currently stands.
///
/// `Failed` covers both a send that never produced a session and a verify
/// attempt that bounced; the presence of a session tells the two apart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum OtpStatus {
    #[default]
    Idle,
    Requesting,
    Sent,
    Verifying,
    Verified,
    Failed,
}

/// Provider-issued token binding an OTP code to one send request.
///
/// The token is the only credential needed to verify a code, so it never
/// leaves the verification flow: no Serialize, and Debug prints a mask.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(raw: impl Into<String>) -> Self {
        SessionId(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionId(****)")
    }
}

/// A live OTP exchange. Exists only between a successful send and the next
/// resend or reset; at most one at a time.
#[derive(Debug, Clone)]
pub struct OtpSession {
    pub mobile: String,
    pub session_id: SessionId,
}
