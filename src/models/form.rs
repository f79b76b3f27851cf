use rocket_okapi::okapi::schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::models::OtpStatus;

pub const COMPANY_PLACEHOLDER: &str = "Not provided";
pub const MESSAGE_PLACEHOLDER: &str = "No message provided";

/// Raw form fields as typed by the visitor. Optional fields stay empty
/// until submission time, when placeholders are filled in.
#[derive(Debug, Clone, Default, Serialize, JsonSchema)]
pub struct FormData {
    pub name: String,
    pub company: String,
    pub email: String,
    pub mobile: String,
    pub message: String,
}

impl FormData {
    pub fn set(&mut self, field: FormField, value: String) {
        match field {
            FormField::Name => self.name = value,
            FormField::Company => self.company = value,
            FormField::Email => self.email = value,
            FormField::Mobile => self.mobile = value,
            FormField::Message => self.message = value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FormField {
    Name,
    Company,
    Email,
    Mobile,
    Message,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    #[default]
    Idle,
    Submitting,
    Submitted,
    Failed,
}

/// Read-only projection handed to the presentation layer. Deliberately
/// excludes the provider session token.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct FormSnapshot {
    pub form: FormData,
    pub otp_status: OtpStatus,
    pub submission_status: SubmissionStatus,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// What the delivery provider receives once the form clears every guard.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct SubmissionPayload {
    pub from_name: String,
    pub company_name: String,
    pub from_email: String,
    pub mobile_number: String,
    pub message: String,
    pub to_email: String,
}

impl SubmissionPayload {
    pub fn from_form(form: &FormData, to_email: &str) -> Self {
        SubmissionPayload {
            from_name: form.name.trim().to_string(),
            company_name: if form.company.trim().is_empty() {
                COMPANY_PLACEHOLDER.to_string()
            } else {
                form.company.clone()
            },
            from_email: form.email.clone(),
            mobile_number: form.mobile.clone(),
            message: if form.message.trim().is_empty() {
                MESSAGE_PLACEHOLDER.to_string()
            } else {
                form.message.clone()
            },
            to_email: to_email.to_string(),
        }
    }
}

/// Everything the presentation layer may ask the form to do.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContactAction {
    UpdateField { field: FormField, value: String },
    RequestOtp,
    VerifyOtp { code: String },
    Resend,
    Submit,
    Reset,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct UpdateFieldDto {
    pub field: FormField,
    pub value: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct VerifyOtpDto {
    pub otp: String,
}
