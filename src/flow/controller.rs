use std::sync::Arc;
use std::time::Duration;

use log::{error, info};
use tokio::sync::Mutex;

use crate::config::Config;
use crate::flow::{FlowError, VerificationFlow};
use crate::models::{
    ContactAction, FormData, FormField, FormSnapshot, OtpStatus, SubmissionPayload,
    SubmissionStatus,
};
use crate::services::{OtpGateway, SubmissionGateway};
use crate::utils::validation::validate_email;

pub const SUBMITTED_MESSAGE: &str = "Form submitted successfully! We will contact you soon.";
pub const DELIVERY_FAILED_MESSAGE: &str =
    "Form submitted but the email notification failed. Please contact us directly.";

/// Knobs the controller needs beyond its gateways.
#[derive(Debug, Clone)]
pub struct ContactOptions {
    /// Inbox that receives the contact notifications.
    pub to_email: String,
    /// How long a successful submission stays on screen before the form
    /// wipes itself back to defaults.
    pub reset_delay: Duration,
}

impl ContactOptions {
    pub fn from_config() -> Self {
        ContactOptions {
            to_email: Config::contact_to_email(),
            reset_delay: Duration::from_millis(Config::submit_reset_ms()),
        }
    }
}

/// Mediates every user interaction with one contact form. Sole writer of
/// the form fields and the submission status; everything OTP-shaped is
/// delegated to the verification flow.
#[derive(Clone)]
pub struct FormController {
    inner: Arc<Inner>,
}

struct Inner {
    flow: VerificationFlow,
    submission: Arc<dyn SubmissionGateway>,
    options: ContactOptions,
    state: Mutex<FormState>,
}

#[derive(Default)]
struct FormState {
    data: FormData,
    status: SubmissionStatus,
    error: Option<String>,
    success: Option<String>,
    busy: bool,
    generation: u64,
}

impl FormController {
    pub fn new(
        otp: Arc<dyn OtpGateway>,
        submission: Arc<dyn SubmissionGateway>,
        options: ContactOptions,
    ) -> Self {
        FormController {
            inner: Arc::new(Inner {
                flow: VerificationFlow::new(otp),
                submission,
                options,
                state: Mutex::new(FormState::default()),
            }),
        }
    }

    pub async fn dispatch(&self, action: ContactAction) -> Result<(), FlowError> {
        match action {
            ContactAction::UpdateField { field, value } => self.update_field(field, value).await,
            ContactAction::RequestOtp => self.request_otp().await,
            ContactAction::VerifyOtp { code } => self.verify_otp(&code).await,
            ContactAction::Resend => self.resend().await,
            ContactAction::Submit => self.submit().await,
            ContactAction::Reset => {
                self.reset().await;
                Ok(())
            }
        }
    }

    /// Read-only projection for rendering. Never includes the provider
    /// session token.
    pub async fn snapshot(&self) -> FormSnapshot {
        let otp_status = self.inner.flow.status().await;
        let st = self.inner.state.lock().await;
        FormSnapshot {
            form: st.data.clone(),
            otp_status,
            submission_status: st.status,
            error: st.error.clone(),
            success: st.success.clone(),
        }
    }

    /// Field edits clear the current error. Editing the mobile number also
    /// throws away any verification tied to the old value: a verified flag
    /// must never outlive a change to the number it verified.
    pub async fn update_field(&self, field: FormField, value: String) -> Result<(), FlowError> {
        if field == FormField::Mobile && self.inner.flow.status().await != OtpStatus::Idle {
            self.inner.flow.reset().await;
        }
        let mut st = self.inner.state.lock().await;
        st.data.set(field, value);
        st.error = None;
        Ok(())
    }

    pub async fn request_otp(&self) -> Result<(), FlowError> {
        let mobile = self.inner.state.lock().await.data.mobile.clone();
        match self.inner.flow.request_otp(&mobile).await {
            Ok(()) => {
                self.record_success("OTP sent successfully via SMS to your mobile number!")
                    .await;
                Ok(())
            }
            Err(e) => Err(self.record_error(e).await),
        }
    }

    pub async fn verify_otp(&self, code: &str) -> Result<(), FlowError> {
        match self.inner.flow.verify_otp(code).await {
            Ok(()) => {
                self.record_success("Mobile number verified successfully!").await;
                Ok(())
            }
            Err(e) => Err(self.record_error(e).await),
        }
    }

    pub async fn resend(&self) -> Result<(), FlowError> {
        match self.inner.flow.resend().await {
            Ok(()) => {
                self.record_success("OTP sent successfully via SMS to your mobile number!")
                    .await;
                Ok(())
            }
            Err(e) => Err(self.record_error(e).await),
        }
    }

    /// Final submission. The guard runs before any gateway traffic; a guard
    /// failure is always recoverable by fixing input. Delivery failure after
    /// a passed guard keeps the entered data.
    pub async fn submit(&self) -> Result<(), FlowError> {
        let verified = self.inner.flow.status().await == OtpStatus::Verified;

        let (generation, payload) = {
            let mut st = self.inner.state.lock().await;
            if st.busy {
                return Err(FlowError::Busy);
            }
            if let Err(e) = Self::check_guard(&st.data, verified) {
                st.error = Some(e.to_string());
                return Err(e);
            }
            st.busy = true;
            st.generation += 1;
            st.status = SubmissionStatus::Submitting;
            st.error = None;
            (
                st.generation,
                SubmissionPayload::from_form(&st.data, &self.inner.options.to_email),
            )
        };

        let outcome = self.inner.submission.send(&payload).await;

        let mut st = self.inner.state.lock().await;
        if st.generation != generation {
            return Err(FlowError::Superseded);
        }
        st.busy = false;
        match outcome {
            Ok(()) => {
                info!("Contact form submitted for {}", payload.mobile_number);
                st.status = SubmissionStatus::Submitted;
                st.success = Some(SUBMITTED_MESSAGE.to_string());
                drop(st);
                self.schedule_reset(generation);
                Ok(())
            }
            Err(e) => {
                error!("Submission delivery failed: {}", e);
                st.status = SubmissionStatus::Failed;
                let err = FlowError::Delivery(DELIVERY_FAILED_MESSAGE.to_string());
                st.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    fn check_guard(data: &FormData, verified: bool) -> Result<(), FlowError> {
        if data.name.trim().is_empty() {
            return Err(FlowError::Validation("Please enter your name".to_string()));
        }
        if !validate_email(&data.email) {
            return Err(FlowError::Validation(
                "Please enter a valid email address".to_string(),
            ));
        }
        if !verified {
            return Err(FlowError::Validation(
                "Please verify your mobile number with OTP".to_string(),
            ));
        }
        Ok(())
    }

    /// Wipe everything back to defaults, OTP session included.
    pub async fn reset(&self) {
        self.inner.flow.reset().await;
        let mut st = self.inner.state.lock().await;
        let generation = st.generation + 1;
        *st = FormState {
            generation,
            ..FormState::default()
        };
    }

    /// A successful submission clears the whole form after a fixed delay.
    /// The wipe is generation-checked so a form that was reset or reused in
    /// the meantime is left alone.
    fn schedule_reset(&self, generation: u64) {
        let controller = self.clone();
        let delay = self.inner.options.reset_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            {
                let mut st = controller.inner.state.lock().await;
                if st.generation != generation {
                    return;
                }
                let generation = generation + 1;
                *st = FormState {
                    generation,
                    ..FormState::default()
                };
            }
            controller.inner.flow.reset().await;
        });
    }

    async fn record_success(&self, message: &str) {
        let mut st = self.inner.state.lock().await;
        st.error = None;
        st.success = Some(message.to_string());
    }

    async fn record_error(&self, err: FlowError) -> FlowError {
        // A superseded call changed nothing; the snapshot already tells the
        // real story.
        if !matches!(err, FlowError::Superseded) {
            let mut st = self.inner.state.lock().await;
            st.error = Some(err.to_string());
        }
        err
    }
}
