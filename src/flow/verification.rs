use std::sync::Arc;

use log::{info, warn};
use tokio::sync::Mutex;

use crate::flow::FlowError;
use crate::models::{OtpSession, OtpStatus};
use crate::services::{GatewayError, OtpGateway};
use crate::utils::validation::{validate_mobile, validate_otp_code};

/// Owns the OTP exchange. The only component that ever sees the provider
/// session token.
///
/// The lock is released around every provider call. `busy` rejects a second
/// invocation while one is outstanding; `generation` is bumped by resets and
/// new sends so a provider answer that arrives late is dropped instead of
/// resurrecting discarded state.
pub struct VerificationFlow {
    gateway: Arc<dyn OtpGateway>,
    state: Mutex<FlowState>,
}

#[derive(Default)]
struct FlowState {
    status: OtpStatus,
    session: Option<OtpSession>,
    busy: bool,
    generation: u64,
}

impl VerificationFlow {
    pub fn new(gateway: Arc<dyn OtpGateway>) -> Self {
        VerificationFlow {
            gateway,
            state: Mutex::new(FlowState::default()),
        }
    }

    pub async fn status(&self) -> OtpStatus {
        self.state.lock().await.status
    }

    /// The number the current session proved control of, if verification has
    /// completed.
    pub async fn verified_mobile(&self) -> Option<String> {
        let st = self.state.lock().await;
        match st.status {
            OtpStatus::Verified => st.session.as_ref().map(|s| s.mobile.clone()),
            _ => None,
        }
    }

    /// Ask the provider to text a code to `mobile`. Any prior session is
    /// discarded before the request goes out.
    pub async fn request_otp(&self, mobile: &str) -> Result<(), FlowError> {
        if !validate_mobile(mobile) {
            return Err(FlowError::Validation(
                "Please enter a valid 10-digit mobile number".to_string(),
            ));
        }

        let generation = {
            let mut st = self.state.lock().await;
            if st.busy {
                return Err(FlowError::Busy);
            }
            st.busy = true;
            st.generation += 1;
            st.session = None;
            st.status = OtpStatus::Requesting;
            st.generation
        };

        let outcome = self.gateway.request_otp(mobile).await;

        let mut st = self.state.lock().await;
        if st.generation != generation {
            return Err(FlowError::Superseded);
        }
        st.busy = false;
        match outcome {
            Ok(session_id) => {
                info!("OTP session opened for {}", mobile);
                st.session = Some(OtpSession {
                    mobile: mobile.to_string(),
                    session_id,
                });
                st.status = OtpStatus::Sent;
                Ok(())
            }
            Err(e) => {
                warn!("OTP send failed: {}", e);
                st.status = OtpStatus::Failed;
                st.session = None;
                Err(match e {
                    GatewayError::Rejected(msg) => FlowError::Rejected(msg),
                    GatewayError::Transport(_) => FlowError::Transport,
                })
            }
        }
    }

    /// Check a code against the live session. A failed attempt keeps the
    /// session, so the user can retry with a fresh code without a resend;
    /// that retry is the one transition that re-enters `Sent` from `Failed`.
    pub async fn verify_otp(&self, code: &str) -> Result<(), FlowError> {
        if !validate_otp_code(code) {
            return Err(FlowError::Validation(
                "Please enter a valid 6-digit OTP".to_string(),
            ));
        }

        let (generation, session_id) = {
            let mut st = self.state.lock().await;
            if st.busy {
                return Err(FlowError::Busy);
            }
            let session_id = match (st.status, &st.session) {
                (OtpStatus::Sent, Some(session)) => session.session_id.clone(),
                (OtpStatus::Failed, Some(session)) => session.session_id.clone(),
                _ => {
                    return Err(FlowError::Validation(
                        "Request an OTP before verifying".to_string(),
                    ));
                }
            };
            if st.status == OtpStatus::Failed {
                st.status = OtpStatus::Sent;
            }
            st.busy = true;
            st.status = OtpStatus::Verifying;
            (st.generation, session_id)
        };

        let outcome = self.gateway.verify(&session_id, code).await;

        let mut st = self.state.lock().await;
        if st.generation != generation {
            return Err(FlowError::Superseded);
        }
        st.busy = false;
        match outcome {
            Ok(()) => {
                info!("Mobile number verified");
                st.status = OtpStatus::Verified;
                Ok(())
            }
            Err(e) => {
                warn!("OTP verification failed: {}", e);
                st.status = OtpStatus::Failed;
                Err(match e {
                    GatewayError::Rejected(_) => {
                        FlowError::Rejected("Invalid OTP. Please try again.".to_string())
                    }
                    GatewayError::Transport(_) => FlowError::Transport,
                })
            }
        }
    }

    /// Drop the current session and ask the provider for a fresh one on the
    /// same number. Only meaningful once a send has happened.
    pub async fn resend(&self) -> Result<(), FlowError> {
        let mobile = {
            let mut st = self.state.lock().await;
            if st.busy {
                return Err(FlowError::Busy);
            }
            let mobile = match (st.status, &st.session) {
                (OtpStatus::Sent, Some(session)) | (OtpStatus::Failed, Some(session)) => {
                    session.mobile.clone()
                }
                _ => {
                    return Err(FlowError::Validation(
                        "There is no OTP to resend".to_string(),
                    ));
                }
            };
            st.session = None;
            st.status = OtpStatus::Idle;
            st.generation += 1;
            mobile
        };

        self.request_otp(&mobile).await
    }

    /// Back to Idle, discarding any session. An in-flight provider call is
    /// not cancelled; its answer is invalidated instead.
    pub async fn reset(&self) {
        let mut st = self.state.lock().await;
        st.status = OtpStatus::Idle;
        st.session = None;
        st.busy = false;
        st.generation += 1;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex as StdMutex;

    use tokio::sync::Notify;

    use super::*;
    use crate::models::SessionId;
    use crate::services::gateway::{GatewayError, OtpGateway};

    #[derive(Default)]
    struct StubOtp {
        sends: AtomicUsize,
        verifies: AtomicUsize,
        reject_send: AtomicBool,
        reject_verify: AtomicBool,
        transport_verify: AtomicBool,
        last_session: StdMutex<Option<String>>,
        gate: Option<Arc<Notify>>,
    }

    #[rocket::async_trait]
    impl OtpGateway for StubOtp {
        async fn request_otp(&self, _mobile: &str) -> Result<SessionId, GatewayError> {
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            let n = self.sends.fetch_add(1, Ordering::SeqCst) + 1;
            if self.reject_send.load(Ordering::SeqCst) {
                return Err(GatewayError::Rejected("provider said no".to_string()));
            }
            Ok(SessionId::new(format!("session-{}", n)))
        }

        async fn verify(&self, session: &SessionId, _code: &str) -> Result<(), GatewayError> {
            self.verifies.fetch_add(1, Ordering::SeqCst);
            *self.last_session.lock().unwrap() = Some(session.as_str().to_string());
            if self.transport_verify.load(Ordering::SeqCst) {
                return Err(GatewayError::Transport("connection refused".to_string()));
            }
            if self.reject_verify.load(Ordering::SeqCst) {
                return Err(GatewayError::Rejected("OTP Mismatch".to_string()));
            }
            Ok(())
        }
    }

    fn flow_with(stub: Arc<StubOtp>) -> Arc<VerificationFlow> {
        Arc::new(VerificationFlow::new(stub))
    }

    #[tokio::test]
    async fn invalid_mobile_never_reaches_the_provider() {
        let stub = Arc::new(StubOtp::default());
        let flow = flow_with(stub.clone());

        let result = flow.request_otp("5876543210").await;
        assert!(matches!(result, Err(FlowError::Validation(_))));
        assert_eq!(stub.sends.load(Ordering::SeqCst), 0);
        assert_eq!(flow.status().await, OtpStatus::Idle);
    }

    #[tokio::test]
    async fn successful_send_opens_a_session() {
        let stub = Arc::new(StubOtp::default());
        let flow = flow_with(stub.clone());

        flow.request_otp("9876543210").await.unwrap();
        assert_eq!(flow.status().await, OtpStatus::Sent);
        assert_eq!(stub.sends.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn rejected_send_leaves_no_session() {
        let stub = Arc::new(StubOtp::default());
        stub.reject_send.store(true, Ordering::SeqCst);
        let flow = flow_with(stub.clone());

        let result = flow.request_otp("9876543210").await;
        assert!(matches!(result, Err(FlowError::Rejected(_))));
        assert_eq!(flow.status().await, OtpStatus::Failed);
        // A failed send holds no session, so verifying is still a local error.
        let result = flow.verify_otp("123456").await;
        assert!(matches!(result, Err(FlowError::Validation(_))));
        assert_eq!(stub.verifies.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn verify_without_a_send_is_a_local_error() {
        let stub = Arc::new(StubOtp::default());
        let flow = flow_with(stub.clone());

        let result = flow.verify_otp("123456").await;
        assert!(matches!(result, Err(FlowError::Validation(_))));
        assert_eq!(stub.verifies.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn malformed_code_is_rejected_before_the_provider() {
        let stub = Arc::new(StubOtp::default());
        let flow = flow_with(stub.clone());
        flow.request_otp("9876543210").await.unwrap();

        for code in ["12345", "1234567", "12a456", ""] {
            let result = flow.verify_otp(code).await;
            assert!(matches!(result, Err(FlowError::Validation(_))), "{code:?}");
        }
        assert_eq!(stub.verifies.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn matched_code_verifies_the_number() {
        let stub = Arc::new(StubOtp::default());
        let flow = flow_with(stub.clone());

        flow.request_otp("9876543210").await.unwrap();
        flow.verify_otp("123456").await.unwrap();
        assert_eq!(flow.status().await, OtpStatus::Verified);
        assert_eq!(flow.verified_mobile().await.as_deref(), Some("9876543210"));
    }

    #[tokio::test]
    async fn failed_verify_keeps_the_session_for_a_retry() {
        let stub = Arc::new(StubOtp::default());
        let flow = flow_with(stub.clone());

        flow.request_otp("9876543210").await.unwrap();
        stub.reject_verify.store(true, Ordering::SeqCst);
        let result = flow.verify_otp("654321").await;
        assert!(matches!(result, Err(FlowError::Rejected(_))));
        assert_eq!(flow.status().await, OtpStatus::Failed);

        // Retry against the same session, no resend in between.
        stub.reject_verify.store(false, Ordering::SeqCst);
        flow.verify_otp("123456").await.unwrap();
        assert_eq!(flow.status().await, OtpStatus::Verified);
        assert_eq!(stub.sends.load(Ordering::SeqCst), 1);
        assert_eq!(
            stub.last_session.lock().unwrap().as_deref(),
            Some("session-1")
        );
    }

    #[tokio::test]
    async fn transport_failure_reads_differently_from_a_mismatch() {
        let stub = Arc::new(StubOtp::default());
        let flow = flow_with(stub.clone());

        flow.request_otp("9876543210").await.unwrap();
        stub.transport_verify.store(true, Ordering::SeqCst);
        let err = flow.verify_otp("123456").await.unwrap_err();
        assert!(matches!(err, FlowError::Transport));
        assert!(err.to_string().contains("check your connection"));
        assert_eq!(flow.status().await, OtpStatus::Failed);
    }

    #[tokio::test]
    async fn resend_issues_a_distinct_session() {
        let stub = Arc::new(StubOtp::default());
        let flow = flow_with(stub.clone());

        flow.request_otp("9876543210").await.unwrap();
        flow.resend().await.unwrap();
        assert_eq!(stub.sends.load(Ordering::SeqCst), 2);

        flow.verify_otp("123456").await.unwrap();
        // The discarded first session is never used again.
        assert_eq!(
            stub.last_session.lock().unwrap().as_deref(),
            Some("session-2")
        );
    }

    #[tokio::test]
    async fn resend_needs_a_prior_send() {
        let stub = Arc::new(StubOtp::default());
        let flow = flow_with(stub.clone());

        let result = flow.resend().await;
        assert!(matches!(result, Err(FlowError::Validation(_))));
        assert_eq!(stub.sends.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn concurrent_request_is_rejected_not_queued() {
        let gate = Arc::new(Notify::new());
        let stub = Arc::new(StubOtp {
            gate: Some(gate.clone()),
            ..Default::default()
        });
        let flow = flow_with(stub.clone());

        let bg = tokio::spawn({
            let flow = flow.clone();
            async move { flow.request_otp("9876543210").await }
        });
        while flow.status().await != OtpStatus::Requesting {
            tokio::task::yield_now().await;
        }

        let result = flow.request_otp("9876543210").await;
        assert!(matches!(result, Err(FlowError::Busy)));

        gate.notify_one();
        bg.await.unwrap().unwrap();
        assert_eq!(flow.status().await, OtpStatus::Sent);
        assert_eq!(stub.sends.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn reset_discards_a_stale_send_response() {
        let gate = Arc::new(Notify::new());
        let stub = Arc::new(StubOtp {
            gate: Some(gate.clone()),
            ..Default::default()
        });
        let flow = flow_with(stub.clone());

        let bg = tokio::spawn({
            let flow = flow.clone();
            async move { flow.request_otp("9876543210").await }
        });
        while flow.status().await != OtpStatus::Requesting {
            tokio::task::yield_now().await;
        }

        flow.reset().await;
        gate.notify_one();

        let result = bg.await.unwrap();
        assert!(matches!(result, Err(FlowError::Superseded)));
        // The provider did answer, but the session never materialized.
        assert_eq!(stub.sends.load(Ordering::SeqCst), 1);
        assert_eq!(flow.status().await, OtpStatus::Idle);
        let result = flow.verify_otp("123456").await;
        assert!(matches!(result, Err(FlowError::Validation(_))));
    }
}
