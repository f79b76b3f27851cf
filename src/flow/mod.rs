pub mod controller;
pub mod verification;

pub use controller::{ContactOptions, FormController};
pub use verification::VerificationFlow;

/// Everything that can go wrong while driving the form. Each variant is a
/// distinct recovery story, and `Display` is the user-facing message.
#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    /// A local precondition failed; no provider was contacted. Fixed by
    /// correcting input.
    #[error("{0}")]
    Validation(String),

    /// A call on this flow is still in flight. The new invocation is
    /// rejected, never queued.
    #[error("Another request is already in progress. Please wait.")]
    Busy,

    /// The provider answered and declined.
    #[error("{0}")]
    Rejected(String),

    /// The provider could not be reached. Same retry path as a rejection,
    /// but the wording points at the connection rather than the content.
    #[error("Network error. Please check your connection and try again.")]
    Transport,

    /// The flow was reset while this call was in flight; the provider's
    /// answer was discarded and no state changed.
    #[error("This request was superseded by a reset.")]
    Superseded,

    /// The form content was accepted locally but the notification could not
    /// be delivered. Entered data is retained.
    #[error("{0}")]
    Delivery(String),
}
