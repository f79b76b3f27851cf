pub mod emailjs;
pub mod gateway;
pub mod smtp;
pub mod two_factor;

pub use emailjs::EmailJsService;
pub use gateway::{GatewayError, OtpGateway, SubmissionGateway};
pub use smtp::SmtpService;
pub use two_factor::TwoFactorService;
