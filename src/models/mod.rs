pub mod form;
pub mod otp;

pub use form::*;
pub use otp::*;
