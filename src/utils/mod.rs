pub mod response;
pub mod validation;

pub use response::{ApiError, ApiResponse};
pub use validation::{validate_email, validate_mobile, validate_otp_code};
