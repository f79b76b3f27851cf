use std::sync::Arc;

use dotenvy::dotenv;
use log::warn;

use capitalspark_server::config::Config;
use capitalspark_server::services::{
    EmailJsService, OtpGateway, SmtpService, SubmissionGateway, TwoFactorService,
};

#[rocket::launch]
fn rocket() -> _ {
    dotenv().ok();
    env_logger::init();

    if !Config::is_two_factor_enabled() {
        warn!("2factor API key not configured; OTP requests will be rejected");
    }

    let otp: Arc<dyn OtpGateway> = Arc::new(TwoFactorService::new());
    let submission: Arc<dyn SubmissionGateway> = if Config::is_emailjs_enabled() {
        Arc::new(EmailJsService::new())
    } else {
        Arc::new(SmtpService::new())
    };

    println!("🚀 CapitalSpark contact API running");
    println!("📚 Swagger UI → http://localhost:8000/api/docs");

    capitalspark_server::rocket(otp, submission)
}
