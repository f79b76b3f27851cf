use rocket::Config as RocketConfig;
use rocket::figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use std::env;

/// Environment-backed configuration. Provider credentials are never
/// embedded; they arrive via `Rocket.toml` or `ROCKET_`-prefixed env vars
/// (loaded from `.env` in development).
pub struct Config;

impl Config {
    fn figment() -> Figment {
        let profile = env::var("ROCKET_PROFILE").unwrap_or_else(|_| "development".to_string());

        Figment::from(RocketConfig::default())
            .merge(Toml::file("Rocket.toml").nested())
            .select(&profile)
            .merge(Env::prefixed("ROCKET_"))
    }

    pub fn two_factor_api_key() -> Option<String> {
        Self::figment().extract_inner("two_factor_api_key").ok()
    }

    /// Provider-side SMS template the OTP goes out with.
    pub fn two_factor_template() -> String {
        Self::figment()
            .extract_inner("two_factor_template")
            .unwrap_or_else(|_| "CAPITALSPARK_OTP".to_string())
    }

    pub fn is_two_factor_enabled() -> bool {
        Self::two_factor_api_key().is_some()
    }

    pub fn emailjs_service_id() -> Option<String> {
        Self::figment().extract_inner("emailjs_service_id").ok()
    }

    pub fn emailjs_template_id() -> Option<String> {
        Self::figment().extract_inner("emailjs_template_id").ok()
    }

    pub fn emailjs_public_key() -> Option<String> {
        Self::figment().extract_inner("emailjs_public_key").ok()
    }

    pub fn is_emailjs_enabled() -> bool {
        Self::emailjs_service_id().is_some()
            && Self::emailjs_template_id().is_some()
            && Self::emailjs_public_key().is_some()
    }

    pub fn mail_host() -> String {
        Self::figment()
            .extract_inner("mail_host")
            .unwrap_or_else(|_| "smtp.gmail.com".to_string())
    }

    pub fn mail_port() -> u16 {
        Self::figment().extract_inner("mail_port").unwrap_or(587)
    }

    pub fn mail_user() -> String {
        Self::figment().extract_inner("mail_user").unwrap_or_default()
    }

    pub fn mail_password() -> String {
        Self::figment()
            .extract_inner("mail_password")
            .unwrap_or_default()
    }

    pub fn mail_from() -> String {
        Self::figment()
            .extract_inner("mail_from")
            .unwrap_or_else(|_| "CapitalSpark <noreply@capitalspark.in>".to_string())
    }

    /// Inbox that receives the contact notifications.
    pub fn contact_to_email() -> String {
        Self::figment()
            .extract_inner("contact_to_email")
            .unwrap_or_else(|_| "contact@capitalspark.in".to_string())
    }

    /// How long a submitted form stays on screen before wiping, in ms.
    pub fn submit_reset_ms() -> u64 {
        Self::figment()
            .extract_inner("submit_reset_ms")
            .unwrap_or(3000)
    }
}
