#[macro_use]
extern crate rocket;

pub mod config;
pub mod flow;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;
pub mod utils;

use std::sync::Arc;

use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::Header;
use rocket::{Build, Request, Response, Rocket};
use rocket_okapi::swagger_ui::{SwaggerUIConfig, make_swagger_ui};

use crate::flow::ContactOptions;
use crate::services::{OtpGateway, SubmissionGateway};
use crate::store::SessionRegistry;

/* ----------------------------- CORS ----------------------------- */

// The form is posted from a browser on another origin.
pub struct CORS;

#[rocket::async_trait]
impl Fairing for CORS {
    fn info(&self) -> Info {
        Info {
            name: "CORS",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, request: &'r Request<'_>, response: &mut Response<'r>) {
        if let Some(origin) = request.headers().get_one("Origin") {
            response.set_header(Header::new("Access-Control-Allow-Origin", origin));
        }

        response.set_header(Header::new(
            "Access-Control-Allow-Methods",
            "GET, POST, OPTIONS",
        ));

        response.set_header(Header::new(
            "Access-Control-Allow-Headers",
            "Content-Type",
        ));

        response.set_header(Header::new("Access-Control-Allow-Credentials", "true"));
    }
}

/* ----------------------------- OPTIONS ----------------------------- */

#[options("/<_..>")]
fn options_handler() {}

/* ----------------------------- ERRORS ----------------------------- */

#[catch(404)]
fn not_found() -> rocket::serde::json::Value {
    rocket::serde::json::json!({
        "success": false,
        "message": "Resource not found (check /api/v1 prefix)"
    })
}

#[catch(500)]
fn internal_error() -> rocket::serde::json::Value {
    rocket::serde::json::json!({
        "success": false,
        "message": "Internal server error"
    })
}

/* ----------------------------- SWAGGER ----------------------------- */

fn swagger_config() -> SwaggerUIConfig {
    SwaggerUIConfig {
        url: "/openapi.json".to_string(),
        ..Default::default()
    }
}

/* ----------------------------- BUILD ----------------------------- */

/// Assemble the Rocket instance around the two injected provider gateways.
/// Tests pass stubs here; `main` wires the real 2factor/EmailJS/SMTP
/// services.
pub fn rocket(
    otp: Arc<dyn OtpGateway>,
    submission: Arc<dyn SubmissionGateway>,
) -> Rocket<Build> {
    rocket::build()
        .manage(SessionRegistry::new(
            otp,
            submission,
            ContactOptions::from_config(),
        ))
        .attach(CORS)
        .mount("/", routes![options_handler])
        .mount(
            "/api/v1",
            routes![
                routes::contact::open_form,
                routes::contact::form_snapshot,
                routes::contact::update_field,
                routes::contact::send_otp,
                routes::contact::verify_otp,
                routes::contact::resend_otp,
                routes::contact::submit_form,
                routes::contact::reset_form,
            ],
        )
        .mount("/api/docs", make_swagger_ui(&swagger_config()))
        .register("/", catchers![not_found, internal_error])
}
