use actix_web::{error::JsonPayloadError, web, HttpRequest, HttpResponse};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::AppError;

pub mod auth;
pub mod compliance;
pub mod gear_log;
pub mod incident;
pub mod report;
pub mod site;
pub mod worker;

/// Body accepted by create and update before field validation.
pub type Payload = web::Json<Map<String, Value>>;

#[derive(Serialize)]
struct Confirmation {
    message: String,
}

pub(crate) fn deleted(label: &str) -> HttpResponse {
    HttpResponse::Ok().json(Confirmation {
        message: format!("{label} deleted"),
    })
}

fn payload_error(error: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::Validation(format!("Invalid payload: {error}")).into()
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(payload_error))
        .service(
            web::scope("/api")
                .service(auth::register)
                .service(auth::login)
                .service(auth::me)
                // gear logs share the incident prefix and must match first
                .service(gear_log::get_gear_logs)
                .service(gear_log::get_gear_log)
                .service(gear_log::create_gear_log)
                .service(gear_log::update_gear_log)
                .service(gear_log::delete_gear_log)
                .service(incident::get_incidents)
                .service(incident::get_incident)
                .service(incident::create_incident)
                .service(incident::update_incident)
                .service(incident::delete_incident)
                .service(compliance::get_compliances)
                .service(compliance::get_compliance)
                .service(compliance::create_compliance)
                .service(compliance::update_compliance)
                .service(compliance::delete_compliance)
                .service(report::get_reports)
                .service(report::get_report)
                .service(report::create_report)
                .service(report::update_report)
                .service(report::delete_report)
                .service(site::get_sites)
                .service(site::get_site)
                .service(site::create_site)
                .service(site::update_site)
                .service(site::delete_site)
                .service(worker::get_workers)
                .service(worker::get_worker)
                .service(worker::create_worker)
                .service(worker::update_worker)
                .service(worker::delete_worker),
        );
}
