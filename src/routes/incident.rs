use actix_web::{delete, get, post, put, web, HttpRequest, HttpResponse};

use super::{deleted, Payload};
use crate::{
    access::{self, Resource},
    error::AppError,
    models::{incident::Incident, user::authenticated},
    state::AppState,
};

/// Only the caller's own incidents.
#[get("/safety")]
pub async fn get_incidents(
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let issuer = authenticated(&req)?;
    let incidents = access::list::<Incident>(&state, &issuer).await?;
    Ok(HttpResponse::Ok().json(incidents))
}
#[get("/safety/{incident_id}")]
pub async fn get_incident(
    incident_id: web::Path<String>,
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    authenticated(&req)?;
    let incident = access::get::<Incident>(&state, &incident_id).await?;
    Ok(HttpResponse::Ok().json(incident))
}
#[post("/safety")]
pub async fn create_incident(
    payload: Payload,
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let issuer = authenticated(&req)?;
    let incident = access::create::<Incident>(&state, &issuer, payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(incident))
}
#[put("/safety/{incident_id}")]
pub async fn update_incident(
    incident_id: web::Path<String>,
    payload: Payload,
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let issuer = authenticated(&req)?;
    let incident =
        access::update::<Incident>(&state, &issuer, &incident_id, payload.into_inner())
            .await?;
    Ok(HttpResponse::Ok().json(incident))
}
#[delete("/safety/{incident_id}")]
pub async fn delete_incident(
    incident_id: web::Path<String>,
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let issuer = authenticated(&req)?;
    access::delete::<Incident>(&state, &issuer, &incident_id).await?;
    Ok(deleted(Incident::schema().label))
}
