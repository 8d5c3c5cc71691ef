use actix_web::{delete, get, post, put, web, HttpRequest, HttpResponse};

use super::{deleted, Payload};
use crate::{
    access::{self, Resource},
    error::AppError,
    models::{compliance::Compliance, user::authenticated},
    state::AppState,
};

#[get("/equipment")]
pub async fn get_compliances(
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let issuer = authenticated(&req)?;
    let compliances = access::list::<Compliance>(&state, &issuer).await?;
    Ok(HttpResponse::Ok().json(compliances))
}
#[get("/equipment/{compliance_id}")]
pub async fn get_compliance(
    compliance_id: web::Path<String>,
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    authenticated(&req)?;
    let compliance = access::get::<Compliance>(&state, &compliance_id).await?;
    Ok(HttpResponse::Ok().json(compliance))
}
#[post("/equipment")]
pub async fn create_compliance(
    payload: Payload,
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let issuer = authenticated(&req)?;
    let compliance = access::create::<Compliance>(&state, &issuer, payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(compliance))
}
#[put("/equipment/{compliance_id}")]
pub async fn update_compliance(
    compliance_id: web::Path<String>,
    payload: Payload,
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let issuer = authenticated(&req)?;
    let compliance =
        access::update::<Compliance>(&state, &issuer, &compliance_id, payload.into_inner())
            .await?;
    Ok(HttpResponse::Ok().json(compliance))
}
#[delete("/equipment/{compliance_id}")]
pub async fn delete_compliance(
    compliance_id: web::Path<String>,
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let issuer = authenticated(&req)?;
    access::delete::<Compliance>(&state, &issuer, &compliance_id).await?;
    Ok(deleted(Compliance::schema().label))
}
