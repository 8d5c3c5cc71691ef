use actix_web::{delete, get, post, put, web, HttpRequest, HttpResponse};

use super::{deleted, Payload};
use crate::{
    access::{self, Resource},
    error::AppError,
    models::{report::Report, user::authenticated},
    state::AppState,
};

#[get("/hazard/reports")]
pub async fn get_reports(
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let issuer = authenticated(&req)?;
    let reports = access::list::<Report>(&state, &issuer).await?;
    Ok(HttpResponse::Ok().json(reports))
}
#[get("/hazard/reports/{report_id}")]
pub async fn get_report(
    report_id: web::Path<String>,
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    authenticated(&req)?;
    let report = access::get::<Report>(&state, &report_id).await?;
    Ok(HttpResponse::Ok().json(report))
}
#[post("/hazard/reports")]
pub async fn create_report(
    payload: Payload,
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let issuer = authenticated(&req)?;
    let report = access::create::<Report>(&state, &issuer, payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(report))
}
#[put("/hazard/reports/{report_id}")]
pub async fn update_report(
    report_id: web::Path<String>,
    payload: Payload,
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let issuer = authenticated(&req)?;
    let report = access::update::<Report>(&state, &issuer, &report_id, payload.into_inner()).await?;
    Ok(HttpResponse::Ok().json(report))
}
#[delete("/hazard/reports/{report_id}")]
pub async fn delete_report(
    report_id: web::Path<String>,
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let issuer = authenticated(&req)?;
    access::delete::<Report>(&state, &issuer, &report_id).await?;
    Ok(deleted(Report::schema().label))
}
