use actix_web::{delete, get, post, put, web, HttpRequest, HttpResponse};

use super::{deleted, Payload};
use crate::{
    access::{self, Resource},
    error::AppError,
    models::{gear_log::GearLog, user::authenticated},
    state::AppState,
};

#[get("/safety/gear-logs")]
pub async fn get_gear_logs(
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let issuer = authenticated(&req)?;
    let gear_logs = access::list::<GearLog>(&state, &issuer).await?;
    Ok(HttpResponse::Ok().json(gear_logs))
}
#[get("/safety/gear-logs/{gear_log_id}")]
pub async fn get_gear_log(
    gear_log_id: web::Path<String>,
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    authenticated(&req)?;
    let gear_log = access::get::<GearLog>(&state, &gear_log_id).await?;
    Ok(HttpResponse::Ok().json(gear_log))
}
#[post("/safety/gear-logs")]
pub async fn create_gear_log(
    payload: Payload,
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let issuer = authenticated(&req)?;
    let gear_log = access::create::<GearLog>(&state, &issuer, payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(gear_log))
}
#[put("/safety/gear-logs/{gear_log_id}")]
pub async fn update_gear_log(
    gear_log_id: web::Path<String>,
    payload: Payload,
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let issuer = authenticated(&req)?;
    let gear_log =
        access::update::<GearLog>(&state, &issuer, &gear_log_id, payload.into_inner())
            .await?;
    Ok(HttpResponse::Ok().json(gear_log))
}
#[delete("/safety/gear-logs/{gear_log_id}")]
pub async fn delete_gear_log(
    gear_log_id: web::Path<String>,
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let issuer = authenticated(&req)?;
    access::delete::<GearLog>(&state, &issuer, &gear_log_id).await?;
    Ok(deleted(GearLog::schema().label))
}
