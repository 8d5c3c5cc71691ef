use actix_web::{delete, get, post, put, web, HttpRequest, HttpResponse};

use super::{deleted, Payload};
use crate::{
    access::{self, Resource},
    error::AppError,
    models::{user::authenticated, worker::Worker},
    state::AppState,
};

#[get("/workers")]
pub async fn get_workers(
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let issuer = authenticated(&req)?;
    let workers = access::list::<Worker>(&state, &issuer).await?;
    Ok(HttpResponse::Ok().json(workers))
}
#[get("/workers/{worker_id}")]
pub async fn get_worker(
    worker_id: web::Path<String>,
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    authenticated(&req)?;
    let worker = access::get::<Worker>(&state, &worker_id).await?;
    Ok(HttpResponse::Ok().json(worker))
}
#[post("/workers")]
pub async fn create_worker(
    payload: Payload,
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let issuer = authenticated(&req)?;
    let worker = access::create::<Worker>(&state, &issuer, payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(worker))
}
#[put("/workers/{worker_id}")]
pub async fn update_worker(
    worker_id: web::Path<String>,
    payload: Payload,
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let issuer = authenticated(&req)?;
    let worker = access::update::<Worker>(&state, &issuer, &worker_id, payload.into_inner()).await?;
    Ok(HttpResponse::Ok().json(worker))
}
#[delete("/workers/{worker_id}")]
pub async fn delete_worker(
    worker_id: web::Path<String>,
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let issuer = authenticated(&req)?;
    access::delete::<Worker>(&state, &issuer, &worker_id).await?;
    Ok(deleted(Worker::schema().label))
}
