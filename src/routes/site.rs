use actix_web::{delete, get, post, put, web, HttpRequest, HttpResponse};

use super::{deleted, Payload};
use crate::{
    access::{self, Resource},
    error::AppError,
    models::{site::Site, user::authenticated},
    state::AppState,
};

#[get("/sites")]
pub async fn get_sites(
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let issuer = authenticated(&req)?;
    let sites = access::list::<Site>(&state, &issuer).await?;
    Ok(HttpResponse::Ok().json(sites))
}
#[get("/sites/{site_id}")]
pub async fn get_site(
    site_id: web::Path<String>,
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    authenticated(&req)?;
    let site = access::get::<Site>(&state, &site_id).await?;
    Ok(HttpResponse::Ok().json(site))
}
#[post("/sites")]
pub async fn create_site(
    payload: Payload,
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let issuer = authenticated(&req)?;
    let site = access::create::<Site>(&state, &issuer, payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(site))
}
#[put("/sites/{site_id}")]
pub async fn update_site(
    site_id: web::Path<String>,
    payload: Payload,
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let issuer = authenticated(&req)?;
    let site = access::update::<Site>(&state, &issuer, &site_id, payload.into_inner()).await?;
    Ok(HttpResponse::Ok().json(site))
}
#[delete("/sites/{site_id}")]
pub async fn delete_site(
    site_id: web::Path<String>,
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let issuer = authenticated(&req)?;
    access::delete::<Site>(&state, &issuer, &site_id).await?;
    Ok(deleted(Site::schema().label))
}
