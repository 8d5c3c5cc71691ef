use actix_web::{get, post, web, HttpRequest, HttpResponse};
use tracing::info;

use crate::{
    error::AppError,
    models::user::{authenticated, User, UserCredential, UserRequest, UserResponse},
    state::AppState,
};

#[post("/auth/register")]
pub async fn register(
    payload: web::Json<UserRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let mut user: User = User::from_request(payload.into_inner())?;
    let _id = user.save(state.store.as_ref()).await?;
    info!(%_id, "registered user");

    let token = UserCredential::issue(&state.config, &_id)?;
    Ok(HttpResponse::Created().json(user.session(token)?))
}
#[post("/auth/login")]
pub async fn login(
    payload: web::Json<UserCredential>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let session = payload.authenticate(&state).await?;
    Ok(HttpResponse::Ok().json(session))
}
#[get("/auth/me")]
pub async fn me(req: HttpRequest) -> Result<HttpResponse, AppError> {
    let issuer = authenticated(&req)?;
    Ok(HttpResponse::Ok().json(UserResponse::from(issuer.as_ref())))
}
