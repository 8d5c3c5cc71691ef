use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use std::io;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use sitesafe_server::{
    config::Config, database, models::user::UserAuthenticationMiddlewareFactory, routes,
    state::AppState,
};

#[actix_web::main]
async fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config: Config = Config::load().map_err(|e| {
        error!(error = %e, "invalid configuration");
        io::Error::new(io::ErrorKind::InvalidInput, e)
    })?;
    let store = database::connect(&config).await.map_err(|e| {
        error!(error = %e, "store initialization failed");
        io::Error::new(io::ErrorKind::Other, e)
    })?;

    let address = config.address();
    let state = web::Data::new(AppState::new(store, config));
    info!(host = %address.0, port = address.1, "starting server");

    HttpServer::new(move || {
        App::new()
            .wrap(UserAuthenticationMiddlewareFactory)
            .wrap(Logger::default())
            .wrap(Cors::permissive())
            .app_data(state.clone())
            .configure(routes::configure)
    })
    .bind(address)?
    .run()
    .await?;

    info!("server stopped");
    Ok(())
}
