use actix_cors::Cors;
use actix_web::{dev::Server, http::header, middleware, web, App, HttpServer};
use tracing::info;

use crate::{
    configuration::{AppState, State},
    controller::{admin, market, misc, proposals},
    error::Error,
};

pub async fn server_task(app_state: &AppState<State>) -> Result<(), Error> {
    let app = app_state.clone();
    tokio::spawn(async move {
        let server = init_server(app)?;
        server.await?;
        Ok(())
    })
    .await?
}

fn init_server(app_state: AppState<State>) -> Result<Server, Error> {
    let host = app_state.config.server_host.to_owned();
    let port = app_state.config.port;

    info!("Listening on {}:{}", host, port);

    let server = HttpServer::new(move || {
        let app = app_state.clone();
        let allowed_cors = String::from("*");
        let cors_access_all =
            app.config.allowed_origins.contains(&allowed_cors);
        let cors = Cors::default()
            .allowed_origin_fn(move |origin, _| {
                if cors_access_all {
                    return true;
                }
                let allowed = &app.config.allowed_origins;
                if let Ok(origin) = origin.to_str() {
                    return allowed.contains(&origin.to_owned());
                }
                false
            })
            .allowed_methods(vec!["GET", "POST", "DELETE"])
            .allowed_headers(vec![header::AUTHORIZATION, header::ACCEPT])
            .allowed_header(header::CONTENT_TYPE);

        App::new()
            .wrap(cors)
            .wrap(middleware::Compress::default())
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().limit(4096))
            .service(
                web::scope("/api")
                    .service(proposals::balance)
                    .service(proposals::spends)
                    .service(proposals::donation_address)
                    .service(proposals::create)
                    .service(admin::invalidate_cache)
                    .service(market::convert_usd)
                    .service(market::prices)
                    .service(misc::version),
            )
    })
    .bind((host, port))?
    .disable_signals()
    .run();
    Ok(server)
}
