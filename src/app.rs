use std::net::TcpListener;
use std::sync::Arc;

use actix_web::dev::Server;
use actix_web::{get, HttpResponse, Responder};
use actix_web::{web, App, HttpServer};

use tracing_actix_web::TracingLogger;

use crate::clock::Clock;
use crate::controller::{notifications, reminders, users};
use crate::error::RestError;
use crate::notification::{EmailNotifier, NotificationEngine};
use crate::repo::Repos;

/// Simple health-check endpoint
#[tracing::instrument(name = "Health check")]
#[get("/health_check")]
async fn health_check() -> impl Responder {
    HttpResponse::Ok().finish()
}

/// Run the application on a specified TCP listener
pub fn run(
    listener: TcpListener,
    repos: Repos,
    engine: NotificationEngine,
    notifier: Arc<EmailNotifier>,
    clock: Arc<dyn Clock>,
) -> anyhow::Result<Server> {
    // Wrap application data
    let repos = web::Data::new(repos);
    let engine = web::Data::new(engine);
    let notifier = web::Data::from(notifier);
    let clock: web::Data<dyn Clock> = web::Data::from(clock);

    // Malformed bodies, queries and paths share the JSON error shape
    let json_config = web::JsonConfig::default()
        .error_handler(|err, _| RestError::ParseError(err.to_string()).into());
    let query_config = web::QueryConfig::default()
        .error_handler(|err, _| RestError::ParseError(err.to_string()).into());
    let path_config = web::PathConfig::default()
        .error_handler(|err, _| RestError::ParseError(err.to_string()).into());

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(json_config.clone())
            .app_data(query_config.clone())
            .app_data(path_config.clone())
            .app_data(repos.clone())
            .app_data(engine.clone())
            .app_data(notifier.clone())
            .app_data(clock.clone())
            .service(health_check)
            .service(notifications::cron)
            .service(notifications::scope())
            .service(reminders::scope())
            .service(users::scope())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
