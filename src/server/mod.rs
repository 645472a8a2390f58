//! HTTP surface of the classification service: status, health and the
//! predict operation.

use rocket::{catchers, routes, Build, Rocket};

use crate::config::ServiceConfig;
use crate::pipeline::ClassificationPipeline;
use crate::relay::BackendRelay;

mod cors;
mod routes;

pub use cors::Cors;
pub use routes::Authorization;

/// Everything a request handler needs, constructed once at startup and
/// immutable afterwards.
pub struct AppState {
    pub pipeline: ClassificationPipeline,
    pub relay: BackendRelay,
    pub config: ServiceConfig,
}

impl AppState {
    pub fn new(pipeline: ClassificationPipeline, relay: BackendRelay, config: ServiceConfig) -> Self {
        Self {
            pipeline,
            relay,
            config,
        }
    }
}

/// Builds the rocket instance; separated from launch so tests can drive
/// it with a local client.
pub fn rocket(state: AppState) -> Rocket<Build> {
    let figment = rocket::Config::figment()
        .merge(("port", state.config.port))
        .merge(("address", "0.0.0.0"));

    rocket::custom(figment)
        .manage(state)
        .attach(Cors)
        .mount(
            "/",
            routes![
                routes::home,
                routes::health,
                routes::predict,
                routes::get_fallback,
                routes::post_fallback,
                routes::put_fallback,
                routes::delete_fallback,
            ],
        )
        .register(
            "/",
            catchers![
                routes::bad_request,
                routes::unauthorized,
                routes::not_found,
                routes::method_not_allowed,
                routes::unprocessable,
                routes::internal_error,
            ],
        )
}
