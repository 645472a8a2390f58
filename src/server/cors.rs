use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::Header;
use rocket::{Request, Response};

use crate::config::EngineMode;

use super::AppState;

/// Permissive CORS for the mobile client: all origins, Content-Type and
/// Authorization headers. The local variant keeps the original service's
/// wider method list.
pub struct Cors;

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "CORS headers",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, request: &'r Request<'_>, response: &mut Response<'r>) {
        let methods = match request.rocket().state::<AppState>().map(|s| s.config.engine_mode) {
            Some(EngineMode::Local) => "GET,PUT,POST,DELETE,OPTIONS",
            _ => "GET,POST,OPTIONS",
        };

        response.set_header(Header::new("Access-Control-Allow-Origin", "*"));
        response.set_header(Header::new(
            "Access-Control-Allow-Headers",
            "Content-Type,Authorization",
        ));
        response.set_header(Header::new("Access-Control-Allow-Methods", methods));
    }
}
