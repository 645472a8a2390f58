use std::path::{Path, PathBuf};

use chrono::Utc;
use rocket::form::Form;
use rocket::fs::TempFile;
use rocket::http::Status;
use rocket::request::{FromRequest, Outcome, Request};
use rocket::response::{self, Responder, Response};
use rocket::serde::json::Json;
use rocket::{catch, delete, get, post, put, State};
use serde_json::{json, Value};

use crate::pipeline::PipelineError;

use super::AppState;

const AVAILABLE_ROUTES: [&str; 3] = [
    "GET  / - This route (server status)",
    "GET  /health - Health check",
    "POST /predict - Image classification and send to backend",
];

/// The caller's authorization credential, forwarded verbatim to the
/// backend. A request without one fails 401 before the handler runs, so
/// no relay can be attempted without credentials.
pub struct Authorization(pub String);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for Authorization {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        match request.headers().get_one("Authorization") {
            Some(value) => Outcome::Success(Authorization(value.to_string())),
            None => Outcome::Error((Status::Unauthorized, ())),
        }
    }
}

/// Stable error body: `{success: false, error}` with the mapped status.
pub struct ApiError {
    status: Status,
    message: String,
}

impl ApiError {
    fn new(status: Status, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        let status = match err {
            PipelineError::InvalidImage(_) => Status::BadRequest,
            PipelineError::Engine(_) => Status::InternalServerError,
        };
        ApiError::new(status, err.to_string())
    }
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, request: &'r Request<'_>) -> response::Result<'static> {
        let body = Json(json!({ "success": false, "error": self.message }));
        Response::build_from(body.respond_to(request)?)
            .status(self.status)
            .ok()
    }
}

#[get("/")]
pub fn home(state: &State<AppState>) -> Json<Value> {
    let engine = state.pipeline.engine();
    Json(json!({
        "message": "Waste Classification API is running successfully!",
        "server_info": {
            "device": engine.device(),
            "mode": engine.mode().as_str(),
            "model": engine.model_version(),
            "model_loaded": true,
            "backend_url": state.relay.backend_url(),
            "routes_available": AVAILABLE_ROUTES,
        },
    }))
}

#[get("/health")]
pub fn health(state: &State<AppState>) -> Json<Value> {
    let engine = state.pipeline.engine();
    Json(json!({
        "status": "healthy",
        "device": engine.device(),
        "mode": engine.mode().as_str(),
        "model_loaded": true,
        "backend_url": state.relay.backend_url(),
        "message": "Server is running successfully",
        "timestamp": Utc::now().to_rfc3339(),
        "version": "2.0",
    }))
}

#[derive(rocket::FromForm)]
pub struct PredictUpload<'f> {
    image: Option<TempFile<'f>>,
}

async fn read_upload(file: &mut TempFile<'_>) -> std::io::Result<Vec<u8>> {
    // TempFile may be buffered in memory or spilled to disk; copying to a
    // scratch path covers both. The scratch file is removed on every exit
    // path, including a failed copy or read.
    let scratch = std::env::temp_dir().join(format!(
        "wastesort-upload-{}-{}",
        std::process::id(),
        Utc::now().timestamp_nanos_opt().unwrap_or_default()
    ));
    let bytes = match file.copy_to(&scratch).await {
        Ok(()) => rocket::tokio::fs::read(&scratch).await,
        Err(e) => Err(e),
    };
    let _ = rocket::tokio::fs::remove_file(&scratch).await;
    bytes
}

/// Classify one uploaded image and forward the decision to the backend.
///
/// Classification is the primary deliverable: a backend failure is
/// reported inside `backend_response` while the response itself stays
/// successful.
#[post("/predict", data = "<form>")]
pub async fn predict(
    form: Form<PredictUpload<'_>>,
    auth: Authorization,
    state: &State<AppState>,
) -> Result<Json<Value>, ApiError> {
    log::info!("Received request to /predict");
    let mut upload = form.into_inner();

    let Some(file) = upload.image.as_mut() else {
        log::warn!("No image in request");
        return Err(ApiError::new(Status::BadRequest, "No image uploaded"));
    };
    let filename = file
        .raw_name()
        .and_then(|name| name.as_str())
        .unwrap_or("upload")
        .to_string();
    log::info!("Received image: {}", filename);

    let bytes = read_upload(file)
        .await
        .map_err(|e| ApiError::new(Status::InternalServerError, format!("Failed to read upload: {}", e)))?;

    let result = state.pipeline.classify(&bytes, &filename).await?;

    let engine = state.pipeline.engine();
    let outcome = state
        .relay
        .send(&result, engine.device(), engine.model_version(), &auth.0)
        .await;

    Ok(Json(json!({
        "prediction": result.class.canonical_name(),
        "confidence": result.formatted_confidence(),
        "success": true,
        "message": "Classification successful",
        "backend_response": outcome.annotation(),
    })))
}

/// Rocket matches routes on (method, path); a method mismatch leaves no
/// candidate route and would fall through to the 404 catcher. These
/// fallbacks claim the remaining methods on known paths and hand off to
/// the 405 catcher, while unknown paths keep their 404.
fn method_mismatch(path: &Path) -> Status {
    match path.to_str() {
        Some("") | Some("health") | Some("predict") => Status::MethodNotAllowed,
        _ => Status::NotFound,
    }
}

#[get("/<path..>", rank = 20)]
pub fn get_fallback(path: PathBuf) -> Status {
    match path.to_str() {
        Some("predict") => Status::MethodNotAllowed,
        _ => Status::NotFound,
    }
}

#[post("/<path..>", rank = 20)]
pub fn post_fallback(path: PathBuf) -> Status {
    match path.to_str() {
        Some("") | Some("health") => Status::MethodNotAllowed,
        // The predict route exists but its data guard forwarded: the
        // request body was not a multipart form.
        Some("predict") => Status::BadRequest,
        _ => Status::NotFound,
    }
}

#[put("/<path..>", rank = 20)]
pub fn put_fallback(path: PathBuf) -> Status {
    method_mismatch(&path)
}

#[delete("/<path..>", rank = 20)]
pub fn delete_fallback(path: PathBuf) -> Status {
    method_mismatch(&path)
}

#[catch(400)]
pub fn bad_request() -> Json<Value> {
    Json(json!({ "success": false, "error": "Bad request" }))
}

#[catch(401)]
pub fn unauthorized() -> Json<Value> {
    Json(json!({ "success": false, "error": "Missing Authorization header" }))
}

#[catch(404)]
pub fn not_found() -> Json<Value> {
    Json(json!({
        "error": "Route not found",
        "available_routes": ["GET  /", "GET  /health", "POST /predict"],
    }))
}

#[catch(405)]
pub fn method_not_allowed() -> Json<Value> {
    Json(json!({
        "error": "Method not allowed",
        "message": "Check the HTTP method (GET/POST) for this route",
    }))
}

/// A request that never parsed as a multipart form with an image field is
/// the caller's error; report it with the missing-image shape.
#[catch(422)]
pub fn unprocessable() -> (Status, Json<Value>) {
    (
        Status::BadRequest,
        Json(json!({ "success": false, "error": "No image uploaded" })),
    )
}

#[catch(500)]
pub fn internal_error() -> Json<Value> {
    Json(json!({ "success": false, "error": "Internal server error" }))
}
