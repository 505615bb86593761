use actix_web::error::JsonPayloadError;
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use log::error;

use crate::error::RelayError;
use crate::model;
use crate::web::models::{ChatRequest, HealthResponse};
use crate::AppState;

// Health check endpoint
pub async fn health_check(data: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok".to_string(),
        mode: data.relay.mode().to_string(),
    })
}

pub async fn list_models() -> impl Responder {
    HttpResponse::Ok().json(model::catalog())
}

// Chat API endpoint
pub async fn chat(
    data: web::Data<AppState>,
    req: web::Json<ChatRequest>,
) -> Result<HttpResponse, RelayError> {
    let reply = data.relay.handle(req.into_inner()).await?;
    Ok(HttpResponse::Ok().json(reply))
}

/// An unreadable chat body is a processing failure, not a client error.
pub fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    error!("Error processing chat request: {}", err);
    RelayError::Processing(err.to_string()).into()
}
