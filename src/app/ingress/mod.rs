pub mod adtag;
pub mod normalize;
pub mod openrtb;
pub mod sellers;
pub mod ssai;
pub mod tracking;
pub mod vast;

use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, ResponseError};
use thiserror::Error;

/// `GET|HEAD /health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().body("ok")
}

/// Errors surfaced to the ingress caller. Partner diagnostics never
/// travel on this path, they go to telemetry only
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl ResponseError for RequestError {
    fn status_code(&self) -> StatusCode {
        match self {
            RequestError::BadRequest(_) => StatusCode::BAD_REQUEST,
            // ad endpoints answer catalog misses with an empty 204
            RequestError::NotFound(_) => StatusCode::NO_CONTENT,
            RequestError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            RequestError::BadRequest(message) => {
                HttpResponse::BadRequest().body(message.clone())
            }
            _ => HttpResponse::build(self.status_code()).finish(),
        }
    }
}

/// Client address honoring the configured forwarded-header chain.
/// The first trusted header present wins, its first hop is the
/// client
pub fn client_ip(req: &HttpRequest, forwarded_headers: &[String]) -> Option<String> {
    for header in forwarded_headers {
        if let Some(value) = req.headers().get(header.as_str()) {
            if let Ok(value) = value.to_str() {
                let first = value.split(',').next().unwrap_or("").trim();
                if !first.is_empty() {
                    return Some(first.to_string());
                }
            }
        }
    }

    req.peer_addr().map(|addr| addr.ip().to_string())
}

pub fn header_string(req: &HttpRequest, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}
