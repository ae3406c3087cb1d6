use crate::app::state::ServiceState;
use actix_web::{web, HttpResponse};

/// `GET /sellers.json` - IAB sellers.json projection of the active
/// publisher table, served from the TTL cache
pub async fn sellers_json(state: web::Data<ServiceState>) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("application/json")
        .body(state.sellers.document())
}
