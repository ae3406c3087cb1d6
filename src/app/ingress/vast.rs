use crate::app::ingress::normalize::{self, PublicaVastQuery};
use crate::app::ingress::{client_ip, header_string, RequestError};
use crate::app::state::ServiceState;
use crate::core::models::adrequest::{AdRequest, Ingress};
use crate::core::render::vast;
use actix_web::{web, HttpRequest, HttpResponse};

const VAST_CONTENT_TYPE: &str = "application/xml";

fn vast_response(state: &ServiceState, context: &crate::app::pipeline::auction::AuctionContext) -> HttpResponse {
    let body = match (context.result(), context.event_id.get()) {
        (Some(result), Some(event_id)) => {
            vast::render(&state.config.ssp_endpoint, event_id, &result.winner().bid)
        }
        // benign empty-ad document on any no-result path
        _ => vast::empty_vast(),
    };

    HttpResponse::Ok().content_type(VAST_CONTENT_TYPE).body(body)
}

/// `GET /vast/{placement_id}` - CTV ad tags
pub async fn vast_tag(
    state: web::Data<ServiceState>,
    path: web::Path<String>,
    http_req: HttpRequest,
) -> Result<HttpResponse, RequestError> {
    let placement_id = path.into_inner();

    if placement_id.is_empty() {
        return Err(RequestError::BadRequest("placement_id is required".into()));
    }

    let request = AdRequest {
        placement_id,
        ua: header_string(&http_req, "user-agent"),
        ip: client_ip(&http_req, &state.config.forwarded_headers),
        referer: header_string(&http_req, "referer"),
        ingress: Ingress::Vast,
        ..Default::default()
    };

    let (context, _) = state.run_auction(request, None).await;

    Ok(vast_response(&state, &context))
}

/// `GET /publica/vast` - VAST with Publica macro parameters
pub async fn publica_vast(
    state: web::Data<ServiceState>,
    query: web::Query<PublicaVastQuery>,
) -> Result<HttpResponse, RequestError> {
    let request = normalize::from_publica_vast(query.into_inner())?;

    let (context, _) = state.run_auction(request, None).await;

    Ok(vast_response(&state, &context))
}
