use crate::app::ingress::normalize::{self, AdTagQuery};
use crate::app::ingress::RequestError;
use crate::app::pipeline::auction::{AuctionContext, AuctionOutcome};
use crate::app::state::ServiceState;
use crate::core::render::adtag;
use actix_web::{web, HttpRequest, HttpResponse};
use anyhow::anyhow;

/// A winner renders, a no-bid is an empty 204, an abort without an
/// outcome is an internal error
fn disposition(context: &AuctionContext, completed: bool) -> Result<Option<()>, RequestError> {
    match context.res.get() {
        Some(AuctionOutcome::Result(_)) => Ok(Some(())),
        Some(AuctionOutcome::NoBid { .. }) => Ok(None),
        None if completed => Ok(None),
        None => Err(RequestError::Internal(anyhow!("auction aborted"))),
    }
}

/// `GET|POST /ad/request` - web and mobile ad tags
pub async fn ad_request(
    state: web::Data<ServiceState>,
    query: web::Query<AdTagQuery>,
    http_req: HttpRequest,
) -> Result<HttpResponse, RequestError> {
    let request = normalize::from_adtag(
        query.into_inner(),
        &http_req,
        &state.config.forwarded_headers,
    )?;

    let (context, completed) = state.run_auction(request, None).await;

    if disposition(&context, completed)?.is_none() {
        return Ok(HttpResponse::NoContent().finish());
    }

    let result = context
        .result()
        .ok_or_else(|| RequestError::Internal(anyhow!("winner missing")))?;
    let event_id = context
        .event_id
        .get()
        .ok_or_else(|| RequestError::Internal(anyhow!("event id missing")))?;

    Ok(HttpResponse::Ok().json(adtag::render(result, event_id)))
}
