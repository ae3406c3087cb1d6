use crate::app::ingress::{normalize, RequestError};
use crate::app::pipeline::auction::AuctionOutcome;
use crate::app::state::ServiceState;
use crate::core::openrtb::{BidRequest, BidResponse, SeatBid};
use actix_web::{web, HttpResponse};
use anyhow::anyhow;

/// `POST /openrtb2/auction` - direct OpenRTB 2.5 ingress. The
/// response keeps only the winning seatbid, priced at clearance
pub async fn auction(
    state: web::Data<ServiceState>,
    body: web::Json<BidRequest>,
) -> Result<HttpResponse, RequestError> {
    let inbound = body.into_inner();
    let request = normalize::from_openrtb(&inbound)?;
    let request_id = inbound.id.clone();

    let (context, completed) = state.run_auction(request, Some(inbound)).await;

    match context.res.get() {
        Some(AuctionOutcome::Result(result)) => {
            let winner = result.winner();

            let mut bid = winner.bid.clone();
            bid.price = result.cleared_price;

            let response = BidResponse {
                id: request_id,
                seatbid: vec![SeatBid {
                    seat: winner.seat.clone(),
                    bid: vec![bid],
                }],
                bidid: context.event_id.get().cloned(),
                cur: Some("USD".to_string()),
                nbr: None,
            };

            Ok(HttpResponse::Ok().json(response))
        }
        Some(AuctionOutcome::NoBid { nbr, .. }) => {
            let response = BidResponse {
                id: request_id,
                nbr: Some(*nbr),
                ..Default::default()
            };

            Ok(HttpResponse::Ok().json(response))
        }
        None if completed => Ok(HttpResponse::NoContent().finish()),
        None => Err(RequestError::Internal(anyhow!("auction aborted"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::state::testutil::{partner, spawn_bidder, state_with};
    use crate::core::catalog::testutil::sample_document;
    use crate::core::openrtb::Imp;
    use actix_web::http::StatusCode;
    use actix_web::{test, App};

    fn inbound_request() -> BidRequest {
        BidRequest {
            id: "caller-1".into(),
            imp: vec![Imp {
                id: "1".into(),
                tagid: Some("plc-1".into()),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[actix_web::test]
    async fn single_bid_clears_at_the_floor() {
        let bidder = spawn_bidder(2.0, None).await;
        let state = state_with(sample_document(), vec![partner("a", bidder)]).await;

        let app = test::init_service(
            App::new()
                .app_data(web::Data::from(state))
                .route("/openrtb2/auction", web::post().to(auction)),
        )
        .await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/openrtb2/auction")
                .set_json(inbound_request())
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);

        let body: BidResponse = test::read_body_json(res).await;
        assert_eq!(body.id, "caller-1");
        assert_eq!(body.cur.as_deref(), Some("USD"));
        assert_eq!(body.seatbid.len(), 1);
        assert_eq!(body.seatbid[0].bid.len(), 1);
        // one admitted bid under second price pays the floor
        assert_eq!(body.seatbid[0].bid[0].price, 0.5);
    }

    #[actix_web::test]
    async fn no_admitted_bids_returns_an_nbr() {
        let bidder = spawn_bidder(0.40, None).await;
        let state = state_with(sample_document(), vec![partner("a", bidder)]).await;

        let app = test::init_service(
            App::new()
                .app_data(web::Data::from(state))
                .route("/openrtb2/auction", web::post().to(auction)),
        )
        .await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/openrtb2/auction")
                .set_json(inbound_request())
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);

        let body: BidResponse = test::read_body_json(res).await;
        assert!(body.seatbid.is_empty());
        assert!(body.nbr.is_some());
    }
}
