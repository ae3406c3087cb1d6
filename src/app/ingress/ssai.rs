use crate::app::ingress::normalize::{self, SsaiRequest};
use crate::app::ingress::RequestError;
use crate::app::pipeline::auction::AuctionOutcome;
use crate::app::state::ServiceState;
use crate::core::render::ssai;
use actix_web::{web, HttpResponse};
use anyhow::anyhow;

/// `POST /publica/ssai` - SSAI ad decisioning
pub async fn decision(
    state: web::Data<ServiceState>,
    body: web::Json<SsaiRequest>,
) -> Result<HttpResponse, RequestError> {
    let request = normalize::from_ssai(body.into_inner())?;

    let (context, completed) = state.run_auction(request, None).await;

    match context.res.get() {
        Some(AuctionOutcome::Result(result)) => {
            let event_id = context
                .event_id
                .get()
                .ok_or_else(|| RequestError::Internal(anyhow!("event id missing")))?;

            let body = ssai::render(
                &state.config.ssp_endpoint,
                &context.request,
                result,
                event_id,
            );

            Ok(HttpResponse::Ok().json(body))
        }
        Some(AuctionOutcome::NoBid { .. }) => Ok(HttpResponse::NoContent().finish()),
        None if completed => Ok(HttpResponse::NoContent().finish()),
        None => Err(RequestError::Internal(anyhow!("auction aborted"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::state::testutil::{partner, spawn_bidder, state_with};
    use crate::core::catalog::testutil::sample_document;
    use crate::core::catalog::CatalogDocument;
    use crate::core::models::deal::Deal;
    use crate::core::models::placement::{AdType, Placement, VideoSettings};
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use chrono::{Duration, Utc};

    fn ctv_document() -> CatalogDocument {
        let mut doc = sample_document();

        doc.placements.push(Placement {
            id: "plc-ctv".into(),
            site_id: "site-1".into(),
            name: "Midroll".into(),
            ad_type: AdType::Video,
            width: 1920,
            height: 1080,
            floor_price: 0.25,
            video: Some(VideoSettings::default()),
            active: true,
            ..Default::default()
        });

        doc.deals.push(Deal {
            id: "PMP-2024-003".into(),
            cpm: 1.0,
            start: Utc::now() - Duration::days(1),
            end: Utc::now() + Duration::days(1),
            ..Default::default()
        });

        doc
    }

    fn decision_body(deal_id: Option<&str>) -> serde_json::Value {
        serde_json::json!({
            "publisher_id": "p1-publica",
            "site_id": "site-1",
            "content_id": "content-9",
            "device_id": "ifa-1",
            "floor": 1.0,
            "deal_id": deal_id,
            "parameters": {"size": "1920x1080"}
        })
    }

    async fn decide(
        state: std::sync::Arc<crate::app::state::ServiceState>,
        body: serde_json::Value,
    ) -> actix_web::dev::ServiceResponse {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::from(state))
                .route("/publica/ssai", web::post().to(decision)),
        )
        .await;

        test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/publica/ssai")
                .set_json(body)
                .to_request(),
        )
        .await
    }

    #[actix_web::test]
    async fn deal_bid_fills_the_ad_break() {
        let bidder = spawn_bidder(2.5, Some("PMP-2024-003")).await;
        let state = state_with(ctv_document(), vec![partner("a", bidder)]).await;

        let res = decide(state, decision_body(Some("PMP-2024-003"))).await;
        assert_eq!(res.status(), StatusCode::OK);

        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["ads"].as_array().unwrap().len(), 1);
        assert_eq!(body["ads"][0]["cpm"], 2.5);
        assert!(body["tracking_urls"]["impression"][0]
            .as_str()
            .unwrap()
            .contains("pub=p1-publica"));
        assert!(!body["cache_buster"].as_str().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn non_deal_bid_is_rejected_with_a_204() {
        // the partner ignores the deal, its bid carries no dealid
        let bidder = spawn_bidder(2.5, None).await;
        let state = state_with(ctv_document(), vec![partner("a", bidder)]).await;

        let res = decide(state, decision_body(Some("PMP-2024-003"))).await;
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
    }

    #[actix_web::test]
    async fn missing_site_is_a_400() {
        let state = state_with(ctv_document(), vec![]).await;

        let res = decide(state, serde_json::json!({"publisher_id": "p1"})).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
