use crate::app::pipeline::events::TrackingEvent;
use crate::app::state::ServiceState;
use actix_web::{web, HttpResponse};
use serde::Deserialize;

/// 1x1 transparent GIF served on every pixel request
pub const TRANSPARENT_GIF: [u8; 43] = [
    0x47, 0x49, 0x46, 0x38, 0x39, 0x61, // GIF89a
    0x01, 0x00, 0x01, 0x00, 0x80, 0x00, 0x00, // 1x1, palette follows
    0x00, 0x00, 0x00, 0xff, 0xff, 0xff, // black, white
    0x21, 0xf9, 0x04, 0x01, 0x00, 0x00, 0x00, 0x00, // transparency
    0x2c, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00, // image descriptor
    0x02, 0x02, 0x44, 0x01, 0x00, // pixel data
    0x3b, // trailer
];

#[derive(Debug, Default, Deserialize)]
pub struct BeaconQuery {
    pub bid_id: Option<String>,
}

fn gif() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("image/gif")
        .body(TRANSPARENT_GIF.to_vec())
}

/// `GET /impression/{bid_id}` - the pixel is served first, the
/// impression settles off the response path
pub async fn impression(
    state: web::Data<ServiceState>,
    path: web::Path<String>,
) -> HttpResponse {
    state.track(TrackingEvent::Impression, path.into_inner());

    gif()
}

/// `GET /publica/pixel/{event}` - VAST quartile beacons
pub async fn publica_pixel(
    state: web::Data<ServiceState>,
    path: web::Path<String>,
    query: web::Query<BeaconQuery>,
) -> HttpResponse {
    let event = path.into_inner();
    let event_id = query.into_inner().bid_id.unwrap_or_default();

    let kind = if event == "impression" {
        TrackingEvent::Impression
    } else {
        TrackingEvent::Quartile(event)
    };

    state.track(kind, event_id);

    gif()
}

/// `GET /click/{bid_id}`
pub async fn click(state: web::Data<ServiceState>, path: web::Path<String>) -> HttpResponse {
    state.track(TrackingEvent::Click, path.into_inner());

    HttpResponse::Ok().finish()
}

/// `GET /publica/click`
pub async fn publica_click(
    state: web::Data<ServiceState>,
    query: web::Query<BeaconQuery>,
) -> HttpResponse {
    state.track(
        TrackingEvent::Click,
        query.into_inner().bid_id.unwrap_or_default(),
    );

    HttpResponse::Ok().finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::state::testutil::state_with;
    use crate::core::catalog::testutil::sample_document;
    use actix_web::http::StatusCode;
    use actix_web::{test as actix_test, App};

    #[test]
    fn pixel_is_exactly_43_bytes() {
        assert_eq!(TRANSPARENT_GIF.len(), 43);
        // GIF89a signature
        assert_eq!(&TRANSPARENT_GIF[..6], b"GIF89a");
        // trailer byte
        assert_eq!(TRANSPARENT_GIF[42], 0x3b);
    }

    #[actix_web::test]
    async fn impression_serves_the_gif_even_for_unknown_ids() {
        let state = state_with(sample_document(), vec![]).await;

        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::from(state))
                .route("/impression/{bid_id}", web::get().to(impression))
                .route("/click/{bid_id}", web::get().to(click)),
        )
        .await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/impression/ev-unknown")
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.headers().get("content-type").unwrap(), "image/gif");

        let body = actix_test::read_body(res).await;
        assert_eq!(body.len(), 43);

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/click/ev-unknown").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
    }
}
