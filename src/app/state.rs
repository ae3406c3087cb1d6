use crate::app::config::SspConfig;
use crate::app::pipeline::auction::{AuctionContext, AuctionOutcome};
use crate::app::pipeline::events::{TrackingContext, TrackingEvent};
use crate::core::catalog::manager::CatalogManager;
use crate::core::models::adrequest::AdRequest;
use crate::core::openrtb::BidRequest;
use crate::core::pipeline::Pipeline;
use crate::core::sellers::SellersCache;
use anyhow::Error;
use std::sync::Arc;
use tracing::{debug, warn, Instrument};

/// Everything a request handler needs, wired once at startup and
/// handed to actix as shared data. No module level state anywhere,
/// tests assemble their own instance with stub pieces
pub struct ServiceState {
    pub config: Arc<SspConfig>,
    pub catalog: Arc<CatalogManager>,
    pub sellers: Arc<SellersCache>,
    pub auction_pipeline: Arc<Pipeline<AuctionContext, Error>>,
    pub tracking_pipeline: Arc<Pipeline<TrackingContext, Error>>,
}

impl ServiceState {
    /// Runs one auction to completion. The returned flag tells the
    /// caller whether the pipeline ran through or aborted early
    pub async fn run_auction(
        &self,
        request: AdRequest,
        inbound: Option<BidRequest>,
    ) -> (AuctionContext, bool) {
        let span = crate::sample_or_attach_root_span!(
            self.config.logging.span_sample_rate,
            "handle_ad_request",
            placement = tracing::field::Empty,
        );

        if !span.is_disabled() {
            span.record("placement", request.placement_id.as_str());
        }

        let context = AuctionContext::new(request, inbound, self.config.tmax());

        let result = self
            .auction_pipeline
            .run(&context)
            .instrument(span)
            .await;

        match &result {
            Ok(_) => debug!("request pipeline success"),
            // an abort that assigned an outcome is a routine no-bid,
            // one without is an internal failure
            Err(e) if context.res.get().is_some() => {
                debug!(error = %e, "request pipeline aborted")
            }
            Err(e) => warn!(error = %e, "request pipeline failed"),
        }

        if let Some(AuctionOutcome::NoBid { nbr, desc }) = context.res.get() {
            debug!(nbr, desc = desc.unwrap_or(""), "no bid");
        }

        (context, result.is_ok())
    }

    /// Processes a tracking beacon off the response path. The caller
    /// has already served the pixel, failures only log
    pub fn track(self: &Arc<Self>, event: TrackingEvent, event_id: String) {
        let state = self.clone();

        tokio::spawn(async move {
            let context = TrackingContext::new(event, event_id);

            if let Err(e) = state.tracking_pipeline.run(&context).await {
                warn!(error = %e, "tracking pipeline failed");
            }
        });
    }
}

#[cfg(test)]
pub(crate) mod testutil {
    use super::*;
    use crate::app::pipeline::auction::build_auction_pipeline;
    use crate::app::pipeline::events::build_tracking_pipeline;
    use crate::core::catalog::provider::CatalogProvider;
    use crate::core::catalog::CatalogDocument;
    use crate::core::demand::dispatch::Dispatcher;
    use crate::core::demand::notices::{NoticeCache, Notifier};
    use crate::core::managers::PartnerManager;
    use crate::core::models::partner::Partner;
    use crate::core::sellers::SellersCache;
    use crate::core::telemetry::TelemetrySink;
    use async_trait::async_trait;
    use std::time::Duration;

    struct DocProvider(CatalogDocument);

    #[async_trait]
    impl CatalogProvider for DocProvider {
        async fn fetch(&self) -> Result<CatalogDocument, Error> {
            Ok(self.0.clone())
        }
    }

    /// Assembles a full service state over an in-memory catalog, the
    /// same wiring the startup pipeline does
    pub async fn state_with(doc: CatalogDocument, partners: Vec<Partner>) -> Arc<ServiceState> {
        let mut config = SspConfig::default();
        config.ssp_endpoint = "https://ssp.example".to_string();
        config.partners = partners;
        let config = Arc::new(config);

        let catalog = Arc::new(
            CatalogManager::load(Box::new(DocProvider(doc)))
                .await
                .expect("test catalog should load"),
        );

        let partners = Arc::new(PartnerManager::new(config.partners.clone()));
        let telemetry = Arc::new(TelemetrySink::disabled());
        let dispatcher = Arc::new(Dispatcher::new(&config.ssp_id).unwrap());
        let notices = Arc::new(NoticeCache::new(Duration::from_secs(60)));
        let notifier = Arc::new(Notifier::new().unwrap());

        let auction_pipeline = build_auction_pipeline(
            &config,
            catalog.clone(),
            partners,
            dispatcher,
            notices.clone(),
            notifier.clone(),
            telemetry.clone(),
        )
        .unwrap();

        let tracking_pipeline = build_tracking_pipeline(notices, notifier, telemetry).unwrap();

        let sellers = Arc::new(SellersCache::new(
            catalog.clone(),
            None,
            Duration::from_secs(60),
        ));

        Arc::new(ServiceState {
            config,
            catalog,
            sellers,
            auction_pipeline: Arc::new(auction_pipeline),
            tracking_pipeline: Arc::new(tracking_pipeline),
        })
    }

    /// A demand partner stub listening on an ephemeral port. Returns
    /// a fixed-price bid, optionally pinned to a deal id
    pub async fn spawn_bidder(price: f64, dealid: Option<&str>) -> String {
        use crate::core::openrtb::{Bid, BidRequest, BidResponse, SeatBid};
        use actix_web::{web, App, HttpResponse, HttpServer};

        let dealid = dealid.map(str::to_string);

        let server = HttpServer::new(move || {
            let dealid = dealid.clone();

            App::new().route(
                "/rtb",
                web::post().to(move |body: web::Json<BidRequest>| {
                    let dealid = dealid.clone();

                    async move {
                        let req = body.into_inner();

                        let bid = Bid {
                            id: format!("bid-{price}"),
                            impid: req.imp.first().map(|imp| imp.id.clone()).unwrap_or_default(),
                            price,
                            adm: Some("<div>ad</div>".to_string()),
                            adomain: vec!["brand.example".to_string()],
                            dealid,
                            ..Default::default()
                        };

                        HttpResponse::Ok().json(BidResponse {
                            id: req.id,
                            seatbid: vec![SeatBid {
                                seat: Some("seat-1".to_string()),
                                bid: vec![bid],
                            }],
                            cur: Some("USD".to_string()),
                            ..Default::default()
                        })
                    }
                }),
            )
        })
        .workers(1)
        .bind(("127.0.0.1", 0))
        .expect("bidder stub should bind");

        let addr = server.addrs()[0];
        actix_web::rt::spawn(server.run());

        format!("http://{addr}/rtb")
    }

    /// A partner that never answers within any sane deadline
    pub async fn spawn_black_hole() -> String {
        use actix_web::{web, App, HttpResponse, HttpServer};

        let server = HttpServer::new(|| {
            App::new().route(
                "/rtb",
                web::post().to(|| async {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    HttpResponse::NoContent().finish()
                }),
            )
        })
        .workers(1)
        .bind(("127.0.0.1", 0))
        .expect("black hole stub should bind");

        let addr = server.addrs()[0];
        actix_web::rt::spawn(server.run());

        format!("http://{addr}/rtb")
    }

    pub fn partner(id: &str, endpoint: String) -> Partner {
        Partner {
            id: id.to_string(),
            name: id.to_string(),
            endpoint,
            timeout_ms: 500,
            active: true,
            ..Default::default()
        }
    }
}
