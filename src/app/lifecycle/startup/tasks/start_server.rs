use crate::app::ingress;
use crate::app::lifecycle::context::StartupContext;
use crate::app::state::ServiceState;
use crate::core::pipeline::AsyncTask;
use actix_web::{web, App, HttpServer};
use anyhow::{anyhow, Error};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

pub struct StartServerTask;

fn routes(app: &mut web::ServiceConfig) {
    app.route("/ad/request", web::get().to(ingress::adtag::ad_request))
        .route("/ad/request", web::post().to(ingress::adtag::ad_request))
        .route("/vast/{placement_id}", web::get().to(ingress::vast::vast_tag))
        .route("/openrtb2/auction", web::post().to(ingress::openrtb::auction))
        .route("/publica/ssai", web::post().to(ingress::ssai::decision))
        .route("/publica/vast", web::get().to(ingress::vast::publica_vast))
        .route(
            "/impression/{bid_id}",
            web::get().to(ingress::tracking::impression),
        )
        .route("/click/{bid_id}", web::get().to(ingress::tracking::click))
        .route(
            "/publica/pixel/{event}",
            web::get().to(ingress::tracking::publica_pixel),
        )
        .route(
            "/publica/click",
            web::get().to(ingress::tracking::publica_click),
        )
        .route("/sellers.json", web::get().to(ingress::sellers::sellers_json))
        .route("/health", web::get().to(ingress::health));
}

#[async_trait]
impl AsyncTask<StartupContext, Error> for StartServerTask {
    async fn run(&self, ctx: &StartupContext) -> Result<(), Error> {
        let config = ctx
            .config
            .get()
            .ok_or_else(|| anyhow!("config missing during server start"))?;

        let state: Arc<ServiceState> = ctx
            .state
            .get()
            .ok_or_else(|| anyhow!("service state missing during server start"))?
            .clone();

        let port = config.port;

        let server = HttpServer::new(move || {
            let state = web::Data::from(state.clone());

            App::new().app_data(state).configure(routes)
        })
        .bind(("0.0.0.0", port))
        .map_err(|e| anyhow!("failed binding port {port}: {e}"))?
        .run();

        let handle = server.handle();
        actix_web::rt::spawn(server);

        ctx.server
            .set(handle)
            .map_err(|_| anyhow!("server already started"))?;

        info!(port, "http server started, ready for requests");

        Ok(())
    }
}
