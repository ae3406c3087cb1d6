use crate::core::demand::flavor::Transport;
use crate::core::models::partner::Partner;
use crate::core::openrtb::{BidRequest, BidResponse};
use anyhow::{anyhow, Error};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::debug;

const OPENRTB_VERSION_HEADER: &str = "x-openrtb-version";
const OPENRTB_VERSION: &str = "2.5";

/// Pooled outbound http client for demand callouts. Per-call
/// deadlines are enforced by the dispatcher, the client level
/// timeout is only a backstop
pub struct DemandClient {
    client: Client,
}

impl DemandClient {
    pub fn new() -> Result<Self, Error> {
        let client = reqwest::ClientBuilder::new()
            .user_agent("sellside")
            .connect_timeout(Duration::from_secs(1))
            .timeout(Duration::from_secs(2))
            .pool_max_idle_per_host(128)
            .pool_idle_timeout(Some(Duration::from_secs(30)))
            .tcp_keepalive(Some(Duration::from_secs(20)))
            .tcp_nodelay(true)
            .referer(false)
            .redirect(reqwest::redirect::Policy::none())
            .gzip(true)
            .build()
            .map_err(Error::from)?;

        Ok(DemandClient { client })
    }

    /// Send one bid request. `Ok(None)` is an explicit http 204
    /// no-bid. Any non 200/204 status, and any 200 whose body fails
    /// to decode, is an error
    pub async fn send(
        &self,
        partner: &Partner,
        transport: &dyn Transport,
        req: &BidRequest,
    ) -> Result<Option<BidResponse>, Error> {
        let body = transport.encode(req, partner)?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            HeaderName::from_static(OPENRTB_VERSION_HEADER),
            HeaderValue::from_static(OPENRTB_VERSION),
        );

        for (key, value) in transport.headers(partner) {
            let value = HeaderValue::from_str(&value)
                .map_err(|e| anyhow!("invalid header value for {}: {}", partner.id, e))?;
            headers.insert(HeaderName::from_static(key), value);
        }

        let res = self
            .client
            .post(&partner.endpoint)
            .headers(headers)
            .body(body)
            .send()
            .await
            .map_err(|e| anyhow!("callout to {} failed: {}", partner.id, e))?;

        let status = res.status();

        if status == StatusCode::NO_CONTENT {
            debug!(partner = %partner.id, "explicit no-bid");
            return Ok(None);
        }

        if status != StatusCode::OK {
            return Err(anyhow!("partner {} returned http {}", partner.id, status));
        }

        let bytes = res
            .bytes()
            .await
            .map_err(|e| anyhow!("failed reading body from {}: {}", partner.id, e))?;

        let response = transport.decode(&bytes)?;

        Ok(Some(response))
    }
}
