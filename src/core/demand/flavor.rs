use crate::core::models::partner::{Flavor, Partner};
use crate::core::openrtb::{BidRequest, BidResponse};
use anyhow::Error;
use serde_json::{json, Map};

/// Capability set a transport flavor exposes to the dispatcher.
/// The dispatcher is generic over this interface, so per-flavor
/// branching never leaks into the fan-out loop
pub trait Transport: Send + Sync {
    /// Partner specific auth headers. Names must be lowercase
    fn headers(&self, partner: &Partner) -> Vec<(&'static str, String)>;

    /// Encode the canonical request for the wire. The default is
    /// plain OpenRTB json
    fn encode(&self, req: &BidRequest, partner: &Partner) -> Result<Vec<u8>, Error> {
        let _ = partner;
        Ok(serde_json::to_vec(req)?)
    }

    fn decode(&self, body: &[u8]) -> Result<BidResponse, Error> {
        Ok(serde_json::from_slice(body)?)
    }

    /// Hook applied to a decoded response before the auction sees it
    fn transform_response(&self, res: BidResponse, partner: &Partner) -> BidResponse {
        let _ = partner;
        res
    }
}

/// Plain OpenRTB 2.5 partner, bearer token auth
pub struct OpenrtbTransport;

impl Transport for OpenrtbTransport {
    fn headers(&self, partner: &Partner) -> Vec<(&'static str, String)> {
        match &partner.api_key {
            Some(key) => vec![("authorization", format!("Bearer {key}"))],
            None => Vec::new(),
        }
    }
}

/// Whitelabel partner: the request carries our exchange identity in
/// `ext` and bid prices are netted down by the partner's revenue
/// share before clearing. This is the only place bid prices mutate
pub struct WhitelabelTransport {
    ssp_id: String,
}

impl WhitelabelTransport {
    pub fn new(ssp_id: String) -> Self {
        WhitelabelTransport { ssp_id }
    }
}

impl Transport for WhitelabelTransport {
    fn headers(&self, partner: &Partner) -> Vec<(&'static str, String)> {
        match &partner.api_key {
            Some(key) => vec![("x-api-key", key.clone())],
            None => Vec::new(),
        }
    }

    fn encode(&self, req: &BidRequest, partner: &Partner) -> Result<Vec<u8>, Error> {
        let _ = partner;

        let mut req = req.clone();
        let mut ext = req.ext.take().unwrap_or_else(Map::new);
        ext.insert("ssp".to_string(), json!({ "id": self.ssp_id }));
        req.ext = Some(ext);

        Ok(serde_json::to_vec(&req)?)
    }

    fn transform_response(&self, mut res: BidResponse, partner: &Partner) -> BidResponse {
        for seatbid in res.seatbid.iter_mut() {
            for bid in seatbid.bid.iter_mut() {
                bid.price = net_down(bid.price, partner.ssp_share);
            }
        }

        res
    }
}

/// Legacy EXADS style partner, differs only in the auth header
pub struct LegacyAdxTransport;

impl Transport for LegacyAdxTransport {
    fn headers(&self, partner: &Partner) -> Vec<(&'static str, String)> {
        match &partner.api_key {
            Some(key) => vec![("x-exads-api-key", key.clone())],
            None => Vec::new(),
        }
    }
}

/// Holds one transport instance per flavor so the dispatcher can
/// resolve them without allocation per call
pub struct Transports {
    openrtb: OpenrtbTransport,
    whitelabel: WhitelabelTransport,
    legacy_adx: LegacyAdxTransport,
}

impl Transports {
    pub fn new(ssp_id: &str) -> Self {
        Transports {
            openrtb: OpenrtbTransport,
            whitelabel: WhitelabelTransport::new(ssp_id.to_string()),
            legacy_adx: LegacyAdxTransport,
        }
    }

    pub fn for_flavor(&self, flavor: Flavor) -> &dyn Transport {
        match flavor {
            Flavor::Openrtb => &self.openrtb,
            Flavor::Whitelabel => &self.whitelabel,
            Flavor::LegacyAdx => &self.legacy_adx,
        }
    }
}

/// Apply the exchange share to a gross bid price.
///
/// # Example
/// A $10 bid with a 0.15 share nets to $8.50
pub fn net_down(gross: f64, share: f64) -> f64 {
    if share <= 0.0 {
        return gross;
    }

    gross * (1.0 - share)
}
