use crate::app::pipeline::auction::context::AuctionContext;
use crate::core::openrtb::schain::SupplyChain;
use crate::core::openrtb::Source;
use crate::core::pipeline::BlockingTask;
use anyhow::{anyhow, Error};
use tracing::{debug, trace};
use uuid::Uuid;

/// Attaches our supply chain hop at `source.ext.schain`.
///
/// A request arriving with an upstream chain keeps it as the prefix
/// and our node is appended behind it, otherwise the publisher is
/// attested directly. Either way validation runs before anything is
/// written, a broken chain aborts the auction
pub struct SchainAppendTask {
    asi: String,
    name: Option<String>,
}

impl SchainAppendTask {
    pub fn new(asi: String, name: Option<String>) -> Self {
        SchainAppendTask { asi, name }
    }
}

impl BlockingTask<AuctionContext, Error> for SchainAppendTask {
    fn run(&self, context: &AuctionContext) -> Result<(), Error> {
        let resolved = context
            .resolved
            .get()
            .ok_or_else(|| anyhow!("schain append before catalog lookup"))?;
        let publisher_id = resolved.publisher.id.clone();

        let mut guard = context.bid_request.write();
        let req = guard
            .as_mut()
            .ok_or_else(|| anyhow!("schain append before request build"))?;

        let mut source = req.source.take().unwrap_or_else(|| Source {
            tid: Some(req.id.clone()),
            ..Default::default()
        });

        let upstream = SupplyChain::from_source(&source);

        let mut schain = match upstream {
            Some(upstream) => {
                trace!("upstream schain present, appending our node");
                SupplyChain::with_intermediaries(upstream.nodes, &self.asi, &publisher_id)
                    .map_err(|e| anyhow!("invalid upstream schain: {e}"))?
            }
            None => SupplyChain::direct(&self.asi, &publisher_id),
        };

        // stamp our hop with this auction and display name
        if let Some(node) = schain.nodes.last_mut() {
            node.rid = Some(Uuid::new_v4().to_string());
            node.name = self.name.clone();
        }

        schain
            .attach_to(&mut source)
            .map_err(|e| anyhow!("failed attaching schain: {e}"))?;

        req.source = Some(source);

        debug!("appended schain written to source.ext.schain");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::auction::tasks::floors::FloorsTask;
    use crate::core::catalog::{testutil, Catalog};
    use crate::core::models::adrequest::AdRequest;
    use crate::core::openrtb::schain::SupplyChainNode;
    use crate::core::openrtb::BidRequest;
    use std::time::Duration;

    fn context_with_request(req: BidRequest) -> AuctionContext {
        let catalog = Catalog::from_document(testutil::sample_document());

        let context = AuctionContext::new(
            AdRequest {
                placement_id: "plc-1".into(),
                ..Default::default()
            },
            Some(req),
            Duration::from_millis(120),
        );

        context
            .resolved
            .set(catalog.resolve("plc-1").unwrap())
            .ok()
            .unwrap();
        FloorsTask::new(0.01).run(&context).unwrap();

        context
    }

    #[test]
    fn direct_request_gets_a_single_node_chain() {
        let context = context_with_request(BidRequest {
            id: "r1".into(),
            ..Default::default()
        });

        SchainAppendTask::new("ssp.example.com".into(), Some("Sellside".into()))
            .run(&context)
            .unwrap();

        let guard = context.bid_request.read();
        let source = guard.as_ref().unwrap().source.as_ref().unwrap().clone();

        let schain = SupplyChain::from_source(&source).unwrap();
        assert_eq!(schain.complete, 1);
        assert_eq!(schain.nodes.len(), 1);
        assert_eq!(schain.nodes[0].asi, "ssp.example.com");
        assert_eq!(schain.nodes[0].sid, "pub-1");
        assert_eq!(schain.nodes[0].name.as_deref(), Some("Sellside"));
        assert!(schain.nodes[0].rid.is_some());
    }

    #[test]
    fn upstream_chain_keeps_its_prefix() {
        let mut source = Source::default();
        let upstream = SupplyChain {
            complete: 1,
            ver: "1.0".into(),
            nodes: vec![SupplyChainNode {
                asi: "reseller.example".into(),
                sid: "r-9".into(),
                hp: 1,
                rid: None,
                name: None,
                domain: None,
            }],
        };
        upstream.attach_to(&mut source).unwrap();

        let context = context_with_request(BidRequest {
            id: "r1".into(),
            source: Some(source),
            ..Default::default()
        });

        SchainAppendTask::new("ssp.example.com".into(), None)
            .run(&context)
            .unwrap();

        let guard = context.bid_request.read();
        let source = guard.as_ref().unwrap().source.as_ref().unwrap().clone();
        let schain = SupplyChain::from_source(&source).unwrap();

        assert_eq!(schain.nodes.len(), 2);
        assert_eq!(schain.nodes[0].asi, "reseller.example");
        assert_eq!(schain.nodes[1].asi, "ssp.example.com");
    }

    #[test]
    fn invalid_upstream_chain_aborts() {
        let mut source = Source::default();
        let mut ext = serde_json::Map::new();
        ext.insert(
            "schain".to_string(),
            serde_json::json!({
                "complete": 1,
                "ver": "1.0",
                "nodes": [{"asi": "", "sid": "x", "hp": 1}]
            }),
        );
        source.ext = Some(ext);

        let context = context_with_request(BidRequest {
            id: "r1".into(),
            source: Some(source),
            ..Default::default()
        });

        let result = SchainAppendTask::new("ssp.example.com".into(), None).run(&context);
        assert!(result.is_err());
    }
}
