use crate::core::openrtb::request::Source;
use anyhow::{bail, Error};
use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use serde_json::Map;

pub const SCHAIN_VERSION: &str = "1.0";

/// IAB SupplyChain object attesting every hop the inventory
/// passed through before reaching the buyer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Builder)]
#[builder(setter(into, strip_option), default)]
pub struct SupplyChain {
    /// 1 when the chain covers every hop back to the publisher
    pub complete: i32,

    pub ver: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nodes: Vec<SupplyChainNode>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Builder)]
#[builder(setter(into, strip_option), default)]
pub struct SupplyChainNode {
    /// Advertising system identifier, the domain of the system
    /// operating this hop
    pub asi: String,

    /// Seller id within that advertising system
    pub sid: String,

    /// Reseller bit, 0 = direct seller, 1 = reseller hop
    pub hp: i32,

    /// Request id assigned by this hop
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rid: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
}

impl SupplyChain {
    /// Chain for inventory sold directly by the publisher: a single
    /// node carrying our system id with the publisher as seller
    pub fn direct(asi: &str, publisher_id: &str) -> SupplyChain {
        SupplyChain {
            complete: 1,
            ver: SCHAIN_VERSION.to_string(),
            nodes: vec![SupplyChainNode {
                asi: asi.to_string(),
                sid: publisher_id.to_string(),
                hp: 0,
                rid: None,
                name: None,
                domain: None,
            }],
        }
    }

    /// Chain carrying an upstream prefix of hops followed by our own
    /// node. Every prefix node is validated before the chain is built
    pub fn with_intermediaries(
        prefix: Vec<SupplyChainNode>,
        asi: &str,
        publisher_id: &str,
    ) -> Result<SupplyChain, Error> {
        for node in &prefix {
            validate_node(node)?;
        }

        let mut nodes = prefix;
        nodes.push(SupplyChainNode {
            asi: asi.to_string(),
            sid: publisher_id.to_string(),
            hp: 0,
            rid: None,
            name: None,
            domain: None,
        });

        Ok(SupplyChain {
            complete: 1,
            ver: SCHAIN_VERSION.to_string(),
            nodes,
        })
    }

    /// Chain used when publisher provenance cannot be fully attested,
    /// our node only with `complete = 0`
    pub fn incomplete(asi: &str, seller_id: &str) -> SupplyChain {
        SupplyChain {
            complete: 0,
            ver: SCHAIN_VERSION.to_string(),
            nodes: vec![SupplyChainNode {
                asi: asi.to_string(),
                sid: seller_id.to_string(),
                hp: 0,
                rid: None,
                name: None,
                domain: None,
            }],
        }
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.ver.is_empty() {
            bail!("schain ver must not be empty");
        }

        if self.nodes.is_empty() {
            bail!("schain must carry at least one node");
        }

        for node in &self.nodes {
            validate_node(node)?;
        }

        Ok(())
    }

    /// Embeds the chain at `source.ext.schain`, preserving any other
    /// keys already present in `source.ext`. The chain is validated
    /// before being written
    pub fn attach_to(&self, source: &mut Source) -> Result<(), Error> {
        self.validate()?;

        let mut ext = source.ext.take().unwrap_or_else(Map::new);
        ext.insert("schain".to_string(), serde_json::to_value(self)?);
        source.ext = Some(ext);

        Ok(())
    }

    /// Reads a chain back out of `source.ext.schain` if present
    pub fn from_source(source: &Source) -> Option<SupplyChain> {
        let ext = source.ext.as_ref()?;
        let value = ext.get("schain")?;

        serde_json::from_value(value.clone()).ok()
    }
}

fn validate_node(node: &SupplyChainNode) -> Result<(), Error> {
    if node.asi.is_empty() {
        bail!("schain node asi must not be empty");
    }

    if node.sid.is_empty() {
        bail!("schain node sid must not be empty");
    }

    if node.hp != 0 && node.hp != 1 {
        bail!("schain node hp must be 0 or 1, got {}", node.hp);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn direct_chain_is_complete_with_one_node() {
        let chain = SupplyChain::direct("ssp.example.com", "pub-1");

        assert_eq!(chain.complete, 1);
        assert_eq!(chain.nodes.len(), 1);
        assert_eq!(chain.nodes[0].sid, "pub-1");
        assert_eq!(chain.nodes[0].hp, 0);
        assert!(chain.validate().is_ok());
    }

    #[test]
    fn intermediary_chain_appends_our_node_last() {
        let prefix = vec![SupplyChainNode {
            asi: "reseller.example".to_string(),
            sid: "r-77".to_string(),
            hp: 1,
            rid: None,
            name: None,
            domain: None,
        }];

        let chain =
            SupplyChain::with_intermediaries(prefix, "ssp.example.com", "pub-1").unwrap();

        assert_eq!(chain.complete, 1);
        assert_eq!(chain.nodes.len(), 2);
        assert_eq!(chain.nodes[1].asi, "ssp.example.com");
    }

    #[test]
    fn intermediary_chain_rejects_invalid_prefix_node() {
        let prefix = vec![SupplyChainNode {
            asi: String::new(),
            sid: "r-77".to_string(),
            hp: 1,
            rid: None,
            name: None,
            domain: None,
        }];

        assert!(SupplyChain::with_intermediaries(prefix, "ssp.example.com", "pub-1").is_err());
    }

    #[test]
    fn incomplete_chain_has_complete_zero() {
        let chain = SupplyChain::incomplete("ssp.example.com", "unknown");
        assert_eq!(chain.complete, 0);
        assert!(chain.validate().is_ok());
    }

    #[test]
    fn validation_rejects_bad_hp() {
        let mut chain = SupplyChain::direct("ssp.example.com", "pub-1");
        chain.nodes[0].hp = 2;
        assert!(chain.validate().is_err());
    }

    #[test]
    fn validation_rejects_empty_chain() {
        let chain = SupplyChain {
            complete: 1,
            ver: SCHAIN_VERSION.to_string(),
            nodes: vec![],
        };
        assert!(chain.validate().is_err());
    }

    #[test]
    fn attach_preserves_existing_ext_keys() {
        let mut source = Source::default();
        let mut ext = Map::new();
        ext.insert("omidpn".to_string(), json!("measure.example"));
        source.ext = Some(ext);

        let chain = SupplyChain::direct("ssp.example.com", "pub-1");
        chain.attach_to(&mut source).unwrap();

        let ext = source.ext.as_ref().unwrap();
        assert_eq!(ext.get("omidpn"), Some(&Value::String("measure.example".into())));
        assert!(ext.contains_key("schain"));
    }

    #[test]
    fn serialize_parse_round_trip_preserves_chain() {
        let chain = SupplyChain::direct("ssp.example.com", "pub-1");

        let mut source = Source::default();
        chain.attach_to(&mut source).unwrap();

        let back = SupplyChain::from_source(&source).unwrap();
        assert_eq!(back, chain);
    }
}
