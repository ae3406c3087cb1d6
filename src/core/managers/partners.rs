use crate::core::models::partner::Partner;
use arc_swap::ArcSwap;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::Arc;
use tracing::debug;

/// Registry of configured demand partners plus their QPS limiters.
/// Partner config is parsed once at startup, the swap keeps the
/// read path allocation free and leaves room for live reload later
pub struct PartnerManager {
    partners: ArcSwap<Vec<Arc<Partner>>>,
    limiters: HashMap<String, Option<DefaultDirectRateLimiter>>,
}

fn create_limiter(partner: &Partner) -> Option<DefaultDirectRateLimiter> {
    if partner.qps < 1 {
        debug!(partner = %partner.id, "no QPS ceiling");
        return None;
    }

    let qps = NonZeroU32::new(partner.qps)?;
    debug!(partner = %partner.id, qps = partner.qps, "QPS ceiling installed");

    Some(RateLimiter::direct(Quota::per_second(qps)))
}

impl PartnerManager {
    pub fn new(partners: Vec<Partner>) -> Self {
        let active: Vec<Arc<Partner>> = partners
            .into_iter()
            .filter(|p| p.active)
            .map(Arc::new)
            .collect();

        let mut limiters = HashMap::new();
        for partner in &active {
            limiters.insert(partner.id.clone(), create_limiter(partner));
        }

        PartnerManager {
            partners: ArcSwap::from_pointee(active),
            limiters,
        }
    }

    /// Snapshot of the active partner set. Taken once per auction so
    /// membership never changes mid flight
    pub fn active(&self) -> Arc<Vec<Arc<Partner>>> {
        self.partners.load_full()
    }

    /// Whether this partner still has QPS budget. A shed partner is
    /// skipped for the auction, never errored
    pub fn allow(&self, partner_id: &str) -> bool {
        match self.limiters.get(partner_id) {
            Some(Some(limiter)) => limiter.check().is_ok(),
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn partner(id: &str, active: bool, qps: u32) -> Partner {
        Partner {
            id: id.to_string(),
            name: id.to_string(),
            active,
            qps,
            ..Default::default()
        }
    }

    #[test]
    fn inactive_partners_are_dropped() {
        let manager = PartnerManager::new(vec![
            partner("a", true, 0),
            partner("b", false, 0),
        ]);

        let active = manager.active();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, "a");
    }

    #[test]
    fn unlimited_partner_is_always_allowed() {
        let manager = PartnerManager::new(vec![partner("a", true, 0)]);

        for _ in 0..1000 {
            assert!(manager.allow("a"));
        }
    }

    #[test]
    fn qps_ceiling_sheds_excess_load() {
        let manager = PartnerManager::new(vec![partner("a", true, 2)]);

        // governor grants the full burst up front, then throttles
        let granted = (0..10).filter(|_| manager.allow("a")).count();
        assert!(granted >= 1 && granted < 10);
    }

    #[test]
    fn unknown_partner_is_allowed() {
        let manager = PartnerManager::new(vec![]);
        assert!(manager.allow("ghost"));
    }
}
