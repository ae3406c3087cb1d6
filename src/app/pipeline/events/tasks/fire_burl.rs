use crate::app::pipeline::events::context::{TrackingContext, TrackingEvent};
use crate::core::demand::notices::Notifier;
use crate::core::pipeline::BlockingTask;
use anyhow::Error;
use std::sync::Arc;
use tracing::debug;

/// Fires the winning partner's billing notice once the impression
/// is actually counted
pub struct FireBurlTask {
    notifier: Arc<Notifier>,
}

impl FireBurlTask {
    pub fn new(notifier: Arc<Notifier>) -> Self {
        FireBurlTask { notifier }
    }
}

impl BlockingTask<TrackingContext, Error> for FireBurlTask {
    fn run(&self, context: &TrackingContext) -> Result<(), Error> {
        if context.event != TrackingEvent::Impression {
            return Ok(());
        }

        let Some(Some(notice)) = context.notice.get() else {
            return Ok(());
        };

        if let Some(burl) = &notice.burl {
            debug!(partner = %notice.partner_id, "firing billing notice");
            self.notifier.fire(burl, notice.cleared_price);
        }

        Ok(())
    }
}
