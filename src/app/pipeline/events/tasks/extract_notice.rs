use crate::app::pipeline::events::context::{TrackingContext, TrackingEvent};
use crate::core::demand::notices::NoticeCache;
use crate::core::pipeline::BlockingTask;
use anyhow::{anyhow, Error};
use std::sync::Arc;
use tracing::debug;

/// Pulls the pending win for this event id out of the notice cache.
/// Only the impression consumes the entry, quartiles and clicks
/// arrive afterwards and are recorded bare
pub struct ExtractNoticeTask {
    cache: Arc<NoticeCache>,
}

impl ExtractNoticeTask {
    pub fn new(cache: Arc<NoticeCache>) -> Self {
        ExtractNoticeTask { cache }
    }
}

impl BlockingTask<TrackingContext, Error> for ExtractNoticeTask {
    fn run(&self, context: &TrackingContext) -> Result<(), Error> {
        let notice = match context.event {
            TrackingEvent::Impression => self.cache.take(&context.event_id),
            _ => None,
        };

        if notice.is_none() && context.event == TrackingEvent::Impression {
            // at-least-once pixels: replays and expired wins land here
            debug!(event = %context.event_id, "no pending notice for impression");
        }

        context
            .notice
            .set(notice)
            .map_err(|_| anyhow!("notice already extracted"))?;

        Ok(())
    }
}
