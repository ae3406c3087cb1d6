use crate::app::pipeline::events::context::{TrackingContext, TrackingEvent};
use crate::core::pipeline::BlockingTask;
use crate::core::telemetry::records::{stamp, ClickRecord, ImpressionRecord};
use crate::core::telemetry::{TelemetryRecord, TelemetrySink};
use anyhow::Error;
use std::sync::Arc;

/// Appends the impression or click record. Counting is
/// at-least-once, the sink owns dedup
pub struct RecordEventTask {
    telemetry: Arc<TelemetrySink>,
}

impl RecordEventTask {
    pub fn new(telemetry: Arc<TelemetrySink>) -> Self {
        RecordEventTask { telemetry }
    }
}

impl BlockingTask<TrackingContext, Error> for RecordEventTask {
    fn run(&self, context: &TrackingContext) -> Result<(), Error> {
        let (ts, date) = stamp();

        let record = match &context.event {
            TrackingEvent::Click => TelemetryRecord::Click(ClickRecord {
                ts,
                date,
                event_id: context.event_id.clone(),
            }),
            event => {
                let notice = context.notice.get().and_then(|notice| notice.as_ref());

                TelemetryRecord::Impression(ImpressionRecord {
                    ts,
                    date,
                    event_id: context.event_id.clone(),
                    event: event.name().to_string(),
                    auction_id: notice.map(|n| n.auction_id.clone()),
                    deal_id: notice.and_then(|n| n.deal_id.clone()),
                    partner_id: notice.map(|n| n.partner_id.clone()),
                    publisher_id: notice.map(|n| n.publisher_id.clone()),
                    cleared_price: notice.map(|n| n.cleared_price),
                    publisher_revenue: notice.map(|n| n.publisher_revenue),
                })
            }
        };

        self.telemetry.append(record);

        Ok(())
    }
}
