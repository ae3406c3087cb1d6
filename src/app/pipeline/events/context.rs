use crate::core::demand::notices::PendingNotice;
use std::sync::OnceLock;

/// Which beacon the tracking endpoint received
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackingEvent {
    Impression,
    /// A VAST playback beacon: start, firstQuartile, midpoint,
    /// thirdQuartile or complete
    Quartile(String),
    Click,
}

impl TrackingEvent {
    pub fn name(&self) -> &str {
        match self {
            TrackingEvent::Impression => "impression",
            TrackingEvent::Quartile(event) => event,
            TrackingEvent::Click => "click",
        }
    }
}

/// Context for one tracking beacon. The response is served before
/// this pipeline finishes, nothing here may fail the http side
pub struct TrackingContext {
    pub event: TrackingEvent,
    pub event_id: String,
    /// The pending win this beacon settles, when still cached
    pub notice: OnceLock<Option<PendingNotice>>,
}

impl TrackingContext {
    pub fn new(event: TrackingEvent, event_id: String) -> TrackingContext {
        TrackingContext {
            event,
            event_id,
            notice: OnceLock::new(),
        }
    }
}
