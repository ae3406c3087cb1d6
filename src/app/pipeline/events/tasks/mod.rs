mod extract_notice;
mod fire_burl;
mod record_event;

pub use extract_notice::ExtractNoticeTask;
pub use fire_burl::FireBurlTask;
pub use record_event::RecordEventTask;
