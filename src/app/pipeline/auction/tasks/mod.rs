mod build_request;
mod callouts;
mod clearing;
mod floors;
mod lookup;
mod matching;
mod notices;
mod qps;
mod record;
mod schain;

pub use build_request::BuildRequestTask;
pub use callouts::BidderCalloutsTask;
pub use clearing::ClearingTask;
pub use floors::FloorsTask;
pub use lookup::CatalogLookupTask;
pub use matching::PartnerMatchingTask;
pub use notices::NoticesTask;
pub use qps::QpsLimiterTask;
pub use record::RecordAuctionTask;
pub use schain::SchainAppendTask;
