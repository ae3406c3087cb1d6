//! OpenRTB 2.5 wire objects.
//!
//! Only the canonical subset this exchange speaks is modeled. Every
//! optional field is skipped during serialization when unset so the
//! wire never carries null placeholders, and numeric fields keep the
//! JSON types the OpenRTB spec assigns them (CPM as doubles, durations
//! in seconds, dimensions in CSS pixels).

pub mod imp;
pub mod request;
pub mod response;
pub mod schain;

pub use imp::{Audio, Banner, Deal, Format, Imp, Native, Pmp, Video};
pub use request::{App, BidRequest, Device, Geo, Publisher, Regs, Site, Source, User};
pub use response::{Bid, BidResponse, SeatBid};
pub use schain::{SupplyChain, SupplyChainNode};

pub use imp::{
    AudioBuilder, BannerBuilder, DealBuilder, FormatBuilder, ImpBuilder, NativeBuilder,
    PmpBuilder, VideoBuilder,
};
pub use request::{
    AppBuilder, BidRequestBuilder, DeviceBuilder, GeoBuilder, PublisherBuilder, RegsBuilder,
    SiteBuilder, SourceBuilder, UserBuilder,
};
pub use response::{BidBuilder, BidResponseBuilder, SeatBidBuilder};
pub use schain::{SupplyChainBuilder, SupplyChainNodeBuilder};
