//! No-bid reason codes returned on `BidResponse.nbr`.
//!
//! Codes below 500 are the standard OpenRTB 2.5 values, the
//! 500 range is exchange specific.

/// Unknown error
pub const UNKNOWN_ERROR: u32 = 0;
/// Technical error during processing
pub const TECHNICAL_ERROR: u32 = 2;

/// No demand partners matched the request
pub const NO_PARTNERS_MATCHED: u32 = 500;
/// Partners were called but no bids survived the auction
pub const NO_BIDS_RECEIVED: u32 = 501;
/// The placement id is unrecognized
pub const UNKNOWN_PLACEMENT: u32 = 502;
/// The placement, site or publisher is disabled
pub const SELLER_DISABLED: u32 = 503;
/// Every matched partner was throttled for QPS
pub const THROTTLED_PARTNER_QPS: u32 = 504;
