pub mod engine;

pub use engine::{run_auction, AuctionTerms};
