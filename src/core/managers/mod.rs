pub mod partners;

pub use partners::PartnerManager;
