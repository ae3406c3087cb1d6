pub mod client;
pub mod dispatch;
pub mod flavor;
pub mod notices;
