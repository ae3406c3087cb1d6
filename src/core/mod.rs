pub mod auction;
pub mod catalog;
pub mod demand;
pub mod managers;
pub mod models;
pub mod observability;
pub mod openrtb;
pub mod pipeline;
pub mod render;
pub mod sellers;
pub mod spec;
pub mod telemetry;
