pub mod config;
pub mod enrichment;
pub mod error;
pub mod geocode;
pub mod http;
pub mod nation;
pub mod reference;
pub mod telemetry;
