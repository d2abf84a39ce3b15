//! Property listing flow classification, normalization, and wizard sequencing.

pub mod config;
pub mod error;
pub mod flows;
pub mod router;
pub mod telemetry;
pub mod wizard;

pub use router::listing_router;
