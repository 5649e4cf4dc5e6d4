// src/models/mod.rs

//! Domain models for the aggregator application.

mod config;
mod posting;

pub use config::{
    Concurrency, Config, ExportConfig, FetchConfig, FilterConfig, GeocoderConfig, Organization,
    SyncConfig,
};
pub use posting::{JobSource, JobStats, Posting};
