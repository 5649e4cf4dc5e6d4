// src/lib.rs

//! jobscout library
//!
//! Concurrent multi-source job posting aggregator. Fetches postings from
//! Ashby, Greenhouse and Lever boards, filters them for role relevance and
//! US geography, merges near-duplicates, and hands the result to the CSV
//! exporter and the record sync service.

pub mod error;
pub mod export;
pub mod location;
pub mod models;
pub mod pipeline;
pub mod scrapers;
pub mod sync;
pub mod utils;
