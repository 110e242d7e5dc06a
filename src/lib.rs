//! Batch ETL that turns the German Credit dataset into a decoded, enriched
//! star schema (one fact table, four dimensions and a flat table).

pub mod config;
pub mod decode;
pub mod export;
pub mod features;
pub mod fetch;
pub mod pipeline;
pub mod quality;
pub mod raw;
pub mod star;
