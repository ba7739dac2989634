pub mod browser;
pub mod config;
pub mod convert;
pub mod ingest;
pub mod load;
pub mod model;
pub mod normalize;
pub mod output;
pub mod sample;
pub mod scoring;
pub mod stderr_buffer;
pub mod tui;
