pub mod aggregate;
pub mod cli;
pub mod config;
pub mod error;
pub mod model;
pub mod render;
pub mod scan;
pub mod view;

pub use aggregate::{Aggregation, Aggregator};
pub use config::Config;
pub use error::{Error, Result};
pub use render::{OutputFormat, Render};
pub use scan::{Diagnostics, ScanOptions};
pub use view::TranscriptViewer;
