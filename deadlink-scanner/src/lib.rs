pub mod aggregate;
pub mod checker;
pub mod config;
pub mod crawler;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod frontier;
pub mod normalize;
pub mod result;

pub use config::CrawlConfig;
pub use crawler::{Crawler, ProgressCallback};
pub use error::ScanError;
pub use result::{CrawlOutcome, LinkResult, LinkStatus, LinkType};
