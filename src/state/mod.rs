//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `UrlStatus` / `CrawlPhase`: lifecycle of a URL record and of the crawl as a whole
//! - `Frontier`: the shared breadth-first queue and seen-set
//! - `DomainState`: per-host request spacing for robots.txt crawl-delay

mod domain_state;
mod frontier;
mod page_state;

pub use domain_state::DomainState;
pub use frontier::{Frontier, UrlRecord};
pub use page_state::{CrawlPhase, UrlStatus};
