pub mod http;
pub mod mapping;
pub mod source;
pub mod translator;

pub use http::HttpSource;
pub use source::{Endpoint, FetchOutcome, SnapshotSource};
pub use translator::{Scrape, Translator};
