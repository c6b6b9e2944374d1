pub mod collection;
pub mod render;

pub use collection::{MetricCollection, MetricKind, Sample};
pub use render::{CONTENT_TYPE, render};
