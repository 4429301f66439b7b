// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod aggregate;
pub mod api;
pub mod article;
pub mod cache;
pub mod category;
pub mod config;
pub mod dedup;
pub mod feed;
pub mod local;
pub mod metrics;
pub mod normalize;
pub mod placeholder;
pub mod providers;
pub mod refresh;
pub mod relay;

// ---- Re-exports for stable public API ----
pub use crate::aggregate::NewsAggregator;
pub use crate::api::{create_router, AppState};
pub use crate::article::Article;
pub use crate::config::{AggregatorConfig, FeedCatalog, FeedDescriptor};
pub use crate::relay::{FetchError, HttpRelay, Relay, StaticRelay};
