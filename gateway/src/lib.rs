//! Ratefeed Gateway
//!
//! The edge entry point: every request is answered from the response cache
//! when possible, otherwise from the provider fallback chain, and successful
//! answers are written back to the cache in the background.

pub mod cache;
pub mod config;
pub mod handler;
pub mod metrics;
pub mod response;
pub mod server;
pub mod store;
pub mod tasks;

pub use cache::{RequestIdentity, ResponseCache};
pub use config::GatewayConfig;
pub use handler::RequestHandler;
pub use response::CachedResponse;
pub use store::{CacheError, CacheStore, MemoryCacheStore};
pub use tasks::DeferredTasks;
