//! In-memory caching for slowly-changing resource collections
//!
//! Azure collection listings (subscriptions, resource groups, ...) rarely
//! change within a session, so every view goes through a cache-aside layer
//! instead of hitting the API on each visit.

mod resource;
mod ttl;

pub use resource::{DEFAULT_TTL, ResourceCache, keys};
pub use ttl::TtlCache;
