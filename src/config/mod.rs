//! Configuration system for az9s
//!
//! Cache/console settings plus the declarative view → action bindings that
//! drive the navigation engine. Config is loaded once at startup and
//! threaded through constructors; there is no ambient global state.

pub mod loader;
pub mod schema;

pub use loader::ConfigLoader;
pub use schema::{ActionConfig, CacheConfig, Config, ConsoleConfig, ViewConfig};
