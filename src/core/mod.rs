/*!
 * Core Module
 * Error types, limits, configuration and timeout values shared across the crate
 */

pub mod config;
pub mod errors;
pub mod limits;
pub mod timeout;

// Re-export commonly used types
pub use config::SyncConfig;
pub use errors::{QueueFull, SyncError, SyncResult};
pub use timeout::Timeout;
