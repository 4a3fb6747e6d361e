//! Redis-backed bitmaps.
//!
//! A [`DistributedBitmap`] has no local state: each operation is a single
//! atomic Lua script call against one hash-tagged key, so concurrent callers
//! never lose updates and multi-step operations (set a bit, then count) stay
//! indivisible.
//!
//! Two widths are provided:
//!
//! - [`Bitmap32`]: `u32` members in a Redis string bitmap.
//! - [`Bitmap64`]: `u64` members in a Redis set.
//!
//! ## Usage
//!
//! ```no_run
//! use bitmap_redis::{Bitmap64, RedisConfig, RedisScriptClient};
//!
//! # async fn run() -> bitmap_redis::Result<()> {
//! let config = RedisConfig::default();
//! let client = RedisScriptClient::connect(&config).await?;
//! let seen = Bitmap64::new("seen-users", client).with_timeout(config.timeout);
//!
//! seen.add(1 << 40).await?;
//! assert!(seen.contains(1 << 40).await?);
//! assert_eq!(seen.len().await?, 1);
//! # Ok(())
//! # }
//! ```

mod client;
pub mod config;
mod engine;
mod error;
pub mod script;

#[cfg(test)]
mod tests_distributed;

pub use client::{RedisScriptClient, ScriptClient};
pub use config::RedisConfig;
pub use engine::{Bitmap32, Bitmap64, DistributedBitmap, key_for};
pub use error::{RemoteError, Result};
pub use script::{Operation, W32, W64, Width};
