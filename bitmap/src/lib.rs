//! Pluggable 64-bit integer set engines.
//!
//! Every engine implements the [`Bitmap`] capability trait and is created by
//! name through a [`Registry`]:
//!
//! - **`bitset`** ([`ShardedBitset`]): splits members into 32-bit shards, each
//!   backed by a dense bit-vector, with its own portable wire format.
//! - **`roaring`** ([`Roaring`]): wraps a compressed roaring treemap and uses
//!   roaring's serialization.
//!
//! Third-party engines can be added with [`register`] (process-wide) or on an
//! explicit [`Registry`] value.
//!
//! ## Usage
//!
//! ```
//! use bitmap::Bitmap;
//!
//! # fn main() -> bitmap::Result<()> {
//! let bm = bitmap::new(bitmap::ENGINE_BITSET)?;
//! bm.add(0);
//! bm.add(1 << 32);
//! bm.add(1 << 32 | 7);
//! assert_eq!(bm.len(), 3);
//!
//! let mut buf = Vec::new();
//! bm.write_to(&mut buf)?;
//! bm.clear();
//! bm.read_from(&mut buf.as_slice())?;
//! assert!(bm.contains(1 << 32));
//! # Ok(())
//! # }
//! ```

use std::io::{Read, Write};

mod bitset;
mod codec;
mod collections;
mod compressed;
pub mod config;
pub mod default;
mod dense;
mod error;
pub mod registry;


pub use bitset::ShardedBitset;
pub use compressed::Roaring;
pub use config::Config;
pub use dense::{DenseBits, MAX_BITS};
pub use error::{BitmapError, Result};
pub use registry::{
    Constructor, ENGINE_BITSET, ENGINE_ROARING, Registry, new, register, registry,
};

/// A set of `u64` members.
///
/// All methods take `&self` and are safe to call from multiple threads.
/// `write_to`/`read_from` must not overlap with mutation of the same
/// instance.
pub trait Bitmap: Send + Sync {
    /// Insert `x`. Inserting an existing member is a no-op.
    fn add(&self, x: u64);

    /// Remove `x`. Removing an absent member is a no-op.
    fn remove(&self, x: u64);

    /// Test whether `x` is a member.
    fn contains(&self, x: u64) -> bool;

    /// Returns `true` if there are no members.
    fn is_empty(&self) -> bool;

    /// Number of members.
    fn len(&self) -> u64;

    /// Remove every member.
    fn clear(&self);

    /// Serialize into `sink`, returning the number of bytes written.
    fn write_to(&self, sink: &mut dyn Write) -> Result<u64>;

    /// Replace the contents with the bitmap serialized in `source`, returning
    /// the number of bytes consumed.
    ///
    /// The bitmap is cleared before reading, so on error it is left empty or
    /// partially restored, never in its previous state.
    fn read_from(&self, source: &mut dyn Read) -> Result<u64>;
}
