use std::io::{self, Read, Write};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::codec::{CountingReader, CountingWriter, read_u32, write_u32};
use crate::collections::HashMap;
use crate::dense::DenseBits;
use crate::error::{BitmapError, Result};
use crate::Bitmap;

type Bucket = Arc<RwLock<DenseBits>>;

/// Split a member into its shard key (high 32 bits) and shard value (low 32 bits).
#[inline]
pub(crate) fn split(x: u64) -> (u32, u32) {
    ((x >> 32) as u32, (x & u64::from(u32::MAX)) as u32)
}

/// The shard count as written in the header. Every `u32` key in use at once
/// makes 2^32 shards, one more than the header can hold.
fn shard_count_header(shards: usize) -> io::Result<u32> {
    u32::try_from(shards).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("{shards} shards do not fit the u32 shard count"),
        )
    })
}

/// An in-process 64-bit bitmap made of 32-bit-addressed dense buckets.
///
/// Buckets are created lazily on the first insertion into their shard and are
/// kept (possibly all-zero) until [`clear`](Bitmap::clear) or
/// [`compact`](ShardedBitset::compact).
///
/// The bucket map lock only guards the map structure. Each bucket carries its
/// own lock, so bit-level mutation of an already-resolved bucket never blocks
/// lookups in other shards.
///
/// `write_to` and `read_from` must not run concurrently with mutation of the
/// same instance: `read_from` clears first, so a concurrent writer would
/// observe a half-restored bitmap.
#[derive(Debug, Default)]
pub struct ShardedBitset {
    buckets: RwLock<HashMap<u32, Bucket>>,
}

impl ShardedBitset {
    /// Create an empty bitmap.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of allocated buckets, including emptied ones.
    pub fn shard_count(&self) -> usize {
        self.buckets.read().len()
    }

    /// Drop every bucket that has no bits set. Returns the number dropped.
    ///
    /// Buckets still referenced outside the map are kept: an `add` may have
    /// resolved one and not yet set its bit.
    pub fn compact(&self) -> usize {
        let mut buckets = self.buckets.write();
        let before = buckets.len();
        // No new clones can appear while the write lock is held.
        buckets.retain(|_, bucket| Arc::strong_count(bucket) > 1 || !bucket.read().none());
        let dropped = before - buckets.len();
        if dropped > 0 {
            debug!("Compacted {} empty buckets, {} remain", dropped, buckets.len());
        }
        dropped
    }

    fn bucket(&self, key: u32) -> Option<Bucket> {
        self.buckets.read().get(&key).cloned()
    }

    fn bucket_or_insert(&self, key: u32) -> Bucket {
        if let Some(bucket) = self.bucket(key) {
            return bucket;
        }

        // A racing creator may have inserted while we waited for the write
        // lock; `entry` keeps whichever bucket got there first.
        let mut buckets = self.buckets.write();
        Arc::clone(buckets.entry(key).or_default())
    }

    fn snapshot(&self) -> Vec<(u32, Bucket)> {
        let mut buckets: Vec<_> = self
            .buckets
            .read()
            .iter()
            .map(|(key, bucket)| (*key, Arc::clone(bucket)))
            .collect();
        buckets.sort_unstable_by_key(|(key, _)| *key);
        buckets
    }
}

impl Bitmap for ShardedBitset {
    fn add(&self, x: u64) {
        let (key, value) = split(x);
        self.bucket_or_insert(key).write().set(value);
    }

    fn remove(&self, x: u64) {
        let (key, value) = split(x);
        if let Some(bucket) = self.bucket(key) {
            bucket.write().unset(value);
        }
    }

    fn contains(&self, x: u64) -> bool {
        let (key, value) = split(x);
        self.bucket(key).is_some_and(|bucket| bucket.read().test(value))
    }

    fn is_empty(&self) -> bool {
        self.buckets
            .read()
            .values()
            .all(|bucket| bucket.read().none())
    }

    fn len(&self) -> u64 {
        self.buckets
            .read()
            .values()
            .map(|bucket| bucket.read().count())
            .sum()
    }

    fn clear(&self) {
        self.buckets.write().clear();
    }

    fn write_to(&self, sink: &mut dyn Write) -> Result<u64> {
        let buckets = self.snapshot();
        let mut writer = CountingWriter::new(sink);

        let shards = shard_count_header(buckets.len()).map_err(|e| BitmapError::io(0, e))?;
        write_u32(&mut writer, shards).map_err(|e| BitmapError::io(writer.count(), e))?;

        for (key, bucket) in &buckets {
            write_u32(&mut writer, *key).map_err(|e| BitmapError::io(writer.count(), e))?;
            bucket
                .read()
                .write_to(&mut writer)
                .map_err(|e| BitmapError::io(writer.count(), e))?;
        }

        debug!(
            "Wrote {} shards ({} bytes)",
            buckets.len(),
            writer.count()
        );
        Ok(writer.count())
    }

    fn read_from(&self, source: &mut dyn Read) -> Result<u64> {
        self.clear();

        let mut reader = CountingReader::new(source);
        let shards = read_u32(&mut reader).map_err(|e| BitmapError::io(reader.count(), e))?;

        for _ in 0..shards {
            let key = read_u32(&mut reader).map_err(|e| BitmapError::io(reader.count(), e))?;
            let bits =
                DenseBits::read_from(&mut reader).map_err(|e| BitmapError::io(reader.count(), e))?;
            self.buckets
                .write()
                .insert(key, Arc::new(RwLock::new(bits)));
        }

        debug!("Read {} shards ({} bytes)", shards, reader.count());
        Ok(reader.count())
    }
}
