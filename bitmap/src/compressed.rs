use std::io::{Read, Write};

use parking_lot::RwLock;
use roaring::RoaringTreemap;
use tracing::debug;

use crate::codec::{CountingReader, CountingWriter};
use crate::error::{BitmapError, Result};
use crate::Bitmap;

/// An in-process 64-bit bitmap backed by a compressed [`RoaringTreemap`].
///
/// Behaves exactly like [`ShardedBitset`](crate::ShardedBitset) but trades
/// throughput for memory when members cluster into runs. The wire format is
/// roaring's own portable serialization.
#[derive(Debug, Default)]
pub struct Roaring {
    inner: RwLock<RoaringTreemap>,
}

impl Roaring {
    /// Create an empty bitmap.
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of bytes [`write_to`](Bitmap::write_to) would produce.
    pub fn serialized_size(&self) -> u64 {
        self.inner.read().serialized_size() as u64
    }
}

impl From<RoaringTreemap> for Roaring {
    fn from(treemap: RoaringTreemap) -> Self {
        Self {
            inner: RwLock::new(treemap),
        }
    }
}

impl Bitmap for Roaring {
    fn add(&self, x: u64) {
        self.inner.write().insert(x);
    }

    fn remove(&self, x: u64) {
        self.inner.write().remove(x);
    }

    fn contains(&self, x: u64) -> bool {
        self.inner.read().contains(x)
    }

    fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    fn len(&self) -> u64 {
        self.inner.read().len()
    }

    fn clear(&self) {
        self.inner.write().clear();
    }

    fn write_to(&self, sink: &mut dyn Write) -> Result<u64> {
        let mut writer = CountingWriter::new(sink);
        self.inner
            .read()
            .serialize_into(&mut writer)
            .map_err(|e| BitmapError::io(writer.count(), e))?;

        debug!("Wrote roaring treemap ({} bytes)", writer.count());
        Ok(writer.count())
    }

    fn read_from(&self, source: &mut dyn Read) -> Result<u64> {
        self.clear();

        let mut reader = CountingReader::new(source);
        let treemap = RoaringTreemap::deserialize_from(&mut reader)
            .map_err(|e| BitmapError::io(reader.count(), e))?;
        *self.inner.write() = treemap;

        debug!("Read roaring treemap ({} bytes)", reader.count());
        Ok(reader.count())
    }
}
